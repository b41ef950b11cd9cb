//! Data models for the timeline engine.

pub mod connection;
pub mod requests;
pub mod settings;
pub mod stage;
pub mod status;

pub use connection::{Connection, EmailStatus, ProgressStage, ResponseType};
pub use requests::UpdateStageRequest;
pub use settings::TimelineSettings;
pub use stage::{StageUpdate, Timeline, TimelineStage};
pub use status::{StageStatus, StageType};
