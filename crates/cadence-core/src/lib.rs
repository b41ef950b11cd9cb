//! Core library for the Cadence outreach timeline application.
//!
//! This crate provides the business logic for tracking an outreach
//! relationship ("connection") through its communication stages — first
//! impression, response, follow-up — and for deriving the messaging
//! context that drives downstream content generation.
//!
//! # Components
//!
//! - [`db`]: the timeline store — SQLite CRUD for connections, stages
//!   and settings
//! - [`engine`]: the stage progression engine — status vocabulary and
//!   the auto-advancement rule (sending an outbound stage spawns a
//!   response stage with a deadline)
//! - [`window`]: the bounded visible-window selector for presentation
//! - [`scheduler`]: the deadline sweep and its recurring timer
//! - [`classifier`] and [`context`]: the status/response classifier and
//!   the template merge producing a [`context::MessagingContext`]
//!
//! # Quick Start
//!
//! ```rust
//! use cadence_core::{EngineBuilder, params::{CreateConnection, Id}};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = EngineBuilder::new()
//!     .with_database_path(Some("cadence.db"))
//!     .build()
//!     .await?;
//!
//! let connection = engine
//!     .add_connection(&CreateConnection {
//!         user_id: "user-1".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! // One first_impression stage at order 1, status waiting.
//! let stage = engine
//!     .initialize_timeline(&Id { id: connection.id })
//!     .await?;
//! println!("Created stage: {}", stage);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod context;
pub mod db;
pub mod display;
pub mod engine;
pub mod error;
pub mod models;
pub mod params;
pub mod scheduler;
pub mod window;

// Re-export commonly used types
pub use context::{MessagingContext, StatusTemplate, TemplateOverride};
pub use db::Database;
pub use engine::{Engine, EngineBuilder};
pub use error::{Result, TimelineError};
pub use models::{
    Connection, EmailStatus, ProgressStage, ResponseType, StageStatus, StageType, StageUpdate,
    Timeline, TimelineSettings, TimelineStage, UpdateStageRequest,
};
pub use scheduler::{DeadlineScheduler, DeadlineSweep, SWEEP_INTERVAL};
pub use window::visible_stages;
