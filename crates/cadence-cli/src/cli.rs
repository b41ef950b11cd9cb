//! Command definitions and handlers.
//!
//! Argument structs carry the clap derives and convert into the core
//! parameter types via `From`, so the core stays free of CLI framework
//! concerns. [`Cli`] owns the engine and the renderer and maps each
//! subcommand onto one engine operation plus its formatted output.

use anyhow::{bail, Result};
use cadence_core::{
    display::Stages,
    params::{CreateConnection, CreateNextStage, Id, UpdateSettings, UpdateStageStatus},
    visible_stages, Engine,
};
use clap::{Args, Subcommand, ValueEnum};

use crate::renderer::TerminalRenderer;

/// Seed a new connection record
///
/// Connection records normally come from the surrounding application;
/// this exists for local use and testing.
#[derive(Args)]
pub struct AddConnectionArgs {
    /// Owning user identifier
    pub user_id: String,
    /// Relationship status ('Not Contacted', 'First Impression',
    /// 'Follow-up', 'Response', 'Meeting Scheduled')
    #[arg(short, long)]
    pub email_status: Option<String>,
    /// Most recent unsent draft text
    #[arg(long)]
    pub draft: Option<String>,
    /// Free text describing the relationship
    #[arg(short, long)]
    pub description: Option<String>,
    /// Free-text notes, e.g. the text of their latest reply
    #[arg(short, long)]
    pub notes: Option<String>,
}

impl From<AddConnectionArgs> for CreateConnection {
    fn from(val: AddConnectionArgs) -> Self {
        CreateConnection {
            user_id: val.user_id,
            email_status: val.email_status,
            last_email_draft: val.draft,
            custom_connection_description: val.description,
            notes: val.notes,
        }
    }
}

/// Show details of a specific connection
#[derive(Args)]
pub struct ShowConnectionArgs {
    /// ID of the connection to display
    pub id: u64,
}

impl From<ShowConnectionArgs> for Id {
    fn from(val: ShowConnectionArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(Subcommand)]
pub enum ConnectionCommands {
    /// Seed a new connection record
    #[command(alias = "a")]
    Add(AddConnectionArgs),
    /// Show details of a specific connection
    #[command(alias = "s")]
    Show(ShowConnectionArgs),
}

/// Initialize a connection's timeline
///
/// Creates the single `first_impression` stage at order 1 in status
/// `waiting`, plus the settings row with the default wait window. Fails
/// if the timeline was already initialized.
#[derive(Args)]
pub struct InitTimelineArgs {
    /// ID of the connection to initialize
    pub connection_id: u64,
}

impl From<InitTimelineArgs> for Id {
    fn from(val: InitTimelineArgs) -> Self {
        Id { id: val.connection_id }
    }
}

/// Show a connection's timeline
///
/// By default only the bounded presentation window around the current
/// stage is shown; --all lists every stage.
#[derive(Args)]
pub struct ShowTimelineArgs {
    /// ID of the connection whose timeline to display
    pub connection_id: u64,
    /// Show every stage instead of the presentation window
    #[arg(long)]
    pub all: bool,
}

#[derive(Subcommand)]
pub enum TimelineCommands {
    /// Initialize a connection's timeline
    #[command(alias = "i")]
    Init(InitTimelineArgs),
    /// Show a connection's timeline
    #[command(alias = "s")]
    Show(ShowTimelineArgs),
}

/// Update a stage's status
///
/// Marking an outbound stage `sent` stamps the send time, computes the
/// response deadline from the connection's wait window, and appends the
/// next `response` stage automatically.
#[derive(Args)]
pub struct UpdateStageArgs {
    /// ID of the connection owning the stage
    pub connection_id: u64,
    /// ID of the stage to update
    pub stage_id: u64,
    /// New status for the stage
    #[arg(short, long)]
    pub status: StageStatusArg,
    /// Draft text to store alongside the status change
    #[arg(long)]
    pub draft: Option<String>,
    /// Final email body to store alongside the status change
    #[arg(long)]
    pub email: Option<String>,
}

impl From<UpdateStageArgs> for UpdateStageStatus {
    fn from(val: UpdateStageArgs) -> Self {
        UpdateStageStatus {
            connection_id: val.connection_id,
            stage_id: val.stage_id,
            status: val.status.to_string(),
            draft_content: val.draft,
            email_content: val.email,
        }
    }
}

/// Append the next stage of a timeline by hand
#[derive(Args)]
pub struct NextStageArgs {
    /// ID of the connection owning the timeline
    pub connection_id: u64,
    /// ID of the stage being advanced from
    pub stage_id: u64,
    /// Type of the new stage
    #[arg(short = 't', long = "type")]
    pub stage_type: StageTypeArg,
}

impl From<NextStageArgs> for CreateNextStage {
    fn from(val: NextStageArgs) -> Self {
        CreateNextStage {
            connection_id: val.connection_id,
            stage_id: val.stage_id,
            stage_type: val.stage_type.to_string(),
        }
    }
}

#[derive(Subcommand)]
pub enum StageCommands {
    /// Update a stage's status
    #[command(alias = "u")]
    Update(UpdateStageArgs),
    /// Append the next stage of a timeline by hand
    #[command(alias = "n")]
    Next(NextStageArgs),
}

/// Set the follow-up wait window for a connection
#[derive(Args)]
pub struct SetSettingsArgs {
    /// ID of the connection whose settings to update
    pub connection_id: u64,
    /// Days to wait for a response before a follow-up is due (1-30)
    pub follow_up_wait_days: u32,
}

impl From<SetSettingsArgs> for UpdateSettings {
    fn from(val: SetSettingsArgs) -> Self {
        UpdateSettings {
            connection_id: val.connection_id,
            follow_up_wait_days: val.follow_up_wait_days,
        }
    }
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Set the follow-up wait window for a connection
    Set(SetSettingsArgs),
}

#[derive(Subcommand)]
pub enum DeadlineCommands {
    /// Run one deadline sweep and report what it did
    Check,
}

/// Derive the messaging context for a connection as JSON
#[derive(Args)]
pub struct ContextArgs {
    /// ID of the connection to derive context for
    pub connection_id: u64,
}

impl From<ContextArgs> for Id {
    fn from(val: ContextArgs) -> Self {
        Id { id: val.connection_id }
    }
}

/// Command-line argument representation of stage status values
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum StageStatusArg {
    /// Stage is waiting for action
    Waiting,
    /// Stage content is being drafted
    Draft,
    /// Stage message has been sent
    Sent,
    /// A response to this stage has arrived
    Received,
}

impl std::fmt::Display for StageStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatusArg::Waiting => write!(f, "waiting"),
            StageStatusArg::Draft => write!(f, "draft"),
            StageStatusArg::Sent => write!(f, "sent"),
            StageStatusArg::Received => write!(f, "received"),
        }
    }
}

/// Command-line argument representation of appendable stage types
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum StageTypeArg {
    /// An expected reply from the connection
    Response,
    /// A renewed outreach message after a lapsed deadline
    FollowUp,
}

impl std::fmt::Display for StageTypeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageTypeArg::Response => write!(f, "response"),
            StageTypeArg::FollowUp => write!(f, "follow_up"),
        }
    }
}

/// Command handler tying the engine to terminal output.
pub struct Cli {
    engine: Engine,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(engine: Engine, renderer: TerminalRenderer) -> Self {
        Self { engine, renderer }
    }

    pub async fn handle_connection_command(&self, command: ConnectionCommands) -> Result<()> {
        match command {
            ConnectionCommands::Add(args) => {
                let connection = self.engine.add_connection(&args.into()).await?;
                self.renderer.render(&connection.to_string())
            }
            ConnectionCommands::Show(args) => {
                let id = args.id;
                match self.engine.get_connection(&args.into()).await? {
                    Some(connection) => self.renderer.render(&connection.to_string()),
                    None => bail!("Connection {id} not found"),
                }
            }
        }
    }

    pub async fn handle_timeline_command(&self, command: TimelineCommands) -> Result<()> {
        match command {
            TimelineCommands::Init(args) => {
                let stage = self.engine.initialize_timeline(&args.into()).await?;
                self.renderer
                    .render(&format!("# Timeline initialized\n{stage}\n"))
            }
            TimelineCommands::Show(args) => {
                let timeline = self
                    .engine
                    .get_timeline(&Id { id: args.connection_id })
                    .await?;
                if args.all {
                    self.renderer.render(&timeline.to_string())
                } else {
                    let window = visible_stages(&timeline.stages);
                    let hidden = timeline.stages.len() - window.len();
                    let mut output = Stages::new(&window, "Timeline").to_string();
                    if hidden > 0 {
                        output.push_str(&format!("({hidden} stages hidden; use --all)\n"));
                    }
                    self.renderer.render(&output)
                }
            }
        }
    }

    pub async fn handle_stage_command(&self, command: StageCommands) -> Result<()> {
        match command {
            StageCommands::Update(args) => {
                let update = self.engine.update_stage_status(&args.into()).await?;
                let mut output = format!("# Updated stage\n{}\n", update.stage);
                if let Some(spawned) = &update.spawned {
                    output.push_str(&format!("# Auto-advanced\n{spawned}\n"));
                }
                self.renderer.render(&output)
            }
            StageCommands::Next(args) => {
                let stage = self.engine.create_next_stage(&args.into()).await?;
                self.renderer.render(&format!("# Created stage\n{stage}\n"))
            }
        }
    }

    pub async fn handle_settings_command(&self, command: SettingsCommands) -> Result<()> {
        match command {
            SettingsCommands::Set(args) => {
                let settings = self.engine.update_settings(&args.into()).await?;
                self.renderer.render(&format!(
                    "Follow-up wait for connection {} set to {} days\n",
                    settings.connection_id, settings.follow_up_wait_days
                ))
            }
        }
    }

    pub async fn handle_deadline_command(&self, command: DeadlineCommands) -> Result<()> {
        match command {
            DeadlineCommands::Check => {
                let sweep = self.engine.check_response_deadlines().await?;
                self.renderer.render(&sweep.to_string())
            }
        }
    }

    pub async fn show_context(&self, args: ContextArgs) -> Result<()> {
        let context = self.engine.messaging_context(&args.into()).await?;
        println!("{}", serde_json::to_string_pretty(&context)?);
        Ok(())
    }
}
