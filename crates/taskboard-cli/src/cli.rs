use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "A team kanban board with ordered columns and tickets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the taskboard data file (or set TASKBOARD_FILE)
    #[arg(long, global = true, value_name = "FILE", env = "TASKBOARD_FILE")]
    pub file: Option<PathBuf>,

    /// Email of the user performing the command (or set TASKBOARD_ACTOR)
    #[arg(long, global = true, value_name = "EMAIL", env = "TASKBOARD_ACTOR")]
    pub actor: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// User operations
    User(UserCommand),
    /// Board operations
    Board(BoardCommand),
    /// Column operations
    Column(ColumnCommand),
    /// Ticket operations
    Ticket(TicketCommand),
    /// Comment operations
    Comment(CommentCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Admin,
    Member,
    Viewer,
}

// User commands
#[derive(Args)]
pub struct UserCommand {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a new user (no actor required)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
    },
    /// List all users
    List,
}

// Board commands
#[derive(Args)]
pub struct BoardCommand {
    #[command(subcommand)]
    pub action: BoardAction,
}

#[derive(Subcommand)]
pub enum BoardAction {
    /// Create a board with the default columns
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List the boards the actor can see
    List,
    /// Get a board with its columns and tickets
    Get {
        #[arg(long)]
        id: Uuid,
    },
    /// Update a board
    Update {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a board with all its columns and tickets
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Add a member to a board
    AddMember {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        user_id: Uuid,
    },
    /// Remove a member from a board
    RemoveMember {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        user_id: Uuid,
    },
}

// Column commands
#[derive(Args)]
pub struct ColumnCommand {
    #[command(subcommand)]
    pub action: ColumnAction,
}

#[derive(Subcommand)]
pub enum ColumnAction {
    /// Add a column, appended unless a position is given
    Add {
        #[arg(long)]
        board_id: Uuid,
        #[arg(long)]
        title: String,
        #[arg(long)]
        position: Option<i32>,
    },
    /// List columns for a board
    List {
        #[arg(long)]
        board_id: Uuid,
    },
    /// Rename a column
    Rename {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        title: String,
    },
    /// Move a column to another position
    Move {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        position: i32,
    },
    /// Delete an empty column
    Delete {
        #[arg(long)]
        id: Uuid,
    },
}

// Ticket commands
#[derive(Args)]
pub struct TicketCommand {
    #[command(subcommand)]
    pub action: TicketAction,
}

#[derive(Subcommand)]
pub enum TicketAction {
    /// Create a ticket at the end of a column
    Create(TicketCreateArgs),
    /// Get a ticket with its comments
    Get {
        #[arg(long)]
        id: Uuid,
    },
    /// List tickets with optional filters
    List(TicketListArgs),
    /// Update ticket fields
    Update(TicketUpdateArgs),
    /// Move a ticket to a column and position
    Move {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        column_id: Uuid,
        #[arg(long, default_value_t = 0)]
        position: i32,
    },
    /// Delete a ticket (soft unless --hard is given by an admin)
    Delete {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        hard: bool,
    },
}

#[derive(Args)]
pub struct TicketCreateArgs {
    #[arg(long)]
    pub board_id: Uuid,
    #[arg(long)]
    pub column_id: Uuid,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    /// Priority: low, medium or high
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub assignee: Option<Uuid>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortArg {
    CreatedAt,
    Priority,
}

#[derive(Args)]
pub struct TicketListArgs {
    #[arg(long)]
    pub board_id: Option<Uuid>,
    #[arg(long)]
    pub column_id: Option<Uuid>,
    #[arg(long)]
    pub assignee: Option<Uuid>,
    #[arg(long)]
    pub priority: Option<String>,
    /// Status: backlog, todo, in_progress, review or done
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,
    #[arg(long)]
    pub ascending: bool,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Args)]
pub struct TicketUpdateArgs {
    #[arg(long)]
    pub id: Uuid,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long, conflicts_with = "unassign")]
    pub assignee: Option<Uuid>,
    #[arg(long)]
    pub unassign: bool,
    #[arg(long)]
    pub column_id: Option<Uuid>,
    /// Raw JSON patch, merged under the flags above
    #[arg(long, value_name = "JSON")]
    pub patch: Option<String>,
}

// Comment commands
#[derive(Args)]
pub struct CommentCommand {
    #[command(subcommand)]
    pub action: CommentAction,
}

#[derive(Subcommand)]
pub enum CommentAction {
    /// Add a comment to a ticket
    Add {
        #[arg(long)]
        ticket_id: Uuid,
        #[arg(long)]
        text: String,
    },
    /// List a ticket's comments, newest first
    List {
        #[arg(long)]
        ticket_id: Uuid,
    },
    /// Delete a comment, leaving a tombstone
    Delete {
        #[arg(long)]
        id: Uuid,
    },
}

impl From<RoleArg> for taskboard_domain::Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Self::Admin,
            RoleArg::Member => Self::Member,
            RoleArg::Viewer => Self::Viewer,
        }
    }
}

impl From<SortArg> for taskboard_domain::TicketSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::CreatedAt => Self::CreatedAt,
            SortArg::Priority => Self::Priority,
        }
    }
}
