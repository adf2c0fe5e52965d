pub mod activity;
pub mod authorization;
pub mod board;
pub mod board_lifecycle;
pub mod column;
pub mod comment;
mod fetch;
pub mod position;
pub mod service;
pub mod store;
pub mod ticket;
pub mod ticket_lifecycle;
pub mod ticket_update;
pub mod user;
pub mod user_directory;
pub mod views;

pub use activity::{ActivityAction, ActivityLog, EntityType};
pub use board::{Board, BoardId, BoardUpdate, DEFAULT_COLUMNS};
pub use board_lifecycle::BoardLifecycle;
pub use column::{Column, ColumnId};
pub use comment::{Comment, CommentId, TOMBSTONE_TEXT};
pub use position::{MoveKind, MovePlan, PositionRange, PositionShift, Scope};
pub use service::Taskboard;
pub use store::{BoardFilter, EntityStore, StoreOp, TicketFilter};
pub use ticket::{NewTicket, Ticket, TicketId, TicketPriority, TicketStatus};
pub use ticket_lifecycle::TicketLifecycle;
pub use ticket_update::{FieldUpdate, TicketUpdate};
pub use user::{Role, User, UserId, UserSummary};
pub use user_directory::UserDirectory;
pub use views::{
    BoardWithColumns, ColumnWithTickets, CommentView, DeleteOutcome, MoveOutcome, TicketDetails,
    TicketQuery, TicketSort,
};
