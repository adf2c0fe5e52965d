//! Response shapes assembled by the lifecycle managers for display.

use serde::{Deserialize, Serialize};

use crate::{
    board::{Board, BoardId},
    column::{Column, ColumnId},
    comment::{Comment, CommentId},
    ticket::{Ticket, TicketId, TicketPriority, TicketStatus},
    user::{UserId, UserSummary},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardWithColumns {
    #[serde(flatten)]
    pub board: Board,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnWithTickets {
    #[serde(flatten)]
    pub column: Column,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: CommentId,
    pub text: String,
    pub is_deleted: bool,
    /// `None` when the author record no longer exists.
    pub author: Option<UserSummary>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl CommentView {
    pub fn new(comment: Comment, author: Option<UserSummary>) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            is_deleted: comment.is_deleted,
            author,
            created_at: comment.created_at,
        }
    }
}

/// A ticket with its references resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketDetails {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub assignee_user: Option<UserSummary>,
    pub creator: Option<UserSummary>,
    pub board: Option<Board>,
    pub column: Option<Column>,
    pub comment_threads: Vec<CommentView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub ticket: Ticket,
    /// Destination first, then the source column when it differs.
    pub affected_columns: Vec<ColumnWithTickets>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub ticket_id: TicketId,
    pub hard_deleted: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketSort {
    #[default]
    CreatedAt,
    Priority,
}

/// Filters for `list_tickets`; unset fields do not filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketQuery {
    pub board_id: Option<BoardId>,
    pub column_id: Option<ColumnId>,
    pub assignee: Option<UserId>,
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub sort: TicketSort,
    /// Ascending instead of the default newest or highest first.
    #[serde(default)]
    pub ascending: bool,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl TicketQuery {
    pub fn sort_tickets(&self, tickets: &mut [Ticket]) {
        match self.sort {
            TicketSort::CreatedAt => tickets.sort_by_key(|t| t.created_at),
            TicketSort::Priority => tickets.sort_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then(a.created_at.cmp(&b.created_at))
            }),
        }
        if !self.ascending {
            tickets.reverse();
        }
    }

    pub fn keeps(&self, ticket: &Ticket) -> bool {
        self.priority.is_none_or(|p| ticket.priority == p)
            && self.status.is_none_or(|s| ticket.status == s)
    }
}
