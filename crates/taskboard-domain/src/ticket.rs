use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_core::{TaskboardError, TaskboardResult};
use uuid::Uuid;

use crate::{board::BoardId, column::ColumnId, comment::CommentId, user::UserId};

pub type TicketId = Uuid;

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TicketPriority {
    /// Case-insensitive parse normalizing to the canonical variant.
    pub fn parse(s: &str) -> TaskboardResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(TicketPriority::Low),
            "medium" => Ok(TicketPriority::Medium),
            "high" => Ok(TicketPriority::High),
            _ => Err(TaskboardError::validation(
                "priority",
                "Priority must be Low, Medium, or High",
            )),
        }
    }
}

/// Reporting status derived from the title of the ticket's column.
///
/// Never authoritative: the column reference is the source of truth and this
/// value is only refreshed when the ticket is moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Backlog,
    Todo,
    InProgress,
    Review,
    Done,
}

impl TicketStatus {
    pub fn from_column_title(title: &str) -> Self {
        match title {
            "Backlog" => TicketStatus::Backlog,
            "Todo" => TicketStatus::Todo,
            "In Progress" | "Doing" => TicketStatus::InProgress,
            "Review" | "Reviewing" => TicketStatus::Review,
            "Done" | "Finished" => TicketStatus::Done,
            _ => TicketStatus::Backlog,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "backlog" => Some(TicketStatus::Backlog),
            "todo" => Some(TicketStatus::Todo),
            "in_progress" => Some(TicketStatus::InProgress),
            "review" => Some(TicketStatus::Review),
            "done" => Some(TicketStatus::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub board_id: BoardId,
    pub column_id: ColumnId,
    #[serde(default)]
    pub assignee: Option<UserId>,
    #[serde(default)]
    pub priority: TicketPriority,
    #[serde(default)]
    pub status: TicketStatus,
    pub position: i32,
    #[serde(default)]
    pub comments: Vec<CommentId>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a ticket; fields are validated by the lifecycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTicket {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
    pub board_id: BoardId,
    pub column_id: ColumnId,
    #[serde(default)]
    pub assignee: Option<UserId>,
}

impl Ticket {
    pub fn new(
        title: String,
        board_id: BoardId,
        column_id: ColumnId,
        position: i32,
        created_by: UserId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description: String::new(),
            board_id,
            column_id,
            assignee: None,
            priority: TicketPriority::Medium,
            status: TicketStatus::Backlog,
            position,
            comments: Vec::new(),
            deleted_at: None,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Live tickets take part in listings and position bookkeeping.
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn move_to_column(&mut self, column_id: ColumnId, position: i32, status: TicketStatus) {
        self.column_id = column_id;
        self.position = position;
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Marks the ticket deleted, keeping the first deletion time on repeats.
    pub fn soft_delete(&mut self) {
        if self.deleted_at.is_none() {
            let now = Utc::now();
            self.deleted_at = Some(now);
            self.updated_at = now;
        }
    }

    pub fn attach_comment(&mut self, comment_id: CommentId) {
        self.comments.push(comment_id);
        self.updated_at = Utc::now();
    }
}

pub fn validate_title(raw: &str) -> TaskboardResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TaskboardError::validation("title", "Title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(TaskboardError::validation(
            "title",
            format!("Title must be at most {} characters", MAX_TITLE_CHARS),
        ));
    }
    Ok(title.to_string())
}

pub fn validate_description(raw: &str) -> TaskboardResult<String> {
    if raw.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(TaskboardError::validation(
            "description",
            format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_CHARS
            ),
        ));
    }
    Ok(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title_trims() {
        assert_eq!(validate_title("  Task A  ").unwrap(), "Task A");
    }

    #[test]
    fn test_validate_title_rejects_blank() {
        assert!(validate_title("").unwrap_err().is_validation());
        assert!(validate_title("   ").unwrap_err().is_validation());
    }

    #[test]
    fn test_validate_title_length_counts_chars() {
        assert!(validate_title(&"a".repeat(100)).is_ok());
        assert!(validate_title(&"a".repeat(101)).is_err());
        assert!(validate_title(&"\u{00e9}".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_description_length() {
        assert!(validate_description(&"x".repeat(1000)).is_ok());
        assert!(validate_description(&"x".repeat(1001)).is_err());
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(TicketPriority::parse("high").unwrap(), TicketPriority::High);
        assert_eq!(TicketPriority::parse("Low").unwrap(), TicketPriority::Low);
        let err = TicketPriority::parse("Urgent").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_priority_rejects_unknown_json() {
        let parsed: Result<TicketPriority, _> = serde_json::from_str("\"Critical\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_status_from_column_title() {
        assert_eq!(TicketStatus::from_column_title("Todo"), TicketStatus::Todo);
        assert_eq!(
            TicketStatus::from_column_title("In Progress"),
            TicketStatus::InProgress
        );
        assert_eq!(
            TicketStatus::from_column_title("Doing"),
            TicketStatus::InProgress
        );
        assert_eq!(
            TicketStatus::from_column_title("Finished"),
            TicketStatus::Done
        );
        assert_eq!(
            TicketStatus::from_column_title("QA Lane"),
            TicketStatus::Backlog
        );
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn test_soft_delete_keeps_first_timestamp() {
        let mut ticket = Ticket::new(
            "Task".into(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            0,
            Uuid::new_v4(),
        );
        assert!(ticket.is_live());

        ticket.soft_delete();
        let first = ticket.deleted_at;
        assert!(first.is_some());

        ticket.soft_delete();
        assert_eq!(ticket.deleted_at, first);
        assert!(!ticket.is_live());
    }
}
