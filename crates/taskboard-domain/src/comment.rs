use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_core::{TaskboardError, TaskboardResult};
use uuid::Uuid;

use crate::{ticket::TicketId, user::UserId};

pub type CommentId = Uuid;

pub const TOMBSTONE_TEXT: &str = "This comment has been deleted.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub ticket_id: TicketId,
    pub author: UserId,
    pub text: String,
    #[serde(default)]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(ticket_id: TicketId, author: UserId, text: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            ticket_id,
            author,
            text,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the text with the tombstone; the record keeps its place in the thread.
    pub fn tombstone(&mut self) {
        self.is_deleted = true;
        self.text = TOMBSTONE_TEXT.to_string();
        self.updated_at = Utc::now();
    }
}

pub fn validate_text(raw: &str) -> TaskboardResult<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(TaskboardError::validation(
            "text",
            "Comment text is required",
        ));
    }
    Ok(text.to_string())
}
