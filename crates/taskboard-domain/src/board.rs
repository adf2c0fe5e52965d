use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_core::{TaskboardError, TaskboardResult};
use uuid::Uuid;

use crate::user::UserId;

pub type BoardId = Uuid;

/// Columns seeded into every new board, in position order.
pub const DEFAULT_COLUMNS: [&str; 5] = ["Backlog", "Todo", "In Progress", "Review", "Done"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub owner: UserId,
    #[serde(default)]
    pub members: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn new(title: String, description: String, owner: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            owner,
            members: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner == user_id
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    pub fn update_title(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    pub fn update_description(&mut self, description: String) {
        self.description = description;
        self.updated_at = Utc::now();
    }

    /// Returns false when the user already had access through ownership or membership.
    pub fn add_member(&mut self, user_id: UserId) -> bool {
        if self.is_owner(user_id) || self.is_member(user_id) {
            return false;
        }
        self.members.push(user_id);
        self.updated_at = Utc::now();
        true
    }

    pub fn remove_member(&mut self, user_id: UserId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != user_id);
        let removed = self.members.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }
}

/// Partial update of the editable board fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Trims and rejects blank titles. Shared by boards and columns.
pub fn validate_title(raw: &str) -> TaskboardResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TaskboardError::validation("title", "Title is required"));
    }
    Ok(title.to_string())
}
