//! Append-only audit trail of board activity.
//!
//! Entries are written by the lifecycle managers after a successful mutation
//! and never read back by them. A failed append is logged and swallowed so
//! the audit trail can never fail the operation it describes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{board::BoardId, store::EntityStore, user::UserId};

pub const DEFAULT_RETENTION_DAYS: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityAction {
    #[serde(rename = "ticket.create")]
    TicketCreate,
    #[serde(rename = "ticket.update")]
    TicketUpdate,
    #[serde(rename = "ticket.move")]
    TicketMove,
    #[serde(rename = "ticket.delete")]
    TicketDelete,
    #[serde(rename = "comment.add")]
    CommentAdd,
    #[serde(rename = "comment.delete")]
    CommentDelete,
    #[serde(rename = "board.create")]
    BoardCreate,
    #[serde(rename = "board.update")]
    BoardUpdate,
    #[serde(rename = "board.delete")]
    BoardDelete,
    #[serde(rename = "column.create")]
    ColumnCreate,
    #[serde(rename = "column.update")]
    ColumnUpdate,
    #[serde(rename = "column.delete")]
    ColumnDelete,
}

impl ActivityAction {
    pub fn entity_type(self) -> EntityType {
        match self {
            ActivityAction::TicketCreate
            | ActivityAction::TicketUpdate
            | ActivityAction::TicketMove
            | ActivityAction::TicketDelete => EntityType::Ticket,
            ActivityAction::CommentAdd | ActivityAction::CommentDelete => EntityType::Comment,
            ActivityAction::BoardCreate
            | ActivityAction::BoardUpdate
            | ActivityAction::BoardDelete => EntityType::Board,
            ActivityAction::ColumnCreate
            | ActivityAction::ColumnUpdate
            | ActivityAction::ColumnDelete => EntityType::Column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Ticket,
    Comment,
    Board,
    Column,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: Uuid,
    pub action: ActivityAction,
    pub user_id: UserId,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub board_id: BoardId,
    #[serde(default)]
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    pub fn new(
        action: ActivityAction,
        user_id: UserId,
        entity_id: Uuid,
        board_id: BoardId,
        metadata: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            user_id,
            entity_type: action.entity_type(),
            entity_id,
            board_id,
            metadata,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, retention_days: u32) -> bool {
        self.created_at + Duration::days(i64::from(retention_days)) <= now
    }

    pub fn ticket_move(
        user_id: UserId,
        ticket_id: Uuid,
        board_id: BoardId,
        from_column: Uuid,
        to_column: Uuid,
        old_index: i32,
        new_index: i32,
    ) -> Self {
        Self::new(
            ActivityAction::TicketMove,
            user_id,
            ticket_id,
            board_id,
            json!({
                "fromColumn": from_column,
                "toColumn": to_column,
                "oldIndex": old_index,
                "newIndex": new_index,
            }),
        )
    }

    pub fn ticket_delete(
        user_id: UserId,
        ticket_id: Uuid,
        board_id: BoardId,
        is_hard_delete: bool,
    ) -> Self {
        Self::new(
            ActivityAction::TicketDelete,
            user_id,
            ticket_id,
            board_id,
            json!({ "isHardDelete": is_hard_delete }),
        )
    }
}

pub async fn record(store: &dyn EntityStore, entry: ActivityLog) {
    let action = entry.action;
    if let Err(e) = store.append_activity(entry).await {
        tracing::warn!("Failed to record activity {:?}: {}", action, e);
    }
}
