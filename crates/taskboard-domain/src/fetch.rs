use std::collections::HashMap;

use taskboard_core::{TaskboardError, TaskboardResult};

use crate::{
    board::{Board, BoardId},
    column::{Column, ColumnId},
    comment::{Comment, CommentId},
    store::EntityStore,
    ticket::{Ticket, TicketId},
    user::{UserId, UserSummary},
};

pub(crate) async fn require_board(store: &dyn EntityStore, id: BoardId) -> TaskboardResult<Board> {
    store
        .find_board(id)
        .await?
        .ok_or_else(|| TaskboardError::NotFound(format!("Board {}", id)))
}

pub(crate) async fn require_column(
    store: &dyn EntityStore,
    id: ColumnId,
) -> TaskboardResult<Column> {
    store
        .find_column(id)
        .await?
        .ok_or_else(|| TaskboardError::NotFound(format!("Column {}", id)))
}

/// A column that must belong to `board_id`; anything else is bad input.
pub(crate) async fn column_on_board(
    store: &dyn EntityStore,
    id: ColumnId,
    board_id: BoardId,
) -> TaskboardResult<Column> {
    match store.find_column(id).await? {
        Some(column) if column.board_id == board_id => Ok(column),
        _ => Err(TaskboardError::validation(
            "column",
            "Invalid column for this board",
        )),
    }
}

pub(crate) async fn require_ticket(
    store: &dyn EntityStore,
    id: TicketId,
) -> TaskboardResult<Ticket> {
    store
        .find_ticket(id)
        .await?
        .ok_or_else(|| TaskboardError::NotFound(format!("Ticket {}", id)))
}

pub(crate) async fn require_comment(
    store: &dyn EntityStore,
    id: CommentId,
) -> TaskboardResult<Comment> {
    store
        .find_comment(id)
        .await?
        .ok_or_else(|| TaskboardError::NotFound(format!("Comment {}", id)))
}

/// Resolves user ids to summaries, fetching each id at most once.
#[derive(Default)]
pub(crate) struct UserCache {
    seen: HashMap<UserId, Option<UserSummary>>,
}

impl UserCache {
    pub(crate) async fn summary(
        &mut self,
        store: &dyn EntityStore,
        id: UserId,
    ) -> TaskboardResult<Option<UserSummary>> {
        if let Some(hit) = self.seen.get(&id) {
            return Ok(hit.clone());
        }
        let summary = store.find_user(id).await?.map(|u| u.summary());
        self.seen.insert(id, summary.clone());
        Ok(summary)
    }
}
