//! In-memory entity store.
//!
//! All collections sit behind one `tokio::sync::RwLock`. Batches are applied
//! to a staged copy and swapped in only when every operation succeeded, which
//! gives the lifecycle managers all-or-nothing position updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_core::{TaskboardError, TaskboardResult};
use taskboard_domain::{
    position::Scope,
    store::{sort_by_position, BoardFilter, EntityStore, StoreOp, TicketFilter},
    user::normalize_email,
    ActivityLog, Board, BoardId, Column, ColumnId, Comment, CommentId, Ticket, TicketId, User,
    UserId,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::traits::{PersistenceMetadata, StoreSnapshot};

/// Every persisted collection, in the shape written to disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collections {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub activity: Vec<ActivityLog>,
}

impl Collections {
    fn apply(&mut self, op: StoreOp) -> TaskboardResult<()> {
        match op {
            StoreOp::Shift(shift) => {
                let mut moved = 0;
                match shift.scope {
                    Scope::Board(board_id) => {
                        for column in self.columns.iter_mut().filter(|c| c.board_id == board_id) {
                            if let Some(position) = shift.apply_to(column.id, column.position) {
                                column.position = position;
                                moved += 1;
                            }
                        }
                    }
                    Scope::Column(column_id) => {
                        let live = TicketFilter::live_in_column(column_id);
                        for ticket in self.tickets.iter_mut().filter(|t| live.matches(t)) {
                            if let Some(position) = shift.apply_to(ticket.id, ticket.position) {
                                ticket.position = position;
                                moved += 1;
                            }
                        }
                    }
                }
                tracing::debug!(
                    "Shifted {} siblings in {:?} by {}",
                    moved,
                    shift.scope,
                    shift.delta
                );
            }
            StoreOp::Reposition {
                scope,
                id,
                position,
            } => match scope {
                Scope::Board(board_id) => {
                    let column = self
                        .columns
                        .iter_mut()
                        .find(|c| c.id == id && c.board_id == board_id)
                        .ok_or_else(|| missing("Column", id))?;
                    column.position = position;
                }
                Scope::Column(column_id) => {
                    let ticket = self
                        .tickets
                        .iter_mut()
                        .find(|t| t.id == id && t.column_id == column_id)
                        .ok_or_else(|| missing("Ticket", id))?;
                    ticket.position = position;
                }
            },
            StoreOp::InsertBoard(board) => {
                if self.boards.iter().any(|b| b.id == board.id) {
                    return Err(TaskboardError::Conflict(format!(
                        "Board {} already exists",
                        board.id
                    )));
                }
                self.boards.push(board);
            }
            StoreOp::InsertTicket(ticket) => {
                if self.tickets.iter().any(|t| t.id == ticket.id) {
                    return Err(TaskboardError::Conflict(format!(
                        "Ticket {} already exists",
                        ticket.id
                    )));
                }
                self.tickets.push(ticket);
            }
            StoreOp::SaveTicket(ticket) => {
                let slot = self
                    .tickets
                    .iter_mut()
                    .find(|t| t.id == ticket.id)
                    .ok_or_else(|| missing("Ticket", ticket.id))?;
                *slot = ticket;
            }
            StoreOp::DeleteTicket(id) => self.tickets.retain(|t| t.id != id),
            StoreOp::InsertColumn(column) => {
                if self.columns.iter().any(|c| c.id == column.id) {
                    return Err(TaskboardError::Conflict(format!(
                        "Column {} already exists",
                        column.id
                    )));
                }
                self.columns.push(column);
            }
            StoreOp::SaveColumn(column) => {
                let slot = self
                    .columns
                    .iter_mut()
                    .find(|c| c.id == column.id)
                    .ok_or_else(|| missing("Column", column.id))?;
                *slot = column;
            }
            StoreOp::DeleteColumn(id) => self.columns.retain(|c| c.id != id),
        }
        Ok(())
    }
}

fn missing(kind: &str, id: Uuid) -> TaskboardError {
    TaskboardError::NotFound(format!("{} {}", kind, id))
}

pub struct MemoryStore {
    state: RwLock<Collections>,
    transactional: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_collections(Collections::default())
    }

    pub fn from_collections(collections: Collections) -> Self {
        Self {
            state: RwLock::new(collections),
            transactional: true,
        }
    }

    /// A store that reports no batch support, forcing step-by-step writes.
    pub fn without_transactions(mut self) -> Self {
        self.transactional = false;
        self
    }

    pub async fn collections(&self) -> Collections {
        self.state.read().await.clone()
    }

    pub async fn export_snapshot(&self, instance_id: Uuid) -> TaskboardResult<StoreSnapshot> {
        let state = self.state.read().await;
        Ok(StoreSnapshot {
            data: serde_json::to_vec(&*state)?,
            metadata: PersistenceMetadata::new(instance_id),
        })
    }

    pub fn import_snapshot(snapshot: &StoreSnapshot) -> TaskboardResult<Self> {
        let collections: Collections = serde_json::from_slice(&snapshot.data)?;
        Ok(Self::from_collections(collections))
    }

    /// Drops activity entries older than the retention window.
    pub async fn purge_expired_activity(&self, now: DateTime<Utc>, retention_days: u32) -> usize {
        let mut state = self.state.write().await;
        let before = state.activity.len();
        state
            .activity
            .retain(|entry| !entry.is_expired(now, retention_days));
        let purged = before - state.activity.len();
        if purged > 0 {
            tracing::info!(
                "Purged {} activity entries older than {} days",
                purged,
                retention_days
            );
        }
        purged
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find_user(&self, id: UserId) -> TaskboardResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: String) -> TaskboardResult<Option<User>> {
        let email = normalize_email(&email);
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| normalize_email(&u.email) == email)
            .cloned())
    }

    async fn list_users(&self) -> TaskboardResult<Vec<User>> {
        Ok(self.state.read().await.users.clone())
    }

    async fn insert_user(&self, user: User) -> TaskboardResult<()> {
        let email = normalize_email(&user.email);
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| normalize_email(&u.email) == email) {
            return Err(TaskboardError::Conflict(format!(
                "A user with email {} already exists",
                user.email
            )));
        }
        state.users.push(user);
        Ok(())
    }

    async fn find_board(&self, id: BoardId) -> TaskboardResult<Option<Board>> {
        let state = self.state.read().await;
        Ok(state.boards.iter().find(|b| b.id == id).cloned())
    }

    async fn list_boards(&self, filter: BoardFilter) -> TaskboardResult<Vec<Board>> {
        let state = self.state.read().await;
        let mut boards: Vec<Board> = state
            .boards
            .iter()
            .filter(|b| match filter {
                BoardFilter::All => true,
                BoardFilter::AccessibleBy(user) => b.is_owner(user) || b.is_member(user),
            })
            .cloned()
            .collect();
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(boards)
    }

    async fn insert_board(&self, board: Board) -> TaskboardResult<()> {
        self.state.write().await.boards.push(board);
        Ok(())
    }

    async fn update_board(&self, board: Board) -> TaskboardResult<()> {
        let mut state = self.state.write().await;
        let slot = state
            .boards
            .iter_mut()
            .find(|b| b.id == board.id)
            .ok_or_else(|| missing("Board", board.id))?;
        *slot = board;
        Ok(())
    }

    async fn delete_board(&self, id: BoardId) -> TaskboardResult<()> {
        self.state.write().await.boards.retain(|b| b.id != id);
        Ok(())
    }

    async fn find_column(&self, id: ColumnId) -> TaskboardResult<Option<Column>> {
        let state = self.state.read().await;
        Ok(state.columns.iter().find(|c| c.id == id).cloned())
    }

    async fn list_columns(&self, board_id: BoardId) -> TaskboardResult<Vec<Column>> {
        let state = self.state.read().await;
        let columns = state
            .columns
            .iter()
            .filter(|c| c.board_id == board_id)
            .cloned()
            .collect();
        Ok(taskboard_domain::column::sorted_columns(columns))
    }

    async fn delete_columns_by_board(&self, board_id: BoardId) -> TaskboardResult<()> {
        self.state
            .write()
            .await
            .columns
            .retain(|c| c.board_id != board_id);
        Ok(())
    }

    async fn find_ticket(&self, id: TicketId) -> TaskboardResult<Option<Ticket>> {
        let state = self.state.read().await;
        Ok(state.tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tickets(&self, filter: TicketFilter) -> TaskboardResult<Vec<Ticket>> {
        let state = self.state.read().await;
        let mut tickets: Vec<Ticket> = state
            .tickets
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        sort_by_position(&mut tickets);
        Ok(tickets)
    }

    async fn delete_tickets_by_board(&self, board_id: BoardId) -> TaskboardResult<()> {
        self.state
            .write()
            .await
            .tickets
            .retain(|t| t.board_id != board_id);
        Ok(())
    }

    async fn find_comment(&self, id: CommentId) -> TaskboardResult<Option<Comment>> {
        let state = self.state.read().await;
        Ok(state.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(&self, ticket_id: TicketId) -> TaskboardResult<Vec<Comment>> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.ticket_id == ticket_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn insert_comment(&self, comment: Comment) -> TaskboardResult<()> {
        self.state.write().await.comments.push(comment);
        Ok(())
    }

    async fn update_comment(&self, comment: Comment) -> TaskboardResult<()> {
        let mut state = self.state.write().await;
        let slot = state
            .comments
            .iter_mut()
            .find(|c| c.id == comment.id)
            .ok_or_else(|| missing("Comment", comment.id))?;
        *slot = comment;
        Ok(())
    }

    async fn delete_comments_by_ticket(&self, ticket_id: TicketId) -> TaskboardResult<()> {
        self.state
            .write()
            .await
            .comments
            .retain(|c| c.ticket_id != ticket_id);
        Ok(())
    }

    async fn append_activity(&self, entry: ActivityLog) -> TaskboardResult<()> {
        self.state.write().await.activity.push(entry);
        Ok(())
    }

    fn supports_atomic_batch(&self) -> bool {
        self.transactional
    }

    async fn apply(&self, op: StoreOp) -> TaskboardResult<()> {
        self.state.write().await.apply(op)
    }

    async fn apply_batch(&self, ops: Vec<StoreOp>) -> TaskboardResult<()> {
        if !self.transactional {
            return Err(TaskboardError::Store(
                "this store does not support transactions".into(),
            ));
        }
        let mut state = self.state.write().await;
        let mut staged = state.clone();
        let count = ops.len();
        for op in ops {
            staged.apply(op)?;
        }
        *state = staged;
        tracing::debug!("Committed batch of {} operations", count);
        Ok(())
    }
}
