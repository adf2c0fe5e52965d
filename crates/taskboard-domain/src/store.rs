use async_trait::async_trait;
use taskboard_core::TaskboardResult;
use uuid::Uuid;

use crate::{
    activity::ActivityLog,
    board::{Board, BoardId},
    column::{Column, ColumnId},
    comment::{Comment, CommentId},
    position::{PositionShift, Scope},
    ticket::{Ticket, TicketId},
    user::{User, UserId},
};

/// Which boards `list_boards` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardFilter {
    All,
    /// Boards the user owns or is a member of.
    AccessibleBy(UserId),
}

/// Ticket query pushed down to the store. Fields left as `None` do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub board_id: Option<BoardId>,
    pub board_ids: Option<Vec<BoardId>>,
    pub column_id: Option<ColumnId>,
    pub assignee: Option<UserId>,
    /// Soft-deleted tickets are excluded unless this is set.
    pub include_deleted: bool,
}

impl TicketFilter {
    /// Live tickets of one column; the sibling set of the ticket ledger.
    pub fn live_in_column(column_id: ColumnId) -> Self {
        Self {
            column_id: Some(column_id),
            ..Self::default()
        }
    }

    pub fn in_board(board_id: BoardId) -> Self {
        Self {
            board_id: Some(board_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        (self.include_deleted || ticket.is_live())
            && self.board_id.is_none_or(|id| ticket.board_id == id)
            && self
                .board_ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&ticket.board_id))
            && self.column_id.is_none_or(|id| ticket.column_id == id)
            && self.assignee.is_none_or(|id| ticket.assignee == Some(id))
    }
}

/// A position-affecting write. Shifts and the entity writes they make room
/// for are submitted together so a store can commit them as one unit.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    Shift(PositionShift),
    Reposition {
        scope: Scope,
        id: Uuid,
        position: i32,
    },
    InsertBoard(Board),
    InsertTicket(Ticket),
    SaveTicket(Ticket),
    DeleteTicket(TicketId),
    InsertColumn(Column),
    SaveColumn(Column),
    DeleteColumn(ColumnId),
}

/// The durable collections the lifecycle managers work against.
///
/// Sibling queries return records ordered by position with creation time as
/// the tie-break. Lookups return `Ok(None)` for unknown ids; `Err` is reserved
/// for store failures and uniqueness conflicts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn find_user(&self, id: UserId) -> TaskboardResult<Option<User>>;

    /// Case-insensitive on the normalized email.
    async fn find_user_by_email(&self, email: String) -> TaskboardResult<Option<User>>;

    async fn list_users(&self) -> TaskboardResult<Vec<User>>;

    /// Fails with `Conflict` when the email is already registered.
    async fn insert_user(&self, user: User) -> TaskboardResult<()>;

    async fn find_board(&self, id: BoardId) -> TaskboardResult<Option<Board>>;

    /// Newest first.
    async fn list_boards(&self, filter: BoardFilter) -> TaskboardResult<Vec<Board>>;

    async fn insert_board(&self, board: Board) -> TaskboardResult<()>;

    async fn update_board(&self, board: Board) -> TaskboardResult<()>;

    async fn delete_board(&self, id: BoardId) -> TaskboardResult<()>;

    async fn find_column(&self, id: ColumnId) -> TaskboardResult<Option<Column>>;

    async fn list_columns(&self, board_id: BoardId) -> TaskboardResult<Vec<Column>>;

    async fn delete_columns_by_board(&self, board_id: BoardId) -> TaskboardResult<()>;

    /// Finds soft-deleted tickets too.
    async fn find_ticket(&self, id: TicketId) -> TaskboardResult<Option<Ticket>>;

    async fn list_tickets(&self, filter: TicketFilter) -> TaskboardResult<Vec<Ticket>>;

    async fn delete_tickets_by_board(&self, board_id: BoardId) -> TaskboardResult<()>;

    async fn find_comment(&self, id: CommentId) -> TaskboardResult<Option<Comment>>;

    /// Oldest first.
    async fn list_comments(&self, ticket_id: TicketId) -> TaskboardResult<Vec<Comment>>;

    async fn insert_comment(&self, comment: Comment) -> TaskboardResult<()>;

    async fn update_comment(&self, comment: Comment) -> TaskboardResult<()>;

    async fn delete_comments_by_ticket(&self, ticket_id: TicketId) -> TaskboardResult<()>;

    async fn append_activity(&self, entry: ActivityLog) -> TaskboardResult<()>;

    /// Whether `apply_batch` commits all-or-nothing.
    fn supports_atomic_batch(&self) -> bool;

    async fn apply(&self, op: StoreOp) -> TaskboardResult<()>;

    /// Applies `ops` in order as one transaction. Stores without transaction
    /// support return `Store` without applying anything.
    async fn apply_batch(&self, ops: Vec<StoreOp>) -> TaskboardResult<()>;
}

/// Apply position-affecting writes, atomically when allowed and supported,
/// otherwise one by one in the given order.
pub async fn apply_ops(
    store: &dyn EntityStore,
    ops: Vec<StoreOp>,
    prefer_atomic: bool,
) -> TaskboardResult<()> {
    if prefer_atomic && store.supports_atomic_batch() {
        return store.apply_batch(ops).await;
    }
    for op in ops {
        store.apply(op).await?;
    }
    Ok(())
}

/// Tickets of a scope in display order: position, then creation time.
pub fn sort_by_position(tickets: &mut [Ticket]) {
    tickets.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;
    use taskboard_core::TaskboardError;

    fn ticket_in(board: BoardId, column: ColumnId) -> Ticket {
        Ticket::new("t".into(), board, column, 0, Uuid::new_v4())
    }

    #[test]
    fn filter_excludes_soft_deleted_by_default() {
        let column = Uuid::new_v4();
        let mut ticket = ticket_in(Uuid::new_v4(), column);
        let filter = TicketFilter::live_in_column(column);
        assert!(filter.matches(&ticket));

        ticket.soft_delete();
        assert!(!filter.matches(&ticket));
        assert!(TicketFilter {
            include_deleted: true,
            ..filter
        }
        .matches(&ticket));
    }

    #[test]
    fn filter_by_board_set_and_assignee() {
        let board = Uuid::new_v4();
        let assignee = Uuid::new_v4();
        let mut ticket = ticket_in(board, Uuid::new_v4());

        let filter = TicketFilter {
            board_ids: Some(vec![Uuid::new_v4(), board]),
            assignee: Some(assignee),
            ..TicketFilter::default()
        };
        assert!(!filter.matches(&ticket));
        ticket.assignee = Some(assignee);
        assert!(filter.matches(&ticket));
        assert!(!TicketFilter::in_board(Uuid::new_v4()).matches(&ticket));
    }

    #[test]
    fn sort_breaks_position_ties_by_creation_time() {
        let board = Uuid::new_v4();
        let column = Uuid::new_v4();
        let mut first = ticket_in(board, column);
        let mut second = ticket_in(board, column);
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        first.position = 1;
        second.position = 1;
        let mut zero = ticket_in(board, column);
        zero.position = 0;

        let mut tickets = vec![second.clone(), first.clone(), zero.clone()];
        sort_by_position(&mut tickets);
        let order: Vec<_> = tickets.iter().map(|t| t.id).collect();
        assert_eq!(order, vec![zero.id, first.id, second.id]);
    }

    #[tokio::test]
    async fn apply_ops_uses_batch_when_supported() {
        let mut store = MockEntityStore::new();
        store.expect_supports_atomic_batch().return_const(true);
        store
            .expect_apply_batch()
            .withf(|ops| ops.len() == 2)
            .times(1)
            .returning(|_| Ok(()));
        store.expect_apply().never();

        let ops = vec![
            StoreOp::DeleteTicket(Uuid::new_v4()),
            StoreOp::DeleteColumn(Uuid::new_v4()),
        ];
        apply_ops(&store, ops, true).await.unwrap();
    }

    #[tokio::test]
    async fn apply_ops_falls_back_to_sequential() {
        let mut store = MockEntityStore::new();
        store.expect_supports_atomic_batch().return_const(false);
        store.expect_apply_batch().never();
        store.expect_apply().times(2).returning(|_| Ok(()));

        let ops = vec![
            StoreOp::DeleteTicket(Uuid::new_v4()),
            StoreOp::DeleteTicket(Uuid::new_v4()),
        ];
        apply_ops(&store, ops, true).await.unwrap();
    }

    #[tokio::test]
    async fn apply_ops_stops_at_first_failure() {
        let failing = Uuid::new_v4();
        let mut store = MockEntityStore::new();
        store.expect_supports_atomic_batch().return_const(true);
        store
            .expect_apply()
            .with(eq(StoreOp::DeleteTicket(failing)))
            .times(1)
            .returning(|_| Err(TaskboardError::Store("timeout".into())));

        let ops = vec![
            StoreOp::DeleteTicket(failing),
            StoreOp::DeleteTicket(Uuid::new_v4()),
        ];
        let err = apply_ops(&store, ops, false).await.unwrap_err();
        assert!(err.is_store());
    }
}
