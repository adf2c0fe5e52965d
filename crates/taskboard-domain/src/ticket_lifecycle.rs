//! Ticket lifecycle.
//!
//! Every operation resolves the records it needs, asks the authorization
//! rules for a decision and only then writes. Position-affecting writes go
//! through the position ledger and are handed to the store as one batch of
//! [`StoreOp`]s.

use std::sync::Arc;

use serde_json::json;
use taskboard_core::{PageRequest, Paginated, TaskboardError, TaskboardResult};
use tracing::{debug, info, warn};

use crate::{
    activity::{self, ActivityAction, ActivityLog},
    authorization::{
        can_access_board, can_access_ticket, can_create, can_delete_comment, can_hard_delete,
        can_modify_ticket, ensure,
    },
    board::Board,
    column::{Column, ColumnId},
    comment::{validate_text, Comment, CommentId},
    fetch::{column_on_board, require_board, require_comment, require_ticket, UserCache},
    position::{
        next_position, plan_move, plan_reindex, plan_remove, validate_index, MoveKind, Scope,
    },
    store::{apply_ops, sort_by_position, BoardFilter, EntityStore, StoreOp, TicketFilter},
    ticket::{validate_description, validate_title, NewTicket, Ticket, TicketId, TicketStatus},
    ticket_update::{FieldUpdate, TicketUpdate},
    user::{User, UserId},
    views::{
        ColumnWithTickets, CommentView, DeleteOutcome, MoveOutcome, TicketDetails, TicketQuery,
    },
};

pub struct TicketLifecycle {
    store: Arc<dyn EntityStore>,
    atomic_moves: bool,
    default_page_size: u32,
}

impl TicketLifecycle {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            atomic_moves: true,
            default_page_size: PageRequest::default().limit,
        }
    }

    /// `false` forces the step-by-step path even on transactional stores.
    pub fn with_atomic_moves(mut self, atomic_moves: bool) -> Self {
        self.atomic_moves = atomic_moves;
        self
    }

    pub fn with_default_page_size(mut self, limit: u32) -> Self {
        self.default_page_size = limit;
        self
    }

    fn uses_atomic_path(&self) -> bool {
        self.atomic_moves && self.store.supports_atomic_batch()
    }

    async fn authorized_ticket(
        &self,
        actor: &User,
        ticket_id: TicketId,
    ) -> TaskboardResult<(Ticket, Option<Board>)> {
        let ticket = require_ticket(self.store.as_ref(), ticket_id).await?;
        let board = self.store.find_board(ticket.board_id).await?;
        ensure(
            can_access_ticket(actor, &ticket, board.as_ref()),
            "You do not have access to this ticket",
        )?;
        Ok((ticket, board))
    }

    async fn modifiable_ticket(
        &self,
        actor: &User,
        ticket_id: TicketId,
    ) -> TaskboardResult<(Ticket, Option<Board>)> {
        let ticket = require_ticket(self.store.as_ref(), ticket_id).await?;
        let board = self.store.find_board(ticket.board_id).await?;
        ensure(
            can_modify_ticket(actor, &ticket, board.as_ref()),
            "You do not have permission to modify this ticket",
        )?;
        Ok((ticket, board))
    }

    pub async fn create(&self, actor: &User, input: NewTicket) -> TaskboardResult<Ticket> {
        let title = validate_title(&input.title)?;
        let description = validate_description(input.description.as_deref().unwrap_or(""))?;
        ensure(
            can_create(actor),
            "Only admins and members can create tickets",
        )?;

        let store = self.store.as_ref();
        let board = require_board(store, input.board_id).await?;
        ensure(
            can_access_board(actor, &board),
            "You do not have access to this board",
        )?;
        let column = column_on_board(store, input.column_id, board.id).await?;
        if let Some(assignee) = input.assignee {
            ensure_user_exists(store, assignee).await?;
        }

        let siblings = store
            .list_tickets(TicketFilter::live_in_column(column.id))
            .await?;
        let position = next_position(siblings.iter().map(|t| t.position));

        let mut ticket = Ticket::new(title, board.id, column.id, position, actor.id);
        ticket.description = description;
        ticket.priority = input.priority.unwrap_or_default();
        ticket.assignee = input.assignee;
        ticket.status = TicketStatus::from_column_title(&column.title);

        store.apply(StoreOp::InsertTicket(ticket.clone())).await?;
        info!(
            "Created ticket {} in column '{}' at position {}",
            ticket.id, column.title, position
        );
        activity::record(
            store,
            ActivityLog::new(
                ActivityAction::TicketCreate,
                actor.id,
                ticket.id,
                board.id,
                json!({ "title": ticket.title, "column": column.id }),
            ),
        )
        .await;

        Ok(ticket)
    }

    pub async fn get(&self, actor: &User, ticket_id: TicketId) -> TaskboardResult<TicketDetails> {
        let (ticket, board) = self.authorized_ticket(actor, ticket_id).await?;
        let store = self.store.as_ref();
        let mut users = UserCache::default();

        let assignee_user = match ticket.assignee {
            Some(id) => users.summary(store, id).await?,
            None => None,
        };
        let creator = users.summary(store, ticket.created_by).await?;
        let column = store.find_column(ticket.column_id).await?;

        let mut comment_threads = Vec::new();
        for comment in store.list_comments(ticket.id).await? {
            let author = users.summary(store, comment.author).await?;
            comment_threads.push(CommentView::new(comment, author));
        }

        Ok(TicketDetails {
            ticket,
            assignee_user,
            creator,
            board,
            column,
            comment_threads,
        })
    }

    pub async fn update(
        &self,
        actor: &User,
        ticket_id: TicketId,
        patch: TicketUpdate,
    ) -> TaskboardResult<Ticket> {
        let (mut ticket, _) = self.modifiable_ticket(actor, ticket_id).await?;
        ensure_live(&ticket)?;
        let store = self.store.as_ref();

        if let Some(column_id) = patch.column {
            column_on_board(store, column_id, ticket.board_id).await?;
        }
        if let FieldUpdate::Set(assignee) = patch.assignee {
            ensure_user_exists(store, assignee).await?;
        }
        if patch.is_empty() {
            return Ok(ticket);
        }

        let mut changed = Vec::new();
        if let Some(title) = patch.title {
            ticket.title = title;
            changed.push("title");
        }
        if let Some(description) = patch.description {
            ticket.description = description;
            changed.push("description");
        }
        if let Some(priority) = patch.priority {
            ticket.priority = priority;
            changed.push("priority");
        }
        if patch.assignee.is_change() {
            patch.assignee.apply_to(&mut ticket.assignee);
            changed.push("assignee");
        }
        if let Some(column_id) = patch.column {
            // Re-pointing only; ordering is left to the move operation.
            ticket.column_id = column_id;
            changed.push("column");
        }
        ticket.updated_at = chrono::Utc::now();

        store.apply(StoreOp::SaveTicket(ticket.clone())).await?;
        activity::record(
            store,
            ActivityLog::new(
                ActivityAction::TicketUpdate,
                actor.id,
                ticket.id,
                ticket.board_id,
                json!({ "fields": changed }),
            ),
        )
        .await;

        Ok(ticket)
    }

    /// Move a ticket to `index` within `destination`, which may be its own column.
    pub async fn move_ticket(
        &self,
        actor: &User,
        ticket_id: TicketId,
        destination: ColumnId,
        index: i32,
    ) -> TaskboardResult<MoveOutcome> {
        validate_index(index)?;
        let (mut ticket, _) = self.modifiable_ticket(actor, ticket_id).await?;
        ensure_live(&ticket)?;
        let store = self.store.as_ref();
        let dest = column_on_board(store, destination, ticket.board_id).await?;
        let source_id = ticket.column_id;

        let mut ops = Vec::new();
        let source = self.healed_siblings(source_id, &mut ops).await?;
        let from_position = source
            .iter()
            .position(|t| t.id == ticket.id)
            .and_then(|rank| i32::try_from(rank).ok())
            .ok_or_else(|| {
                TaskboardError::Internal(format!(
                    "Ticket {} missing from its column listing",
                    ticket.id
                ))
            })?;
        let dest_count = if dest.id == source_id {
            source.len()
        } else {
            self.healed_siblings(dest.id, &mut ops).await?.len()
        };

        let plan = plan_move(
            ticket.id,
            Scope::Column(source_id),
            from_position,
            Scope::Column(dest.id),
            index,
            dest_count,
        )?;
        let status = TicketStatus::from_column_title(&dest.title);

        if plan.kind == MoveKind::NoOp && ops.is_empty() && status == ticket.status {
            debug!("Move of ticket {} is a no-op", ticket.id);
            let affected = self.affected_columns(&dest, None).await?;
            return Ok(MoveOutcome {
                ticket,
                affected_columns: affected,
            });
        }

        ticket.move_to_column(dest.id, plan.position, status);
        ops.extend(plan.shifts.iter().copied().map(StoreOp::Shift));
        ops.push(StoreOp::SaveTicket(ticket.clone()));

        if self.uses_atomic_path() {
            self.move_ticket_atomic(ops).await?;
        } else {
            self.move_ticket_best_effort(ops).await?;
        }

        activity::record(
            store,
            ActivityLog::ticket_move(
                actor.id,
                ticket.id,
                ticket.board_id,
                source_id,
                dest.id,
                from_position,
                plan.position,
            ),
        )
        .await;

        let source_column = if source_id == dest.id {
            None
        } else {
            store.find_column(source_id).await?
        };
        let affected = self.affected_columns(&dest, source_column.as_ref()).await?;
        Ok(MoveOutcome {
            ticket,
            affected_columns: affected,
        })
    }

    /// All shifts and the ticket write commit together or not at all.
    async fn move_ticket_atomic(&self, ops: Vec<StoreOp>) -> TaskboardResult<()> {
        debug!("Applying move as one batch of {} operations", ops.len());
        self.store.apply_batch(ops).await
    }

    /// Shifts first, ticket last. A failure part way leaves stale positions
    /// that readers tolerate and the next move through the scope heals.
    async fn move_ticket_best_effort(&self, ops: Vec<StoreOp>) -> TaskboardResult<()> {
        let total = ops.len();
        for (applied, op) in ops.into_iter().enumerate() {
            if let Err(e) = self.store.apply(op).await {
                warn!(
                    "Move failed after {} of {} steps; positions may be stale: {}",
                    applied, total, e
                );
                return Err(e);
            }
        }
        Ok(())
    }

    /// Live siblings of a column in display order. When soft deletes have left
    /// gaps, repositions that renumber them are appended to `ops` and the
    /// returned tickets carry the renumbered positions.
    async fn healed_siblings(
        &self,
        column_id: ColumnId,
        ops: &mut Vec<StoreOp>,
    ) -> TaskboardResult<Vec<Ticket>> {
        let mut siblings = self
            .store
            .list_tickets(TicketFilter::live_in_column(column_id))
            .await?;
        sort_by_position(&mut siblings);

        let ordered: Vec<_> = siblings.iter().map(|t| (t.id, t.position)).collect();
        let changes = plan_reindex(&ordered);
        if !changes.is_empty() {
            debug!(
                "Renumbering {} tickets in column {} before move",
                changes.len(),
                column_id
            );
        }
        for (id, position) in changes {
            if let Some(t) = siblings.iter_mut().find(|t| t.id == id) {
                t.position = position;
            }
            ops.push(StoreOp::Reposition {
                scope: Scope::Column(column_id),
                id,
                position,
            });
        }
        Ok(siblings)
    }

    async fn affected_columns(
        &self,
        dest: &Column,
        source: Option<&Column>,
    ) -> TaskboardResult<Vec<ColumnWithTickets>> {
        let mut affected = Vec::new();
        for column in std::iter::once(dest).chain(source) {
            let mut tickets = self
                .store
                .list_tickets(TicketFilter::live_in_column(column.id))
                .await?;
            sort_by_position(&mut tickets);
            affected.push(ColumnWithTickets {
                column: column.clone(),
                tickets,
            });
        }
        Ok(affected)
    }

    /// Soft delete by default. A hard delete asked for by a non-admin is
    /// downgraded to a soft delete rather than refused.
    pub async fn delete(
        &self,
        actor: &User,
        ticket_id: TicketId,
        hard_delete: bool,
    ) -> TaskboardResult<DeleteOutcome> {
        let (mut ticket, _) = self.modifiable_ticket(actor, ticket_id).await?;
        let store = self.store.as_ref();

        let hard = if hard_delete && !can_hard_delete(actor) {
            warn!(
                "Hard delete of ticket {} requested by non-admin {}; soft deleting instead",
                ticket.id, actor.id
            );
            false
        } else {
            hard_delete
        };

        if hard {
            let mut ops = vec![StoreOp::DeleteTicket(ticket.id)];
            if ticket.is_live() {
                ops.push(StoreOp::Shift(plan_remove(
                    Scope::Column(ticket.column_id),
                    ticket.position,
                )));
            }
            apply_ops(store, ops, self.atomic_moves).await?;
            store.delete_comments_by_ticket(ticket.id).await?;
            info!("Hard deleted ticket {}", ticket.id);
        } else if ticket.is_live() {
            ticket.soft_delete();
            store.apply(StoreOp::SaveTicket(ticket.clone())).await?;
            info!("Soft deleted ticket {}", ticket.id);
        } else {
            debug!("Ticket {} already soft deleted", ticket.id);
            return Ok(DeleteOutcome {
                ticket_id: ticket.id,
                hard_deleted: false,
            });
        }

        activity::record(
            store,
            ActivityLog::ticket_delete(actor.id, ticket.id, ticket.board_id, hard),
        )
        .await;

        Ok(DeleteOutcome {
            ticket_id: ticket.id,
            hard_deleted: hard,
        })
    }

    pub async fn add_comment(
        &self,
        actor: &User,
        ticket_id: TicketId,
        text: &str,
    ) -> TaskboardResult<CommentView> {
        let text = validate_text(text)?;
        ensure(
            can_create(actor),
            "Only admins and members can add comments",
        )?;
        let (mut ticket, _) = self.authorized_ticket(actor, ticket_id).await?;
        ensure_live(&ticket)?;
        let store = self.store.as_ref();

        let comment = Comment::new(ticket.id, actor.id, text);
        store.insert_comment(comment.clone()).await?;
        ticket.attach_comment(comment.id);
        store.apply(StoreOp::SaveTicket(ticket.clone())).await?;

        activity::record(
            store,
            ActivityLog::new(
                ActivityAction::CommentAdd,
                actor.id,
                comment.id,
                ticket.board_id,
                json!({ "ticket": ticket.id }),
            ),
        )
        .await;

        Ok(CommentView::new(comment, Some(actor.summary())))
    }

    /// Tombstones the comment. Deleting a tombstone again changes nothing.
    pub async fn delete_comment(
        &self,
        actor: &User,
        comment_id: CommentId,
    ) -> TaskboardResult<Comment> {
        let store = self.store.as_ref();
        let mut comment = require_comment(store, comment_id).await?;
        ensure(
            can_delete_comment(actor, &comment),
            "Only the author or an admin can delete this comment",
        )?;
        if comment.is_deleted {
            return Ok(comment);
        }

        comment.tombstone();
        store.update_comment(comment.clone()).await?;

        if let Some(ticket) = store.find_ticket(comment.ticket_id).await? {
            activity::record(
                store,
                ActivityLog::new(
                    ActivityAction::CommentDelete,
                    actor.id,
                    comment.id,
                    ticket.board_id,
                    json!({ "ticket": ticket.id }),
                ),
            )
            .await;
        }

        Ok(comment)
    }

    /// Newest first, tombstones included.
    pub async fn list_comments(
        &self,
        actor: &User,
        ticket_id: TicketId,
    ) -> TaskboardResult<Vec<CommentView>> {
        let (ticket, _) = self.authorized_ticket(actor, ticket_id).await?;
        let store = self.store.as_ref();
        let mut users = UserCache::default();

        let mut comments = store.list_comments(ticket.id).await?;
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut views = Vec::with_capacity(comments.len());
        for comment in comments {
            let author = users.summary(store, comment.author).await?;
            views.push(CommentView::new(comment, author));
        }
        Ok(views)
    }

    /// Live tickets on boards the actor can see, filtered, sorted and paged.
    pub async fn list_tickets(
        &self,
        actor: &User,
        query: TicketQuery,
    ) -> TaskboardResult<Paginated<Ticket>> {
        let store = self.store.as_ref();
        let mut filter = TicketFilter {
            column_id: query.column_id,
            assignee: query.assignee,
            ..TicketFilter::default()
        };

        if let Some(board_id) = query.board_id {
            let board = require_board(store, board_id).await?;
            ensure(
                can_access_board(actor, &board),
                "You do not have access to this board",
            )?;
            filter.board_id = Some(board.id);
        } else if !actor.is_admin() {
            let boards = store
                .list_boards(BoardFilter::AccessibleBy(actor.id))
                .await?;
            filter.board_ids = Some(boards.into_iter().map(|b| b.id).collect());
        }

        let mut tickets = store.list_tickets(filter).await?;
        tickets.retain(|t| query.keeps(t));
        query.sort_tickets(&mut tickets);

        let page = PageRequest::new(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(self.default_page_size),
        );
        Ok(page.slice(tickets))
    }
}

fn ensure_live(ticket: &Ticket) -> TaskboardResult<()> {
    if ticket.is_live() {
        Ok(())
    } else {
        Err(TaskboardError::Conflict(format!(
            "Ticket {} has been deleted",
            ticket.id
        )))
    }
}

async fn ensure_user_exists(store: &dyn EntityStore, id: UserId) -> TaskboardResult<()> {
    match store.find_user(id).await? {
        Some(_) => Ok(()),
        None => Err(TaskboardError::validation(
            "assignee",
            "Assignee does not exist",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::MockEntityStore, user::Role};
    use mockall::predicate::*;
    use uuid::Uuid;

    struct Fixture {
        actor: User,
        board: Board,
        column: Column,
        ticket: Ticket,
    }

    fn fixture(role: Role) -> Fixture {
        let actor = User::new("Ada".into(), "ada@example.com".into(), role);
        let board = Board::new("Board".into(), String::new(), actor.id);
        let column = Column::new(board.id, "Todo".into(), 0);
        let mut ticket = Ticket::new("Task".into(), board.id, column.id, 0, actor.id);
        ticket.status = TicketStatus::Todo;
        Fixture {
            actor,
            board,
            column,
            ticket,
        }
    }

    fn expect_lookups(store: &mut MockEntityStore, f: &Fixture) {
        let ticket = f.ticket.clone();
        store
            .expect_find_ticket()
            .with(eq(ticket.id))
            .returning(move |_| Ok(Some(ticket.clone())));
        let board = f.board.clone();
        store
            .expect_find_board()
            .returning(move |_| Ok(Some(board.clone())));
        let column = f.column.clone();
        store
            .expect_find_column()
            .returning(move |_| Ok(Some(column.clone())));
        store.expect_append_activity().returning(|_| Ok(()));
    }

    #[tokio::test]
    async fn non_admin_hard_delete_is_downgraded() {
        let f = fixture(Role::Member);
        let mut store = MockEntityStore::new();
        expect_lookups(&mut store, &f);
        store
            .expect_apply()
            .withf(|op| matches!(op, StoreOp::SaveTicket(t) if t.deleted_at.is_some()))
            .times(1)
            .returning(|_| Ok(()));
        store.expect_apply_batch().never();
        store.expect_delete_comments_by_ticket().never();

        let tickets = TicketLifecycle::new(Arc::new(store));
        let outcome = tickets.delete(&f.actor, f.ticket.id, true).await.unwrap();
        assert!(!outcome.hard_deleted);
    }

    #[tokio::test]
    async fn repeated_soft_delete_writes_nothing() {
        let mut f = fixture(Role::Member);
        f.ticket.soft_delete();
        let mut store = MockEntityStore::new();
        let ticket = f.ticket.clone();
        store
            .expect_find_ticket()
            .with(eq(ticket.id))
            .returning(move |_| Ok(Some(ticket.clone())));
        let board = f.board.clone();
        store
            .expect_find_board()
            .returning(move |_| Ok(Some(board.clone())));
        store.expect_apply().never();
        store.expect_apply_batch().never();
        store.expect_append_activity().never();

        let tickets = TicketLifecycle::new(Arc::new(store));
        let outcome = tickets.delete(&f.actor, f.ticket.id, false).await.unwrap();
        assert_eq!(outcome.ticket_id, f.ticket.id);
        assert!(!outcome.hard_deleted);
    }

    #[tokio::test]
    async fn admin_hard_delete_compacts_and_drops_comments() {
        let f = fixture(Role::Admin);
        let mut store = MockEntityStore::new();
        expect_lookups(&mut store, &f);
        store.expect_supports_atomic_batch().return_const(true);
        let ticket_id = f.ticket.id;
        store
            .expect_apply_batch()
            .withf(move |ops| {
                ops.len() == 2
                    && ops[0] == StoreOp::DeleteTicket(ticket_id)
                    && matches!(ops[1], StoreOp::Shift(s) if s.delta == -1)
            })
            .times(1)
            .returning(|_| Ok(()));
        store
            .expect_delete_comments_by_ticket()
            .with(eq(ticket_id))
            .times(1)
            .returning(|_| Ok(()));

        let tickets = TicketLifecycle::new(Arc::new(store));
        let outcome = tickets.delete(&f.actor, ticket_id, true).await.unwrap();
        assert!(outcome.hard_deleted);
    }

    fn two_ticket_column(f: &Fixture) -> Vec<Ticket> {
        let mut second = Ticket::new("Next".into(), f.board.id, f.column.id, 1, f.actor.id);
        second.created_at = f.ticket.created_at + chrono::Duration::seconds(1);
        vec![f.ticket.clone(), second]
    }

    #[tokio::test]
    async fn move_uses_batch_on_transactional_store() {
        let f = fixture(Role::Member);
        let siblings = two_ticket_column(&f);
        let mut store = MockEntityStore::new();
        expect_lookups(&mut store, &f);
        store
            .expect_list_tickets()
            .returning(move |_| Ok(siblings.clone()));
        store.expect_supports_atomic_batch().return_const(true);
        store
            .expect_apply_batch()
            .withf(|ops| matches!(ops.last(), Some(StoreOp::SaveTicket(t)) if t.position == 1))
            .times(1)
            .returning(|_| Ok(()));
        store.expect_apply().never();

        let tickets = TicketLifecycle::new(Arc::new(store));
        let outcome = tickets
            .move_ticket(&f.actor, f.ticket.id, f.column.id, 1)
            .await
            .unwrap();
        assert_eq!(outcome.ticket.position, 1);
        assert_eq!(outcome.affected_columns.len(), 1);
    }

    #[tokio::test]
    async fn move_falls_back_to_sequential_writes() {
        let f = fixture(Role::Member);
        let siblings = two_ticket_column(&f);
        let mut store = MockEntityStore::new();
        expect_lookups(&mut store, &f);
        store
            .expect_list_tickets()
            .returning(move |_| Ok(siblings.clone()));
        store.expect_supports_atomic_batch().return_const(false);
        store.expect_apply_batch().never();
        store.expect_apply().times(2).returning(|_| Ok(()));

        let tickets = TicketLifecycle::new(Arc::new(store));
        tickets
            .move_ticket(&f.actor, f.ticket.id, f.column.id, 5)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn disabled_atomic_moves_forces_sequential_path() {
        let f = fixture(Role::Member);
        let siblings = two_ticket_column(&f);
        let mut store = MockEntityStore::new();
        expect_lookups(&mut store, &f);
        store
            .expect_list_tickets()
            .returning(move |_| Ok(siblings.clone()));
        store.expect_supports_atomic_batch().return_const(true);
        store.expect_apply_batch().never();
        store.expect_apply().times(2).returning(|_| Ok(()));

        let tickets = TicketLifecycle::new(Arc::new(store)).with_atomic_moves(false);
        tickets
            .move_ticket(&f.actor, f.ticket.id, f.column.id, 1)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn move_to_current_slot_writes_nothing() {
        let f = fixture(Role::Member);
        let siblings = two_ticket_column(&f);
        let mut store = MockEntityStore::new();
        expect_lookups(&mut store, &f);
        store
            .expect_list_tickets()
            .returning(move |_| Ok(siblings.clone()));
        store.expect_supports_atomic_batch().return_const(true);
        store.expect_apply_batch().never();
        store.expect_apply().never();

        let tickets = TicketLifecycle::new(Arc::new(store));
        let outcome = tickets
            .move_ticket(&f.actor, f.ticket.id, f.column.id, 0)
            .await
            .unwrap();
        assert_eq!(outcome.ticket.position, 0);
    }

    #[tokio::test]
    async fn move_surfaces_store_failure() {
        let f = fixture(Role::Member);
        let siblings = two_ticket_column(&f);
        let mut store = MockEntityStore::new();
        expect_lookups(&mut store, &f);
        store
            .expect_list_tickets()
            .returning(move |_| Ok(siblings.clone()));
        store.expect_supports_atomic_batch().return_const(true);
        store
            .expect_apply_batch()
            .returning(|_| Err(TaskboardError::Store("connection lost".into())));

        let tickets = TicketLifecycle::new(Arc::new(store));
        let err = tickets
            .move_ticket(&f.actor, f.ticket.id, f.column.id, 1)
            .await
            .unwrap_err();
        assert!(err.is_store());
    }

    #[tokio::test]
    async fn negative_index_is_rejected_before_any_lookup() {
        let f = fixture(Role::Member);
        let tickets = TicketLifecycle::new(Arc::new(MockEntityStore::new()));
        let err = tickets
            .move_ticket(&f.actor, f.ticket.id, f.column.id, -1)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn activity_failure_does_not_fail_create() {
        let f = fixture(Role::Member);
        let mut store = MockEntityStore::new();
        let board = f.board.clone();
        store
            .expect_find_board()
            .returning(move |_| Ok(Some(board.clone())));
        let column = f.column.clone();
        store
            .expect_find_column()
            .returning(move |_| Ok(Some(column.clone())));
        store.expect_list_tickets().returning(|_| Ok(Vec::new()));
        store.expect_apply().times(1).returning(|_| Ok(()));
        store
            .expect_append_activity()
            .returning(|_| Err(TaskboardError::Store("disk full".into())));

        let tickets = TicketLifecycle::new(Arc::new(store));
        let ticket = tickets
            .create(
                &f.actor,
                NewTicket {
                    title: "  Task A  ".into(),
                    board_id: f.board.id,
                    column_id: f.column.id,
                    ..NewTicket::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(ticket.title, "Task A");
        assert_eq!(ticket.position, 0);
        assert_eq!(ticket.status, TicketStatus::Todo);
    }

    #[tokio::test]
    async fn create_rejects_column_from_other_board() {
        let f = fixture(Role::Member);
        let mut store = MockEntityStore::new();
        let board = f.board.clone();
        store
            .expect_find_board()
            .returning(move |_| Ok(Some(board.clone())));
        let foreign = Column::new(Uuid::new_v4(), "Todo".into(), 0);
        store
            .expect_find_column()
            .returning(move |_| Ok(Some(foreign.clone())));
        store.expect_apply().never();

        let tickets = TicketLifecycle::new(Arc::new(store));
        let err = tickets
            .create(
                &f.actor,
                NewTicket {
                    title: "Task".into(),
                    board_id: f.board.id,
                    column_id: f.column.id,
                    ..NewTicket::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
}
