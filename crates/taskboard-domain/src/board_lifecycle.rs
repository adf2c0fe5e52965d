use std::sync::Arc;

use serde_json::json;
use taskboard_core::{TaskboardError, TaskboardResult};
use tracing::{debug, error, info, warn};

use crate::{
    activity::{self, ActivityAction, ActivityLog},
    authorization::{can_access_board, can_create, can_delete_board, can_modify_board, ensure},
    board::{validate_title, Board, BoardId, BoardUpdate, DEFAULT_COLUMNS},
    column::{sorted_columns, Column, ColumnId},
    fetch::{require_board, require_column},
    position::{
        next_position, plan_insert_at, plan_move, plan_reindex, plan_remove, validate_index,
        MoveKind, Scope,
    },
    store::{apply_ops, sort_by_position, BoardFilter, EntityStore, StoreOp, TicketFilter},
    user::{User, UserId},
    views::{BoardWithColumns, ColumnWithTickets},
};

pub struct BoardLifecycle {
    store: Arc<dyn EntityStore>,
    atomic_moves: bool,
}

impl BoardLifecycle {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            atomic_moves: true,
        }
    }

    pub fn with_atomic_moves(mut self, atomic_moves: bool) -> Self {
        self.atomic_moves = atomic_moves;
        self
    }

    async fn modifiable_board(&self, actor: &User, board_id: BoardId) -> TaskboardResult<Board> {
        let board = require_board(self.store.as_ref(), board_id).await?;
        ensure(
            can_modify_board(actor, &board),
            "Only the board owner or an admin can change this board",
        )?;
        Ok(board)
    }

    async fn accessible_board(&self, actor: &User, board_id: BoardId) -> TaskboardResult<Board> {
        let board = require_board(self.store.as_ref(), board_id).await?;
        ensure(
            can_access_board(actor, &board),
            "You do not have access to this board",
        )?;
        Ok(board)
    }

    async fn board_columns(&self, board_id: BoardId) -> TaskboardResult<Vec<Column>> {
        Ok(sorted_columns(self.store.list_columns(board_id).await?))
    }

    /// Creates the board with its default columns in one batch. Stores without
    /// transactions may leave part of the batch behind on failure, so the board
    /// and its columns are removed again before the error is returned.
    pub async fn create_board(
        &self,
        actor: &User,
        title: &str,
        description: Option<String>,
    ) -> TaskboardResult<BoardWithColumns> {
        let title = validate_title(title)?;
        ensure(
            can_create(actor),
            "Only admins and members can create boards",
        )?;
        let store = self.store.as_ref();

        let board = Board::new(title, description.unwrap_or_default(), actor.id);
        let columns: Vec<Column> = DEFAULT_COLUMNS
            .iter()
            .zip(0..)
            .map(|(title, position)| Column::new(board.id, (*title).to_string(), position))
            .collect();
        let seed = std::iter::once(StoreOp::InsertBoard(board.clone()))
            .chain(columns.iter().cloned().map(StoreOp::InsertColumn))
            .collect();

        if let Err(e) = apply_ops(store, seed, true).await {
            error!(
                "Seeding columns for board {} failed, rolling back: {}",
                board.id, e
            );
            if let Err(cleanup) = store.delete_columns_by_board(board.id).await {
                warn!("Failed to remove partial columns of {}: {}", board.id, cleanup);
            }
            if let Err(cleanup) = store.delete_board(board.id).await {
                warn!("Failed to roll back board {}: {}", board.id, cleanup);
            }
            return Err(e);
        }

        info!("Created board '{}' ({})", board.title, board.id);
        activity::record(
            store,
            ActivityLog::new(
                ActivityAction::BoardCreate,
                actor.id,
                board.id,
                board.id,
                json!({ "title": board.title }),
            ),
        )
        .await;

        Ok(BoardWithColumns { board, columns })
    }

    /// Admins see every board; everyone else the boards they own or belong to.
    pub async fn list_boards(&self, actor: &User) -> TaskboardResult<Vec<Board>> {
        let filter = if actor.is_admin() {
            BoardFilter::All
        } else {
            BoardFilter::AccessibleBy(actor.id)
        };
        self.store.list_boards(filter).await
    }

    pub async fn get_board(
        &self,
        actor: &User,
        board_id: BoardId,
    ) -> TaskboardResult<BoardWithColumns> {
        let board = self.accessible_board(actor, board_id).await?;
        let columns = self.board_columns(board.id).await?;
        Ok(BoardWithColumns { board, columns })
    }

    pub async fn update_board(
        &self,
        actor: &User,
        board_id: BoardId,
        update: BoardUpdate,
    ) -> TaskboardResult<Board> {
        let title = update.title.as_deref().map(validate_title).transpose()?;
        let mut board = self.modifiable_board(actor, board_id).await?;

        if let Some(title) = title {
            board.update_title(title);
        }
        if let Some(description) = update.description {
            board.update_description(description);
        }
        self.store.update_board(board.clone()).await?;

        activity::record(
            self.store.as_ref(),
            ActivityLog::new(
                ActivityAction::BoardUpdate,
                actor.id,
                board.id,
                board.id,
                json!({ "title": board.title }),
            ),
        )
        .await;
        Ok(board)
    }

    pub async fn add_member(
        &self,
        actor: &User,
        board_id: BoardId,
        user_id: UserId,
    ) -> TaskboardResult<Board> {
        let mut board = self.modifiable_board(actor, board_id).await?;
        if self.store.find_user(user_id).await?.is_none() {
            return Err(TaskboardError::NotFound(format!("User {}", user_id)));
        }
        if !board.add_member(user_id) {
            debug!("User {} already has access to board {}", user_id, board.id);
            return Ok(board);
        }
        self.store.update_board(board.clone()).await?;
        activity::record(
            self.store.as_ref(),
            ActivityLog::new(
                ActivityAction::BoardUpdate,
                actor.id,
                board.id,
                board.id,
                json!({ "addedMember": user_id }),
            ),
        )
        .await;
        Ok(board)
    }

    pub async fn remove_member(
        &self,
        actor: &User,
        board_id: BoardId,
        user_id: UserId,
    ) -> TaskboardResult<Board> {
        let mut board = self.modifiable_board(actor, board_id).await?;
        if !board.remove_member(user_id) {
            return Ok(board);
        }
        self.store.update_board(board.clone()).await?;
        activity::record(
            self.store.as_ref(),
            ActivityLog::new(
                ActivityAction::BoardUpdate,
                actor.id,
                board.id,
                board.id,
                json!({ "removedMember": user_id }),
            ),
        )
        .await;
        Ok(board)
    }

    /// Removes the board with its columns and tickets. Comments of those
    /// tickets are left behind.
    pub async fn delete_board(&self, actor: &User, board_id: BoardId) -> TaskboardResult<()> {
        let store = self.store.as_ref();
        let board = require_board(store, board_id).await?;
        ensure(
            can_delete_board(actor, &board),
            "Only the board owner or an admin can delete this board",
        )?;

        store.delete_tickets_by_board(board.id).await?;
        store.delete_columns_by_board(board.id).await?;
        store.delete_board(board.id).await?;
        info!(
            "Deleted board '{}' ({}) with its columns and tickets",
            board.title, board.id
        );

        activity::record(
            store,
            ActivityLog::new(
                ActivityAction::BoardDelete,
                actor.id,
                board.id,
                board.id,
                json!({ "title": board.title }),
            ),
        )
        .await;
        Ok(())
    }

    /// Appends a column, or inserts it at `index` pushing later columns right.
    pub async fn add_column(
        &self,
        actor: &User,
        board_id: BoardId,
        title: &str,
        index: Option<i32>,
    ) -> TaskboardResult<Column> {
        let title = validate_title(title)?;
        let board = self.modifiable_board(actor, board_id).await?;
        let columns = self.board_columns(board.id).await?;

        let (position, shifts) = match index {
            Some(index) => plan_insert_at(Scope::Board(board.id), index, columns.len())?,
            None => (next_position(columns.iter().map(|c| c.position)), Vec::new()),
        };
        let column = Column::new(board.id, title, position);

        let mut ops: Vec<StoreOp> = shifts.into_iter().map(StoreOp::Shift).collect();
        ops.push(StoreOp::InsertColumn(column.clone()));
        apply_ops(self.store.as_ref(), ops, self.atomic_moves).await?;

        activity::record(
            self.store.as_ref(),
            ActivityLog::new(
                ActivityAction::ColumnCreate,
                actor.id,
                column.id,
                board.id,
                json!({ "title": column.title, "position": position }),
            ),
        )
        .await;
        Ok(column)
    }

    pub async fn rename_column(
        &self,
        actor: &User,
        column_id: ColumnId,
        title: &str,
    ) -> TaskboardResult<Column> {
        let title = validate_title(title)?;
        let mut column = require_column(self.store.as_ref(), column_id).await?;
        self.modifiable_board(actor, column.board_id).await?;

        let previous = column.title.clone();
        column.rename(title);
        self.store.apply(StoreOp::SaveColumn(column.clone())).await?;

        activity::record(
            self.store.as_ref(),
            ActivityLog::new(
                ActivityAction::ColumnUpdate,
                actor.id,
                column.id,
                column.board_id,
                json!({ "from": previous, "to": column.title }),
            ),
        )
        .await;
        Ok(column)
    }

    /// Reorders a column within its board. Returns the board's columns in
    /// their new order.
    pub async fn move_column(
        &self,
        actor: &User,
        column_id: ColumnId,
        index: i32,
    ) -> TaskboardResult<Vec<Column>> {
        validate_index(index)?;
        let mut column = require_column(self.store.as_ref(), column_id).await?;
        let board = self.modifiable_board(actor, column.board_id).await?;
        let scope = Scope::Board(board.id);
        let columns = self.board_columns(board.id).await?;

        let ordered: Vec<_> = columns.iter().map(|c| (c.id, c.position)).collect();
        let mut ops: Vec<StoreOp> = plan_reindex(&ordered)
            .into_iter()
            .map(|(id, position)| StoreOp::Reposition {
                scope,
                id,
                position,
            })
            .collect();
        let from_position = columns
            .iter()
            .position(|c| c.id == column.id)
            .and_then(|rank| i32::try_from(rank).ok())
            .ok_or_else(|| {
                TaskboardError::Internal(format!("Column {} missing from its board", column.id))
            })?;

        let plan = plan_move(
            column.id,
            scope,
            from_position,
            scope,
            index,
            columns.len(),
        )?;
        if plan.kind == MoveKind::NoOp && ops.is_empty() {
            return Ok(columns);
        }

        column.update_position(plan.position);
        ops.extend(plan.shifts.into_iter().map(StoreOp::Shift));
        ops.push(StoreOp::SaveColumn(column.clone()));
        apply_ops(self.store.as_ref(), ops, self.atomic_moves).await?;

        activity::record(
            self.store.as_ref(),
            ActivityLog::new(
                ActivityAction::ColumnUpdate,
                actor.id,
                column.id,
                board.id,
                json!({ "oldIndex": from_position, "newIndex": plan.position }),
            ),
        )
        .await;
        self.board_columns(board.id).await
    }

    /// Refuses while the column holds live tickets. Soft-deleted tickets
    /// still in it are removed together with the column.
    pub async fn delete_column(&self, actor: &User, column_id: ColumnId) -> TaskboardResult<()> {
        let store = self.store.as_ref();
        let column = require_column(store, column_id).await?;
        let board = self.modifiable_board(actor, column.board_id).await?;

        let tickets = store
            .list_tickets(TicketFilter {
                column_id: Some(column.id),
                include_deleted: true,
                ..TicketFilter::default()
            })
            .await?;
        if tickets.iter().any(|t| t.is_live()) {
            return Err(TaskboardError::Conflict(
                "Cannot delete column with existing tickets".into(),
            ));
        }

        let mut ops: Vec<StoreOp> = tickets
            .iter()
            .map(|t| StoreOp::DeleteTicket(t.id))
            .collect();
        ops.push(StoreOp::DeleteColumn(column.id));
        ops.push(StoreOp::Shift(plan_remove(
            Scope::Board(board.id),
            column.position,
        )));
        apply_ops(store, ops, self.atomic_moves).await?;
        for ticket in &tickets {
            store.delete_comments_by_ticket(ticket.id).await?;
        }
        info!(
            "Deleted column '{}' from board {} ({} soft-deleted tickets purged)",
            column.title,
            board.id,
            tickets.len()
        );

        activity::record(
            store,
            ActivityLog::new(
                ActivityAction::ColumnDelete,
                actor.id,
                column.id,
                board.id,
                json!({ "title": column.title }),
            ),
        )
        .await;
        Ok(())
    }

    /// Columns in order, each with its live tickets in order.
    pub async fn list_columns(
        &self,
        actor: &User,
        board_id: BoardId,
    ) -> TaskboardResult<Vec<ColumnWithTickets>> {
        let board = self.accessible_board(actor, board_id).await?;
        let columns = self.board_columns(board.id).await?;
        let mut tickets = self
            .store
            .list_tickets(TicketFilter::in_board(board.id))
            .await?;
        sort_by_position(&mut tickets);

        Ok(columns
            .into_iter()
            .map(|column| {
                let tickets = tickets
                    .iter()
                    .filter(|t| t.column_id == column.id)
                    .cloned()
                    .collect();
                ColumnWithTickets { column, tickets }
            })
            .collect())
    }
}
