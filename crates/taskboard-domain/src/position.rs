//! Position ledger.
//!
//! Siblings in a scope (columns of a board, live tickets of a column) occupy
//! positions `0..n-1` with no gaps and no duplicates between operations. The
//! functions here never touch storage: they plan the conditional bulk shifts
//! ("add `delta` to every sibling whose position is in `[min, max]`") that a
//! store applies, and the position the moving entity lands on.
//!
//! Shifts must be applied before, or atomically with, the write of the
//! entity itself. Readers always sort by position and tolerate duplicates,
//! so a non-atomic store that applies a plan step by step only exposes a
//! bounded window of stale positions.

use serde::{Deserialize, Serialize};
use taskboard_core::{TaskboardError, TaskboardResult};
use uuid::Uuid;

use crate::{board::BoardId, column::ColumnId};

/// The sibling-ordering context a position is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Columns of a board.
    Board(BoardId),
    /// Live tickets of a column.
    Column(ColumnId),
}

/// Inclusive position bounds; `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl PositionRange {
    pub fn between(min: i32, max: i32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: i32) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn contains(&self, position: i32) -> bool {
        self.min.is_none_or(|min| position >= min) && self.max.is_none_or(|max| position <= max)
    }
}

/// A conditional bulk update over one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionShift {
    pub scope: Scope,
    pub range: PositionRange,
    pub delta: i32,
    /// The entity being moved, which must never be shifted with its siblings.
    pub exclude: Option<Uuid>,
}

impl PositionShift {
    /// The shifted position for a sibling, or `None` if the shift skips it.
    pub fn apply_to(&self, id: Uuid, position: i32) -> Option<i32> {
        if self.exclude == Some(id) || !self.range.contains(position) {
            return None;
        }
        Some(position + self.delta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    NoOp,
    WithinScope,
    AcrossScope,
}

/// Everything a store needs to perform one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub kind: MoveKind,
    pub from_scope: Scope,
    pub to_scope: Scope,
    pub from_position: i32,
    pub position: i32,
    pub shifts: Vec<PositionShift>,
}

/// Append slot: one past the highest live position, or 0 when empty.
///
/// Equal to the live count while the ordering is dense, and never collides
/// with a live sibling when a soft delete has left a gap.
pub fn next_position(live_positions: impl IntoIterator<Item = i32>) -> i32 {
    live_positions
        .into_iter()
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

pub fn validate_index(index: i32) -> TaskboardResult<i32> {
    if index < 0 {
        return Err(TaskboardError::validation(
            "index",
            "Position must be zero or greater",
        ));
    }
    Ok(index)
}

/// Open a slot at `index` (clamped to append) by pushing later siblings down.
pub fn plan_insert_at(
    scope: Scope,
    index: i32,
    live_count: usize,
) -> TaskboardResult<(i32, Vec<PositionShift>)> {
    let position = validate_index(index)?.min(count_as_position(live_count));
    if position == count_as_position(live_count) {
        return Ok((position, Vec::new()));
    }
    Ok((
        position,
        vec![PositionShift {
            scope,
            range: PositionRange::at_least(position),
            delta: 1,
            exclude: None,
        }],
    ))
}

/// Shifts for moving an entity from `old` to `new` inside one scope.
pub fn plan_move_within(scope: Scope, entity: Uuid, old: i32, new: i32) -> Vec<PositionShift> {
    if new > old {
        vec![PositionShift {
            scope,
            range: PositionRange::between(old + 1, new),
            delta: -1,
            exclude: Some(entity),
        }]
    } else if new < old {
        vec![PositionShift {
            scope,
            range: PositionRange::between(new, old - 1),
            delta: 1,
            exclude: Some(entity),
        }]
    } else {
        Vec::new()
    }
}

/// Close the gap in the source scope and open a slot in the destination.
/// The two shifts touch disjoint scopes, so their relative order is free.
pub fn plan_move_across(
    entity: Uuid,
    old_scope: Scope,
    old_position: i32,
    new_scope: Scope,
    new_position: i32,
) -> Vec<PositionShift> {
    let mut close_gap = plan_remove(old_scope, old_position);
    close_gap.exclude = Some(entity);
    vec![
        close_gap,
        PositionShift {
            scope: new_scope,
            range: PositionRange::at_least(new_position),
            delta: 1,
            exclude: Some(entity),
        },
    ]
}

/// Compaction after `removed` leaves the scope.
pub fn plan_remove(scope: Scope, removed: i32) -> PositionShift {
    PositionShift {
        scope,
        range: PositionRange::at_least(removed.saturating_add(1)),
        delta: -1,
        exclude: None,
    }
}

/// Resolve a move request into a plan.
///
/// `dest_live_count` counts the live siblings currently in `to`, including
/// the entity itself when the move stays in its scope. The requested index
/// is clamped to the last slot within a scope and to the append slot across
/// scopes.
pub fn plan_move(
    entity: Uuid,
    from: Scope,
    from_position: i32,
    to: Scope,
    requested: i32,
    dest_live_count: usize,
) -> TaskboardResult<MovePlan> {
    let requested = validate_index(requested)?;

    if from == to {
        let last = count_as_position(dest_live_count).saturating_sub(1).max(0);
        let position = requested.min(last);
        let shifts = plan_move_within(from, entity, from_position, position);
        let kind = if shifts.is_empty() {
            MoveKind::NoOp
        } else {
            MoveKind::WithinScope
        };
        return Ok(MovePlan {
            kind,
            from_scope: from,
            to_scope: to,
            from_position,
            position,
            shifts,
        });
    }

    let position = requested.min(count_as_position(dest_live_count));
    Ok(MovePlan {
        kind: MoveKind::AcrossScope,
        from_scope: from,
        to_scope: to,
        from_position,
        position,
        shifts: plan_move_across(entity, from, from_position, to, position),
    })
}

/// Renumber siblings, given in display order, to `0..n`.
///
/// Returns only the entries whose stored position changes. Soft deletes leave
/// gaps in the live ordering; a move heals its scopes with this before planning.
pub fn plan_reindex(ordered: &[(Uuid, i32)]) -> Vec<(Uuid, i32)> {
    ordered
        .iter()
        .zip(0..)
        .filter(|((_, current), rank)| current != rank)
        .map(|((id, _), rank)| (*id, rank))
        .collect()
}

/// True when the positions are exactly a permutation of `0..n`.
pub fn is_dense(positions: impl IntoIterator<Item = i32>) -> bool {
    let mut sorted: Vec<i32> = positions.into_iter().collect();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(i, &p)| i32::try_from(i).is_ok_and(|i| i == p))
}

fn count_as_position(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal in-memory sibling table for replaying plans.
    #[derive(Default)]
    struct Siblings {
        rows: Vec<(Uuid, Scope, i32)>,
    }

    impl Siblings {
        fn positions(&self, scope: Scope) -> Vec<i32> {
            let mut p: Vec<i32> = self
                .rows
                .iter()
                .filter(|(_, s, _)| *s == scope)
                .map(|(_, _, p)| *p)
                .collect();
            p.sort_unstable();
            p
        }

        fn order(&self, scope: Scope) -> Vec<Uuid> {
            let mut rows: Vec<_> = self.rows.iter().filter(|(_, s, _)| *s == scope).collect();
            rows.sort_by_key(|(_, _, p)| *p);
            rows.into_iter().map(|(id, _, _)| *id).collect()
        }

        fn count(&self, scope: Scope) -> usize {
            self.rows.iter().filter(|(_, s, _)| *s == scope).count()
        }

        fn apply(&mut self, shifts: &[PositionShift]) {
            for shift in shifts {
                for (id, scope, pos) in self.rows.iter_mut() {
                    if *scope == shift.scope {
                        if let Some(p) = shift.apply_to(*id, *pos) {
                            *pos = p;
                        }
                    }
                }
            }
        }

        fn append(&mut self, scope: Scope) -> Uuid {
            let id = Uuid::new_v4();
            let position = next_position(self.positions(scope));
            self.rows.push((id, scope, position));
            id
        }

        fn insert_at(&mut self, scope: Scope, index: i32) -> Uuid {
            let (position, shifts) = plan_insert_at(scope, index, self.count(scope)).unwrap();
            self.apply(&shifts);
            let id = Uuid::new_v4();
            self.rows.push((id, scope, position));
            id
        }

        fn move_to(&mut self, id: Uuid, to: Scope, index: i32) -> MovePlan {
            let (_, from, from_pos) = *self.rows.iter().find(|(r, _, _)| *r == id).unwrap();
            let count = self.count(to);
            let plan = plan_move(id, from, from_pos, to, index, count).unwrap();
            self.apply(&plan.shifts);
            let row = self.rows.iter_mut().find(|(r, _, _)| *r == id).unwrap();
            row.1 = plan.to_scope;
            row.2 = plan.position;
            plan
        }

        fn remove(&mut self, id: Uuid) {
            let idx = self.rows.iter().position(|(r, _, _)| *r == id).unwrap();
            let (_, scope, pos) = self.rows.remove(idx);
            self.apply(&[plan_remove(scope, pos)]);
        }
    }

    fn column() -> Scope {
        Scope::Column(Uuid::new_v4())
    }

    #[test]
    fn next_position_appends() {
        assert_eq!(next_position(Vec::new()), 0);
        assert_eq!(next_position(vec![0, 1, 2]), 3);
        assert_eq!(next_position(vec![0, 2]), 3);
    }

    #[test]
    fn insert_at_shifts_later_siblings() {
        let scope = column();
        let mut s = Siblings::default();
        let a = s.append(scope);
        let b = s.append(scope);
        let c = s.insert_at(scope, 1);

        assert_eq!(s.order(scope), vec![a, c, b]);
        assert!(is_dense(s.positions(scope)));
    }

    #[test]
    fn insert_past_end_clamps_to_append() {
        let scope = column();
        let (position, shifts) = plan_insert_at(scope, 42, 3).unwrap();
        assert_eq!(position, 3);
        assert!(shifts.is_empty());
    }

    #[test]
    fn negative_index_is_rejected() {
        let scope = column();
        assert!(plan_insert_at(scope, -1, 3).unwrap_err().is_validation());
        assert!(plan_move(Uuid::new_v4(), scope, 0, scope, -2, 3)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn move_down_within_scope() {
        let scope = column();
        let mut s = Siblings::default();
        let ids: Vec<_> = (0..4).map(|_| s.append(scope)).collect();

        let plan = s.move_to(ids[0], scope, 2);
        assert_eq!(plan.kind, MoveKind::WithinScope);
        assert_eq!(s.order(scope), vec![ids[1], ids[2], ids[0], ids[3]]);
        assert!(is_dense(s.positions(scope)));
    }

    #[test]
    fn move_up_within_scope() {
        let scope = column();
        let mut s = Siblings::default();
        let ids: Vec<_> = (0..4).map(|_| s.append(scope)).collect();

        s.move_to(ids[3], scope, 1);
        assert_eq!(s.order(scope), vec![ids[0], ids[3], ids[1], ids[2]]);
        assert!(is_dense(s.positions(scope)));
    }

    #[test]
    fn move_to_same_index_is_noop() {
        let scope = column();
        let mut s = Siblings::default();
        let ids: Vec<_> = (0..3).map(|_| s.append(scope)).collect();
        let before = s.rows.clone();

        let plan = s.move_to(ids[1], scope, 1);
        assert_eq!(plan.kind, MoveKind::NoOp);
        assert!(plan.shifts.is_empty());
        assert_eq!(s.rows, before);
    }

    #[test]
    fn move_within_clamps_to_last_slot() {
        let scope = column();
        let mut s = Siblings::default();
        let ids: Vec<_> = (0..3).map(|_| s.append(scope)).collect();

        let plan = s.move_to(ids[0], scope, 10);
        assert_eq!(plan.position, 2);
        assert_eq!(s.order(scope), vec![ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn move_across_scopes_conserves_counts() {
        let from = column();
        let to = column();
        let mut s = Siblings::default();
        let src: Vec<_> = (0..3).map(|_| s.append(from)).collect();
        let dst: Vec<_> = (0..2).map(|_| s.append(to)).collect();

        let plan = s.move_to(src[1], to, 1);
        assert_eq!(plan.kind, MoveKind::AcrossScope);
        assert_eq!(s.count(from), 2);
        assert_eq!(s.count(to), 3);
        assert_eq!(s.order(from), vec![src[0], src[2]]);
        assert_eq!(s.order(to), vec![dst[0], src[1], dst[1]]);
        assert!(is_dense(s.positions(from)));
        assert!(is_dense(s.positions(to)));
    }

    #[test]
    fn move_across_clamps_to_append() {
        let from = column();
        let to = column();
        let mut s = Siblings::default();
        let moved = s.append(from);
        s.append(to);

        let plan = s.move_to(moved, to, 99);
        assert_eq!(plan.position, 1);
        assert!(is_dense(s.positions(to)));
        assert!(s.positions(from).is_empty());
    }

    #[test]
    fn move_into_empty_scope() {
        let from = column();
        let to = column();
        let mut s = Siblings::default();
        let moved = s.append(from);

        let plan = s.move_to(moved, to, 0);
        assert_eq!(plan.position, 0);
        assert_eq!(s.positions(to), vec![0]);
    }

    #[test]
    fn remove_compacts_higher_positions() {
        let scope = column();
        let mut s = Siblings::default();
        let ids: Vec<_> = (0..4).map(|_| s.append(scope)).collect();

        s.remove(ids[1]);
        assert_eq!(s.order(scope), vec![ids[0], ids[2], ids[3]]);
        assert!(is_dense(s.positions(scope)));
    }

    #[test]
    fn remove_last_shifts_nothing() {
        let scope = column();
        let mut s = Siblings::default();
        let ids: Vec<_> = (0..3).map(|_| s.append(scope)).collect();
        let before: Vec<_> = s.rows.iter().take(2).cloned().collect();

        s.remove(ids[2]);
        assert_eq!(s.rows, before);
    }

    #[test]
    fn density_survives_mixed_sequence() {
        let a = column();
        let b = Scope::Board(Uuid::new_v4());
        let mut s = Siblings::default();
        let mut ids = Vec::new();
        for i in 0..6 {
            ids.push(if i % 2 == 0 { s.append(a) } else { s.insert_at(a, 0) });
        }
        for _ in 0..3 {
            ids.push(s.append(b));
        }

        s.move_to(ids[0], a, 4);
        s.move_to(ids[2], b, 0);
        s.remove(ids[3]);
        s.move_to(ids[7], a, 2);
        s.insert_at(b, 2);
        s.move_to(ids[5], a, 0);
        s.remove(ids[6]);
        s.move_to(ids[8], b, 0);

        assert!(is_dense(s.positions(a)));
        assert!(is_dense(s.positions(b)));
        assert_eq!(s.rows.len(), 8);
    }

    #[test]
    fn shift_respects_exclusion_and_range() {
        let scope = column();
        let entity = Uuid::new_v4();
        let shift = PositionShift {
            scope,
            range: PositionRange::between(1, 3),
            delta: -1,
            exclude: Some(entity),
        };
        assert_eq!(shift.apply_to(Uuid::new_v4(), 2), Some(1));
        assert_eq!(shift.apply_to(entity, 2), None);
        assert_eq!(shift.apply_to(Uuid::new_v4(), 0), None);
        assert_eq!(shift.apply_to(Uuid::new_v4(), 4), None);
    }

    #[test]
    fn reindex_closes_gaps_left_by_soft_delete() {
        let scope = column();
        let mut s = Siblings::default();
        let ids: Vec<_> = (0..4).map(|_| s.append(scope)).collect();
        // Dropping a row without compaction mimics a soft-deleted tombstone.
        s.rows.retain(|(id, _, _)| *id != ids[1]);
        assert!(!is_dense(s.positions(scope)));

        let ordered: Vec<_> = s
            .order(scope)
            .into_iter()
            .map(|id| (id, s.rows.iter().find(|r| r.0 == id).unwrap().2))
            .collect();
        let changes = plan_reindex(&ordered);
        assert_eq!(changes, vec![(ids[2], 1), (ids[3], 2)]);

        for (id, position) in changes {
            s.rows.iter_mut().find(|r| r.0 == id).unwrap().2 = position;
        }
        assert!(is_dense(s.positions(scope)));
        assert!(plan_reindex(&[(ids[0], 0)]).is_empty());
    }

    #[test]
    fn is_dense_detects_gaps_and_duplicates() {
        assert!(is_dense(Vec::new()));
        assert!(is_dense(vec![2, 0, 1]));
        assert!(!is_dense(vec![0, 2]));
        assert!(!is_dense(vec![0, 1, 1]));
        assert!(!is_dense(vec![1, 2]));
    }
}
