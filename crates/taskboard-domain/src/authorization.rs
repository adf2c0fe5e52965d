//! Authorization rules.
//!
//! Pure predicates over records the caller has already fetched. None of them
//! perform I/O and none of them panic: a missing board or an empty member
//! list always resolves to "not authorized".
//!
//! The key asymmetry: any board member may view and work inside a board
//! (create, edit and move tickets), but only the owner or an admin may
//! rename or delete the board or manage its columns.

use taskboard_core::{TaskboardError, TaskboardResult};

use crate::{
    board::Board,
    comment::Comment,
    ticket::Ticket,
    user::{Role, User},
};

/// Coarse gate applied before creating boards, tickets or comments.
/// Viewers are always denied, whatever their relationship to the board.
pub fn can_create(actor: &User) -> bool {
    actor.has_role_level(Role::Member)
}

pub fn can_access_board(actor: &User, board: &Board) -> bool {
    actor.is_admin() || board.is_owner(actor.id) || board.is_member(actor.id)
}

pub fn can_modify_board(actor: &User, board: &Board) -> bool {
    actor.is_admin() || board.is_owner(actor.id)
}

pub fn can_delete_board(actor: &User, board: &Board) -> bool {
    can_modify_board(actor, board)
}

/// Board access, or being the ticket's assignee.
pub fn can_access_ticket(actor: &User, ticket: &Ticket, board: Option<&Board>) -> bool {
    let via_board = board.is_some_and(|b| b.id == ticket.board_id && can_access_board(actor, b));
    via_board || ticket.assignee == Some(actor.id)
}

/// Editing and moving are collaboration actions, so this is the access predicate.
pub fn can_modify_ticket(actor: &User, ticket: &Ticket, board: Option<&Board>) -> bool {
    can_access_ticket(actor, ticket, board)
}

pub fn can_delete_comment(actor: &User, comment: &Comment) -> bool {
    actor.is_admin() || comment.author == actor.id
}

pub fn can_hard_delete(actor: &User) -> bool {
    actor.is_admin()
}

pub(crate) fn ensure(allowed: bool, message: &str) -> TaskboardResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(TaskboardError::Unauthorized(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: Role) -> User {
        User::new("u".into(), format!("{}@example.com", Uuid::new_v4()), role)
    }

    fn board_owned_by(owner: &User) -> Board {
        Board::new("Board".into(), String::new(), owner.id)
    }

    fn ticket_on(board: &Board) -> Ticket {
        Ticket::new("Task".into(), board.id, Uuid::new_v4(), 0, board.owner)
    }

    #[test]
    fn owner_member_admin_can_access_board() {
        let owner = user(Role::Member);
        let member = user(Role::Viewer);
        let admin = user(Role::Admin);
        let stranger = user(Role::Member);
        let mut board = board_owned_by(&owner);
        board.add_member(member.id);

        assert!(can_access_board(&owner, &board));
        assert!(can_access_board(&member, &board));
        assert!(can_access_board(&admin, &board));
        assert!(!can_access_board(&stranger, &board));
    }

    #[test]
    fn membership_does_not_grant_modify() {
        let owner = user(Role::Member);
        let member = user(Role::Member);
        let mut board = board_owned_by(&owner);
        board.add_member(member.id);

        assert!(can_access_board(&member, &board));
        assert!(!can_modify_board(&member, &board));
        assert!(!can_delete_board(&member, &board));
        assert!(can_modify_board(&owner, &board));
        assert!(can_delete_board(&user(Role::Admin), &board));
    }

    #[test]
    fn board_without_members_field_denies_strangers() {
        let owner = user(Role::Member);
        let board: Board = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "title": "Legacy",
            "owner": owner.id,
            "created_at": chrono::Utc::now(),
            "updated_at": chrono::Utc::now(),
        }))
        .unwrap();

        assert!(!can_access_board(&user(Role::Member), &board));
        assert!(can_access_board(&owner, &board));
    }

    #[test]
    fn assignee_can_access_ticket_without_board_access() {
        let owner = user(Role::Member);
        let outsider = user(Role::Viewer);
        let board = board_owned_by(&owner);
        let mut ticket = ticket_on(&board);

        assert!(!can_access_ticket(&outsider, &ticket, Some(&board)));
        ticket.assignee = Some(outsider.id);
        assert!(can_access_ticket(&outsider, &ticket, Some(&board)));
        assert!(can_modify_ticket(&outsider, &ticket, Some(&board)));
    }

    #[test]
    fn missing_board_never_grants_ticket_access() {
        let admin = user(Role::Admin);
        let owner = user(Role::Member);
        let board = board_owned_by(&owner);
        let ticket = ticket_on(&board);

        assert!(!can_access_ticket(&owner, &ticket, None));
        assert!(!can_access_ticket(&admin, &ticket, None));
    }

    #[test]
    fn mismatched_board_never_grants_ticket_access() {
        let owner = user(Role::Member);
        let board = board_owned_by(&owner);
        let other_board = board_owned_by(&owner);
        let ticket = ticket_on(&other_board);
        let stranger = user(Role::Member);
        let stranger_board = board_owned_by(&stranger);

        assert!(can_access_ticket(&owner, &ticket, Some(&other_board)));
        assert!(!can_access_ticket(&owner, &ticket, Some(&board)));
        assert!(!can_access_ticket(&stranger, &ticket, Some(&stranger_board)));
    }

    #[test]
    fn comment_deletion_limited_to_author_and_admin() {
        let author = user(Role::Viewer);
        let other = user(Role::Member);
        let comment = Comment::new(Uuid::new_v4(), author.id, "hi".into());

        assert!(can_delete_comment(&author, &comment));
        assert!(!can_delete_comment(&other, &comment));
        assert!(can_delete_comment(&user(Role::Admin), &comment));
    }

    #[test]
    fn hard_delete_is_admin_only() {
        assert!(can_hard_delete(&user(Role::Admin)));
        assert!(!can_hard_delete(&user(Role::Member)));
        assert!(!can_hard_delete(&user(Role::Viewer)));
    }

    #[test]
    fn creation_gate_rejects_viewers() {
        assert!(can_create(&user(Role::Admin)));
        assert!(can_create(&user(Role::Member)));
        assert!(!can_create(&user(Role::Viewer)));
    }

    #[test]
    fn admin_can_do_everything_a_member_can() {
        let owner = user(Role::Member);
        let member = user(Role::Member);
        let admin = user(Role::Admin);
        let mut board = board_owned_by(&owner);
        board.add_member(member.id);
        let ticket = ticket_on(&board);
        let comment = Comment::new(ticket.id, member.id, "note".into());

        let checks: [fn(&User, &Board, &Ticket, &Comment) -> bool; 6] = [
            |a, _, _, _| can_create(a),
            |a, b, _, _| can_access_board(a, b),
            |a, b, _, _| can_modify_board(a, b),
            |a, b, t, _| can_access_ticket(a, t, Some(b)),
            |a, _, _, c| can_delete_comment(a, c),
            |a, _, _, _| can_hard_delete(a),
        ];
        for check in checks {
            if check(&member, &board, &ticket, &comment) {
                assert!(check(&admin, &board, &ticket, &comment));
            }
        }
    }
}
