/// Access-policy decision functions
///
/// Every mutation and read that targets a board, task, or comment is gated by
/// one of these functions. They are pure: no I/O, no side effects. Callers
/// resolve the entities (board, its member ids, task, comment) first and pass
/// them in, which keeps each rule independently unit-testable with synthetic
/// structs.
///
/// # Rules
///
/// - Board visibility and mutation use one predicate: owner or member.
///   Members deliberately hold the same mutation rights as the owner,
///   including delete and member management. This matches the product
///   contract and is preserved, not tightened.
/// - Task deletion is tighter: only the task's creator or the board's owner.
/// - Comment access follows board access; comment deletion is author-only.
///
/// Existence is the caller's concern: these functions decide allow/deny for
/// entities that exist. Not-found is surfaced before any policy check so
/// clients can distinguish "does not exist" from "no access".

use uuid::Uuid;

use crate::models::board::Board;
use crate::models::comment::Comment;
use crate::models::task::Task;

/// May the user see this board (listing, detail view)?
///
/// Allow iff the user owns the board or appears in its member set.
pub fn can_view_board(user_id: Uuid, board: &Board, member_ids: &[Uuid]) -> bool {
    board.owner_id == user_id || member_ids.contains(&user_id)
}

/// May the user mutate this board (title, member set, deletion)?
///
/// Same predicate as viewing: members hold full mutate rights.
pub fn can_mutate_board(user_id: Uuid, board: &Board, member_ids: &[Uuid]) -> bool {
    can_view_board(user_id, board, member_ids)
}

/// May the user create a task on this board?
///
/// Allow iff owner or member. A missing board never reaches this check; the
/// boundary reports not-found first.
pub fn can_create_task_on_board(user_id: Uuid, board: &Board, member_ids: &[Uuid]) -> bool {
    can_view_board(user_id, board, member_ids)
}

/// May the user read or update this task?
///
/// Board-scoped: owner or member of the task's board.
pub fn can_access_task(user_id: Uuid, board: &Board, member_ids: &[Uuid]) -> bool {
    can_view_board(user_id, board, member_ids)
}

/// May the user delete this task?
///
/// Allow iff the user created the task or owns its board. Being a board
/// member (or even the assignee) is not sufficient.
pub fn can_delete_task(user_id: Uuid, task: &Task, board: &Board) -> bool {
    task.created_by == Some(user_id) || board.owner_id == user_id
}

/// May the user list or add comments on this task?
///
/// Allow iff the user owns the task's board or is one of its members.
pub fn can_access_task_comments(user_id: Uuid, board: &Board, member_ids: &[Uuid]) -> bool {
    can_view_board(user_id, board, member_ids)
}

/// May the user delete this comment?
///
/// Author-only. Runs after the comment-access gate, so the caller has
/// already established the user may see the task at all.
pub fn can_delete_comment(user_id: Uuid, comment: &Comment) -> bool {
    comment.author_id == user_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{TaskPriority, TaskStatus};
    use chrono::Utc;

    fn board(owner_id: Uuid) -> Board {
        Board {
            id: Uuid::new_v4(),
            title: Some("Sprint 1".to_string()),
            owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn task(board_id: Uuid, created_by: Option<Uuid>) -> Task {
        Task {
            id: Uuid::new_v4(),
            board_id,
            title: Some("Fix bug".to_string()),
            description: None,
            status: TaskStatus::ToDo,
            priority: TaskPriority::Medium,
            assignee_id: None,
            reviewer_id: None,
            due_date: None,
            created_by,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn comment(task_id: Uuid, author_id: Uuid) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            task_id,
            author_id,
            content: "Looks good".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_board_visibility() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let b = board(owner);
        let members = vec![member];

        assert!(can_view_board(owner, &b, &members));
        assert!(can_view_board(member, &b, &members));
        assert!(!can_view_board(outsider, &b, &members));
    }

    #[test]
    fn test_owner_visible_without_membership_row() {
        // The owner is not auto-added to the member set; the predicate still
        // grants access.
        let owner = Uuid::new_v4();
        let b = board(owner);

        assert!(can_view_board(owner, &b, &[]));
    }

    #[test]
    fn test_members_hold_full_mutation_rights() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let b = board(owner);
        let members = vec![member];

        assert!(can_mutate_board(owner, &b, &members));
        assert!(can_mutate_board(member, &b, &members));
        assert!(!can_mutate_board(outsider, &b, &members));
    }

    #[test]
    fn test_task_creation_follows_board_access() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let b = board(owner);
        let members = vec![member];

        assert!(can_create_task_on_board(owner, &b, &members));
        assert!(can_create_task_on_board(member, &b, &members));
        assert!(!can_create_task_on_board(outsider, &b, &members));
    }

    #[test]
    fn test_task_deletion_creator_or_board_owner() {
        let owner = Uuid::new_v4();
        let creator = Uuid::new_v4();
        let member = Uuid::new_v4();
        let b = board(owner);
        let t = task(b.id, Some(creator));

        assert!(can_delete_task(creator, &t, &b));
        assert!(can_delete_task(owner, &t, &b));

        // A plain member who neither created the task nor owns the board
        // may not delete it, even though they can see it.
        assert!(!can_delete_task(member, &t, &b));
    }

    #[test]
    fn test_task_deletion_after_creator_account_removed() {
        // created_by nulls out when the creator's account is deleted;
        // only the board owner may delete the task then.
        let owner = Uuid::new_v4();
        let someone = Uuid::new_v4();
        let b = board(owner);
        let t = task(b.id, None);

        assert!(can_delete_task(owner, &t, &b));
        assert!(!can_delete_task(someone, &t, &b));
    }

    #[test]
    fn test_comment_access_follows_board_access() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let b = board(owner);
        let members = vec![member];

        assert!(can_access_task_comments(owner, &b, &members));
        assert!(can_access_task_comments(member, &b, &members));
        assert!(!can_access_task_comments(outsider, &b, &members));
    }

    #[test]
    fn test_comment_deletion_author_only() {
        let author = Uuid::new_v4();
        let board_owner = Uuid::new_v4();
        let c = comment(Uuid::new_v4(), author);

        assert!(can_delete_comment(author, &c));
        assert!(!can_delete_comment(board_owner, &c));
    }

    #[test]
    fn test_decisions_are_deterministic() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let b = board(owner);
        let members = vec![member];

        for _ in 0..3 {
            assert!(can_view_board(member, &b, &members));
        }
    }
}
