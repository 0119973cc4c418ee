//! Identifiers and handles for command tasks.
//!
//! Every flushed command gets a [`TaskId`] made of the command's `TypeId` and a
//! context-wide generation counter, plus a child [`CancellationToken`] of the context's root
//! token. Cancelling the root (on shutdown or drop) therefore reaches every task, while a
//! superseding dispatch only cancels the handle of the previous run of the same command.

use std::any::TypeId;

use tokio_util::sync::CancellationToken;

/// Which command spawned a task, and when.
///
/// Generations only grow, so of two ids with the same `type_id` the larger generation is
/// the more recent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    type_id: TypeId,
    generation: u64,
}

impl TaskId {
    pub fn new(type_id: TypeId, generation: u64) -> Self {
        Self {
            type_id,
            generation,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A running task's id together with its cooperative cancellation token.
///
/// Cancelling does not abort the future; the command observes it through
/// `cancel.cancelled()` or because its [`crate::LatestOnlyUpdater`] stops forwarding writes.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_orders_by_generation_within_a_type() {
        let type_id = TypeId::of::<String>();
        let older = TaskId::new(type_id, 1);
        let newer = TaskId::new(type_id, 2);

        assert_eq!(older.type_id(), newer.type_id());
        assert!(older < newer, "higher generation should sort later");
        assert_ne!(older, TaskId::new(TypeId::of::<i32>(), 1));
    }

    #[test]
    fn cancelling_a_handle_reaches_every_clone() {
        let handle = TaskHandle::new(
            TaskId::new(TypeId::of::<String>(), 1),
            CancellationToken::new(),
        );
        let cloned = handle.clone();
        let token = handle.cancellation_token();

        assert!(!cloned.is_cancelled());
        handle.cancel();
        assert!(cloned.is_cancelled());
        assert!(token.is_cancelled());
    }

    #[test]
    fn child_tokens_follow_the_parent() {
        let root = CancellationToken::new();
        let handle = TaskHandle::new(TaskId::new(TypeId::of::<u8>(), 3), root.child_token());

        root.cancel();
        assert!(handle.is_cancelled());
    }
}
