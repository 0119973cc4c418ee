use std::any::{Any, type_name};

use log::warn;

/// Opt-in cloning used when a command snapshot is taken.
///
/// Types that return `None` are simply left out of the snapshot, so commands can only read
/// what has been made cloneable.
pub trait SnapshotClone {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        None
    }
}

/// A value owned by [`crate::StateCtx`].
///
/// Plain states are written from the UI thread (`state_mut` / `update`); computes are a
/// specialisation of this trait and are written through an [`crate::Updater`].
pub trait State: Any + SnapshotClone {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Replace `self` with a boxed value of the same concrete type.
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Shared body for [`State::assign_box`].
pub fn assign_impl<T: 'static>(target: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *target = *value,
        Err(_) => warn!("Ignored assignment of a mismatched type to {}", type_name::<T>()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    struct Counter(u32);

    impl SnapshotClone for Counter {}

    impl State for Counter {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            assign_impl(self, new_self);
        }
    }

    #[test]
    fn assign_replaces_value() {
        let mut counter = Counter(1);
        counter.assign_box(Box::new(Counter(7)));
        assert_eq!(counter, Counter(7));
    }

    #[test]
    fn assign_ignores_other_types() {
        let mut counter = Counter(1);
        counter.assign_box(Box::new("not a counter"));
        assert_eq!(counter, Counter(1));
    }

    #[test]
    fn snapshot_clone_defaults_to_none() {
        assert!(Counter(3).clone_boxed().is_none());
    }
}
