use std::any::TypeId;

use crate::{Dep, State, Updater};

/// `(state ids, compute ids)` a compute reads from.
pub type ComputeDeps = (Vec<TypeId>, Vec<TypeId>);

/// A cached value inside [`crate::StateCtx`].
///
/// Derived computes read their dependencies through [`Dep`] and publish the new value with
/// `updater.set(..)`; they are re-run whenever one of the dependencies changes. Caches that
/// are filled by a [`crate::Command`] declare no dependencies and keep `compute` a no-op,
/// since side effects must never run inside a compute.
pub trait Compute: State {
    fn deps(&self) -> ComputeDeps;

    fn compute(&self, deps: Dep<'_>, updater: Updater);
}
