use std::any::{Any, TypeId, type_name};

use flume::Sender;
use log::warn;
use tokio_util::sync::CancellationToken;

use crate::State;

type PatchFn = Box<dyn FnOnce(&mut dyn Any) + Send>;

pub(crate) enum Update {
    Assign {
        id: TypeId,
        name: &'static str,
        value: Box<dyn Any + Send>,
    },
    Patch {
        id: TypeId,
        name: &'static str,
        patch: PatchFn,
    },
}

/// Write handle for computes and states.
///
/// Updates are queued and only become visible after the owning context drains them in
/// `StateCtx::sync_computes`, so it is safe to move an updater into async tasks.
#[derive(Debug, Clone)]
pub struct Updater {
    send: Sender<Update>,
}

impl std::fmt::Debug for Update {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assign { name, .. } => write!(f, "Assign({name})"),
            Self::Patch { name, .. } => write!(f, "Patch({name})"),
        }
    }
}

impl Updater {
    pub(crate) fn new(send: Sender<Update>) -> Self {
        Self { send }
    }

    /// Replace the whole value of `T`.
    pub fn set<T: State + Send>(&self, value: T) {
        self.push(Update::Assign {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            value: Box::new(value),
        });
    }

    /// Modify `T` in place once the update is applied.
    ///
    /// Use this instead of [`Updater::set`] when several tasks write disjoint parts of the
    /// same value and must not overwrite each other.
    pub fn patch<T, F>(&self, patch: F)
    where
        T: State,
        F: FnOnce(&mut T) + Send + 'static,
    {
        let name = type_name::<T>();
        self.push(Update::Patch {
            id: TypeId::of::<T>(),
            name,
            patch: Box::new(move |any: &mut dyn Any| match any.downcast_mut::<T>() {
                Some(value) => patch(value),
                None => warn!("Patch for {name} reached a value of another type"),
            }),
        });
    }

    fn push(&self, update: Update) {
        if let Err(err) = self.send.send(update) {
            warn!("State context dropped before {:?} was applied", err.into_inner());
        }
    }
}

/// Updater handed to commands.
///
/// Once the command's cancellation token fires (a newer run superseded it, or the context
/// shut down) every further write is discarded, so a stale response never lands.
#[derive(Debug, Clone)]
pub struct LatestOnlyUpdater {
    inner: Updater,
    cancel: CancellationToken,
}

impl LatestOnlyUpdater {
    pub fn new(inner: Updater, cancel: CancellationToken) -> Self {
        Self { inner, cancel }
    }

    pub fn set<T: State + Send>(&self, value: T) {
        if self.is_stale::<T>() {
            return;
        }
        self.inner.set(value);
    }

    pub fn patch<T, F>(&self, patch: F)
    where
        T: State,
        F: FnOnce(&mut T) + Send + 'static,
    {
        if self.is_stale::<T>() {
            return;
        }
        self.inner.patch(patch);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn is_stale<T>(&self) -> bool {
        let stale = self.cancel.is_cancelled();
        if stale {
            log::debug!("Dropped stale update for {}", type_name::<T>());
        }
        stale
    }
}
