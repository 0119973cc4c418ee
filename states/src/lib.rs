//! State runtime shared by the table business layer and the UI.
//!
//! A [`StateCtx`] owns plain [`State`]s, cached [`Compute`]s and async [`Command`]s.
//! Derived computes are re-run in dependency order when their inputs change; commands
//! run on the async runtime and report back through an [`Updater`].

mod command;
mod compute;
mod ctx;
mod dep;
mod graph;
mod snapshot;
mod state;
mod sync_status;
mod task;
mod updater;

pub use command::{Command, CommandFuture};
pub use compute::{Compute, ComputeDeps};
pub use ctx::StateCtx;
pub use dep::Dep;
pub use graph::{DepRoute, Graph, TopologyError};
pub use snapshot::CommandSnapshot;
pub use state::{SnapshotClone, State, assign_impl};
pub use sync_status::StateSyncStatus;
pub use task::{TaskHandle, TaskId};
pub use updater::{LatestOnlyUpdater, Updater};
