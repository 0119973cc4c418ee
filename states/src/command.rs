use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::{CommandSnapshot, LatestOnlyUpdater};

pub type CommandFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Explicitly dispatched side effect.
///
/// A command reads its inputs from the [`CommandSnapshot`], performs IO in the returned
/// future and reports back only through the updater.
pub trait Command: Send + Sync + 'static {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        cancel: CancellationToken,
    ) -> CommandFuture;

    /// When `true`, dispatching the command cancels the previous run of the same command.
    fn supersedes_previous(&self) -> bool {
        false
    }
}
