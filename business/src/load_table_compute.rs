//! Collection load: compute-shaped cache + command.
//!
//! `LoadTableCompute` holds the latest outcome of `GET {api_url}`; `LoadTableCommand`
//! performs the request and writes the cache through its updater. Dispatching the command
//! again cancels a load that is still in flight, so an older response never replaces the
//! rows of a newer render pass.

use std::any::Any;

use log::{error, info};
use tables_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, LatestOnlyUpdater,
    SnapshotClone, State, Updater, assign_impl,
};
use tokio_util::sync::CancellationToken;

use crate::{RecordSet, TableConfig, api};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadTableResult {
    #[default]
    Idle,
    Loading,
    Loaded(RecordSet),
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadTableCompute {
    pub result: LoadTableResult,
}

impl LoadTableCompute {
    pub fn loading() -> Self {
        Self {
            result: LoadTableResult::Loading,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.result, LoadTableResult::Loading)
    }

    pub fn records(&self) -> Option<&RecordSet> {
        match &self.result {
            LoadTableResult::Loaded(records) => Some(records),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.result {
            LoadTableResult::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl SnapshotClone for LoadTableCompute {}

impl State for LoadTableCompute {
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

impl Compute for LoadTableCompute {
    fn deps(&self) -> ComputeDeps {
        // filled by LoadTableCommand
        (Vec::new(), Vec::new())
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {}
}

/// `GET {api_url}` into [`LoadTableCompute`].
#[derive(Debug, Default)]
pub struct LoadTableCommand;

impl Command for LoadTableCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let config = snap.state::<TableConfig>().clone();

        Box::pin(async move {
            updater.set(LoadTableCompute::loading());
            info!("Loading table `{}` from {}", config.parent, config.api_url);

            let result = tokio::select! {
                () = cancel.cancelled() => {
                    info!("Load of `{}` superseded", config.parent);
                    return;
                }
                result = api::list_records(&config) => result,
            };

            let result = match result {
                Ok(records) => LoadTableResult::Loaded(records),
                Err(err) => {
                    error!("Load of `{}` failed: {err}", config.parent);
                    LoadTableResult::Failed(format!("{} ({err})", config.locale.load_failed()))
                }
            };
            updater.set(LoadTableCompute { result });
        })
    }

    fn supersedes_previous(&self) -> bool {
        true
    }
}
