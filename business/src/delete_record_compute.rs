//! Two-phase row deletion.
//!
//! The row leaves the view as soon as its key is marked [`DeleteStatus::Pending`]; the
//! command then records whether the server confirmed it. Statuses are scoped to a render
//! generation, and outcomes that arrive after a re-render are dropped.

use std::any::Any;
use std::collections::BTreeMap;

use log::{error, info};
use tables_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, LatestOnlyUpdater,
    SnapshotClone, State, Updater, assign_impl,
};
use tokio_util::sync::CancellationToken;
use ustr::Ustr;

use crate::{TableConfig, api};

#[derive(Debug, Clone, Default)]
pub struct DeleteRecordInput {
    pub key: Option<Ustr>,
    pub generation: u64,
}

impl SnapshotClone for DeleteRecordInput {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for DeleteRecordInput {
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStatus {
    Pending,
    Confirmed,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionsCompute {
    pub generation: u64,
    pub statuses: BTreeMap<Ustr, DeleteStatus>,
}

impl DeletionsCompute {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            statuses: BTreeMap::new(),
        }
    }

    pub fn status(&self, key: Ustr) -> Option<&DeleteStatus> {
        self.statuses.get(&key)
    }

    /// Apply an outcome if it belongs to the current generation.
    pub fn record(&mut self, generation: u64, key: Ustr, status: DeleteStatus) -> bool {
        if generation != self.generation {
            return false;
        }
        self.statuses.insert(key, status);
        true
    }
}

impl SnapshotClone for DeletionsCompute {}

impl State for DeletionsCompute {
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

impl Compute for DeletionsCompute {
    fn deps(&self) -> ComputeDeps {
        // written by the table handle and DeleteRecordCommand
        (Vec::new(), Vec::new())
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {}
}

/// `DELETE {api_url}/{key}` for the key in [`DeleteRecordInput`].
#[derive(Debug, Default)]
pub struct DeleteRecordCommand;

impl Command for DeleteRecordCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> CommandFuture {
        let config = snap.state::<TableConfig>().clone();
        let DeleteRecordInput { key, generation } = snap.state::<DeleteRecordInput>().clone();

        Box::pin(async move {
            let Some(key) = key else {
                return;
            };
            info!("Deleting `{key}` from `{}`", config.parent);

            let status = match api::delete_record(&config, &key).await {
                Ok(()) => DeleteStatus::Confirmed,
                Err(err) => {
                    error!("Delete of `{key}` in `{}` failed: {err}", config.parent);
                    DeleteStatus::Failed(format!("{} ({err})", config.locale.delete_failed()))
                }
            };
            updater.patch(move |deletions: &mut DeletionsCompute| {
                if !deletions.record(generation, key, status) {
                    info!("Ignored delete outcome for `{key}` from an older render");
                }
            });
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_from_older_generations_are_ignored() {
        let key = Ustr::from("7");
        let mut deletions = DeletionsCompute::new(2);

        assert!(!deletions.record(1, key, DeleteStatus::Confirmed));
        assert_eq!(deletions.status(key), None);

        assert!(deletions.record(2, key, DeleteStatus::Failed("boom".to_owned())));
        assert_eq!(
            deletions.status(key),
            Some(&DeleteStatus::Failed("boom".to_owned()))
        );
    }
}
