//! Record creation: input state, per-request status cache and the POST command.
//!
//! Usage from the table handle:
//! 1. write the complete draft and a fresh request id into [`CreateRecordInput`]
//! 2. dispatch [`CreateRecordCommand`]
//! 3. whenever [`CreateRecordCompute::created`] reports a request id, rebuild the table
//!    from a fresh GET; the rebuild drops every settled entry via
//!    [`CreateRecordCompute::prune_settled`]
//!
//! Each request keeps its own status, so several creates may race and finish in any order
//! without one hiding the outcome of another.

use std::any::Any;
use std::collections::BTreeMap;

use log::{error, info};
use tables_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, LatestOnlyUpdater,
    SnapshotClone, State, Updater, assign_impl,
};
use tokio_util::sync::CancellationToken;

use crate::{Draft, TableConfig, api};

#[derive(Debug, Clone, Default)]
pub struct CreateRecordInput {
    pub draft: Draft,
    pub request_id: u64,
}

impl SnapshotClone for CreateRecordInput {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for CreateRecordInput {
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
pub enum CreateRecordResult {
    Pending,
    Created,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRecordCompute {
    pub requests: BTreeMap<u64, CreateRecordResult>,
}

impl CreateRecordCompute {
    pub fn status(&self, request_id: u64) -> Option<&CreateRecordResult> {
        self.requests.get(&request_id)
    }

    /// Request ids that completed successfully and were not pruned yet.
    pub fn created(&self) -> Vec<u64> {
        self.requests
            .iter()
            .filter(|(_, result)| matches!(result, CreateRecordResult::Created))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Keep only the requests still waiting for the server.
    pub fn prune_settled(&mut self) {
        self.requests
            .retain(|_, result| matches!(result, CreateRecordResult::Pending));
    }
}

impl SnapshotClone for CreateRecordCompute {}

impl State for CreateRecordCompute {
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

impl Compute for CreateRecordCompute {
    fn deps(&self) -> ComputeDeps {
        // filled by CreateRecordCommand
        (Vec::new(), Vec::new())
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {}
}

/// `POST {api_url}` with the draft from [`CreateRecordInput`].
#[derive(Debug, Default)]
pub struct CreateRecordCommand;

impl Command for CreateRecordCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> CommandFuture {
        let config = snap.state::<TableConfig>().clone();
        let CreateRecordInput { draft, request_id } = snap.state::<CreateRecordInput>().clone();

        Box::pin(async move {
            updater.patch(move |creates: &mut CreateRecordCompute| {
                creates
                    .requests
                    .insert(request_id, CreateRecordResult::Pending);
            });
            info!("Creating record #{request_id} in `{}`", config.parent);

            let result = match api::create_record(&config, &draft).await {
                Ok(()) => {
                    info!("Record #{request_id} created in `{}`", config.parent);
                    CreateRecordResult::Created
                }
                Err(err) => {
                    error!("Create #{request_id} in `{}` failed: {err}", config.parent);
                    CreateRecordResult::Failed(format!(
                        "{} ({err})",
                        config.locale.create_failed()
                    ))
                }
            };
            updater.patch(move |creates: &mut CreateRecordCompute| {
                creates.requests.insert(request_id, result);
            });
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_lists_every_success_in_any_order() {
        let mut creates = CreateRecordCompute::default();
        assert!(creates.created().is_empty());

        creates.requests.insert(1, CreateRecordResult::Pending);
        creates.requests.insert(2, CreateRecordResult::Created);
        creates.requests.insert(3, CreateRecordResult::Failed("x".to_owned()));
        assert_eq!(creates.created(), vec![2]);

        // the older request finishing later is still reported
        creates.requests.insert(1, CreateRecordResult::Created);
        assert_eq!(creates.created(), vec![1, 2]);
    }

    #[test]
    fn prune_keeps_only_pending_requests() {
        let mut creates = CreateRecordCompute::default();
        creates.requests.insert(1, CreateRecordResult::Created);
        creates.requests.insert(2, CreateRecordResult::Failed("x".to_owned()));
        creates.requests.insert(3, CreateRecordResult::Pending);

        creates.prune_settled();

        assert_eq!(creates.requests.len(), 1);
        assert_eq!(creates.status(3), Some(&CreateRecordResult::Pending));
    }
}
