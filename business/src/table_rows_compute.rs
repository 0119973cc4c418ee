use std::any::{Any, TypeId};

use tables_states::{Compute, ComputeDeps, Dep, SnapshotClone, State, Updater, assign_impl};
use ustr::Ustr;

use crate::{DeleteStatus, DeletionsCompute, LoadTableCompute, TableConfig};

/// A data row as the view shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub key: Ustr,
    /// Display text per column.
    pub cells: Vec<String>,
    /// Set when a failed delete brought the row back.
    pub delete_error: Option<String>,
}

/// Visible rows, derived from the loaded records and the delete statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRowsCompute {
    pub rows: Vec<RowView>,
    /// Delete failures of rows that stay hidden.
    pub hidden_failures: Vec<(Ustr, String)>,
}

impl SnapshotClone for TableRowsCompute {}

impl State for TableRowsCompute {
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

impl Compute for TableRowsCompute {
    fn deps(&self) -> ComputeDeps {
        (
            vec![TypeId::of::<TableConfig>()],
            vec![
                TypeId::of::<LoadTableCompute>(),
                TypeId::of::<DeletionsCompute>(),
            ],
        )
    }

    fn compute(&self, deps: Dep<'_>, updater: Updater) {
        let config = deps.get_state_ref::<TableConfig>();
        let load = deps.get_compute_ref::<LoadTableCompute>();
        let deletions = deps.get_compute_ref::<DeletionsCompute>();

        let mut next = Self::default();
        for record in load.records().map(|set| set.records.as_slice()).unwrap_or_default() {
            let delete_error = match deletions.status(record.key) {
                None => None,
                Some(DeleteStatus::Pending | DeleteStatus::Confirmed) => continue,
                Some(DeleteStatus::Failed(message)) if config.restore_failed_deletes => {
                    Some(message.clone())
                }
                Some(DeleteStatus::Failed(message)) => {
                    next.hidden_failures.push((record.key, message.clone()));
                    continue;
                }
            };
            next.rows.push(RowView {
                key: record.key,
                cells: record.cells(config.locale),
                delete_error,
            });
        }

        updater.set(next);
    }
}
