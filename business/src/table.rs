//! One rendered table.
//!
//! [`TableHandle::render`] validates a [`TableConfig`], builds the table's own
//! [`StateCtx`] and starts the first load. The handle is the only way the UI talks to the
//! table; dropping it disposes the view and cancels whatever is still in flight.

use log::{info, warn};
use tables_states::StateCtx;
use ustr::Ustr;

use crate::{
    ConfigError, CreateRecordCommand, CreateRecordCompute, CreateRecordInput,
    CreateRecordResult, DeleteRecordCommand, DeleteRecordInput, DeleteStatus, DeletionsCompute,
    EditorRow, LoadTableCommand, LoadTableCompute, RowView, TableConfig, TableRowsCompute,
    TableSession,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent; this many empty inputs are now marked required.
    Incomplete { flagged: usize },
    Submitted { request_id: u64 },
    UnknownRow,
}

#[derive(Debug)]
pub struct TableHandle {
    ctx: StateCtx,
}

impl TableHandle {
    pub fn render(config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            "Rendering table `{}` with {} columns",
            config.parent,
            config.columns.len()
        );

        let mut ctx = StateCtx::new();
        ctx.add_state(config);
        ctx.add_state(TableSession::default());
        ctx.add_state(CreateRecordInput::default());
        ctx.add_state(DeleteRecordInput::default());
        ctx.record_compute(LoadTableCompute::default());
        ctx.record_compute(DeletionsCompute::default());
        ctx.record_compute(CreateRecordCompute::default());
        ctx.record_compute(TableRowsCompute::default());
        ctx.record_command(LoadTableCommand);
        ctx.record_command(CreateRecordCommand);
        ctx.record_command(DeleteRecordCommand);
        if let Err(err) = ctx.verify_deps() {
            // static graph, only reachable through a programming error
            warn!("Table compute graph is invalid: {err}");
        }

        let mut handle = Self { ctx };
        handle.rerender();
        Ok(handle)
    }

    pub fn config(&self) -> &TableConfig {
        self.ctx.state::<TableConfig>()
    }

    pub fn header_cells(&self) -> Vec<&str> {
        self.config().header_cells()
    }

    pub fn generation(&self) -> u64 {
        self.session().generation
    }

    /// Full rebuild: drafts and editor rows are discarded and the data is fetched again.
    ///
    /// Settled create outcomes belong to the discarded editor rows and are dropped; creates
    /// still in flight keep their entry so their success triggers another rebuild.
    pub fn rerender(&mut self) {
        let session = self.ctx.state_mut::<TableSession>();
        session.generation += 1;
        session.editor_rows.clear();
        let generation = session.generation;

        let updater = self.ctx.updater();
        updater.set(LoadTableCompute::loading());
        updater.set(DeletionsCompute::new(generation));
        updater.patch(CreateRecordCompute::prune_settled);
        self.ctx.sync_computes();

        self.ctx.dispatch::<LoadTableCommand>();
        self.ctx.run_computed();
    }

    /// Per-frame bookkeeping: apply command results and re-render after a successful create.
    ///
    /// Successes are consumed by the rebuild, so one that arrives later (even for an older
    /// request) triggers a rebuild of its own.
    pub fn sync(&mut self) {
        self.ctx.sync_computes();

        let created = self.ctx.compute::<CreateRecordCompute>().created();
        if !created.is_empty() {
            info!(
                "Records {created:?} created, rebuilding `{}`",
                self.config().parent
            );
            self.rerender();
        }

        self.ctx.run_computed();
    }

    pub fn load_state(&self) -> &LoadTableCompute {
        self.ctx.compute::<LoadTableCompute>()
    }

    pub fn rows(&self) -> &[RowView] {
        &self.ctx.compute::<TableRowsCompute>().rows
    }

    pub fn hidden_delete_failures(&self) -> &[(Ustr, String)] {
        &self.ctx.compute::<TableRowsCompute>().hidden_failures
    }

    pub fn delete_status(&self, key: Ustr) -> Option<&DeleteStatus> {
        self.ctx.compute::<DeletionsCompute>().status(key)
    }

    pub fn editor_rows(&self) -> &[EditorRow] {
        &self.session().editor_rows
    }

    pub fn create_status(&self, request_id: u64) -> Option<&CreateRecordResult> {
        self.ctx.compute::<CreateRecordCompute>().status(request_id)
    }

    /// Status of the create last submitted from an editor row.
    pub fn editor_status(&self, row_id: u64) -> Option<&CreateRecordResult> {
        let request_id = self.session().editor_row(row_id)?.submitted?;
        self.create_status(request_id)
    }

    /// Prepend an empty editor row and return its id.
    pub fn open_editor_row(&mut self) -> u64 {
        let column_count = self.config().columns.len();
        let session = self.ctx.state_mut::<TableSession>();
        session.next_row_id += 1;
        let row_id = session.next_row_id;
        session
            .editor_rows
            .insert(0, EditorRow::new(row_id, column_count));
        row_id
    }

    pub fn edit_field(&mut self, row_id: u64, column: usize, value: impl Into<String>) {
        let Some(field) = self.config().columns.get(column).map(|c| c.value) else {
            warn!("Edit of unknown column {column} ignored");
            return;
        };
        match self.ctx.state_mut::<TableSession>().editor_row_mut(row_id) {
            Some(row) => row.edit(column, field, value),
            None => warn!("Edit of unknown editor row {row_id} ignored"),
        }
    }

    /// Handle the submit key on an editor row.
    ///
    /// An incomplete draft flags every empty input of every open editor row and sends
    /// nothing.
    pub fn submit(&mut self, row_id: u64) -> SubmitOutcome {
        let column_count = self.config().columns.len();
        let session = self.ctx.state_mut::<TableSession>();

        let Some(complete) = session
            .editor_row(row_id)
            .map(|row| row.draft.is_complete(column_count))
        else {
            return SubmitOutcome::UnknownRow;
        };
        if !complete {
            let flagged = session
                .editor_rows
                .iter_mut()
                .map(EditorRow::flag_empty)
                .sum();
            return SubmitOutcome::Incomplete { flagged };
        }

        session.next_request_id += 1;
        let request_id = session.next_request_id;
        let Some(row) = session.editor_row_mut(row_id) else {
            return SubmitOutcome::UnknownRow;
        };
        row.submitted = Some(request_id);
        let draft = row.draft.clone();

        self.ctx.update::<CreateRecordInput>(|input| {
            *input = CreateRecordInput { draft, request_id };
        });
        self.ctx
            .updater()
            .patch(move |creates: &mut CreateRecordCompute| {
                creates
                    .requests
                    .insert(request_id, CreateRecordResult::Pending);
            });
        self.ctx.sync_computes();
        self.ctx.dispatch::<CreateRecordCommand>();

        SubmitOutcome::Submitted { request_id }
    }

    /// Remove the row from view right away and send the DELETE.
    pub fn delete_row(&mut self, key: Ustr) {
        let generation = self.generation();

        self.ctx
            .updater()
            .patch(move |deletions: &mut DeletionsCompute| {
                deletions.record(generation, key, DeleteStatus::Pending);
            });
        self.ctx.sync_computes();
        self.ctx.run_computed();

        self.ctx.update::<DeleteRecordInput>(|input| {
            input.key = Some(key);
            input.generation = generation;
        });
        self.ctx.dispatch::<DeleteRecordCommand>();
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.ctx.task_count() > 0
    }

    /// Wait until every request (including loads started by re-renders) has finished.
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn settle(&mut self) {
        loop {
            self.sync();
            if self.ctx.task_count() == 0 {
                break;
            }
            if self.ctx.task_set_mut().join_next().await.is_none() {
                break;
            }
        }
        self.sync();
    }

    pub async fn shutdown(&mut self) {
        self.ctx.shutdown().await;
    }

    fn session(&self) -> &TableSession {
        self.ctx.state::<TableSession>()
    }
}
