use std::any::Any;

use tables_states::{SnapshotClone, State, assign_impl};

use crate::EditorRow;

/// View state of one render pass, owned by the UI thread.
#[derive(Debug, Default)]
pub struct TableSession {
    pub generation: u64,
    /// Newest first.
    pub editor_rows: Vec<EditorRow>,
    pub next_row_id: u64,
    pub next_request_id: u64,
}

impl TableSession {
    pub fn editor_row(&self, row_id: u64) -> Option<&EditorRow> {
        self.editor_rows.iter().find(|row| row.id == row_id)
    }

    pub fn editor_row_mut(&mut self, row_id: u64) -> Option<&mut EditorRow> {
        self.editor_rows.iter_mut().find(|row| row.id == row_id)
    }
}

impl SnapshotClone for TableSession {}

impl State for TableSession {
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
