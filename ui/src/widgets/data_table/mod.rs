//! The data table widget.
//!
//! Layout, top to bottom:
//! - toolbar with the add button and the load status
//! - a grid with the header, the open editor rows and the data rows
//!
//! Clicks and edits are collected while drawing and applied to the
//! [`TableHandle`] afterwards.

mod editor;
mod header;
mod row;

use std::time::Duration;

use egui::{Frame, Margin, Response, RichText, Stroke, Ui};
use log::info;
use tables_business::{SubmitOutcome, TableHandle};
use ustr::Ustr;

use crate::utils::colors::{COLOR_RED, TABLE_BORDER_COLOR};

/// Results of background requests only arrive through `sync`, which runs on repaint.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub(crate) enum TableAction {
    OpenEditor,
    Edit {
        row_id: u64,
        column: usize,
        value: String,
    },
    Submit {
        row_id: u64,
    },
    Delete(Ustr),
}

/// Draws `table` and applies what the user did in this frame.
pub fn data_table(table: &mut TableHandle, ui: &mut Ui) -> Response {
    table.sync();

    let mut actions = Vec::new();
    let response = ui
        .vertical(|ui| {
            toolbar(table, ui, &mut actions);
            ui.add_space(8.0);
            grid(table, ui, &mut actions);
        })
        .response;

    for action in actions {
        apply(table, action);
    }

    if table.has_pending_tasks() {
        ui.ctx().request_repaint_after(POLL_INTERVAL);
    }
    response
}

fn toolbar(table: &TableHandle, ui: &mut Ui, actions: &mut Vec<TableAction>) {
    let locale = table.config().locale;

    ui.horizontal(|ui| {
        if ui.button(locale.add_button()).clicked() {
            actions.push(TableAction::OpenEditor);
        }

        let load = table.load_state();
        if load.is_loading() {
            ui.spinner();
            ui.label(locale.loading());
        } else if let Some(message) = load.error_message() {
            ui.colored_label(COLOR_RED, message);
        } else if table.rows().is_empty() && table.editor_rows().is_empty() {
            ui.weak(locale.empty());
        }
    });

    for (key, message) in table.hidden_delete_failures() {
        ui.label(RichText::new(format!("{key}: {message}")).small().color(COLOR_RED));
    }
}

fn grid(table: &TableHandle, ui: &mut Ui, actions: &mut Vec<TableAction>) {
    let config = table.config();
    let titles = table.header_cells();

    Frame::NONE
        .stroke(Stroke::new(1.0, TABLE_BORDER_COLOR))
        .inner_margin(Margin::ZERO)
        .show(ui, |ui| {
            egui::Grid::new(("data_table", config.parent.as_str()))
                .num_columns(titles.len())
                .striped(true)
                .spacing([16.0, 0.0])
                .min_col_width(60.0)
                .show(ui, |ui| {
                    header::header_row(ui, &titles);

                    for editor_row in table.editor_rows() {
                        let status = table.editor_status(editor_row.id);
                        editor::editor_row(ui, editor_row, status, config, actions);
                    }

                    for data_row in table.rows() {
                        if row::data_row(ui, data_row, config.locale) {
                            actions.push(TableAction::Delete(data_row.key));
                        }
                    }
                });
        });
}

fn apply(table: &mut TableHandle, action: TableAction) {
    match action {
        TableAction::OpenEditor => {
            table.open_editor_row();
        }
        TableAction::Edit {
            row_id,
            column,
            value,
        } => table.edit_field(row_id, column, value),
        TableAction::Submit { row_id } => match table.submit(row_id) {
            SubmitOutcome::Incomplete { flagged } => {
                info!("Editor row {row_id} is incomplete, {flagged} inputs flagged");
            }
            SubmitOutcome::Submitted { request_id } => {
                info!("Editor row {row_id} submitted as request #{request_id}");
            }
            SubmitOutcome::UnknownRow => {}
        },
        TableAction::Delete(key) => table.delete_row(key),
    }
}

#[cfg(test)]
mod data_table_tests {
    use egui_kittest::Harness;
    use kittest::Queryable as _;
    use tables_business::{ColumnSpec, Locale, TableConfig};

    use super::*;
    use crate::state::State;

    // Nothing is spawned without a tokio runtime, so the table stays in its loading state.
    fn offline_state(locale: Locale) -> State {
        State::single(
            TableConfig::new("usersTable01", "http://127.0.0.1:9/users")
                .with_locale(locale)
                .with_column(ColumnSpec::new("Name", "name"))
                .with_column(ColumnSpec::new("Surname", "surname")),
        )
    }

    fn harness<'a>(state: State) -> Harness<'a, State> {
        Harness::new_ui_state(
            |ui, state: &mut State| {
                for table in &mut state.tables {
                    data_table(table, ui);
                }
            },
            state,
        )
    }

    #[test]
    fn test_header_has_a_cell_per_column_plus_actions() {
        let mut harness = harness(offline_state(Locale::En));
        harness.step();

        assert!(
            harness.query_by_label_contains("Name").is_some(),
            "Name header should exist"
        );
        assert!(
            harness.query_by_label_contains("Surname").is_some(),
            "Surname header should exist"
        );
        assert!(
            harness.query_by_label("Delete").is_some(),
            "Action column header should exist"
        );
        assert!(
            harness.query_by_label_contains("Loading").is_some(),
            "Load status should be shown"
        );
    }

    #[test]
    fn test_russian_labels() {
        let mut harness = harness(offline_state(Locale::Ru));
        harness.step();

        assert!(
            harness.query_by_label("Удаление").is_some(),
            "Action column header should be translated"
        );
        assert!(
            harness.query_by_label("Добавить пользователя").is_some(),
            "Add button should be translated"
        );
    }

    #[test]
    fn test_add_button_opens_editor_rows_on_top() {
        let mut harness = harness(offline_state(Locale::En));
        harness.step();

        harness.get_by_label("Add new user").click();
        harness.step();
        harness.get_by_label("Add new user").click();
        harness.step();

        let editor_rows = harness.state().tables[0].editor_rows();
        assert_eq!(editor_rows.len(), 2, "each click opens an editor row");
        assert!(
            editor_rows[0].id > editor_rows[1].id,
            "newest editor row comes first"
        );
        assert!(editor_rows.iter().all(|row| row.inputs.len() == 2));
    }

    #[test]
    fn test_required_inputs_survive_a_repaint() {
        let mut harness = harness(offline_state(Locale::En));
        harness.step();

        {
            let table = &mut harness.state_mut().tables[0];
            let row = table.open_editor_row();
            table.edit_field(row, 0, "Grace");
            assert!(matches!(
                table.submit(row),
                SubmitOutcome::Incomplete { flagged: 1 }
            ));
        }
        harness.step();

        let editor_rows = harness.state().tables[0].editor_rows();
        assert_eq!(editor_rows[0].inputs[0], "Grace");
        assert_eq!(editor_rows[0].required, vec![false, true]);
    }
}
