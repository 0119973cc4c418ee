use egui::{Frame, Key, RichText, Stroke, TextEdit, Ui};
use tables_business::{CreateRecordResult, EditorRow, TableConfig};

use super::{TableAction, header::data_cell};
use crate::utils::colors::{COLOR_AMBER, COLOR_RED};

/// Renders one editor row: an input per column and the status of its create.
pub(super) fn editor_row(
    ui: &mut Ui,
    row: &EditorRow,
    status: Option<&CreateRecordResult>,
    config: &TableConfig,
    actions: &mut Vec<TableAction>,
) {
    let submit_key = config.submit_key().unwrap_or(Key::Enter);

    for (column, spec) in config.columns.iter().enumerate() {
        let mut text = row.inputs.get(column).cloned().unwrap_or_default();
        let required = row.required.get(column).copied().unwrap_or(false);

        let response = data_cell(ui, |ui| {
            // keyed by row id so focus stays put when a newer row is prepended
            let edit = TextEdit::singleline(&mut text)
                .id_salt(("editor_input", row.id, column))
                .hint_text(config.locale.placeholder(spec.value))
                .desired_width(140.0);
            if required {
                Frame::NONE
                    .stroke(Stroke::new(1.5, COLOR_RED))
                    .show(ui, |ui| ui.add(edit))
                    .inner
            } else {
                ui.add(edit)
            }
        })
        .inner;

        if response.changed() {
            actions.push(TableAction::Edit {
                row_id: row.id,
                column,
                value: text,
            });
        }
        // a single-line edit gives up focus on Enter, other keys keep it
        if (response.has_focus() || response.lost_focus())
            && ui.input(|i| i.key_pressed(submit_key))
        {
            actions.push(TableAction::Submit { row_id: row.id });
        }
    }

    data_cell(ui, |ui| match status {
        Some(CreateRecordResult::Pending) => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new(config.locale.saving()).color(COLOR_AMBER));
            });
        }
        Some(CreateRecordResult::Failed(message)) => {
            ui.label(RichText::new(message).small().color(COLOR_RED));
        }
        Some(CreateRecordResult::Created) | None => {}
    });

    ui.end_row();
}
