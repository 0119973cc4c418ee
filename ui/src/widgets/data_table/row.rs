use egui::{RichText, Ui};
use tables_business::{Locale, RowView};

use super::header::data_cell;
use crate::utils::colors::COLOR_RED;

/// Renders one data row. Returns `true` when its delete button was clicked.
pub(super) fn data_row(ui: &mut Ui, row: &RowView, locale: Locale) -> bool {
    for cell in &row.cells {
        data_cell(ui, |ui| {
            ui.label(cell.as_str());
        });
    }

    let clicked = data_cell(ui, |ui| {
        ui.vertical(|ui| {
            let clicked = ui.button(locale.delete_button()).clicked();
            if let Some(error) = &row.delete_error {
                ui.label(RichText::new(error).small().color(COLOR_RED));
            }
            clicked
        })
        .inner
    })
    .inner;

    ui.end_row();
    clicked
}
