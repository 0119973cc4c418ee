use egui::{Frame, InnerResponse, Margin, Ui};

use crate::utils::colors::HEADER_BG_COLOR;

/// Header cell with background.
pub(super) fn header_cell<R>(
    ui: &mut Ui,
    add_contents: impl FnOnce(&mut Ui) -> R,
) -> InnerResponse<R> {
    Frame::NONE
        .fill(HEADER_BG_COLOR)
        .inner_margin(Margin::symmetric(8, 8))
        .show(ui, add_contents)
}

/// Data cell with padding.
pub(super) fn data_cell<R>(ui: &mut Ui, add_contents: impl FnOnce(&mut Ui) -> R) -> InnerResponse<R> {
    Frame::NONE
        .inner_margin(Margin::symmetric(8, 6))
        .show(ui, add_contents)
}

/// One bold cell per title, then the row is closed.
pub(super) fn header_row(ui: &mut Ui, titles: &[&str]) {
    for title in titles {
        header_cell(ui, |ui| {
            ui.strong(*title);
        });
    }
    ui.end_row();
}
