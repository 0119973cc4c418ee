use crate::{state::State, utils::colors::COLOR_RED, widgets};

pub struct TablesApp {
    state: State,
}

impl TablesApp {
    /// Called once before the first frame.
    pub fn new(state: State) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &State {
        &self.state
    }
}

impl eframe::App for TablesApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            for error in &self.state.errors {
                ui.colored_label(COLOR_RED, error.as_str());
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                for table in &mut self.state.tables {
                    widgets::data_table(table, ui);
                    ui.add_space(16.0);
                }
            });
        });
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use egui_kittest::Harness;
    use kittest::Queryable as _;
    use tables_business::TableConfig;

    use super::*;

    #[tokio::test]
    async fn rejected_tables_are_reported_in_the_window() {
        // nothing listens on port 9, the valid table just ends up failing its load
        let state = State::from_config(tables_business::AppConfig {
            tables: vec![
                TableConfig::new("broken", ""),
                TableConfig::new("ok", "http://127.0.0.1:9/users"),
            ],
        });
        assert_eq!(state.tables.len(), 1);

        let mut harness = Harness::new_eframe(|_| TablesApp::new(state));
        harness.step();

        assert!(
            harness.query_by_label_contains("broken").is_some(),
            "config error should be shown"
        );
        assert_eq!(harness.state().state().tables.len(), 1);
    }
}
