use log::error;
use tables_business::{AppConfig, TableConfig, TableHandle};

/// The main application state: one handle per rendered table.
#[derive(Debug, Default)]
pub struct State {
    pub tables: Vec<TableHandle>,
    /// Startup problems shown above the tables.
    pub errors: Vec<String>,
}

impl State {
    /// Render every table of `config`. A table whose config is rejected is
    /// skipped and reported instead of aborting the others.
    pub fn from_config(config: AppConfig) -> Self {
        let mut state = Self::default();
        for table in config.tables {
            let parent = table.parent.clone();
            match TableHandle::render(table) {
                Ok(handle) => state.tables.push(handle),
                Err(err) => {
                    error!("Table `{parent}` was not rendered: {err}");
                    state.errors.push(format!("{parent}: {err}"));
                }
            }
        }
        state
    }

    /// A single table against `config`, for tests and embedding.
    pub fn single(config: TableConfig) -> Self {
        Self::from_config(AppConfig {
            tables: vec![config],
        })
    }
}
