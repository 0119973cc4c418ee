//! Table configuration.
//!
//! A [`TableConfig`] is the static description of one table: where it lives, which columns
//! it shows and which collection endpoint feeds it. [`AppConfig`] is the list of tables the
//! app renders, loaded from a JSON file and adjusted by environment variables.

use std::any::Any;
use std::collections::BTreeSet;
use std::env::vars;
use std::path::Path;

use anyhow::Context as _;
use log::info;
use serde::{Deserialize, Serialize};
use tables_states::{SnapshotClone, State, assign_impl};
use thiserror::Error;
use ustr::Ustr;

use crate::Locale;

pub const DEFAULT_API_URL: &str = "https://mock-api.shpp.me/apanov/users";

/// How a column's raw values are turned into cell text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Dates when they parse as one, verbatim otherwise.
    #[default]
    Auto,
    Text,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub title: String,
    /// Record field key shown in this column.
    pub value: Ustr,
    #[serde(default)]
    pub kind: FieldKind,
}

impl ColumnSpec {
    pub fn new(title: impl Into<String>, value: &str) -> Self {
        Self {
            title: title.into(),
            value: Ustr::from(value),
            kind: FieldKind::Auto,
        }
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }
}

fn default_submit_key() -> String {
    "Enter".to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Container id the table is mounted in.
    pub parent: String,
    pub columns: Vec<ColumnSpec>,
    #[serde(alias = "apiUrl")]
    pub api_url: String,
    #[serde(default)]
    pub locale: Locale,
    /// Key name (as understood by egui) that submits an editor row.
    #[serde(default = "default_submit_key", alias = "submitKey")]
    pub submit_key: String,
    /// Show rows again, marked with the error, when their DELETE fails.
    #[serde(default, alias = "restoreFailedDeletes")]
    pub restore_failed_deletes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("table `{parent}`: apiUrl must not be empty")]
    EmptyApiUrl { parent: String },
    #[error("table `{parent}`: apiUrl `{url}` must be an http(s) URL or start with `/`")]
    InvalidApiUrl { parent: String, url: String },
    #[error("table `{parent}`: column field `{field}` is used more than once")]
    DuplicateField { parent: String, field: Ustr },
    #[error("table `{parent}`: unknown submit key `{key}`")]
    UnknownSubmitKey { parent: String, key: String },
}

impl TableConfig {
    pub fn new(parent: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            columns: Vec::new(),
            api_url: api_url.into(),
            locale: Locale::default(),
            submit_key: default_submit_key(),
            restore_failed_deletes: false,
        }
    }

    pub fn with_column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_restore_failed_deletes(mut self, restore: bool) -> Self {
        self.restore_failed_deletes = restore;
        self
    }

    /// The users table served by the public mock API.
    pub fn users(locale: Locale) -> Self {
        let titles = match locale {
            Locale::En => ["Name", "Surname", "Birthday", "Avatar"],
            Locale::Ru => ["Имя", "Фамилия", "Дата рождения", "Аватар"],
        };
        let fields = ["name", "surname", "birthday", "avatar"];

        let mut config = Self::new("usersTable01", DEFAULT_API_URL).with_locale(locale);
        for (title, field) in titles.into_iter().zip(fields) {
            config = config.with_column(ColumnSpec::new(title, field));
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_url.trim();
        if url.is_empty() {
            return Err(ConfigError::EmptyApiUrl {
                parent: self.parent.clone(),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://") || url.starts_with('/')) {
            return Err(ConfigError::InvalidApiUrl {
                parent: self.parent.clone(),
                url: url.to_owned(),
            });
        }

        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if !seen.insert(column.value) {
                return Err(ConfigError::DuplicateField {
                    parent: self.parent.clone(),
                    field: column.value,
                });
            }
        }

        if self.submit_key().is_none() {
            return Err(ConfigError::UnknownSubmitKey {
                parent: self.parent.clone(),
                key: self.submit_key.clone(),
            });
        }

        Ok(())
    }

    pub fn submit_key(&self) -> Option<egui::Key> {
        egui::Key::from_name(&self.submit_key)
    }

    /// Header titles: one per column plus the action column.
    pub fn header_cells(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|column| column.title.as_str())
            .chain(std::iter::once(self.locale.action_column_title()))
            .collect()
    }

    pub fn fields(&self) -> impl Iterator<Item = Ustr> + '_ {
        self.columns.iter().map(|column| column.value)
    }

    /// `{api_url}/{key}`; the key is used as-is.
    pub fn record_url(&self, key: &str) -> String {
        format!("{}/{key}", self.api_url.trim_end_matches('/'))
    }
}

impl SnapshotClone for TableConfig {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for TableConfig {
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

/// Every table the app renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub tables: Vec<TableConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tables: vec![TableConfig::users(Locale::En)],
        }
    }
}

// An intermediate struct for the environment; everything is optional.
#[derive(Debug, Default, Deserialize)]
struct RawEnv {
    tables_config: Option<String>,
    tables_api_url: Option<String>,
    tables_locale: Option<String>,
}

impl AppConfig {
    /// Build the configuration from `TABLES_CONFIG`, `TABLES_API_URL` and `TABLES_LOCALE`.
    pub fn init() -> anyhow::Result<Self> {
        info!("Loading table configuration from environment variables");
        let raw: RawEnv = serde_env::from_iter(vars())?;
        Self::from_raw(raw)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid table configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read table configuration {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("in {}", path.display()))
    }

    fn from_raw(raw: RawEnv) -> anyhow::Result<Self> {
        let RawEnv {
            tables_config,
            tables_api_url,
            tables_locale,
        } = raw;

        let mut config = match tables_config {
            Some(path) => {
                info!("Using TABLES_CONFIG: {path}");
                Self::from_file(path)?
            }
            None => {
                info!("TABLES_CONFIG not set, using the built-in users table");
                Self::default()
            }
        };

        if let Some(url) = tables_api_url {
            info!("TABLES_API_URL overrides every table endpoint with {url}");
            for table in &mut config.tables {
                table.api_url.clone_from(&url);
            }
        }

        if let Some(raw_locale) = tables_locale {
            let Some(locale) = Locale::parse(&raw_locale) else {
                anyhow::bail!("TABLES_LOCALE must be `en` or `ru`, got `{raw_locale}`");
            };
            for table in &mut config.tables {
                table.locale = locale;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tables.iter().try_for_each(TableConfig::validate)
    }
}
