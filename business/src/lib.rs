//! Business layer of the remote data table.
//!
//! Configuration, the typed record schema, the collection HTTP calls and the
//! computes/commands that back one [`TableHandle`].

mod api;
mod config;
mod create_record_compute;
mod delete_record_compute;
mod draft;
pub mod http;
mod load_table_compute;
mod locale;
mod record;
mod session;
mod table;
mod table_rows_compute;

pub mod test_utils;

pub use api::{ApiResult, TableApiError, create_record, delete_record, list_records};
pub use config::{AppConfig, ColumnSpec, ConfigError, DEFAULT_API_URL, FieldKind, TableConfig};
pub use create_record_compute::{
    CreateRecordCommand, CreateRecordCompute, CreateRecordInput, CreateRecordResult,
};
pub use delete_record_compute::{
    DeleteRecordCommand, DeleteRecordInput, DeleteStatus, DeletionsCompute,
};
pub use draft::{Draft, EditorRow};
pub use load_table_compute::{LoadTableCommand, LoadTableCompute, LoadTableResult};
pub use locale::Locale;
pub use record::{FieldValue, Record, RecordSet, SchemaError, parse_date};
pub use session::TableSession;
pub use table::{SubmitOutcome, TableHandle};
pub use table_rows_compute::{RowView, TableRowsCompute};
