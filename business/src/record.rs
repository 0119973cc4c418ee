//! Typed records, validated where the collection response is decoded.
//!
//! The endpoint answers `{"data": {<key>: {<field>: value, ..}, ..}}`. Each record is mapped
//! onto the configured columns once, so the view never looks fields up by name.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::warn;
use serde_json::{Map, Value};
use thiserror::Error;
use ustr::Ustr;

use crate::{ColumnSpec, FieldKind, Locale};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("response body must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },
    #[error("`data` must be an object or an array, got {found}")]
    InvalidData { found: &'static str },
    #[error("record `{key}` must be a JSON object, got {found}")]
    InvalidRecord { key: Ustr, found: &'static str },
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse the date-like strings the collection uses.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 (the date is taken in the value's own offset) and naive
/// `YYYY-MM-DD[T ]HH:MM:SS[.fff]`. Bare numbers are never dates.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() < 10 {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|datetime| datetime.date())
}

/// One cell's value after mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Missing,
    Text(String),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn from_json(value: Option<&Value>, kind: FieldKind) -> Self {
        let text = match value {
            None | Some(Value::Null) => return Self::Missing,
            Some(Value::String(s)) => s.clone(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Number(n)) => return Self::Text(n.to_string()),
            // nested values are shown as compact JSON
            Some(other) => return Self::Text(other.to_string()),
        };

        match kind {
            FieldKind::Text => Self::Text(text),
            FieldKind::Auto => parse_date(&text).map_or(Self::Text(text), Self::Date),
            FieldKind::Date => match parse_date(&text) {
                Some(date) => Self::Date(date),
                None => {
                    if !text.is_empty() {
                        warn!("Value `{text}` in a date column is not a date, shown as text");
                    }
                    Self::Text(text)
                }
            },
        }
    }

    pub fn display(&self, locale: Locale) -> String {
        match self {
            Self::Missing => String::new(),
            Self::Text(text) => text.clone(),
            Self::Date(date) => locale.format_date(*date),
        }
    }
}

/// One row from the collection, values aligned with the configured columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Server-assigned key, used for `DELETE {api_url}/{key}`.
    pub key: Ustr,
    pub values: Vec<FieldValue>,
}

impl Record {
    pub fn from_json(key: Ustr, value: &Value, columns: &[ColumnSpec]) -> Result<Self, SchemaError> {
        let Value::Object(fields) = value else {
            return Err(SchemaError::InvalidRecord {
                key,
                found: json_kind(value),
            });
        };

        let values = columns
            .iter()
            .map(|column| FieldValue::from_json(fields.get(column.value.as_str()), column.kind))
            .collect();

        Ok(Self { key, values })
    }

    pub fn cells(&self, locale: Locale) -> Vec<String> {
        self.values.iter().map(|value| value.display(locale)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    pub records: Vec<Record>,
}

impl RecordSet {
    /// Decode a collection response body.
    ///
    /// Keys enumerate like a JS object: integer-like keys ascending, then the rest in
    /// document order. An array `data` is keyed by index; a missing `data` is empty.
    pub fn from_response(body: &Value, columns: &[ColumnSpec]) -> Result<Self, SchemaError> {
        let Value::Object(root) = body else {
            return Err(SchemaError::NotAnObject {
                found: json_kind(body),
            });
        };

        let entries: Vec<(Ustr, &Value)> = match root.get("data") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(data)) => enumeration_order(data),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| (Ustr::from(&index.to_string()), item))
                .collect(),
            Some(other) => {
                return Err(SchemaError::InvalidData {
                    found: json_kind(other),
                });
            }
        };

        let records = entries
            .into_iter()
            .map(|(key, value)| Record::from_json(key, value, columns))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn array_index(key: &str) -> Option<u32> {
    // canonical form only: "01" or "+1" are ordinary string keys
    if key == "0" || (!key.starts_with('0') && key.bytes().all(|b| b.is_ascii_digit())) {
        key.parse::<u32>().ok().filter(|index| *index != u32::MAX)
    } else {
        None
    }
}

fn enumeration_order(data: &Map<String, Value>) -> Vec<(Ustr, &Value)> {
    let mut indexed: Vec<(u32, Ustr, &Value)> = Vec::new();
    let mut named: Vec<(Ustr, &Value)> = Vec::new();

    for (key, value) in data {
        match array_index(key) {
            Some(index) => indexed.push((index, Ustr::from(key), value)),
            None => named.push((Ustr::from(key), value)),
        }
    }
    indexed.sort_by_key(|(index, _, _)| *index);

    indexed
        .into_iter()
        .map(|(_, key, value)| (key, value))
        .chain(named)
        .collect()
}
