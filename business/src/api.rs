//! Collection endpoint calls.
//!
//! Plain async functions used by the table commands. Any non-2xx status is a failure;
//! there are no retries.

use log::info;
use serde_json::Value;
use thiserror::Error;

use crate::http::{Client, HttpError, Method};
use crate::{Draft, RecordSet, SchemaError, TableConfig};

#[derive(Debug, Clone, Error)]
pub enum TableApiError {
    #[error(transparent)]
    Transport(#[from] HttpError),
    #[error("{operation} {url} returned status {status}")]
    Status {
        operation: &'static str,
        url: String,
        status: u16,
    },
    #[error("cannot decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("cannot encode request body: {0}")]
    Encode(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

pub type ApiResult<T> = Result<T, TableApiError>;

fn status_error(method: Method, url: &str, status: u16) -> TableApiError {
    TableApiError::Status {
        operation: method.as_str(),
        url: url.to_owned(),
        status,
    }
}

/// GET `{api_url}`
pub async fn list_records(config: &TableConfig) -> ApiResult<RecordSet> {
    let url = config.api_url.as_str();
    let response = Client::get(url).send().await?;

    if !response.is_success() {
        return Err(status_error(Method::Get, url, response.status));
    }

    let body: Value = response.json().map_err(|e| TableApiError::Decode {
        url: url.to_owned(),
        message: e.to_string(),
    })?;
    let records = RecordSet::from_response(&body, &config.columns)?;
    info!("Loaded {} records from {url}", records.len());
    Ok(records)
}

/// POST `{api_url}` with the draft as a JSON object.
pub async fn create_record(config: &TableConfig, draft: &Draft) -> ApiResult<()> {
    let url = config.api_url.as_str();
    let response = Client::post(url)
        .json(draft)
        .map_err(|e| TableApiError::Encode(e.to_string()))?
        .send()
        .await?;

    if !response.is_success() {
        return Err(status_error(Method::Post, url, response.status));
    }
    Ok(())
}

/// DELETE `{api_url}/{key}`
pub async fn delete_record(config: &TableConfig, key: &str) -> ApiResult<()> {
    let url = config.record_url(key);
    let response = Client::delete(&url).send().await?;

    if !response.is_success() {
        return Err(status_error(Method::Delete, &url, response.status));
    }
    Ok(())
}
