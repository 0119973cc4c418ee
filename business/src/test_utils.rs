//! Mock-server helpers for table flow tests.
//!
//! # Example
//!
//! ```ignore
//! let test_ctx = TestContext::new().await;
//! test_ctx.mock_list(sample_users()).await;
//!
//! let mut table = test_ctx.render(test_ctx.config());
//! settle(&mut table).await;
//! assert_eq!(table.rows().len(), 2);
//! ```

#![cfg(all(test, not(target_arch = "wasm32")))]

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

use crate::{ColumnSpec, TableConfig, TableHandle};

pub const USERS_PATH: &str = "/users";

pub struct TestContext {
    pub mock_server: MockServer,
}

impl TestContext {
    pub async fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            mock_server: MockServer::start().await,
        }
    }

    pub fn api_url(&self) -> String {
        format!("{}{USERS_PATH}", self.mock_server.uri())
    }

    /// Three-column users table against the mock server.
    pub fn config(&self) -> TableConfig {
        TableConfig::new("usersTable01", self.api_url())
            .with_column(ColumnSpec::new("Name", "name"))
            .with_column(ColumnSpec::new("Surname", "surname"))
            .with_column(ColumnSpec::new("Birthday", "birthday"))
    }

    /// # Panics
    /// Panics on an invalid config, tests only.
    pub fn render(&self, config: TableConfig) -> TableHandle {
        TableHandle::render(config).expect("test config is valid")
    }

    pub async fn mock_list(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.mock_server)
            .await;
    }

    /// Answer only the next GET with `body`; later GETs fall through to other mocks.
    pub async fn mock_list_once(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .up_to_n_times(1)
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_list_error(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_create(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"ok": status < 300})))
            .mount(&self.mock_server)
            .await;
    }

    /// Answer the POST whose `name` field is `name` after `delay`.
    pub async fn mock_create_delayed(&self, name: &str, delay: Duration) {
        Mock::given(method("POST"))
            .and(path(USERS_PATH))
            .and(body_partial_json(json!({"name": name})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"ok": true}))
                    .set_delay(delay),
            )
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_delete(&self, key: &str, status: u16) {
        Mock::given(method("DELETE"))
            .and(path(format!("{USERS_PATH}/{key}")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn requests_with_method(&self, verb: &str) -> usize {
        self.mock_server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.method.as_str() == verb)
            .count()
    }
}

/// Wait for every task of `table`, failing the test after five seconds.
pub async fn settle(table: &mut TableHandle) {
    tokio::time::timeout(Duration::from_secs(5), table.settle())
        .await
        .expect("table requests should finish");
}

pub fn sample_users() -> Value {
    json!({"data": {
        "1": {"name": "Ada", "surname": "Lovelace", "birthday": "1815-12-10"},
        "2": {"name": "Alan", "surname": "Turing", "birthday": "1912-06-23T00:00:00.000Z"}
    }})
}
