use std::time::Duration;

use egui_kittest::Harness;
use serde_json::{Value, json};
use tables_business::{ColumnSpec, TableConfig};
use tables_ui::state::State;
use tables_ui::widgets::data_table;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERS_PATH: &str = "/users";

pub struct TestCtx<'a> {
    mock_server: MockServer,
    harness: Harness<'a, State>,
}

impl<'a> TestCtx<'a> {
    /// A users table backed by a mock server that lists [`sample_users`].
    pub async fn new() -> Self {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_users()))
            .mount(&mock_server)
            .await;
        Self::with_server(mock_server)
    }

    /// Mount the mocks on `mock_server` before calling this, the first GET leaves right away.
    pub fn with_server(mock_server: MockServer) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let config = TableConfig::new("usersTable01", format!("{}{USERS_PATH}", mock_server.uri()))
            .with_column(ColumnSpec::new("Name", "name"))
            .with_column(ColumnSpec::new("Surname", "surname"))
            .with_column(ColumnSpec::new("Birthday", "birthday"));

        let harness = Harness::new_ui_state(
            |ui, state: &mut State| {
                for table in &mut state.tables {
                    data_table(table, ui);
                }
            },
            State::single(config),
        );

        Self {
            mock_server,
            harness,
        }
    }

    pub fn harness_mut(&mut self) -> &mut Harness<'a, State> {
        &mut self.harness
    }

    pub fn harness(&self) -> &Harness<'a, State> {
        &self.harness
    }

    pub fn mock_server(&self) -> &MockServer {
        &self.mock_server
    }

    /// Wait for every request of the table, then draw two frames: the grid sizes itself on
    /// the first one, so clicks only land after the second.
    pub async fn settle(&mut self) {
        tokio::time::timeout(
            Duration::from_secs(5),
            self.harness.state_mut().tables[0].settle(),
        )
        .await
        .expect("table requests should finish");
        self.harness.step();
        self.harness.step();
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

pub fn sample_users() -> Value {
    json!({"data": {
        "1": {"name": "Ada", "surname": "Lovelace", "birthday": "1815-12-10"},
        "2": {"name": "Alan", "surname": "Turing", "birthday": "1912-06-23T00:00:00.000Z"}
    }})
}
