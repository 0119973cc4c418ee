//! Data table flows driven through the widget against a mock collection.

#![cfg(not(target_arch = "wasm32"))]

mod common;

use common::{TestCtx, USERS_PATH, sample_users};
use egui::accesskit::Role;
use egui_kittest::Harness;
use kittest::Queryable as _;
use serde_json::json;
use tables_business::SubmitOutcome;
use tables_ui::state::State;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_rows_render_with_formatted_dates() {
    let mut ctx = TestCtx::new().await;
    ctx.settle().await;

    let harness = ctx.harness();
    for text in ["Ada", "Lovelace", "10 December 1815", "Alan", "23 June 1912"] {
        assert!(
            harness.query_by_label(text).is_some(),
            "cell `{text}` should be shown"
        );
    }
    assert!(
        harness.query_by_label_contains("Loading").is_none(),
        "load status should be gone"
    );
}

#[tokio::test]
async fn test_failed_load_shows_the_message() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut ctx = TestCtx::with_server(mock_server);
    ctx.settle().await;

    assert!(
        ctx.harness()
            .query_by_label_contains("Can't get data from backend")
            .is_some(),
        "load failure should be shown"
    );
    assert_eq!(ctx.requests_with_method("GET").await, 1);
}

#[tokio::test]
async fn test_delete_removes_the_row_before_the_server_answers() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_users()))
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{USERS_PATH}/1")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut ctx = TestCtx::with_server(mock_server);
    ctx.settle().await;

    // the header cell comes first, then one button per row
    let harness = ctx.harness_mut();
    let delete_buttons = harness.query_all_by_label("Delete").count();
    assert_eq!(delete_buttons, 3, "header plus a button per row");
    harness
        .query_all_by_label("Delete")
        .nth(1)
        .expect("delete button of the first row")
        .click();
    harness.step();
    harness.step();

    assert!(
        harness.query_by_label("Ada").is_none(),
        "row should disappear right away"
    );

    ctx.settle().await;
    let harness = ctx.harness();
    assert!(
        harness.query_by_label("Ada").is_none(),
        "failed delete stays hidden by default"
    );
    assert!(harness.query_by_label("Alan").is_some());
    assert!(
        harness.query_by_label_contains("Can't delete").is_some(),
        "hidden failure should be reported"
    );
    assert_eq!(ctx.requests_with_method("DELETE").await, 1);
}

#[tokio::test]
async fn test_incomplete_submit_sends_nothing() {
    let mut ctx = TestCtx::new().await;
    ctx.settle().await;

    let harness = ctx.harness_mut();
    harness.get_by_label("Add new user").click();
    harness.step();

    {
        let table = &mut harness.state_mut().tables[0];
        let row_id = table.editor_rows()[0].id;
        table.edit_field(row_id, 0, "Grace");
        assert_eq!(table.submit(row_id), SubmitOutcome::Incomplete { flagged: 2 });
    }
    harness.step();

    ctx.settle().await;
    assert_eq!(ctx.requests_with_method("POST").await, 0);
    assert_eq!(ctx.harness().state().tables[0].editor_rows().len(), 1);
}

/// Focus the `index`-th editor input, top row first, and let egui pick it up.
fn focus_input(harness: &mut Harness<'_, State>, index: usize) {
    // opened editor rows only get their inputs on the frame after the action
    harness.step();
    harness
        .query_all_by_role(Role::TextInput)
        .nth(index)
        .expect("editor input should exist")
        .focus();
    harness.step();
}

fn type_into(harness: &mut Harness<'_, State>, index: usize, text: &str) {
    focus_input(harness, index);
    harness.event(egui::Event::Text(text.to_owned()));
    harness.step();
}

#[tokio::test]
async fn test_enter_on_incomplete_row_flags_empty_inputs() {
    let mut ctx = TestCtx::new().await;
    ctx.settle().await;

    let harness = ctx.harness_mut();
    harness.get_by_label("Add new user").click();
    harness.step();

    type_into(harness, 0, "Grace");
    harness.key_press(egui::Key::Enter);
    harness.step();

    let editor_rows = harness.state().tables[0].editor_rows();
    assert_eq!(editor_rows[0].inputs, vec!["Grace", "", ""]);
    assert_eq!(
        editor_rows[0].required,
        vec![false, true, true],
        "empty inputs should be flagged on submit"
    );

    ctx.settle().await;
    assert_eq!(ctx.requests_with_method("POST").await, 0);
}

#[tokio::test]
async fn test_enter_on_complete_row_posts_once() {
    let mut ctx = TestCtx::new().await;
    Mock::given(method("POST"))
        .and(path(USERS_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .mount(ctx.mock_server())
        .await;
    ctx.settle().await;

    let harness = ctx.harness_mut();
    harness.get_by_label("Add new user").click();
    harness.step();

    for (index, text) in ["Grace", "Hopper", "1906-12-09"].into_iter().enumerate() {
        type_into(harness, index, text);
    }
    assert_eq!(
        harness.state().tables[0].editor_rows()[0].inputs,
        vec!["Grace", "Hopper", "1906-12-09"]
    );
    harness.key_press(egui::Key::Enter);
    harness.step();

    ctx.settle().await;
    assert_eq!(ctx.requests_with_method("POST").await, 1);
    assert!(
        ctx.harness().state().tables[0].editor_rows().is_empty(),
        "a successful create rebuilds the table"
    );

    let post = ctx
        .mock_server()
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .find(|request| request.method.as_str() == "POST")
        .expect("POST was sent");
    let body: serde_json::Value = serde_json::from_slice(&post.body).expect("json body");
    assert_eq!(
        body,
        json!({"name": "Grace", "surname": "Hopper", "birthday": "1906-12-09"})
    );
}

#[tokio::test]
async fn test_typing_stays_in_its_row_when_a_row_is_prepended() {
    let mut ctx = TestCtx::new().await;
    ctx.settle().await;

    let harness = ctx.harness_mut();
    harness.get_by_label("Add new user").click();
    harness.step();
    type_into(harness, 0, "Gr");

    // a newer row lands on top while the first input keeps focus
    let newer = harness.state_mut().tables[0].open_editor_row();
    harness.step();
    harness.event(egui::Event::Text("ace".to_owned()));
    harness.step();

    let editor_rows = harness.state().tables[0].editor_rows();
    assert_eq!(editor_rows.len(), 2);
    assert_eq!(editor_rows[0].id, newer);
    assert_eq!(editor_rows[0].inputs[0], "", "new row is untouched");
    assert_eq!(editor_rows[1].inputs[0], "Grace", "text goes to the focused row");
}

#[tokio::test]
async fn test_successful_create_rebuilds_the_table() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_users()))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {
            "1": {"name": "Ada", "surname": "Lovelace", "birthday": "1815-12-10"},
            "2": {"name": "Alan", "surname": "Turing", "birthday": "1912-06-23"},
            "3": {"name": "Grace", "surname": "Hopper", "birthday": "1906-12-09"}
        }})))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(USERS_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let mut ctx = TestCtx::with_server(mock_server);
    ctx.settle().await;

    let harness = ctx.harness_mut();
    harness.get_by_label("Add new user").click();
    harness.step();
    {
        let table = &mut harness.state_mut().tables[0];
        let row_id = table.editor_rows()[0].id;
        for (column, value) in ["Grace", "Hopper", "1906-12-09"].into_iter().enumerate() {
            table.edit_field(row_id, column, value);
        }
        assert!(matches!(
            table.submit(row_id),
            SubmitOutcome::Submitted { .. }
        ));
    }
    harness.step();

    ctx.settle().await;
    let harness = ctx.harness();
    assert!(
        harness.query_by_label("9 December 1906").is_some(),
        "new record should come from the fresh GET"
    );
    assert!(
        harness.state().tables[0].editor_rows().is_empty(),
        "editor rows are discarded by the rebuild"
    );
    assert_eq!(ctx.requests_with_method("GET").await, 2);
    assert_eq!(ctx.mock_server().received_requests().await.map(|r| r.len()), Some(3));
}
