use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{
    app, app_with, ServerMode, ABANDONED_CHANGE, COMMIT_MSG_HOOK, FEATURE_CHANGE, OTHER_ACCOUNT_ID,
    SELF_ACCOUNT_ID, TYPO_CHANGE,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const XSSI_PREFIX: &str = ")]}'\n";

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Decode a Gerrit JSON body, insisting on the XSSI guard line.
async fn body_json(response: axum::response::Response) -> Value {
    let bytes = body_bytes(response).await;
    let text = std::str::from_utf8(&bytes).unwrap();
    let payload = text
        .strip_prefix(XSSI_PREFIX)
        .unwrap_or_else(|| panic!("missing XSSI prefix: {text:?}"));
    serde_json::from_str(payload).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn empty(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json; charset=UTF-8")
        .body(body.to_string())
        .unwrap()
}

async fn send(app: &Router, req: Request<String>) -> axum::response::Response {
    app.clone().oneshot(req).await.unwrap()
}

// --- changes ---

#[tokio::test]
async fn list_open_changes() {
    let app = app();
    let resp = send(&app, get("/changes/?q=is:open")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let changes = body_json(resp).await;
    let numbers: Vec<u64> = changes
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["_number"].as_u64().unwrap())
        .collect();
    assert_eq!(numbers, [FEATURE_CHANGE, TYPO_CHANGE]);
}

#[tokio::test]
async fn list_changes_pages_with_limit_and_start() {
    let app = app();
    let resp = send(&app, get("/changes/?q=is:open&n=1&S=1")).await;
    let changes = body_json(resp).await;
    assert_eq!(changes.as_array().unwrap().len(), 1);
    assert_eq!(changes[0]["_number"], TYPO_CHANGE);
}

#[tokio::test]
async fn detail_options_add_messages_labels_and_revision() {
    let app = app();
    let resp = send(
        &app,
        get("/changes/?q=3965&o=CURRENT_REVISION&o=MESSAGES&o=LABELS&o=DETAILED_LABELS"),
    )
    .await;
    let changes = body_json(resp).await;
    let change = &changes[0];
    assert_eq!(change["messages"][0]["message"], "Uploaded patch set 1.");
    assert!(change["labels"]["Code-Review"].is_object());
    assert_eq!(
        change["current_revision"],
        "184ebe53805e102605d11f6b143486d15c23a09c"
    );
}

#[tokio::test]
async fn legacy_mode_rejects_messages_option() {
    let app = app_with(ServerMode::Legacy);
    let resp = send(&app, get("/changes/?q=3965&o=MESSAGES")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_bytes(resp).await;
    assert!(std::str::from_utf8(&body).unwrap().contains("MESSAGES"));

    let resp = send(&app, get("/changes/?q=3965&o=LABELS")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn abandon_then_restore() {
    let app = app();
    let resp = send(
        &app,
        json_request("POST", "/changes/3966/abandon", json!({"message": "dup"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "ABANDONED");

    let resp = send(&app, json_request("POST", "/changes/3966/abandon", json!({}))).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = send(&app, json_request("POST", "/changes/3966/restore", json!({}))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "NEW");
}

#[tokio::test]
async fn restore_requires_abandoned_change() {
    let app = app();
    let resp = send(&app, json_request("POST", "/changes/3965/restore", json!({}))).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let uri = format!("/changes/{ABANDONED_CHANGE}/restore");
    let resp = send(&app, json_request("POST", &uri, json!({}))).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_change_is_404_plain_text() {
    let app = app();
    let resp = send(&app, json_request("POST", "/changes/1/abandon", json!({}))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(resp).await.as_ref(), b"Not found: 1");
}

// --- revisions ---

#[tokio::test]
async fn review_records_votes_and_comments() {
    let app = app();
    let resp = send(
        &app,
        json_request(
            "POST",
            "/changes/3965/revisions/current/review",
            json!({
                "message": "Some nits",
                "labels": {"Code-Review": -1},
                "comments": {"src/feature x.rs": [{"line": 23, "message": "[nit] trailing whitespace"}]}
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"labels": {"Code-Review": -1}}));

    let resp = send(&app, get("/changes/3965/revisions/current/comments/")).await;
    let comments = body_json(resp).await;
    let list = comments["src/feature x.rs"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["line"], 23);
    assert_eq!(list[0]["author"]["_account_id"], SELF_ACCOUNT_ID);
}

#[tokio::test]
async fn review_with_unknown_label_is_rejected() {
    let app = app();
    let resp = send(
        &app,
        json_request(
            "POST",
            "/changes/3965/revisions/current/review",
            json!({"labels": {"Verified": 1}}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_needs_approval() {
    let app = app();
    let submit = || json_request("POST", "/changes/3965/revisions/current/submit", json!({}));

    let resp = send(&app, submit()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    send(
        &app,
        json_request(
            "POST",
            "/changes/3965/revisions/current/review",
            json!({"labels": {"Code-Review": 2}}),
        ),
    )
    .await;
    let resp = send(&app, submit()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "MERGED");
}

#[tokio::test]
async fn reviewed_flag_round_trips_through_file_listing() {
    let app = app();
    let flag = "/changes/3965/revisions/current/files/src%2Ffeature%20x.rs/reviewed";

    let resp = send(&app, empty("PUT", flag)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let resp = send(&app, empty("PUT", flag)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let files = body_json(send(&app, get("/changes/3965/revisions/current/files/")).await).await;
    assert_eq!(files["src/feature x.rs"]["reviewed"], true);
    assert_eq!(files["src/feature x.rs"]["lines_inserted"], 42);

    let resp = send(&app, empty("DELETE", flag)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let files = body_json(send(&app, get("/changes/3965/revisions/current/files/")).await).await;
    assert!(files["src/feature x.rs"].get("reviewed").is_none());
}

#[tokio::test]
async fn unknown_revision_is_404() {
    let app = app();
    let resp = send(&app, get("/changes/3965/revisions/deadbeef/files/")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- accounts ---

#[tokio::test]
async fn get_self_account() {
    let app = app();
    let account = body_json(send(&app, get("/accounts/self")).await).await;
    assert_eq!(account["_account_id"], SELF_ACCOUNT_ID);
    assert_eq!(account["username"], "jdoe");

    let other = body_json(send(&app, get(&format!("/accounts/{OTHER_ACCOUNT_ID}"))).await).await;
    assert_eq!(other["name"], "Jane Roe");
}

#[tokio::test]
async fn star_shows_up_in_starred_listing_and_queries() {
    let app = app();
    let resp = send(&app, empty("PUT", "/accounts/self/starred.changes/3966")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let starred = body_json(send(&app, get("/accounts/self/starred.changes")).await).await;
    assert_eq!(starred.as_array().unwrap().len(), 1);
    assert_eq!(starred[0]["starred"], true);

    let queried = body_json(send(&app, get("/changes/?q=is:starred")).await).await;
    assert_eq!(queried[0]["_number"], TYPO_CHANGE);

    send(&app, empty("DELETE", "/accounts/self/starred.changes/3966")).await;
    let starred = body_json(send(&app, get("/accounts/self/starred.changes")).await).await;
    assert!(starred.as_array().unwrap().is_empty());
}

// --- projects ---

#[tokio::test]
async fn list_projects_with_prefix_and_description() {
    let app = app();
    let projects = body_json(send(&app, get("/projects/?d&p=tools")).await).await;
    assert_eq!(
        projects,
        json!({"tools/gerrit": {"id": "tools%2Fgerrit", "description": "Gerrit Code Review"}})
    );
}

#[tokio::test]
async fn list_projects_pages_in_name_order() {
    let app = app();
    let projects = body_json(send(&app, get("/projects/?n=2")).await).await;
    let names: Vec<&String> = projects.as_object().unwrap().keys().collect();
    assert_eq!(names, ["All-Projects", "demo"]);
    assert!(projects["demo"].get("description").is_none());
}

// --- tools ---

#[tokio::test]
async fn commit_msg_hook_is_served_raw() {
    let app = app();
    let resp = send(&app, get("/tools/hooks/commit-msg")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await.as_ref(), COMMIT_MSG_HOOK.as_bytes());
}
