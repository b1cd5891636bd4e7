//! In-memory fake Gerrit server used by the client's integration tests.
//!
//! # Design
//! Serves the subset of the REST API the client speaks, with Gerrit's wire
//! quirks: JSON bodies carry the `)]}'` guard line, errors are plain text,
//! timestamps use `yyyy-MM-dd HH:mm:ss.nnnnnnnnn`. `ServerMode::Legacy`
//! imitates releases that reject `o=MESSAGES` with 400. State is seeded with
//! a fixed set of accounts, projects and changes.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const SELF_ACCOUNT_ID: u64 = 1000096;
pub const OTHER_ACCOUNT_ID: u64 = 1000097;

pub const FEATURE_CHANGE: u64 = 3965;
pub const TYPO_CHANGE: u64 = 3966;
pub const ABANDONED_CHANGE: u64 = 3900;

pub const COMMIT_MSG_HOOK: &str = "#!/bin/sh\n# From Gerrit Code Review\n#\n# Part of Gerrit Code Review (https://www.gerritcodereview.com/)\nadd_ChangeId() {\n\t:\n}\n";

const XSSI_PREFIX: &str = ")]}'\n";
const TIMESTAMP: &str = "2013-02-21 11:16:36.775000000";

/// Which server generation to imitate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerMode {
    #[default]
    Current,
    /// Rejects the `MESSAGES` change option with 400.
    Legacy,
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub username: String,
}

impl Account {
    fn to_json(&self) -> Value {
        json!({
            "_account_id": self.id,
            "name": self.name,
            "email": self.email,
            "username": self.username,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub author: u64,
    pub message: String,
    pub revision_number: u32,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: String,
    pub author: u64,
    pub line: Option<u32>,
    pub side: Option<String>,
    pub in_reply_to: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    New,
    Merged,
    Abandoned,
}

impl Status {
    fn as_str(self) -> &'static str {
        match self {
            Status::New => "NEW",
            Status::Merged => "MERGED",
            Status::Abandoned => "ABANDONED",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Change {
    pub number: u64,
    pub project: String,
    pub branch: String,
    pub change_id: String,
    pub subject: String,
    pub status: Status,
    pub owner: u64,
    pub revision: String,
    pub files: BTreeMap<String, (u64, u64)>,
    pub messages: Vec<Message>,
    /// label -> account -> vote
    pub votes: BTreeMap<String, BTreeMap<u64, i32>>,
    /// path -> comments in posting order
    pub comments: BTreeMap<String, Vec<Comment>>,
}

impl Change {
    pub fn triplet(&self) -> String {
        format!("{}~{}~{}", self.project, self.branch, self.change_id)
    }

    fn matches_id(&self, id: &str) -> bool {
        id == self.number.to_string() || id == self.triplet() || id == self.change_id
    }

    fn matches_revision(&self, rev: &str) -> bool {
        rev == "current" || rev == "1" || rev == self.revision
    }
}

#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub description: String,
}

#[derive(Debug)]
pub struct Db {
    pub accounts: Vec<Account>,
    pub projects: Vec<Project>,
    pub changes: Vec<Change>,
    /// (account, change number)
    pub starred: HashSet<(u64, u64)>,
    /// (account, change number, path)
    pub reviewed: HashSet<(u64, u64, String)>,
}

impl Db {
    pub fn seeded() -> Self {
        let accounts = vec![
            Account {
                id: SELF_ACCOUNT_ID,
                name: "John Doe".to_string(),
                email: "john.doe@example.com".to_string(),
                username: "jdoe".to_string(),
            },
            Account {
                id: OTHER_ACCOUNT_ID,
                name: "Jane Roe".to_string(),
                email: "jane.roe@example.com".to_string(),
                username: "jroe".to_string(),
            },
        ];
        let projects = vec![
            Project {
                name: "demo".to_string(),
                description: "Demo project".to_string(),
            },
            Project {
                name: "tools/gerrit".to_string(),
                description: "Gerrit Code Review".to_string(),
            },
            Project {
                name: "All-Projects".to_string(),
                description: "Access inherited by all other projects.".to_string(),
            },
        ];
        let changes = vec![
            Change {
                number: FEATURE_CHANGE,
                project: "demo".to_string(),
                branch: "master".to_string(),
                change_id: "I8473b95934b5732ac55d26311a706c9c2bde9940".to_string(),
                subject: "Implementing Feature X".to_string(),
                status: Status::New,
                owner: SELF_ACCOUNT_ID,
                revision: "184ebe53805e102605d11f6b143486d15c23a09c".to_string(),
                files: BTreeMap::from([
                    ("/COMMIT_MSG".to_string(), (7, 0)),
                    ("src/feature x.rs".to_string(), (42, 3)),
                ]),
                messages: vec![Message {
                    id: "YH-egE".to_string(),
                    author: SELF_ACCOUNT_ID,
                    message: "Uploaded patch set 1.".to_string(),
                    revision_number: 1,
                }],
                votes: BTreeMap::from([("Code-Review".to_string(), BTreeMap::new())]),
                comments: BTreeMap::new(),
            },
            Change {
                number: TYPO_CHANGE,
                project: "demo".to_string(),
                branch: "master".to_string(),
                change_id: "I0d2c1bd2b1e4c5f8a6b7d9e0f1a2b3c4d5e6f7a8".to_string(),
                subject: "Fix typo in README".to_string(),
                status: Status::New,
                owner: OTHER_ACCOUNT_ID,
                revision: "674ac754f91e64a0efb8087e59a176484bd534d1".to_string(),
                files: BTreeMap::from([("README".to_string(), (1, 1))]),
                messages: Vec::new(),
                votes: BTreeMap::from([("Code-Review".to_string(), BTreeMap::new())]),
                comments: BTreeMap::new(),
            },
            Change {
                number: ABANDONED_CHANGE,
                project: "tools".to_string(),
                branch: "stable-1.0".to_string(),
                change_id: "I5e3b0b8a4f7c6d2e1f0a9b8c7d6e5f4a3b2c1d0e".to_string(),
                subject: "Old work".to_string(),
                status: Status::Abandoned,
                owner: SELF_ACCOUNT_ID,
                revision: "0f1e2d3c4b5a69788796a5b4c3d2e1f00f1e2d3c".to_string(),
                files: BTreeMap::new(),
                messages: Vec::new(),
                votes: BTreeMap::new(),
                comments: BTreeMap::new(),
            },
        ];

        Self {
            accounts,
            projects,
            changes,
            starred: HashSet::new(),
            reviewed: HashSet::new(),
        }
    }

    fn account(&self, id: &str) -> Option<&Account> {
        if id == "self" {
            return self.accounts.iter().find(|a| a.id == SELF_ACCOUNT_ID);
        }
        self.accounts.iter().find(|a| {
            id == a.id.to_string() || id == a.username || id == a.email
        })
    }

    fn account_json(&self, id: u64) -> Value {
        self.accounts
            .iter()
            .find(|a| a.id == id)
            .map(Account::to_json)
            .unwrap_or_else(|| json!({ "_account_id": id }))
    }

    fn change_index(&self, id: &str) -> Option<usize> {
        self.changes.iter().position(|c| c.matches_id(id))
    }

    fn change_json(&self, change: &Change, options: &ChangeOptions) -> Value {
        let mut out = json!({
            "id": change.triplet(),
            "project": change.project,
            "branch": change.branch,
            "change_id": change.change_id,
            "subject": change.subject,
            "status": change.status.as_str(),
            "created": "2013-02-01 09:59:32.126000000",
            "updated": TIMESTAMP,
            "mergeable": change.status == Status::New,
            "insertions": change.files.values().map(|f| f.0).sum::<u64>(),
            "deletions": change.files.values().map(|f| f.1).sum::<u64>(),
            "_number": change.number,
            "owner": self.account_json(change.owner),
        });
        if self.starred.contains(&(SELF_ACCOUNT_ID, change.number)) {
            out["starred"] = json!(true);
        }
        if options.labels || options.detailed_labels {
            out["labels"] = self.labels_json(change, options.detailed_labels);
        }
        if options.messages {
            out["messages"] = change
                .messages
                .iter()
                .map(|m| {
                    json!({
                        "id": m.id,
                        "author": self.account_json(m.author),
                        "date": TIMESTAMP,
                        "message": m.message,
                        "_revision_number": m.revision_number,
                    })
                })
                .collect();
        }
        if options.current_revision {
            out["current_revision"] = json!(change.revision);
            out["revisions"] = json!({
                change.revision.clone(): {
                    "_number": 1,
                    "ref": format!("refs/changes/{:02}/{}/1", change.number % 100, change.number),
                    "fetch": {
                        "http": {
                            "url": format!("http://localhost/{}", change.project),
                            "ref": format!("refs/changes/{:02}/{}/1", change.number % 100, change.number),
                        }
                    }
                }
            });
        }
        out
    }

    fn labels_json(&self, change: &Change, detailed: bool) -> Value {
        let mut labels = serde_json::Map::new();
        for (label, votes) in &change.votes {
            let mut info = serde_json::Map::new();
            for (&account, &vote) in votes {
                let key = match vote {
                    2 => "approved",
                    1 => "recommended",
                    -1 => "disliked",
                    -2 => "rejected",
                    _ => continue,
                };
                info.insert(key.to_string(), self.account_json(account));
            }
            if let Some(max) = votes.values().max_by_key(|v| v.abs()) {
                info.insert("value".to_string(), json!(max));
            }
            if detailed {
                let all: Vec<Value> = votes
                    .iter()
                    .map(|(&account, &vote)| {
                        let mut approval = self.account_json(account);
                        approval["value"] = json!(vote);
                        approval["date"] = json!(TIMESTAMP);
                        approval
                    })
                    .collect();
                info.insert("all".to_string(), Value::Array(all));
            }
            labels.insert(label.clone(), Value::Object(info));
        }
        Value::Object(labels)
    }
}

#[derive(Debug, Default)]
struct ChangeOptions {
    labels: bool,
    detailed_labels: bool,
    messages: bool,
    current_revision: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<RwLock<Db>>,
    pub mode: ServerMode,
}

pub fn app() -> Router {
    app_with(ServerMode::Current)
}

pub fn app_with(mode: ServerMode) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Db::seeded())),
        mode,
    };
    let api = Router::new()
        .route("/accounts/{id}", get(get_account))
        .route("/accounts/{id}/starred.changes", get(list_starred))
        .route(
            "/accounts/{id}/starred.changes/{change}",
            put(star_change).delete(unstar_change),
        )
        .route("/changes/", get(list_changes))
        .route("/changes/{id}/abandon", post(abandon_change))
        .route("/changes/{id}/restore", post(restore_change))
        .route("/changes/{id}/revisions/{rev}/review", post(post_review))
        .route("/changes/{id}/revisions/{rev}/submit", post(submit_revision))
        .route("/changes/{id}/revisions/{rev}/comments/", get(list_comments))
        .route("/changes/{id}/revisions/{rev}/files/", get(list_files))
        .route(
            "/changes/{id}/revisions/{rev}/files/{path}/reviewed",
            put(mark_reviewed).delete(unmark_reviewed),
        )
        .route("/projects/", get(list_projects))
        .route("/tools/hooks/commit-msg", get(commit_msg_hook));
    // Authenticated clients use the same endpoints under `/a`.
    Router::new()
        .nest("/a", api.clone())
        .merge(api)
        .with_state(state)
}

/// Serve the fake Gerrit in `mode` on `listener` until the task is dropped.
pub async fn run(listener: TcpListener, mode: ServerMode) -> Result<(), std::io::Error> {
    info!(addr = ?listener.local_addr().ok(), ?mode, "mock gerrit listening");
    axum::serve(listener, app_with(mode)).await
}

/// Install a `tracing` subscriber honouring `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

fn gerrit_json(status: StatusCode, value: Value) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json; charset=UTF-8")],
        format!("{XSSI_PREFIX}{value}"),
    )
        .into_response()
}

fn gerrit_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=UTF-8")],
        message.into(),
    )
        .into_response()
}

fn not_found(what: &str) -> Response {
    gerrit_error(StatusCode::NOT_FOUND, format!("Not found: {what}"))
}

// --- accounts ---

async fn get_account(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let db = state.db.read().await;
    match db.account(&id) {
        Some(account) => gerrit_json(StatusCode::OK, account.to_json()),
        None => not_found(&id),
    }
}

async fn list_starred(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let db = state.db.read().await;
    let Some(account) = db.account(&id) else {
        return not_found(&id);
    };
    let options = ChangeOptions::default();
    let starred: Vec<Value> = db
        .changes
        .iter()
        .filter(|c| db.starred.contains(&(account.id, c.number)))
        .map(|c| db.change_json(c, &options))
        .collect();
    gerrit_json(StatusCode::OK, Value::Array(starred))
}

async fn star_change(
    State(state): State<AppState>,
    Path((id, change)): Path<(String, String)>,
) -> Response {
    set_star(state, id, change, true).await
}

async fn unstar_change(
    State(state): State<AppState>,
    Path((id, change)): Path<(String, String)>,
) -> Response {
    set_star(state, id, change, false).await
}

async fn set_star(state: AppState, id: String, change: String, starred: bool) -> Response {
    let mut db = state.db.write().await;
    let Some(account) = db.account(&id).map(|a| a.id) else {
        return not_found(&id);
    };
    let Some(idx) = db.change_index(&change) else {
        return not_found(&change);
    };
    let number = db.changes[idx].number;
    if starred {
        db.starred.insert((account, number));
    } else {
        db.starred.remove(&(account, number));
    }
    StatusCode::NO_CONTENT.into_response()
}

// --- changes ---

async fn list_changes(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let mut query = None;
    let mut limit = None;
    let mut start = 0usize;
    let mut options = ChangeOptions::default();

    for (key, value) in &params {
        match key.as_str() {
            "q" => query = Some(value.clone()),
            "n" => limit = value.parse::<usize>().ok(),
            "S" => start = value.parse().unwrap_or(0),
            "o" => match value.as_str() {
                "LABELS" => options.labels = true,
                "DETAILED_LABELS" => options.detailed_labels = true,
                "CURRENT_REVISION" => options.current_revision = true,
                "MESSAGES" if state.mode == ServerMode::Legacy => {
                    debug!("legacy mode rejecting MESSAGES option");
                    return gerrit_error(
                        StatusCode::BAD_REQUEST,
                        "\"MESSAGES\" is not a valid value for \"-o\"",
                    );
                }
                "MESSAGES" => options.messages = true,
                _ => {}
            },
            _ => {}
        }
    }

    let db = state.db.read().await;
    let matched: Vec<Value> = db
        .changes
        .iter()
        .filter(|c| query.as_deref().map_or(true, |q| matches_query(&db, c, q)))
        .skip(start)
        .take(limit.unwrap_or(usize::MAX))
        .map(|c| db.change_json(c, &options))
        .collect();
    gerrit_json(StatusCode::OK, Value::Array(matched))
}

/// Every whitespace-separated term must match.
fn matches_query(db: &Db, change: &Change, query: &str) -> bool {
    query.split_whitespace().all(|term| match term {
        "is:open" | "status:open" => change.status == Status::New,
        "status:merged" | "is:merged" => change.status == Status::Merged,
        "status:abandoned" | "is:abandoned" => change.status == Status::Abandoned,
        "is:starred" => db.starred.contains(&(SELF_ACCOUNT_ID, change.number)),
        "owner:self" => change.owner == SELF_ACCOUNT_ID,
        other => {
            if let Some(project) = other.strip_prefix("project:") {
                change.project == project
            } else if let Some(branch) = other.strip_prefix("branch:") {
                change.branch == branch
            } else {
                change.matches_id(other)
            }
        }
    })
}

#[derive(Debug, Default, Deserialize)]
struct MessageInput {
    message: Option<String>,
}

async fn abandon_change(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MessageInput>,
) -> Response {
    transition(state, id, Status::New, Status::Abandoned, "Abandoned", input.message).await
}

async fn restore_change(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MessageInput>,
) -> Response {
    transition(state, id, Status::Abandoned, Status::New, "Restored", input.message).await
}

async fn transition(
    state: AppState,
    id: String,
    from: Status,
    to: Status,
    verb: &str,
    message: Option<String>,
) -> Response {
    let mut db = state.db.write().await;
    let Some(idx) = db.change_index(&id) else {
        return not_found(&id);
    };
    if db.changes[idx].status != from {
        return gerrit_error(
            StatusCode::CONFLICT,
            format!("change is {}", db.changes[idx].status.as_str().to_lowercase()),
        );
    }
    let change = &mut db.changes[idx];
    change.status = to;
    let text = match message {
        Some(m) => format!("{verb}\n\n{m}"),
        None => verb.to_string(),
    };
    change.messages.push(Message {
        id: short_id(),
        author: SELF_ACCOUNT_ID,
        message: text,
        revision_number: 1,
    });
    let change = db.changes[idx].clone();
    gerrit_json(StatusCode::OK, db.change_json(&change, &ChangeOptions::default()))
}

#[derive(Debug, Deserialize)]
struct CommentInput {
    line: Option<u32>,
    side: Option<String>,
    in_reply_to: Option<String>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ReviewInput {
    message: Option<String>,
    #[serde(default)]
    labels: BTreeMap<String, i32>,
    #[serde(default)]
    comments: BTreeMap<String, Vec<CommentInput>>,
}

async fn post_review(
    State(state): State<AppState>,
    Path((id, rev)): Path<(String, String)>,
    Json(input): Json<ReviewInput>,
) -> Response {
    let mut db = state.db.write().await;
    let Some(idx) = db.change_index(&id) else {
        return not_found(&id);
    };
    let change = &mut db.changes[idx];
    if !change.matches_revision(&rev) {
        return not_found(&rev);
    }
    if change.status != Status::New {
        return gerrit_error(StatusCode::CONFLICT, "change is closed");
    }

    for (label, vote) in &input.labels {
        let Some(votes) = change.votes.get_mut(label) else {
            return gerrit_error(
                StatusCode::BAD_REQUEST,
                format!("label \"{label}\" is not a configured label"),
            );
        };
        votes.insert(SELF_ACCOUNT_ID, *vote);
    }
    for (path, comments) in input.comments {
        let stored = change.comments.entry(path).or_default();
        for c in comments {
            stored.push(Comment {
                id: short_id(),
                author: SELF_ACCOUNT_ID,
                line: c.line,
                side: c.side,
                in_reply_to: c.in_reply_to,
                message: c.message,
            });
        }
    }
    if let Some(message) = input.message {
        change.messages.push(Message {
            id: short_id(),
            author: SELF_ACCOUNT_ID,
            message: format!("Patch Set 1:\n\n{message}"),
            revision_number: 1,
        });
    }
    gerrit_json(StatusCode::OK, json!({ "labels": input.labels }))
}

#[derive(Debug, Default, Deserialize)]
struct SubmitInput {
    #[serde(default)]
    wait_for_merge: bool,
}

async fn submit_revision(
    State(state): State<AppState>,
    Path((id, rev)): Path<(String, String)>,
    Json(input): Json<SubmitInput>,
) -> Response {
    let mut db = state.db.write().await;
    let Some(idx) = db.change_index(&id) else {
        return not_found(&id);
    };
    let change = &mut db.changes[idx];
    if !change.matches_revision(&rev) {
        return not_found(&rev);
    }
    if change.status != Status::New {
        return gerrit_error(StatusCode::CONFLICT, "change is closed");
    }
    let approved = change
        .votes
        .get("Code-Review")
        .is_some_and(|votes| votes.values().any(|v| *v == 2));
    if !approved {
        return gerrit_error(StatusCode::CONFLICT, "needs Code-Review");
    }
    change.status = Status::Merged;
    debug!(change = change.number, wait = input.wait_for_merge, "submitted");
    gerrit_json(StatusCode::OK, json!({ "status": "MERGED" }))
}

async fn list_comments(
    State(state): State<AppState>,
    Path((id, rev)): Path<(String, String)>,
) -> Response {
    let db = state.db.read().await;
    let Some(idx) = db.change_index(&id) else {
        return not_found(&id);
    };
    let change = &db.changes[idx];
    if !change.matches_revision(&rev) {
        return not_found(&rev);
    }
    let mut out = serde_json::Map::new();
    for (path, comments) in &change.comments {
        let list: Vec<Value> = comments
            .iter()
            .map(|c| {
                let mut v = json!({
                    "id": c.id,
                    "message": c.message,
                    "updated": TIMESTAMP,
                    "author": db.account_json(c.author),
                });
                if let Some(line) = c.line {
                    v["line"] = json!(line);
                }
                if let Some(side) = &c.side {
                    v["side"] = json!(side);
                }
                if let Some(parent) = &c.in_reply_to {
                    v["in_reply_to"] = json!(parent);
                }
                v
            })
            .collect();
        out.insert(path.clone(), Value::Array(list));
    }
    gerrit_json(StatusCode::OK, Value::Object(out))
}

async fn list_files(
    State(state): State<AppState>,
    Path((id, rev)): Path<(String, String)>,
) -> Response {
    let db = state.db.read().await;
    let Some(idx) = db.change_index(&id) else {
        return not_found(&id);
    };
    let change = &db.changes[idx];
    if !change.matches_revision(&rev) {
        return not_found(&rev);
    }
    let files: serde_json::Map<String, Value> = change
        .files
        .iter()
        .map(|(path, (inserted, deleted))| {
            let mut info = json!({ "lines_inserted": inserted });
            if *deleted > 0 {
                info["lines_deleted"] = json!(deleted);
            }
            if db.reviewed.contains(&(SELF_ACCOUNT_ID, change.number, path.clone())) {
                info["reviewed"] = json!(true);
            }
            (path.clone(), info)
        })
        .collect();
    gerrit_json(StatusCode::OK, Value::Object(files))
}

async fn mark_reviewed(
    State(state): State<AppState>,
    Path((id, rev, path)): Path<(String, String, String)>,
) -> Response {
    set_reviewed(state, id, rev, path, true).await
}

async fn unmark_reviewed(
    State(state): State<AppState>,
    Path((id, rev, path)): Path<(String, String, String)>,
) -> Response {
    set_reviewed(state, id, rev, path, false).await
}

async fn set_reviewed(
    state: AppState,
    id: String,
    rev: String,
    path: String,
    reviewed: bool,
) -> Response {
    let mut db = state.db.write().await;
    let Some(idx) = db.change_index(&id) else {
        return not_found(&id);
    };
    let change = &db.changes[idx];
    if !change.matches_revision(&rev) {
        return not_found(&rev);
    }
    if !change.files.contains_key(&path) {
        return not_found(&path);
    }
    let key = (SELF_ACCOUNT_ID, change.number, path);
    if reviewed {
        if db.reviewed.insert(key) {
            StatusCode::CREATED.into_response()
        } else {
            StatusCode::OK.into_response()
        }
    } else {
        db.reviewed.remove(&key);
        StatusCode::NO_CONTENT.into_response()
    }
}

// --- projects ---

async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let mut description = false;
    let mut prefix = None;
    let mut limit = None;
    let mut start = 0usize;
    for (key, value) in &params {
        match key.as_str() {
            "d" => description = true,
            "p" => prefix = Some(value.clone()),
            "n" => limit = value.parse::<usize>().ok(),
            "S" => start = value.parse().unwrap_or(0),
            _ => {}
        }
    }

    let db = state.db.read().await;
    let mut projects: Vec<&Project> = db
        .projects
        .iter()
        .filter(|p| prefix.as_deref().map_or(true, |pre| p.name.starts_with(pre)))
        .collect();
    projects.sort_by(|a, b| a.name.cmp(&b.name));

    let out: serde_json::Map<String, Value> = projects
        .into_iter()
        .skip(start)
        .take(limit.unwrap_or(usize::MAX))
        .map(|p| {
            let mut info = json!({ "id": p.name.replace('/', "%2F") });
            if description {
                info["description"] = json!(p.description);
            }
            (p.name.clone(), info)
        })
        .collect();
    gerrit_json(StatusCode::OK, Value::Object(out))
}

// --- tools ---

async fn commit_msg_hook() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        COMMIT_MSG_HOOK,
    )
        .into_response()
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
