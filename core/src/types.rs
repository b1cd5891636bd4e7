//! Records exchanged with the Gerrit REST API.
//!
//! # Design
//! Field names follow Gerrit's lower-case-with-underscores convention so most
//! fields need no attribute; the underscore-prefixed ones are renamed
//! explicitly. Servers return different field subsets depending on the
//! requested options, so everything beyond a record's identity is optional
//! or defaulted. Maps that end up serialized use `BTreeMap` to keep key order
//! stable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::{decode_project_id, gerrit_timestamp};

/// Lifecycle state of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeStatus {
    New,
    Merged,
    Abandoned,
    Draft,
    /// Any status this client does not know about yet.
    #[serde(other)]
    Unknown,
}

/// A change as returned by `/changes/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeInfo {
    /// `project~branch~Change-Id`, assigned by the server.
    pub id: String,
    pub project: String,
    pub branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub change_id: String,
    pub subject: String,
    pub status: ChangeStatus,
    #[serde(with = "gerrit_timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "gerrit_timestamp")]
    pub updated: DateTime<Utc>,
    /// `None` until the server has computed mergeability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mergeable: Option<bool>,
    #[serde(default)]
    pub starred: bool,
    #[serde(default)]
    pub reviewed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insertions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletions: Option<u64>,
    #[serde(rename = "_sortkey", default, skip_serializing_if = "Option::is_none")]
    pub sortkey: Option<String>,
    #[serde(rename = "_number")]
    pub number: u64,
    #[serde(default)]
    pub owner: AccountInfo,
    #[serde(default)]
    pub labels: BTreeMap<String, LabelInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ChangeMessageInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_revision: Option<String>,
    /// Keyed by commit SHA.
    #[serde(default)]
    pub revisions: BTreeMap<String, RevisionInfo>,
}

impl ChangeInfo {
    /// The project name as a human would write it.
    pub fn project_name(&self) -> String {
        decode_project_id(&self.project)
    }

    pub fn current_revision_info(&self) -> Option<&RevisionInfo> {
        self.current_revision
            .as_ref()
            .and_then(|sha| self.revisions.get(sha))
    }
}

/// An account reference.
///
/// Equality is partial: two records are equal when every field present on
/// both sides matches. Servers return different subsets of these fields
/// depending on query detail, so a missing field never makes two accounts
/// differ. The relation is not transitive, hence no `Eq` or `Hash`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(rename = "_account_id", default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

fn agree<T: PartialEq>(a: &Option<T>, b: &Option<T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

impl PartialEq for AccountInfo {
    fn eq(&self, other: &Self) -> bool {
        agree(&self.account_id, &other.account_id)
            && agree(&self.name, &other.name)
            && agree(&self.email, &other.email)
            && agree(&self.username, &other.username)
    }
}

/// One patch set of a change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionInfo {
    #[serde(default)]
    pub draft: bool,
    #[serde(rename = "_number")]
    pub number: u32,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    /// Keyed by protocol scheme (`http`, `ssh`, ...).
    #[serde(default)]
    pub fetch: BTreeMap<String, FetchInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitInfo>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub files: BTreeMap<String, FileInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchInfo {
    pub url: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(default)]
    pub parents: Vec<CommitParent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<GitPersonInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committer: Option<GitPersonInfo>,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitParent {
    pub commit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitPersonInfo {
    pub name: String,
    pub email: String,
    #[serde(with = "gerrit_timestamp")]
    pub date: DateTime<Utc>,
    /// Offset from UTC in minutes.
    #[serde(default)]
    pub tz: i32,
}

/// Per-file entry of a revision's file list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// `A`, `D`, `R`, `C` or `W`; absent means modified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub binary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_inserted: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_deleted: Option<u64>,
}

/// Votes on one label. The four summary accounts may overlap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<AccountInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected: Option<AccountInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended: Option<AccountInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disliked: Option<AccountInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    #[serde(default)]
    pub optional: bool,
    /// Only present with `DETAILED_LABELS`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all: Vec<ApprovalInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalInfo {
    #[serde(flatten)]
    pub account: AccountInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "gerrit_timestamp::option")]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeMessageInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AccountInfo>,
    #[serde(with = "gerrit_timestamp")]
    pub date: DateTime<Utc>,
    pub message: String,
    #[serde(rename = "_revision_number", default, skip_serializing_if = "Option::is_none")]
    pub revision_number: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// URL-encoded project path.
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl ProjectInfo {
    pub fn decoded_id(&self) -> String {
        decode_project_id(&self.id)
    }
}

/// Which side of a diff a comment is attached to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Parent,
    #[default]
    Revision,
}

/// An inline comment, both as posted in a review and as stored by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Omitted when the comment is keyed by path in a map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub side: Side,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "gerrit_timestamp::option")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AccountInfo>,
}

impl CommentInfo {
    pub fn on_line(line: u32, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn reply_to(mut self, id: impl Into<String>) -> Self {
        self.in_reply_to = Some(id.into());
        self
    }

    pub fn on_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }
}

/// Body of `POST .../review`.
///
/// Labels and comments are sorted by key so the same review always
/// serializes to the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, i32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub comments: BTreeMap<String, Vec<CommentInfo>>,
}

impl ReviewInput {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn label(mut self, name: impl Into<String>, vote: i32) -> Self {
        self.labels.insert(name.into(), vote);
        self
    }

    /// Append a comment to `path`, keeping earlier comments on that file in order.
    pub fn comment(mut self, path: impl Into<String>, comment: CommentInfo) -> Self {
        self.comments.entry(path.into()).or_default().push(comment);
        self
    }
}

/// Body of `POST .../submit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitInput {
    pub wait_for_merge: bool,
}

/// Body of `POST /changes/{id}/abandon`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbandonInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `POST /changes/{id}/restore`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
