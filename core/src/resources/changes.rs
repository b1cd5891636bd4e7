//! Change and revision resources.

use std::collections::BTreeMap;
use std::fmt;

use crate::capabilities::Operation;
use crate::client::GerritClient;
use crate::codec::{encode, encode_path_segment};
use crate::compat::{detail_query, with_degraded_retry};
use crate::error::Result;
use crate::http::{HttpExecutor, HttpMethod};
use crate::parse::{parse_changes, parse_comments, parse_files};
use crate::query::ChangeQuery;
use crate::types::{
    AbandonInput, ChangeInfo, CommentInfo, FileInfo, RestoreInput, ReviewInput, SubmitInput,
};

/// Revision token the server resolves to the change's current patch set.
const CURRENT_REVISION: &str = "current";

/// The ways a change can be addressed in a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeId {
    /// Legacy numeric id (`_number`).
    Number(u64),
    /// Any identifier the server accepts, used verbatim (e.g. `ChangeInfo::id`).
    Id(String),
    /// `project~branch~Change-Id`, each part encoded on its own.
    Triplet {
        project: String,
        branch: String,
        change_id: String,
    },
}

impl ChangeId {
    pub fn triplet(
        project: impl Into<String>,
        branch: impl Into<String>,
        change_id: impl Into<String>,
    ) -> Self {
        ChangeId::Triplet {
            project: project.into(),
            branch: branch.into(),
            change_id: change_id.into(),
        }
    }

    /// The identity as it appears in a URL path segment.
    pub fn as_path_segment(&self) -> String {
        match self {
            ChangeId::Number(n) => n.to_string(),
            ChangeId::Id(id) => id.clone(),
            ChangeId::Triplet {
                project,
                branch,
                change_id,
            } => format!(
                "{}~{}~{}",
                encode_path_segment(project),
                encode_path_segment(branch),
                encode_path_segment(change_id)
            ),
        }
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_path_segment())
    }
}

impl From<u64> for ChangeId {
    fn from(n: u64) -> Self {
        ChangeId::Number(n)
    }
}

impl From<&str> for ChangeId {
    fn from(id: &str) -> Self {
        ChangeId::Id(id.to_string())
    }
}

impl From<String> for ChangeId {
    fn from(id: String) -> Self {
        ChangeId::Id(id)
    }
}

impl From<&ChangeInfo> for ChangeId {
    fn from(change: &ChangeInfo) -> Self {
        ChangeId::Id(change.id.clone())
    }
}

impl<P, B, C> From<(P, B, C)> for ChangeId
where
    P: Into<String>,
    B: Into<String>,
    C: Into<String>,
{
    fn from((project, branch, change_id): (P, B, C)) -> Self {
        ChangeId::triplet(project, branch, change_id)
    }
}

/// The `/changes/` collection.
pub struct Changes<'c, E> {
    client: &'c GerritClient<E>,
}

impl<'c, E: HttpExecutor> Changes<'c, E> {
    pub(crate) fn new(client: &'c GerritClient<E>) -> Self {
        Self { client }
    }

    /// Query changes. An empty query lists what the server returns by default.
    pub fn list(&self, query: &ChangeQuery) -> Result<Vec<ChangeInfo>> {
        self.client.require(Operation::ListChanges)?;
        let path = query.to_path("/changes/");
        let value = self
            .client
            .transport()
            .execute_expecting(HttpMethod::Get, &path, None)?;
        parse_changes(value)
    }

    /// A handle on one change. No request is made.
    pub fn id(&self, id: impl Into<ChangeId>) -> ChangeApi<'c, E> {
        ChangeApi {
            client: self.client,
            id: id.into().as_path_segment(),
        }
    }
}

/// Operations on a single change.
pub struct ChangeApi<'c, E> {
    client: &'c GerritClient<E>,
    id: String,
}

impl<'c, E: HttpExecutor> ChangeApi<'c, E> {
    /// The identity used in request paths.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fetch the change with its current revision, messages and detailed labels.
    ///
    /// Servers that do not know the `MESSAGES` option are retried once
    /// without it. Returns `None` when the query matches nothing.
    pub fn get(&self) -> Result<Option<ChangeInfo>> {
        self.client.require(Operation::GetChangeDetail)?;
        let transport = self.client.transport();
        let changes = with_degraded_retry(|shape| {
            let path = detail_query(&self.id, shape).to_path("/changes/");
            let value = transport.execute_expecting(HttpMethod::Get, &path, None)?;
            parse_changes(value)
        })?;
        Ok(changes.into_iter().next())
    }

    pub fn abandon(&self, input: &AbandonInput) -> Result<()> {
        self.client.require(Operation::Abandon)?;
        self.post(&format!("/changes/{}/abandon", self.id), encode(input)?)
    }

    pub fn restore(&self, input: &RestoreInput) -> Result<()> {
        self.client.require(Operation::Restore)?;
        self.post(&format!("/changes/{}/restore", self.id), encode(input)?)
    }

    /// The current revision, resolved by the server; no request is made.
    pub fn current(&self) -> RevisionApi<'c, E> {
        self.revision(CURRENT_REVISION)
    }

    /// A revision by commit SHA, patch set number, or `current`.
    pub fn revision(&self, revision: &str) -> RevisionApi<'c, E> {
        RevisionApi {
            client: self.client,
            change_id: self.id.clone(),
            revision: revision.to_string(),
        }
    }

    fn post(&self, path: &str, body: String) -> Result<()> {
        self.client
            .transport()
            .execute(HttpMethod::Post, path, Some(body), &[])
            .map(|_| ())
    }
}

/// Operations on one revision of a change.
pub struct RevisionApi<'c, E> {
    client: &'c GerritClient<E>,
    change_id: String,
    revision: String,
}

impl<'c, E: HttpExecutor> RevisionApi<'c, E> {
    pub fn change_id(&self) -> &str {
        &self.change_id
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    fn path(&self, suffix: &str) -> String {
        format!(
            "/changes/{}/revisions/{}/{suffix}",
            self.change_id, self.revision
        )
    }

    /// Post a message, votes and inline comments.
    pub fn review(&self, input: &ReviewInput) -> Result<()> {
        self.client.require(Operation::Review)?;
        self.client
            .transport()
            .execute(HttpMethod::Post, &self.path("review"), Some(encode(input)?), &[])
            .map(|_| ())
    }

    pub fn submit(&self, input: &SubmitInput) -> Result<()> {
        self.client.require(Operation::Submit)?;
        self.client
            .transport()
            .execute(HttpMethod::Post, &self.path("submit"), Some(encode(input)?), &[])
            .map(|_| ())
    }

    /// Mark (`PUT`) or unmark (`DELETE`) `file` as reviewed by the caller.
    pub fn set_reviewed(&self, file: &str, reviewed: bool) -> Result<()> {
        self.client.require(Operation::SetReviewed)?;
        let path = self.path(&format!("files/{}/reviewed", encode_path_segment(file)));
        let method = if reviewed {
            HttpMethod::Put
        } else {
            HttpMethod::Delete
        };
        self.client
            .transport()
            .execute(method, &path, None, &[])
            .map(|_| ())
    }

    /// Published comments keyed by file path.
    pub fn comments(&self) -> Result<BTreeMap<String, Vec<CommentInfo>>> {
        self.client.require(Operation::ListComments)?;
        let value = self
            .client
            .transport()
            .execute_expecting(HttpMethod::Get, &self.path("comments/"), None)?;
        parse_comments(value)
    }

    /// Files touched by the revision keyed by path.
    pub fn files(&self) -> Result<BTreeMap<String, FileInfo>> {
        self.client.require(Operation::ListFiles)?;
        let value = self
            .client
            .transport()
            .execute_expecting(HttpMethod::Get, &self.path("files/"), None)?;
        parse_files(value)
    }
}
