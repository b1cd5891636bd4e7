//! Explicit description of the operations a client is allowed to perform.
//!
//! # Design
//! Instead of exposing methods that fail at runtime because "nothing
//! implements them", a `GerritClient` carries a `Capabilities` set. Every
//! operation checks the set before building a request and returns
//! `GerritError::Unsupported` when it is missing, so no network call is made.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{GerritError, Result};

/// Every operation exposed by the resource handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    GetAccount,
    StarChange,
    UnstarChange,
    ListStarredChanges,
    ListChanges,
    GetChangeDetail,
    Abandon,
    Restore,
    Review,
    Submit,
    SetReviewed,
    ListComments,
    ListFiles,
    ListProjects,
    GetCommitMessageHook,
}

impl Operation {
    pub const ALL: [Operation; 15] = [
        Operation::GetAccount,
        Operation::StarChange,
        Operation::UnstarChange,
        Operation::ListStarredChanges,
        Operation::ListChanges,
        Operation::GetChangeDetail,
        Operation::Abandon,
        Operation::Restore,
        Operation::Review,
        Operation::Submit,
        Operation::SetReviewed,
        Operation::ListComments,
        Operation::ListFiles,
        Operation::ListProjects,
        Operation::GetCommitMessageHook,
    ];

    /// Whether the operation changes server-side state.
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Operation::StarChange
                | Operation::UnstarChange
                | Operation::Abandon
                | Operation::Restore
                | Operation::Review
                | Operation::Submit
                | Operation::SetReviewed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::GetAccount => "get_account",
            Operation::StarChange => "star_change",
            Operation::UnstarChange => "unstar_change",
            Operation::ListStarredChanges => "list_starred_changes",
            Operation::ListChanges => "list_changes",
            Operation::GetChangeDetail => "get_change_detail",
            Operation::Abandon => "abandon",
            Operation::Restore => "restore",
            Operation::Review => "review",
            Operation::Submit => "submit",
            Operation::SetReviewed => "set_reviewed",
            Operation::ListComments => "list_comments",
            Operation::ListFiles => "list_files",
            Operation::ListProjects => "list_projects",
            Operation::GetCommitMessageHook => "get_commit_message_hook",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of operations a client supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    supported: BTreeSet<Operation>,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            supported: Operation::ALL.into_iter().collect(),
        }
    }

    /// Everything except operations that change server-side state.
    pub fn read_only() -> Self {
        Self {
            supported: Operation::ALL
                .into_iter()
                .filter(|op| !op.is_mutating())
                .collect(),
        }
    }

    pub fn without(mut self, op: Operation) -> Self {
        self.supported.remove(&op);
        self
    }

    pub fn with(mut self, op: Operation) -> Self {
        self.supported.insert(op);
        self
    }

    pub fn supports(&self, op: Operation) -> bool {
        self.supported.contains(&op)
    }

    pub(crate) fn require(&self, op: Operation) -> Result<()> {
        if self.supports(op) {
            Ok(())
        } else {
            Err(GerritError::Unsupported(op))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        self.supported.iter().copied()
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::all()
    }
}
