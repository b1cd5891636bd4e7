//! Synchronous typed client for the Gerrit Code Review REST API.
//!
//! # Overview
//! Structured calls (query changes, post a review, star a change, list
//! projects, fetch the commit-msg hook) become HTTP requests against
//! server-relative paths; JSON responses come back as typed records. The
//! network exchange itself is performed by a host-supplied `HttpExecutor`,
//! with a blocking `ureq` executor bundled behind the `ureq-client` feature.
//!
//! # Design
//! - `GerritClient` holds only its `Transport` and `Capabilities`; handles
//!   (`ChangeApi`, `RevisionApi`, `AccountApi`) borrow it and carry an identity.
//! - Parsers accept either an array or a single object and report shape
//!   mismatches as `GerritError::Format` with the offending payload.
//! - The change-detail call is retried once without `o=MESSAGES` when an
//!   older server rejects it with 400; nothing else is retried.
//!
//! ```no_run
//! use gerrit_core::{ChangeQuery, Gerrit, GerritConfig, ReviewInput};
//!
//! # fn main() -> gerrit_core::Result<()> {
//! let gerrit = Gerrit::connect(GerritConfig::from_env()?);
//! for change in gerrit.changes().list(&ChangeQuery::new().query("is:open").limit(10))? {
//!     println!("{} {}", change.number, change.subject);
//! }
//! gerrit
//!     .changes()
//!     .id(4247u64)
//!     .current()
//!     .review(&ReviewInput::message("Looks good").label("Code-Review", 1))?;
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod capabilities;
pub mod client;
pub mod codec;
pub mod compat;
pub mod config;
pub mod error;
pub mod http;
pub mod parse;
pub mod query;
pub mod resources;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

#[cfg(feature = "ureq-client")]
pub use backends::UreqExecutor;
#[cfg(feature = "ureq-client")]
pub use client::Gerrit;
pub use capabilities::{Capabilities, Operation};
pub use client::GerritClient;
pub use codec::decode_project_id;
pub use config::{Credentials, GerritConfig};
pub use error::{GerritError, Result};
pub use http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse};
pub use query::{ChangeOption, ChangeQuery, ProjectQuery};
pub use resources::{AccountApi, Accounts, ChangeApi, ChangeId, Changes, Projects, RevisionApi, Tools};
pub use transport::Transport;
pub use types::{
    AbandonInput, AccountInfo, ApprovalInfo, ChangeInfo, ChangeMessageInfo, ChangeStatus,
    CommentInfo, CommitInfo, FetchInfo, FileInfo, LabelInfo, ProjectInfo, RestoreInput,
    ReviewInput, RevisionInfo, Side, SubmitInput,
};
