//! Resource namespaces for the Gerrit REST API.

mod accounts;
mod changes;
mod projects;
mod tools;

pub use accounts::{AccountApi, Accounts};
pub use changes::{ChangeApi, ChangeId, Changes, RevisionApi};
pub use projects::Projects;
pub use tools::Tools;
