//! Server-provided tooling.

use crate::capabilities::Operation;
use crate::client::GerritClient;
use crate::error::Result;
use crate::http::{HttpExecutor, HttpMethod};

const COMMIT_MSG_HOOK_PATH: &str = "/tools/hooks/commit-msg";

pub struct Tools<'c, E> {
    client: &'c GerritClient<E>,
}

impl<'c, E: HttpExecutor> Tools<'c, E> {
    pub(crate) fn new(client: &'c GerritClient<E>) -> Self {
        Self { client }
    }

    /// The `commit-msg` hook script as raw bytes.
    ///
    /// Writing it to `.git/hooks/commit-msg` and making it executable is left
    /// to the caller.
    pub fn commit_message_hook(&self) -> Result<Vec<u8>> {
        self.client.require(Operation::GetCommitMessageHook)?;
        self.client
            .transport()
            .execute_raw(HttpMethod::Get, COMMIT_MSG_HOOK_PATH)
    }
}
