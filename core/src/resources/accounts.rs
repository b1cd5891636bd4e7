//! Account resources.

use crate::capabilities::Operation;
use crate::client::GerritClient;
use crate::codec::encode_path_segment;
use crate::error::Result;
use crate::http::{HttpExecutor, HttpMethod};
use crate::parse::{parse_account, parse_changes};
use crate::resources::ChangeId;
use crate::types::{AccountInfo, ChangeInfo};

/// Account id the server resolves to the authenticated caller.
const SELF_ACCOUNT: &str = "self";

/// The `/accounts/` collection.
pub struct Accounts<'c, E> {
    client: &'c GerritClient<E>,
}

impl<'c, E: HttpExecutor> Accounts<'c, E> {
    pub(crate) fn new(client: &'c GerritClient<E>) -> Self {
        Self { client }
    }

    /// A handle on an account by numeric id, username, email or `self`.
    pub fn id(&self, id: &str) -> AccountApi<'c, E> {
        AccountApi {
            client: self.client,
            id: encode_path_segment(id),
        }
    }

    /// The account of the authenticated caller.
    pub fn self_account(&self) -> AccountApi<'c, E> {
        self.id(SELF_ACCOUNT)
    }
}

/// Operations on a single account.
pub struct AccountApi<'c, E> {
    client: &'c GerritClient<E>,
    id: String,
}

impl<'c, E: HttpExecutor> AccountApi<'c, E> {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// `None` when the server answers with an empty body.
    pub fn get(&self) -> Result<Option<AccountInfo>> {
        self.client.require(Operation::GetAccount)?;
        let value = self.client.transport().execute(
            HttpMethod::Get,
            &format!("/accounts/{}", self.id),
            None,
            &[],
        )?;
        parse_account(value)
    }

    pub fn star(&self, change: impl Into<ChangeId>) -> Result<()> {
        self.client.require(Operation::StarChange)?;
        self.set_star(HttpMethod::Put, change.into())
    }

    pub fn unstar(&self, change: impl Into<ChangeId>) -> Result<()> {
        self.client.require(Operation::UnstarChange)?;
        self.set_star(HttpMethod::Delete, change.into())
    }

    pub fn starred_changes(&self) -> Result<Vec<ChangeInfo>> {
        self.client.require(Operation::ListStarredChanges)?;
        let value = self.client.transport().execute_expecting(
            HttpMethod::Get,
            &format!("/accounts/{}/starred.changes", self.id),
            None,
        )?;
        parse_changes(value)
    }

    fn set_star(&self, method: HttpMethod, change: ChangeId) -> Result<()> {
        let path = format!("/accounts/{}/starred.changes/{change}", self.id);
        self.client
            .transport()
            .execute(method, &path, None, &[])
            .map(|_| ())
    }
}
