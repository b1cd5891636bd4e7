//! Project listing.

use crate::capabilities::Operation;
use crate::client::GerritClient;
use crate::error::Result;
use crate::http::{HttpExecutor, HttpMethod};
use crate::parse::parse_projects;
use crate::query::ProjectQuery;
use crate::types::ProjectInfo;

/// The `/projects/` collection.
pub struct Projects<'c, E> {
    client: &'c GerritClient<E>,
}

impl<'c, E: HttpExecutor> Projects<'c, E> {
    pub(crate) fn new(client: &'c GerritClient<E>) -> Self {
        Self { client }
    }

    /// List projects ordered by name.
    pub fn list(&self, query: &ProjectQuery) -> Result<Vec<ProjectInfo>> {
        self.client.require(Operation::ListProjects)?;
        let path = query.to_path("/projects/");
        let value = self
            .client
            .transport()
            .execute_expecting(HttpMethod::Get, &path, None)?;
        Ok(parse_projects(value)?.into_values().collect())
    }
}
