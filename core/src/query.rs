//! Query-string assembly for collection endpoints.
//!
//! `QueryBuilder` renders components in the order they are pushed. The typed
//! parameter sets (`ChangeQuery`, `ProjectQuery`) push their keys in Gerrit's
//! canonical order, so callers cannot produce a differently-ordered URL by
//! setting fields in a different sequence.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered list of query components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    parts: Vec<String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `key=value`; `None` contributes nothing.
    pub fn param(mut self, key: &str, value: Option<impl fmt::Display>) -> Self {
        if let Some(value) = value {
            self.parts.push(format!("{key}={value}"));
        }
        self
    }

    /// Bare `key` when `enabled`.
    pub fn flag(mut self, key: &str, enabled: bool) -> Self {
        if enabled {
            self.parts.push(key.to_string());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Append the query string to `path`. No components means no `?`.
    pub fn build(&self, path: &str) -> String {
        if self.parts.is_empty() {
            return path.to_string();
        }
        format!("{path}?{}", self.parts.join("&"))
    }
}

/// Escape a free-text Gerrit query.
///
/// Whitespace-separated terms are joined with `+`. Each term is
/// percent-encoded except for `:`, which separates operators from their
/// arguments and is kept readable (`status:open`).
pub fn escape_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|term| urlencoding::encode(term).replace("%3A", ":"))
        .collect::<Vec<_>>()
        .join("+")
}

/// Escape an already path-encoded identity for use as a query value.
fn escape_identity(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut rest = id;
    while let Some(c) = rest.chars().next() {
        let bytes = rest.as_bytes();
        let len = if c == '%'
            && bytes.len() >= 3
            && bytes[1].is_ascii_hexdigit()
            && bytes[2].is_ascii_hexdigit()
        {
            out.push_str(&rest[..3]);
            3
        } else {
            let len = c.len_utf8();
            out.push_str(&urlencoding::encode(&rest[..len]));
            len
        };
        rest = &rest[len..];
    }
    out
}

/// Values accepted by the `o=` parameter of `/changes/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeOption {
    Labels,
    DetailedLabels,
    CurrentRevision,
    AllRevisions,
    CurrentCommit,
    AllCommits,
    CurrentFiles,
    AllFiles,
    DetailedAccounts,
    Messages,
    Reviewed,
    DownloadCommands,
}

impl ChangeOption {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeOption::Labels => "LABELS",
            ChangeOption::DetailedLabels => "DETAILED_LABELS",
            ChangeOption::CurrentRevision => "CURRENT_REVISION",
            ChangeOption::AllRevisions => "ALL_REVISIONS",
            ChangeOption::CurrentCommit => "CURRENT_COMMIT",
            ChangeOption::AllCommits => "ALL_COMMITS",
            ChangeOption::CurrentFiles => "CURRENT_FILES",
            ChangeOption::AllFiles => "ALL_FILES",
            ChangeOption::DetailedAccounts => "DETAILED_ACCOUNTS",
            ChangeOption::Messages => "MESSAGES",
            ChangeOption::Reviewed => "REVIEWED",
            ChangeOption::DownloadCommands => "DOWNLOAD_COMMANDS",
        }
    }
}

impl fmt::Display for ChangeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for `GET /changes/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeQuery {
    query: Option<String>,
    limit: Option<u32>,
    start: Option<u32>,
    options: Vec<ChangeOption>,
}

impl ChangeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-text search, e.g. `status:open owner:self`. Blank text is ignored.
    pub fn query(mut self, query: &str) -> Self {
        let escaped = escape_query(query);
        self.query = (!escaped.is_empty()).then_some(escaped);
        self
    }

    /// Query by a change identity (`q=<change id>`). The identity is escaped
    /// as one value; `~` and existing `%XX` escapes are left alone.
    pub(crate) fn raw_query(mut self, query: &str) -> Self {
        self.query = Some(escape_identity(query));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    /// Add an `o=` option. Adding the same option twice has no effect: the
    /// server treats a repeated option like a single one, so duplicates are
    /// dropped and each option is sent once, in first-added order.
    pub fn option(mut self, option: ChangeOption) -> Self {
        if !self.options.contains(&option) {
            self.options.push(option);
        }
        self
    }

    pub fn options(self, options: impl IntoIterator<Item = ChangeOption>) -> Self {
        options.into_iter().fold(self, ChangeQuery::option)
    }

    pub fn without_option(mut self, option: ChangeOption) -> Self {
        self.options.retain(|o| *o != option);
        self
    }

    pub fn has_option(&self, option: ChangeOption) -> bool {
        self.options.contains(&option)
    }

    fn builder(&self) -> QueryBuilder {
        let builder = QueryBuilder::new()
            .param("q", self.query.as_deref())
            .param("n", self.limit)
            .param("S", self.start);
        self.options
            .iter()
            .fold(builder, |b, option| b.param("o", Some(option)))
    }

    /// The full path for `base`, e.g. `/changes/?q=is:open&n=10`.
    pub fn to_path(&self, base: &str) -> String {
        self.builder().build(base)
    }
}

/// Parameters for `GET /projects/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectQuery {
    description: bool,
    prefix: Option<String>,
    limit: Option<u32>,
    start: Option<u32>,
}

impl ProjectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include project descriptions (`d`).
    pub fn with_description(mut self) -> Self {
        self.description = true;
        self
    }

    /// Only projects whose name starts with `prefix` (`p=`).
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(urlencoding::encode(prefix).into_owned());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    pub fn to_path(&self, base: &str) -> String {
        QueryBuilder::new()
            .flag("d", self.description)
            .param("p", self.prefix.as_deref())
            .param("n", self.limit)
            .param("S", self.start)
            .build(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_and_limit() {
        let q = ChangeQuery::new().query("is:open").limit(10);
        assert_eq!(q.to_path("/changes/"), "/changes/?q=is:open&n=10");
    }

    #[test]
    fn no_parameters_means_no_question_mark() {
        assert_eq!(ChangeQuery::new().to_path("/changes/"), "/changes/");
        assert_eq!(ProjectQuery::new().to_path("/projects/"), "/projects/");
    }

    #[test]
    fn single_option() {
        let q = ChangeQuery::new().option(ChangeOption::Labels);
        assert_eq!(q.to_path("/changes/"), "/changes/?o=LABELS");
    }

    #[test]
    fn canonical_order_regardless_of_call_order() {
        let q = ChangeQuery::new()
            .query("is:open")
            .limit(10)
            .option(ChangeOption::CurrentFiles)
            .start(30);
        assert_eq!(
            q.to_path("/changes/"),
            "/changes/?q=is:open&n=10&S=30&o=CURRENT_FILES"
        );
    }

    #[test]
    fn duplicate_options_are_sent_once_in_first_added_order() {
        let q = ChangeQuery::new()
            .options([ChangeOption::CurrentRevision, ChangeOption::Messages])
            .option(ChangeOption::CurrentRevision)
            .option(ChangeOption::Labels);
        assert_eq!(
            q.to_path("/changes/"),
            "/changes/?o=CURRENT_REVISION&o=MESSAGES&o=LABELS"
        );
        assert!(q.has_option(ChangeOption::Messages));
        let q = q.without_option(ChangeOption::Messages);
        assert!(!q.has_option(ChangeOption::Messages));
        assert_eq!(q.to_path("/changes/"), "/changes/?o=CURRENT_REVISION&o=LABELS");
    }

    #[test]
    fn identity_query_is_escaped_as_one_value() {
        let q = ChangeQuery::new().raw_query("my proj~master~I1&o=ALL_FILES");
        assert_eq!(
            q.to_path("/changes/"),
            "/changes/?q=my%20proj~master~I1%26o%3DALL_FILES"
        );
        assert!(!q.has_option(ChangeOption::AllFiles));
    }

    #[test]
    fn identity_query_keeps_existing_escapes() {
        assert_eq!(escape_identity("packages%2Ftest~master~I1"), "packages%2Ftest~master~I1");
        assert_eq!(escape_identity("4247"), "4247");
        assert_eq!(escape_identity("100%"), "100%25");
        assert_eq!(escape_identity("a+b#c"), "a%2Bb%23c");
        assert_eq!(escape_identity("réal"), "r%C3%A9al");
    }

    #[test]
    fn free_text_is_escaped() {
        assert_eq!(escape_query("status:open owner:self"), "status:open+owner:self");
        assert_eq!(escape_query("  message:\"fix bug\" "), "message:%22fix+bug%22");
        assert_eq!(escape_query("topic:a&b"), "topic:a%26b");
        assert_eq!(
            escape_query("project:tools/gerrit"),
            "project:tools%2Fgerrit"
        );
    }

    #[test]
    fn blank_query_is_dropped() {
        let q = ChangeQuery::new().query("   ").limit(5);
        assert_eq!(q.to_path("/changes/"), "/changes/?n=5");
    }

    #[test]
    fn project_parameters_combine_independently() {
        assert_eq!(
            ProjectQuery::new().with_description().to_path("/projects/"),
            "/projects/?d"
        );
        assert_eq!(
            ProjectQuery::new().start(20).prefix("tools/").to_path("/projects/"),
            "/projects/?p=tools%2F&S=20"
        );
        assert_eq!(
            ProjectQuery::new()
                .limit(25)
                .with_description()
                .prefix("plugins")
                .start(50)
                .to_path("/projects/"),
            "/projects/?d&p=plugins&n=25&S=50"
        );
    }

    #[test]
    fn builder_keeps_push_order() {
        let path = QueryBuilder::new()
            .param("S", Some(3))
            .flag("d", true)
            .param("q", None::<&str>)
            .flag("x", false)
            .param("o", Some("A"))
            .param("o", Some("B"))
            .build("/x/");
        assert_eq!(path, "/x/?S=3&d&o=A&o=B");
    }

    #[test]
    fn absent_components_leave_builder_empty() {
        let builder = QueryBuilder::new()
            .param("q", None::<&str>)
            .flag("d", false);
        assert!(builder.is_empty());
        assert_eq!(builder.build("/x/"), "/x/");
        assert!(!builder.flag("d", true).is_empty());
    }
}
