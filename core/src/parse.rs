//! Turning raw JSON responses into typed records.
//!
//! # Design
//! The same record kind reaches us in different envelopes: a collection query
//! returns an array, a single-resource fetch returns one object, and a few
//! endpoints return an object keyed by a natural key (project name, file
//! path). Each helper matches on the `serde_json::Value` variant first and
//! only then decodes, so a shape mismatch is reported as `Format` with the
//! offending payload instead of as an obscure serde error.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::codec::{decode, truncate};
use crate::error::{GerritError, Result};
use crate::types::{AccountInfo, ChangeInfo, CommentInfo, FileInfo, ProjectInfo};

/// Decode an array of objects, or a single object as a one-element result.
///
/// Element order follows the response.
pub fn parse_many<T: DeserializeOwned>(value: Value) -> Result<Vec<T>> {
    match value {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                let Value::Object(obj) = item else {
                    return Err(GerritError::Format(format!(
                        "element {idx} is not an object: {item} (response: {})",
                        truncate(&Value::Array(items.clone()).to_string())
                    )));
                };
                out.push(parse_one(obj)?);
            }
            Ok(out)
        }
        Value::Object(obj) => Ok(vec![parse_one(&obj)?]),
        other => Err(GerritError::Format(format!(
            "expected an object or an array of objects, got: {}",
            truncate(&other.to_string())
        ))),
    }
}

pub fn parse_one<T: DeserializeOwned>(obj: &Map<String, Value>) -> Result<T> {
    decode(Value::Object(obj.clone()))
}

/// Decode an object keyed by a natural key, applying `f` to every value.
///
/// The result is sorted by key regardless of the order the server used.
pub fn parse_map_with<T, F>(value: Value, mut f: F) -> Result<BTreeMap<String, T>>
where
    F: FnMut(&str, Value) -> Result<T>,
{
    match value {
        Value::Object(entries) => entries
            .into_iter()
            .map(|(key, entry)| f(&key, entry).map(|parsed| (key, parsed)))
            .collect(),
        other => Err(GerritError::Format(format!(
            "expected an object keyed by name, got: {}",
            truncate(&other.to_string())
        ))),
    }
}

/// Decode an object whose values must each be an object.
pub fn parse_object_map<T: DeserializeOwned>(value: Value) -> Result<BTreeMap<String, T>> {
    let rendered = truncate(&value.to_string());
    parse_map_with(value, |key, entry| match entry {
        Value::Object(obj) => parse_one(&obj),
        other => Err(GerritError::Format(format!(
            "entry {key:?} is not an object: {other} (response: {rendered})"
        ))),
    })
}

/// Decode an optional single object. Absence, including JSON `null`, is not an error.
pub fn parse_single<T: DeserializeOwned>(value: Option<Value>) -> Result<Option<T>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(obj)) => parse_one(&obj).map(Some),
        Some(other) => Err(GerritError::Format(format!(
            "expected an object, got: {}",
            truncate(&other.to_string())
        ))),
    }
}

pub fn parse_changes(value: Value) -> Result<Vec<ChangeInfo>> {
    parse_many(value)
}

pub fn parse_account(value: Option<Value>) -> Result<Option<AccountInfo>> {
    parse_single(value)
}

/// Projects come back keyed by name; entries without a `name` take the key.
pub fn parse_projects(value: Value) -> Result<BTreeMap<String, ProjectInfo>> {
    let mut projects: BTreeMap<String, ProjectInfo> = parse_object_map(value)?;
    for (key, project) in projects.iter_mut() {
        if project.name.is_none() {
            project.name = Some(key.clone());
        }
    }
    Ok(projects)
}

/// Comments come back keyed by file path, each path holding a list.
pub fn parse_comments(value: Value) -> Result<BTreeMap<String, Vec<CommentInfo>>> {
    parse_map_with(value, |path, entry| {
        let mut comments: Vec<CommentInfo> = parse_many(entry)?;
        for comment in comments.iter_mut() {
            if comment.path.is_none() {
                comment.path = Some(path.to_string());
            }
        }
        Ok(comments)
    })
}

pub fn parse_files(value: Value) -> Result<BTreeMap<String, FileInfo>> {
    parse_object_map(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn project(id: &str) -> Value {
        json!({"id": id, "description": format!("{id} project")})
    }

    #[test]
    fn array_keeps_server_order() {
        let parsed: Vec<ProjectInfo> =
            parse_many(json!([project("zeta"), project("alpha"), project("mid")])).unwrap();
        let ids: Vec<_> = parsed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["zeta", "alpha", "mid"]);
        assert_eq!(parsed[1].description.as_deref(), Some("alpha project"));
    }

    #[test]
    fn single_object_becomes_one_element() {
        let parsed: Vec<ProjectInfo> = parse_many(project("solo")).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "solo");
    }

    #[test]
    fn empty_array_is_empty() {
        let parsed: Vec<ProjectInfo> = parse_many(json!([])).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn scalars_and_null_are_rejected() {
        for value in [json!(null), json!(42), json!("text"), json!(true)] {
            let err = parse_many::<ProjectInfo>(value.clone()).unwrap_err();
            assert!(matches!(err, GerritError::Format(_)), "{value}");
        }
    }

    #[test]
    fn non_object_element_names_element_and_response() {
        let err = parse_many::<ProjectInfo>(json!([project("ok"), 7])).unwrap_err();
        let GerritError::Format(msg) = err else {
            panic!("expected Format, got {err:?}");
        };
        assert!(msg.contains("element 1"), "{msg}");
        assert!(msg.contains(": 7"), "{msg}");
        assert!(msg.contains("\"ok\""), "{msg}");
    }

    #[test]
    fn object_map_is_sorted_by_key() {
        let parsed = parse_projects(json!({
            "tools/gerrit": {"id": "tools%2Fgerrit"},
            "All-Projects": {"id": "All-Projects", "name": "All-Projects"},
            "external/bison": {"id": "external%2Fbison", "description": "GNU parser generator"}
        }))
        .unwrap();
        let keys: Vec<_> = parsed.keys().map(String::as_str).collect();
        assert_eq!(keys, ["All-Projects", "external/bison", "tools/gerrit"]);
        assert_eq!(parsed["tools/gerrit"].name.as_deref(), Some("tools/gerrit"));
        assert_eq!(parsed["tools/gerrit"].decoded_id(), "tools/gerrit");
    }

    #[test]
    fn object_map_rejects_non_object_entries() {
        let err = parse_projects(json!({"a": {"id": "a"}, "b": [1]})).unwrap_err();
        assert!(matches!(err, GerritError::Format(msg) if msg.contains("\"b\"")));

        let err = parse_projects(json!([{"id": "a"}])).unwrap_err();
        assert!(matches!(err, GerritError::Format(_)));
    }

    #[test]
    fn comments_are_grouped_by_path() {
        let parsed = parse_comments(json!({
            "gerrit-server/src/main/java/com/google/gerrit/server/project/RefControl.java": [
                {"id": "TvcXrmjM", "line": 23, "message": "[nit] trailing whitespace", "updated": "2013-02-26 15:40:43.986000000"},
                {"id": "TveXwFiA", "line": 49, "in_reply_to": "TfYX-Iuo", "message": "Done"}
            ],
            "README": {"id": "single", "line": 1, "message": "one"}
        }))
        .unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["README"].len(), 1);
        let java = parsed
            .get("gerrit-server/src/main/java/com/google/gerrit/server/project/RefControl.java")
            .unwrap();
        assert_eq!(java[0].line, Some(23));
        assert_eq!(java[1].in_reply_to.as_deref(), Some("TfYX-Iuo"));
        assert_eq!(
            java[0].path.as_deref(),
            Some("gerrit-server/src/main/java/com/google/gerrit/server/project/RefControl.java")
        );
    }

    #[test]
    fn single_accepts_absence() {
        assert!(parse_account(None).unwrap().is_none());
        assert!(parse_account(Some(json!(null))).unwrap().is_none());

        let acc = parse_account(Some(json!({"_account_id": 5, "name": "A"})))
            .unwrap()
            .unwrap();
        assert_eq!(acc.account_id, Some(5));

        let err = parse_account(Some(json!([{"_account_id": 5}]))).unwrap_err();
        assert!(matches!(err, GerritError::Format(_)));
    }

    #[test]
    fn files_map_decodes_entries() {
        let files = parse_files(json!({
            "/COMMIT_MSG": {"status": "A", "lines_inserted": 7},
            "gerrit-server/src/main/java/Foo.java": {"lines_inserted": 5, "lines_deleted": 3}
        }))
        .unwrap();
        assert_eq!(files["/COMMIT_MSG"].status.as_deref(), Some("A"));
        assert_eq!(files["gerrit-server/src/main/java/Foo.java"].lines_deleted, Some(3));
        assert!(!files["/COMMIT_MSG"].binary);
    }
}
