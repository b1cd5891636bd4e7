//! JSON codec conventions shared by every record.
//!
//! Gerrit names fields in lower case joined by underscores, which maps onto
//! Rust field names one-to-one; records only rename the few fields that start
//! with an underscore. Timestamps travel as `yyyy-MM-dd HH:mm:ss` in UTC,
//! usually followed by nanoseconds which are dropped on input.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{GerritError, Result};

const TIMESTAMP_OUT: &str = "%Y-%m-%d %H:%M:%S";
const TIMESTAMP_IN: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Serialize a request body.
pub fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| GerritError::Serialization(e.to_string()))
}

/// Decode a typed record out of an already-parsed JSON value.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    let rendered = truncate(&value.to_string());
    serde_json::from_value(value).map_err(|e| GerritError::Format(format!("{e}: {rendered}")))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_IN)
        .ok()
        .map(|t| t.trunc_subsecs(0).and_utc())
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_OUT).to_string()
}

/// Percent-decode a project id for display (`packages%2Ftest` -> `packages/test`).
///
/// Ids that do not decode to valid UTF-8 are returned unchanged.
pub fn decode_project_id(id: &str) -> String {
    urlencoding::decode(id)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| id.to_string())
}

/// Percent-encode a value so it fits in a single URL path segment.
pub fn encode_path_segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

const MAX_PAYLOAD_IN_MESSAGE: usize = 2048;

/// Keep error messages bounded when a whole response is echoed back.
pub(crate) fn truncate(rendered: &str) -> String {
    if rendered.len() <= MAX_PAYLOAD_IN_MESSAGE {
        return rendered.to_string();
    }
    let mut end = MAX_PAYLOAD_IN_MESSAGE;
    while !rendered.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &rendered[..end])
}

/// `#[serde(with = "gerrit_timestamp")]` for `DateTime<Utc>` fields.
pub mod gerrit_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    /// Same format for optional fields; `null` and missing both map to `None`.
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            ts: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => serializer.serialize_str(&super::super::format_timestamp(ts)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::super::parse_timestamp(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}"))),
                None => Ok(None),
            }
        }
    }
}
