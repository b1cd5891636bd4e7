//! Fallback for servers that reject newer query options.
//!
//! Older Gerrit releases answer `400 Bad Request` when the change-detail
//! query asks for `o=MESSAGES`. The detail call is issued in its `Primary`
//! shape first; on exactly that status it is reissued once in its `Degraded`
//! shape, without the option. Every other outcome, including a failure of the
//! degraded attempt, is returned unchanged.

use tracing::warn;

use crate::error::{GerritError, Result};
use crate::query::{ChangeOption, ChangeQuery};

const UNSUPPORTED_OPTION_STATUS: u16 = 400;

/// Options requested by the change-detail call, in wire order.
pub const DETAIL_OPTIONS: [ChangeOption; 4] = [
    ChangeOption::CurrentRevision,
    ChangeOption::Messages,
    ChangeOption::Labels,
    ChangeOption::DetailedLabels,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    Primary,
    Degraded,
}

/// The change-detail query for `id` in the given shape.
pub fn detail_query(id: &str, shape: RequestShape) -> ChangeQuery {
    let query = ChangeQuery::new().raw_query(id).options(DETAIL_OPTIONS);
    match shape {
        RequestShape::Primary => query,
        RequestShape::Degraded => query.without_option(ChangeOption::Messages),
    }
}

/// Run `attempt` in the primary shape, retrying once degraded on HTTP 400.
pub fn with_degraded_retry<T, F>(mut attempt: F) -> Result<T>
where
    F: FnMut(RequestShape) -> Result<T>,
{
    match attempt(RequestShape::Primary) {
        Err(GerritError::Status { code, message }) if code == UNSUPPORTED_OPTION_STATUS => {
            warn!(
                status = code,
                %message,
                "server rejected change detail query, retrying without MESSAGES"
            );
            attempt(RequestShape::Degraded)
        }
        other => other,
    }
}
