//! HTTP executor implementations.

#[cfg(feature = "ureq-client")]
mod ureq_client;
#[cfg(feature = "ureq-client")]
pub use ureq_client::UreqExecutor;
