//! HTTP exchange types and the executor seam.
//!
//! # Design
//! Requests and responses are plain data. The core builds `HttpRequest`
//! values and interprets `HttpResponse` values; the actual network exchange
//! is delegated to an `HttpExecutor` supplied by the host. An executor
//! reports only failures that prevented a response from arriving. Every HTTP
//! status, including 4xx/5xx, is returned as data so `Transport` can map it.

use std::fmt;

use crate::error::GerritError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute: `Transport` has already joined the base URL, the
/// authentication prefix and the server-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP exchange on behalf of the core.
///
/// Implementations must be safe to share between threads; the client never
/// wraps them in a lock.
pub trait HttpExecutor: Send + Sync {
    /// Send the request and return whatever response the server produced.
    ///
    /// Only connection, timeout, TLS and I/O failures are errors; they should
    /// be reported as `GerritError::Transport`.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, GerritError>;
}

impl<E: HttpExecutor + ?Sized> HttpExecutor for &E {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, GerritError> {
        (**self).send(request)
    }
}

impl<E: HttpExecutor + ?Sized> HttpExecutor for std::sync::Arc<E> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, GerritError> {
        (**self).send(request)
    }
}
