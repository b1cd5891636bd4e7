//! One HTTP verb against one server-relative path.
//!
//! # Design
//! `Transport` owns the configuration and an `HttpExecutor`. It decorates
//! each request (base URL, `/a` prefix and Basic auth when credentials are
//! configured, JSON headers), hands it to the executor, then maps the
//! response: 2xx bodies are stripped of Gerrit's `)]}'` guard line and parsed,
//! everything else becomes `GerritError::Status`. It keeps no state between
//! calls.

use base64::Engine;
use serde_json::Value;
use tracing::debug;

use crate::codec::truncate;
use crate::config::GerritConfig;
use crate::error::{GerritError, Result};
use crate::http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse};

/// Anti-XSSI guard Gerrit puts in front of every JSON response.
const XSSI_PREFIX: &[u8] = b")]}'";

#[derive(Debug)]
pub struct Transport<E> {
    config: GerritConfig,
    executor: E,
}

impl<E: HttpExecutor> Transport<E> {
    pub fn new(config: GerritConfig, executor: E) -> Self {
        Self { config, executor }
    }

    pub fn config(&self) -> &GerritConfig {
        &self.config
    }

    /// Issue a request and parse the JSON response. Empty bodies yield `None`.
    pub fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        extra_headers: &[(&str, &str)],
    ) -> Result<Option<Value>> {
        let response = self.send(method, path, body, extra_headers)?;
        parse_json_body(&response.body)
    }

    /// Issue a request and return the successful body untouched.
    pub fn execute_raw(&self, method: HttpMethod, path: &str) -> Result<Vec<u8>> {
        Ok(self.send(method, path, None, &[])?.body)
    }

    /// Issue a request whose successful response must carry JSON.
    pub fn execute_expecting(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
    ) -> Result<Value> {
        self.execute(method, path, body, &[])?.ok_or_else(|| {
            GerritError::Format(format!("{method} {path} returned an empty body"))
        })
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        extra_headers: &[(&str, &str)],
    ) -> HttpRequest {
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push((
                "Content-Type".to_string(),
                "application/json; charset=UTF-8".to_string(),
            ));
        }
        if let Some(credentials) = &self.config.credentials {
            let token = base64::engine::general_purpose::STANDARD
                .encode(format!("{}:{}", credentials.username, credentials.password));
            headers.push(("Authorization".to_string(), format!("Basic {token}")));
        }
        headers.extend(
            extra_headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );

        let auth_prefix = if self.config.credentials.is_some() { "/a" } else { "" };
        HttpRequest {
            method,
            url: format!("{}{auth_prefix}{path}", self.config.base_url),
            headers,
            body,
        }
    }

    fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        extra_headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let request = self.build_request(method, path, body, extra_headers);
        debug!(method = %method, path, "sending request");

        let response = self.executor.send(&request)?;
        debug!(
            method = %method,
            path,
            status = response.status,
            bytes = response.body.len(),
            "received response"
        );

        check_status(response)
    }
}

/// Map non-2xx responses to `GerritError::Status`.
fn check_status(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    let text = String::from_utf8_lossy(&response.body).trim().to_string();
    let message = if text.is_empty() {
        reason_phrase(response.status).to_string()
    } else {
        truncate(&text)
    };
    Err(GerritError::Status {
        code: response.status,
        message,
    })
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        412 => "Precondition Failed",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unexpected Status",
    }
}

/// Strip the `)]}'` guard line, if any, and parse what remains.
pub fn parse_json_body(body: &[u8]) -> Result<Option<Value>> {
    let body = body.strip_prefix(XSSI_PREFIX).unwrap_or(body);
    let text = std::str::from_utf8(body)
        .map_err(|e| GerritError::Format(format!("response is not UTF-8: {e}")))?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|e| GerritError::Format(format!("{e}: {}", truncate(text))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::test_support::RecordingExecutor;
    use serde_json::json;

    fn transport(executor: &RecordingExecutor) -> Transport<&RecordingExecutor> {
        Transport::new(GerritConfig::new("http://gerrit.local:8080/"), executor)
    }

    #[test]
    fn strips_xssi_prefix() {
        let value = parse_json_body(b")]}'\n{\"a\":1}").unwrap();
        assert_eq!(value, Some(json!({"a": 1})));

        let value = parse_json_body(b"[1,2]").unwrap();
        assert_eq!(value, Some(json!([1, 2])));
    }

    #[test]
    fn empty_body_is_none() {
        assert_eq!(parse_json_body(b"").unwrap(), None);
        assert_eq!(parse_json_body(b")]}'\n").unwrap(), None);
    }

    #[test]
    fn invalid_json_is_format_error() {
        let err = parse_json_body(b")]}'\n<html>").unwrap_err();
        assert!(matches!(err, GerritError::Format(msg) if msg.contains("<html>")));
    }

    #[test]
    fn anonymous_requests_hit_plain_paths() {
        let exec = RecordingExecutor::new(vec![HttpResponse::new(200, ")]}'\n[]")]);
        let value = transport(&exec)
            .execute(HttpMethod::Get, "/changes/", None, &[])
            .unwrap();
        assert_eq!(value, Some(json!([])));

        let sent = exec.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Get);
        assert_eq!(sent[0].url, "http://gerrit.local:8080/changes/");
        assert_eq!(sent[0].header("accept"), Some("application/json"));
        assert!(sent[0].header("authorization").is_none());
        assert!(sent[0].body.is_none());
    }

    #[test]
    fn config_is_kept_as_given() {
        let exec = RecordingExecutor::new(vec![]);
        let transport = transport(&exec);
        assert_eq!(transport.config().base_url, "http://gerrit.local:8080");
        assert!(transport.config().credentials.is_none());
    }

    #[test]
    fn credentials_add_prefix_and_basic_auth() {
        let exec = RecordingExecutor::new(vec![HttpResponse::new(204, "")]);
        let config = GerritConfig::new("https://review.example.org")
            .with_credentials(Credentials::new("jdoe", "secret"));
        let transport = Transport::new(config, &exec);

        let value = transport
            .execute(
                HttpMethod::Post,
                "/changes/1/abandon",
                Some("{}".to_string()),
                &[("X-Gerrit-Trace", "1")],
            )
            .unwrap();
        assert!(value.is_none());

        let sent = &exec.requests()[0];
        assert_eq!(sent.url, "https://review.example.org/a/changes/1/abandon");
        assert_eq!(sent.header("authorization"), Some("Basic amRvZTpzZWNyZXQ="));
        assert_eq!(
            sent.header("content-type"),
            Some("application/json; charset=UTF-8")
        );
        assert_eq!(sent.header("x-gerrit-trace"), Some("1"));
        assert_eq!(sent.body.as_deref(), Some("{}"));
    }

    #[test]
    fn non_success_becomes_status_error() {
        let exec = RecordingExecutor::new(vec![HttpResponse::new(409, "change is merged\n")]);
        let err = transport(&exec)
            .execute(HttpMethod::Post, "/changes/1/abandon", None, &[])
            .unwrap_err();
        assert!(matches!(
            err,
            GerritError::Status { code: 409, ref message } if message == "change is merged"
        ));
    }

    #[test]
    fn empty_error_body_uses_reason_phrase() {
        let exec = RecordingExecutor::new(vec![HttpResponse::new(404, "")]);
        let err = transport(&exec)
            .execute(HttpMethod::Get, "/accounts/nobody", None, &[])
            .unwrap_err();
        assert!(matches!(
            err,
            GerritError::Status { code: 404, ref message } if message == "Not Found"
        ));
    }

    #[test]
    fn executor_failures_propagate() {
        let exec = RecordingExecutor::failing("connection refused");
        let err = transport(&exec)
            .execute(HttpMethod::Get, "/changes/", None, &[])
            .unwrap_err();
        assert!(matches!(err, GerritError::Transport(msg) if msg == "connection refused"));
    }

    #[test]
    fn raw_body_is_not_parsed() {
        let script = b"#!/bin/sh\necho hook\n".to_vec();
        let exec = RecordingExecutor::new(vec![HttpResponse::new(200, script.clone())]);
        let bytes = transport(&exec)
            .execute_raw(HttpMethod::Get, "/tools/hooks/commit-msg")
            .unwrap();
        assert_eq!(bytes, script);
    }

    #[test]
    fn expecting_rejects_empty_body() {
        let exec = RecordingExecutor::new(vec![HttpResponse::new(200, "")]);
        let err = transport(&exec)
            .execute_expecting(HttpMethod::Get, "/changes/", None)
            .unwrap_err();
        assert!(matches!(err, GerritError::Format(_)));
    }
}
