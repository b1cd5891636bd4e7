//! Scripted executor shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::GerritError;
use crate::http::{HttpExecutor, HttpRequest, HttpResponse};

/// Records every request and answers from a fixed script.
///
/// Running past the end of the script answers `500` so a test that sends an
/// unexpected extra request fails loudly.
pub struct RecordingExecutor {
    requests: Mutex<Vec<HttpRequest>>,
    script: Mutex<VecDeque<Result<HttpResponse, String>>>,
}

impl RecordingExecutor {
    pub fn new(responses: Vec<HttpResponse>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            script: Mutex::new(responses.into_iter().map(Ok).collect()),
        }
    }

    pub fn failing(cause: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::from([Err(cause.to_string())])),
        }
    }

    pub fn json(status: u16, body: serde_json::Value) -> HttpResponse {
        HttpResponse::new(status, format!(")]}}'\n{body}"))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpExecutor for RecordingExecutor {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, GerritError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(cause)) => Err(GerritError::Transport(cause)),
            None => Ok(HttpResponse::new(500, "unscripted request")),
        }
    }
}
