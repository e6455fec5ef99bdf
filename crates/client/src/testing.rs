//! In-memory transport for unit tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::transport::{ApiRequest, HttpTransport, TransportError};

/// Canned reply for [`MockTransport`]
#[derive(Debug, Clone)]
pub enum MockReply {
    Body(String),
    Status(u16, String),
}

/// Transport that records every request and replays queued replies
///
/// With the queue empty it answers `{"data":null}`.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, body: impl Into<String>) -> &Self {
        self.replies.lock().unwrap().push_back(MockReply::Body(body.into()));
        self
    }

    pub fn fail(&self, status: u16) -> &Self {
        self.replies.lock().unwrap().push_back(MockReply::Status(status, "error".to_string()));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request sent")
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(request);

        match self.replies.lock().unwrap().pop_front() {
            Some(MockReply::Body(body)) => Ok(body),
            Some(MockReply::Status(status, body)) => Err(TransportError::Status { status, body }),
            None => Ok(r#"{"data":null}"#.to_string()),
        }
    }
}
