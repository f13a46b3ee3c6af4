//! Scripted transport for unit tests.
//!
//! Push responses with [`MockTransport::respond`] in the order the code under
//! test will request them, then inspect [`MockTransport::calls`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::clients::errors::{HttpError, HttpResponseError};
use crate::clients::http_request::HttpMethod;
use crate::clients::transport::{QueryParams, Transport};

/// One request observed by the mock.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub query: Option<QueryParams>,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Value, HttpError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    page_size: Option<u32>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_page_size(page_size: u32) -> Arc<Self> {
        Arc::new(Self {
            page_size: Some(page_size),
            ..Self::default()
        })
    }

    /// Queues a successful response body.
    pub fn respond(&self, body: Value) {
        self.responses.lock().unwrap().push_back(Ok(body));
    }

    /// Queues a problem-document failure with the given status.
    pub fn fail(&self, code: u16, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(HttpError::Response(HttpResponseError {
                code,
                message: body.to_string(),
                body,
                error_reference: None,
            })));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(
        &self,
        method: HttpMethod,
        path: &str,
        query: Option<QueryParams>,
        body: Option<Value>,
    ) -> Result<Value, HttpError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            query,
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected {method} {path}: no scripted response left"))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, query: Option<QueryParams>) -> Result<Value, HttpError> {
        self.record(HttpMethod::Get, path, query, None)
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, HttpError> {
        self.record(HttpMethod::Post, path, None, body)
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, HttpError> {
        self.record(HttpMethod::Put, path, None, Some(body))
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Value, HttpError> {
        self.record(HttpMethod::Patch, path, None, Some(body))
    }

    async fn delete(&self, path: &str) -> Result<(), HttpError> {
        self.record(HttpMethod::Delete, path, None, None).map(|_| ())
    }

    fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(crate::config::DEFAULT_PAGE_SIZE)
    }
}
