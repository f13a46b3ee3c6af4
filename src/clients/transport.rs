//! The verb-level transport seam used by the resource layer.
//!
//! Resources never talk to `reqwest` directly. They hold an
//! `Arc<dyn Transport>` and issue one awaited call per operation.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::clients::errors::HttpError;
use crate::config::DEFAULT_PAGE_SIZE;

/// Query parameters sent with a GET request.
pub type QueryParams = HashMap<String, String>;

/// Authenticated HTTP verbs against the API root.
///
/// Paths are relative to the API root (`lists/{list_id}/members`). Each
/// method resolves to the parsed JSON body of a 2xx response, or an
/// [`HttpError`] for transport failures and non-success responses.
///
/// Implementations must be safe to share between tasks; the resource layer
/// itself adds no locking around the transport.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Fetches a resource or collection page.
    async fn get(&self, path: &str, query: Option<QueryParams>) -> Result<Value, HttpError>;

    /// Creates a resource or invokes an action. Actions may carry no body.
    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, HttpError>;

    /// Upserts a resource.
    async fn put(&self, path: &str, body: Value) -> Result<Value, HttpError>;

    /// Partially updates a resource.
    async fn patch(&self, path: &str, body: Value) -> Result<Value, HttpError>;

    /// Deletes a resource. The API answers with an empty body.
    async fn delete(&self, path: &str) -> Result<(), HttpError>;

    /// Number of items list iterators request per page.
    fn page_size(&self) -> u32 {
        DEFAULT_PAGE_SIZE
    }
}
