//! HTTP client types for Mailchimp API communication.
//!
//! This module provides the HTTP layer for making authenticated requests to
//! the Marketing API, and the [`Transport`] trait the resource layer is
//! written against.
//!
//! # Overview
//!
//! - [`Transport`]: Verb-level seam (`get`/`post`/`put`/`patch`/`delete`)
//! - [`HttpClient`]: The reqwest-backed implementation of [`Transport`]
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: A parsed response from the API
//! - [`HttpMethod`]: Supported HTTP methods
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mailchimp_api::{ApiKey, MailchimpConfig};
//! use mailchimp_api::clients::{HttpClient, Transport};
//!
//! let config = MailchimpConfig::builder()
//!     .api_key(ApiKey::new("0123abcd-us21").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let transport: Arc<dyn Transport> = Arc::new(HttpClient::new(&config)?);
//! let health = transport.get("ping", None).await?;
//! ```
//!
//! # Retry Behavior
//!
//! - **429 (Too Many Requests)**: Retries using `Retry-After` header value, or 1 second if not present
//! - **5xx (Server Error)**: Retries with fixed 1-second delay
//! - **Other errors (4xx)**: Returns immediately without retry
//!
//! The default `tries` is 1, meaning no automatic retries. Configure via
//! [`MailchimpConfig`](crate::MailchimpConfig) with `.tries(n)`.

mod errors;
mod http_client;
mod http_request;
mod http_response;
#[cfg(test)]
pub(crate) mod mock;
mod transport;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
pub use transport::{QueryParams, Transport};
