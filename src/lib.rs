//! # Mailchimp API Rust SDK
//!
//! A typed client for the Mailchimp Marketing API (v3.0). Remote resources
//! such as list members, campaigns and automation emails are mirrored as
//! plain Rust records whose lifecycle is kept in sync with the server.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`MailchimpConfig`] and [`MailchimpConfigBuilder`]
//! - Validated newtypes for the API key and API root
//! - An async HTTP client with retry logic and rate limit handling
//! - Null-tolerant, type-checked hydration of JSON payloads via [`rest::FieldReader`]
//! - The Detached → Persisted → Deleted entity lifecycle via [`rest::Entity`]
//! - Lazy pagination of list endpoints via [`rest::Paginator`]
//! - Subscriber addressing by email via [`rest::subscriber_hash`]
//!
//! ## Quick Start
//!
//! ```rust
//! use mailchimp_api::{ApiKey, MailchimpConfig};
//!
//! // The data center suffix of the key selects the API root
//! let config = MailchimpConfig::builder()
//!     .api_key(ApiKey::new("0123456789abcdef-us21").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.api_key().data_center(), "us21");
//! ```
//!
//! ## Working with Resources
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mailchimp_api::{ApiKey, HttpClient, MailchimpConfig};
//! use mailchimp_api::rest::resources::{Campaign, Member, MemberStatus};
//!
//! let config = MailchimpConfig::builder()
//!     .api_key(ApiKey::new("0123456789abcdef-us21")?)
//!     .build()?;
//! let transport = Arc::new(HttpClient::new(&config)?);
//!
//! // Fetch a member by email and unsubscribe them
//! let mut member = Member::find(transport.clone(), "57afe96172", "urist@example.com").await?;
//! member.change_status(MemberStatus::Unsubscribed).await?;
//!
//! // Walk every campaign, one page at a time
//! let mut campaigns = Campaign::list(transport.clone(), None)?;
//! while let Some(campaign) = campaigns.try_next().await? {
//!     println!("{}", *campaign);
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Thread-safe**: All types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime
//! - **Explicit lifecycle**: Deleted entities reject every operation locally

pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use config::{ApiKey, BaseUrl, MailchimpConfig, MailchimpConfigBuilder};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError, Transport,
};

// Re-export the resource layer essentials
pub use rest::{Entity, EntityState, Paginator, RemoteError, ResourceError};
