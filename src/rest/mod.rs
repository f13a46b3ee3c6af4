//! REST resource infrastructure for the Mailchimp Marketing API.
//!
//! This module provides the reusable object-mapping layer every resource is
//! built on:
//!
//! - **[`FieldReader`]**: type-checked, null-tolerant field extraction
//! - **[`Hydrate`]**: the "populate from raw JSON" contract
//! - **[`Resource`] / [`Entity`]**: resource descriptors and the
//!   Detached → Persisted → Deleted lifecycle
//! - **[`Paginator`]**: lazy traversal of offset-paged list endpoints
//! - **[`subscriber_hash`]**: member addressing by email
//! - **Path building**: per-operation path templates with parent IDs
//!
//! Concrete resources live in [`resources`]; human-readable formatting lives
//! in [`display`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mailchimp_api::{ApiKey, HttpClient, MailchimpConfig};
//! use mailchimp_api::rest::resources::{Member, MemberDraft, MemberStatus};
//!
//! let config = MailchimpConfig::builder()
//!     .api_key(ApiKey::new("0123abcd-us21")?)
//!     .build()?;
//! let transport = Arc::new(HttpClient::new(&config)?);
//!
//! // Add a subscriber
//! let mut member = MemberDraft {
//!     list_id: Some("57afe96172".to_string()),
//!     email_address: Some("urist@example.com".to_string()),
//!     status: Some(MemberStatus::Subscribed),
//!     ..Default::default()
//! }
//! .into_entity(transport.clone())?;
//! member.create().await?;
//!
//! // Change it and push the change
//! member.change_status(MemberStatus::Unsubscribed).await?;
//!
//! // Archive it
//! member.delete().await?;
//! ```

mod errors;
mod fields;
mod hash;
mod hydrate;
mod pagination;
mod path;
mod resource;

pub mod display;
pub mod resources;

pub use errors::{RemoteError, ResourceError};
pub use fields::{FieldReader, JsonKind, ParseError, RawRecord, WireEnum};
pub(crate) use fields::{serialize_timestamp, wire_enum};
pub use hash::{is_email_address, subscriber_hash};
pub use hydrate::Hydrate;
pub use pagination::Paginator;
pub use path::{build_path, get_path, ResourceOperation, ResourcePath};
pub use resource::{Entity, EntityState, Resource};
