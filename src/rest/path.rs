//! Path building infrastructure for REST resources.
//!
//! Every resource declares a table of [`ResourcePath`]s, one per operation.
//! Most Marketing API resources live under a parent collection, so templates
//! carry the parent ID as well as the instance ID:
//! - `lists/{list_id}/members/{id}`
//! - `automations/{workflow_id}/emails/{id}`
//!
//! When several paths serve the same operation, the most specific one whose
//! IDs are all available wins.
//!
//! # Example
//!
//! ```rust
//! use mailchimp_api::rest::{ResourcePath, ResourceOperation, get_path, build_path};
//! use mailchimp_api::HttpMethod;
//! use std::collections::HashMap;
//!
//! const PATHS: &[ResourcePath] = &[
//!     ResourcePath::new(
//!         HttpMethod::Get,
//!         ResourceOperation::Find,
//!         &["list_id", "id"],
//!         "lists/{list_id}/members/{id}",
//!     ),
//!     ResourcePath::new(HttpMethod::Get, ResourceOperation::All, &["list_id"], "lists/{list_id}/members"),
//! ];
//!
//! let path = get_path(PATHS, ResourceOperation::Find, &["list_id", "id"]).unwrap();
//!
//! let mut ids = HashMap::new();
//! ids.insert("list_id", "57afe96172");
//! ids.insert("id", "62eeb292278cc15f5817cb78f7790b08");
//! let url = build_path(path.template, &ids);
//! assert_eq!(url, "lists/57afe96172/members/62eeb292278cc15f5817cb78f7790b08");
//! ```

use crate::clients::HttpMethod;
use std::collections::HashMap;
use std::fmt::Display;

/// Operations that can be performed on a REST resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceOperation {
    /// Fetch a single resource (GET `.../{id}`).
    Find,
    /// List a collection (GET `...`).
    All,
    /// Create a new resource (POST `...`).
    Create,
    /// Partially update an existing resource (PATCH `.../{id}`).
    Update,
    /// Create or replace a resource addressed by its natural key (PUT `.../{id}`).
    Upsert,
    /// Delete a resource (DELETE `.../{id}`).
    Delete,
}

impl ResourceOperation {
    /// Returns the default HTTP method for this operation.
    #[must_use]
    pub const fn default_http_method(&self) -> HttpMethod {
        match self {
            Self::Find | Self::All => HttpMethod::Get,
            Self::Create => HttpMethod::Post,
            Self::Update => HttpMethod::Patch,
            Self::Upsert => HttpMethod::Put,
            Self::Delete => HttpMethod::Delete,
        }
    }

    /// Returns the operation name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::All => "all",
            Self::Create => "create",
            Self::Update => "update",
            Self::Upsert => "add_or_update",
            Self::Delete => "delete",
        }
    }
}

/// A path configuration for a REST resource operation.
///
/// Templates use `{id_name}` placeholders; see [`build_path`].
///
/// ```rust
/// use mailchimp_api::rest::{ResourcePath, ResourceOperation};
/// use mailchimp_api::HttpMethod;
///
/// const CAMPAIGN_UPDATE: ResourcePath = ResourcePath::new(
///     HttpMethod::Patch,
///     ResourceOperation::Update,
///     &["id"],
///     "campaigns/{id}",
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePath {
    /// The HTTP method for this path.
    pub http_method: HttpMethod,
    /// The operation this path is used for.
    pub operation: ResourceOperation,
    /// Required ID parameters in order (e.g., `["list_id", "id"]`).
    pub ids: &'static [&'static str],
    /// The URL template with `{id}` placeholders.
    pub template: &'static str,
}

impl ResourcePath {
    /// Creates a new `ResourcePath`.
    #[must_use]
    pub const fn new(
        http_method: HttpMethod,
        operation: ResourceOperation,
        ids: &'static [&'static str],
        template: &'static str,
    ) -> Self {
        Self {
            http_method,
            operation,
            ids,
            template,
        }
    }

    /// Returns the number of required IDs for this path.
    #[must_use]
    pub const fn id_count(&self) -> usize {
        self.ids.len()
    }

    /// Checks if all required IDs are available.
    #[must_use]
    pub fn matches_ids(&self, available_ids: &[&str]) -> bool {
        self.ids.iter().all(|id| available_ids.contains(id))
    }
}

/// Selects the best matching path for an operation.
///
/// Among the paths for `operation` whose IDs are all available, returns the
/// one with the most IDs. Returns `None` if no path matches.
///
/// ```rust
/// use mailchimp_api::rest::{ResourcePath, ResourceOperation, get_path};
/// use mailchimp_api::HttpMethod;
///
/// const PATHS: &[ResourcePath] = &[
///     ResourcePath::new(HttpMethod::Get, ResourceOperation::All, &["workflow_id"], "automations/{workflow_id}/emails"),
///     ResourcePath::new(HttpMethod::Get, ResourceOperation::Find, &["workflow_id", "id"], "automations/{workflow_id}/emails/{id}"),
/// ];
///
/// assert!(get_path(PATHS, ResourceOperation::Find, &["id"]).is_none());
/// assert!(get_path(PATHS, ResourceOperation::Create, &["workflow_id"]).is_none());
/// ```
#[must_use]
pub fn get_path<'a>(
    paths: &'a [ResourcePath],
    operation: ResourceOperation,
    available_ids: &[&str],
) -> Option<&'a ResourcePath> {
    paths
        .iter()
        .filter(|p| p.operation == operation)
        .filter(|p| p.matches_ids(available_ids))
        .max_by_key(|p| p.id_count())
}

/// Builds a URL from a template by interpolating IDs.
///
/// Values are percent-encoded so IDs can never introduce extra path segments.
/// Placeholders without a value are left as they are.
///
/// ```rust
/// use mailchimp_api::rest::build_path;
/// use std::collections::HashMap;
///
/// let mut ids = HashMap::new();
/// ids.insert("list_id", "abc");
/// ids.insert("id", "a/b");
///
/// let url = build_path("lists/{list_id}/members/{id}", &ids);
/// assert_eq!(url, "lists/abc/members/a%2Fb");
/// ```
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn build_path<V: Display>(template: &str, ids: &HashMap<&str, V>) -> String {
    let mut result = template.to_string();

    for (key, value) in ids {
        let placeholder = format!("{{{key}}}");
        let encoded = urlencoding::encode(&value.to_string()).into_owned();
        result = result.replace(&placeholder, &encoded);
    }

    result
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceOperation>();
    assert_send_sync::<ResourcePath>();
};
