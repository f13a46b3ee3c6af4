//! Resource descriptors and the entity lifecycle.
//!
//! A [`Resource`] is a plain typed record plus a static descriptor: its
//! paths, its list envelope key and its writable subset. [`Entity<R>`] wraps
//! one such record together with the transport handle and drives it through
//! the lifecycle:
//!
//! ```text
//!   detached ──create()──▶ Persisted ──delete()──▶ Deleted
//!                           │    ▲
//!                           └────┘ update() / refresh() / add_or_update()
//! ```
//!
//! Every successful mutation re-hydrates the entity from the response body.
//! Hydration builds a complete new record before swapping it in, so a failed
//! call never leaves a half-updated entity behind.
//!
//! Any operation on a `Deleted` entity fails with
//! [`ResourceError::InvalidState`] before the transport is contacted.
//!
//! # Implementing a Resource
//!
//! ```rust,ignore
//! use mailchimp_api::rest::{FieldReader, Hydrate, ParseError, Resource, ResourceOperation, ResourcePath};
//! use mailchimp_api::HttpMethod;
//! use serde::Serialize;
//!
//! #[derive(Debug, Clone, Default, Serialize)]
//! pub struct Segment {
//!     #[serde(skip_serializing)]
//!     pub id: Option<String>,
//!     #[serde(skip_serializing)]
//!     pub list_id: Option<String>,
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     pub name: Option<String>,
//!     #[serde(skip_serializing)]
//!     pub member_count: Option<i64>,
//! }
//!
//! impl Resource for Segment {
//!     type ListParams = ();
//!     const NAME: &'static str = "Segment";
//!     const COLLECTION_KEY: &'static str = "segments";
//!     const PATHS: &'static [ResourcePath] = &[
//!         ResourcePath::new(HttpMethod::Get, ResourceOperation::Find, &["list_id", "id"], "lists/{list_id}/segments/{id}"),
//!         ResourcePath::new(HttpMethod::Get, ResourceOperation::All, &["list_id"], "lists/{list_id}/segments"),
//!         ResourcePath::new(HttpMethod::Post, ResourceOperation::Create, &["list_id"], "lists/{list_id}/segments"),
//!         ResourcePath::new(HttpMethod::Patch, ResourceOperation::Update, &["list_id", "id"], "lists/{list_id}/segments/{id}"),
//!         ResourcePath::new(HttpMethod::Delete, ResourceOperation::Delete, &["list_id", "id"], "lists/{list_id}/segments/{id}"),
//!     ];
//!
//!     fn id(&self) -> Option<&str> {
//!         self.id.as_deref()
//!     }
//!
//!     fn parent_ids(&self) -> Vec<(&'static str, String)> {
//!         self.list_id.iter().map(|id| ("list_id", id.clone())).collect()
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::clients::{HttpMethod, Transport};
use crate::rest::fields::ParseError;
use crate::rest::hydrate::Hydrate;
use crate::rest::pagination::Paginator;
use crate::rest::{build_path, get_path, ResourceError, ResourceOperation, ResourcePath};

/// Lifecycle state of an [`Entity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Assembled locally and never sent to the server.
    Detached,
    /// Mirrors the last known server representation.
    Persisted,
    /// Removed on the server. Terminal.
    Deleted,
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => write!(f, "Detached"),
            Self::Persisted => write!(f, "Persisted"),
            Self::Deleted => write!(f, "Deleted"),
        }
    }
}

/// Static description of one remote resource type.
///
/// The resource struct doubles as its own write view: fields annotated
/// `#[serde(skip_serializing)]` are read-only, and absent optional fields are
/// skipped, so `serde_json::to_value` yields exactly the writable subset.
pub trait Resource: Hydrate + Serialize + Clone + fmt::Debug + Send + Sync + 'static {
    /// Filter and sort parameters accepted by the list endpoint.
    ///
    /// Use `()` if the endpoint takes none.
    type ListParams: Serialize + Default + Send + Sync;

    /// Type name used in errors and logs.
    const NAME: &'static str;

    /// Key of the items array in list envelopes (e.g., `members`).
    const COLLECTION_KEY: &'static str;

    /// Paths for each supported operation.
    const PATHS: &'static [ResourcePath];

    /// Returns the identifier carried in the record, if any.
    fn id(&self) -> Option<&str>;

    /// Returns the parent identifiers needed to address this record.
    fn parent_ids(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Returns the identifier derived from the record's natural key.
    ///
    /// Used to address upserts before the server has issued an identifier.
    fn natural_key(&self) -> Option<String> {
        None
    }

    /// Serializes the writable subset of the record.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    fn writable_fields(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Body sent by [`Entity::create`].
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    fn create_body(&self) -> Result<Value, serde_json::Error> {
        self.writable_fields()
    }

    /// Body sent by [`Entity::update`].
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    fn update_body(&self) -> Result<Value, serde_json::Error> {
        self.writable_fields()
    }

    /// Body sent by [`Entity::add_or_update`].
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    fn upsert_body(&self) -> Result<Value, serde_json::Error> {
        self.writable_fields()
    }
}

/// A typed mirror of one remote resource instance.
///
/// Dereferences to the underlying record for reads. Local edits made through
/// [`DerefMut`] or [`Entity::resource_mut`] are sent by the next
/// [`Entity::update`] or [`Entity::add_or_update`], and are discarded by any
/// re-hydration.
#[derive(Debug, Clone)]
pub struct Entity<R: Resource> {
    transport: Arc<dyn Transport>,
    state: EntityState,
    id: Option<String>,
    resource: R,
}

impl<R: Resource> Entity<R> {
    /// Wraps a locally assembled record that has not been sent yet.
    #[must_use]
    pub fn detached(transport: Arc<dyn Transport>, resource: R) -> Self {
        Self {
            transport,
            state: EntityState::Detached,
            id: None,
            resource,
        }
    }

    /// Builds a persisted entity from a server representation.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Parse`] if the payload does not match the
    /// resource's schema.
    pub fn from_raw(transport: Arc<dyn Transport>, raw: &Value) -> Result<Self, ResourceError> {
        let resource = R::from_value(raw).map_err(ResourceError::parse(R::NAME))?;
        Ok(Self::persisted(transport, resource))
    }

    pub(crate) fn persisted(transport: Arc<dyn Transport>, resource: R) -> Self {
        Self {
            transport,
            state: EntityState::Persisted,
            id: resource.id().map(ToString::to_string),
            resource,
        }
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EntityState {
        self.state
    }

    /// Returns the server-issued identifier.
    ///
    /// `None` until a create or upsert succeeds. Never changes afterwards.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the underlying record.
    #[must_use]
    pub const fn resource(&self) -> &R {
        &self.resource
    }

    /// Returns the underlying record for local edits.
    pub fn resource_mut(&mut self) -> &mut R {
        &mut self.resource
    }

    /// Consumes the entity and returns the record.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.resource
    }

    /// Returns the transport handle used by this entity.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Replaces every field with the contents of `raw`.
    ///
    /// Nothing is merged with the previous values. If `raw` fails to parse,
    /// the entity is left exactly as it was. A `Detached` entity stays
    /// detached and gains no identifier; a `Persisted` one only accepts a
    /// record carrying its own `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] for deleted entities, or
    /// [`ResourceError::Parse`] on schema mismatch.
    pub fn hydrate(&mut self, raw: &Value) -> Result<(), ResourceError> {
        self.ensure("hydrate", &[EntityState::Detached, EntityState::Persisted])?;
        if self.state == EntityState::Detached {
            self.resource = R::from_value(raw).map_err(ResourceError::parse(R::NAME))?;
            return Ok(());
        }
        self.apply(raw)
    }

    /// Swaps in a server record and marks the entity `Persisted`.
    ///
    /// The record must carry an `id`, and once one is assigned it must not
    /// change. Nothing is touched on error.
    fn apply(&mut self, raw: &Value) -> Result<(), ResourceError> {
        let parse = ResourceError::parse(R::NAME);
        let fresh = R::from_value(raw).map_err(&parse)?;
        let Some(id) = fresh.id() else {
            return Err(parse(ParseError::MissingField {
                field: "id".to_string(),
            }));
        };
        if let Some(pinned) = self.id.as_deref() {
            if pinned != id {
                return Err(parse(ParseError::IdentifierChanged {
                    field: "id".to_string(),
                    expected: pinned.to_string(),
                    value: id.to_string(),
                }));
            }
        }

        self.id = Some(id.to_string());
        self.resource = fresh;
        self.state = EntityState::Persisted;
        Ok(())
    }

    /// Fetches one resource.
    ///
    /// `ids` must name every placeholder of the resource's find path,
    /// including `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::PathResolutionFailed`] if the IDs do not
    /// match a path, or any transport, remote or parse error.
    pub async fn find(
        transport: Arc<dyn Transport>,
        ids: &[(&str, &str)],
    ) -> Result<Self, ResourceError> {
        let ids: HashMap<&str, String> = ids.iter().map(|(k, v)| (*k, (*v).to_string())).collect();
        let (_, url) = resolve::<R>(ResourceOperation::Find, &ids)?;

        let response = transport.get(&url, None).await?;
        Self::from_raw(transport, &response)
    }

    /// Lists the collection lazily, one page per request.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::PathResolutionFailed`] if `parents` does not
    /// match the list path, or [`ResourceError::Serialization`] if `params`
    /// cannot be encoded as a query string. Page errors surface from the
    /// returned [`Paginator`].
    pub fn list(
        transport: Arc<dyn Transport>,
        parents: &[(&str, &str)],
        params: Option<R::ListParams>,
    ) -> Result<Paginator<Self>, ResourceError> {
        let ids: HashMap<&str, String> =
            parents.iter().map(|(k, v)| (*k, (*v).to_string())).collect();
        let (_, url) = resolve::<R>(ResourceOperation::All, &ids)?;

        let query = params
            .map(|p| serialize_to_query(R::NAME, &p))
            .transpose()?
            .unwrap_or_default();

        Ok(Paginator::entities(transport, url, R::COLLECTION_KEY, R::NAME, query))
    }

    /// Sends the writable fields to the collection endpoint.
    ///
    /// On success the entity is re-hydrated from the response, takes the
    /// server-issued identifier and becomes `Persisted`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is
    /// `Detached`. A response without an `id` is a [`ResourceError::Parse`]
    /// error and leaves the entity `Detached`.
    pub async fn create(&mut self) -> Result<(), ResourceError> {
        self.ensure("create", &[EntityState::Detached])?;

        let ids = self.address(None);
        let (path, url) = resolve::<R>(ResourceOperation::Create, &ids)?;
        let body = self
            .resource
            .create_body()
            .map_err(ResourceError::serialization(R::NAME))?;

        let response = self.write(path, &url, body).await?;
        self.apply(&response)?;
        tracing::debug!(resource = R::NAME, id = ?self.id, "Created resource");
        Ok(())
    }

    /// Sends the writable fields to the instance endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is
    /// `Persisted`; on any other error the fields are unchanged.
    pub async fn update(&mut self) -> Result<(), ResourceError> {
        self.ensure("update", &[EntityState::Persisted])?;
        let body = self
            .resource
            .update_body()
            .map_err(ResourceError::serialization(R::NAME))?;
        self.send_update(body).await
    }

    /// Sends a caller-built partial body to the instance endpoint.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::update`].
    pub async fn update_with(&mut self, body: Value) -> Result<(), ResourceError> {
        self.ensure("update", &[EntityState::Persisted])?;
        self.send_update(body).await
    }

    async fn send_update(&mut self, body: Value) -> Result<(), ResourceError> {
        let ids = self.address(self.id.clone());
        let (path, url) = resolve::<R>(ResourceOperation::Update, &ids)?;

        let response = self.write(path, &url, body).await?;
        self.apply(&response)?;
        tracing::debug!(resource = R::NAME, path = %url, "Updated resource");
        Ok(())
    }

    /// Creates or replaces the resource at the address derived from its
    /// natural key.
    ///
    /// Repeating the call with the same natural key addresses the same
    /// remote resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] for deleted entities, or
    /// [`ResourceError::PathResolutionFailed`] when neither an identifier
    /// nor a natural key is available. A response without an `id` is a
    /// [`ResourceError::Parse`] error and leaves the entity as it was.
    pub async fn add_or_update(&mut self) -> Result<(), ResourceError> {
        self.ensure(
            "add_or_update",
            &[EntityState::Detached, EntityState::Persisted],
        )?;

        let key = self
            .id
            .clone()
            .or_else(|| self.resource.natural_key())
            .ok_or(ResourceError::PathResolutionFailed {
                resource: R::NAME,
                operation: "add_or_update",
            })?;
        let ids = self.address(Some(key));
        let (path, url) = resolve::<R>(ResourceOperation::Upsert, &ids)?;
        let body = self
            .resource
            .upsert_body()
            .map_err(ResourceError::serialization(R::NAME))?;

        let response = self.write(path, &url, body).await?;
        self.apply(&response)?;
        tracing::debug!(resource = R::NAME, path = %url, "Upserted resource");
        Ok(())
    }

    /// Deletes the resource on the server.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is
    /// `Persisted`; on any other error the entity stays `Persisted`.
    pub async fn delete(&mut self) -> Result<(), ResourceError> {
        self.ensure("delete", &[EntityState::Persisted])?;

        let ids = self.address(self.id.clone());
        let (_, url) = resolve::<R>(ResourceOperation::Delete, &ids)?;

        self.transport.delete(&url).await?;
        self.mark_deleted();
        Ok(())
    }

    /// Re-reads the resource from the server.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is
    /// `Persisted`.
    pub async fn refresh(&mut self) -> Result<(), ResourceError> {
        let url = self.path("refresh")?;
        let response = self.transport.get(&url, None).await?;
        self.apply(&response)
    }

    /// Invokes a server action below the instance path.
    ///
    /// The entity is not modified. The response body is returned as is
    /// (`{}` for actions that answer with no content).
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is
    /// `Persisted`, or any transport or remote error.
    pub async fn perform(&self, action: &str, body: Option<Value>) -> Result<Value, ResourceError> {
        let url = self.child_path("perform", action)?;
        tracing::debug!(resource = R::NAME, path = %url, "Performing action");
        Ok(self.transport.post(&url, body).await?)
    }

    /// Invokes a server action that answers with a new resource.
    ///
    /// Returns the new resource as a separate persisted entity; this entity
    /// is not modified.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::perform`], plus [`ResourceError::Parse`].
    pub async fn perform_returning(
        &self,
        action: &str,
        body: Option<Value>,
    ) -> Result<Self, ResourceError> {
        let response = self.perform(action, body).await?;
        Self::from_raw(Arc::clone(&self.transport), &response)
    }

    /// Fetches a sub-resource below the instance path.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is
    /// `Persisted`, or any transport, remote or parse error.
    pub async fn fetch_child<T: Hydrate>(&self, suffix: &str) -> Result<T, ResourceError> {
        let url = self.child_path("fetch", suffix)?;
        let response = self.transport.get(&url, None).await?;
        T::from_value(&response).map_err(ResourceError::parse(R::NAME))
    }

    /// Lists a sub-collection below the instance path.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is
    /// `Persisted`.
    pub fn child_list<T: Hydrate + Send + 'static>(
        &self,
        suffix: &str,
        collection_key: &'static str,
    ) -> Result<Paginator<T>, ResourceError> {
        let url = self.child_path("list", suffix)?;
        Ok(Paginator::records(
            Arc::clone(&self.transport),
            url,
            collection_key,
        ))
    }

    /// Returns the instance path.
    pub(crate) fn path(&self, operation: &'static str) -> Result<String, ResourceError> {
        self.ensure(operation, &[EntityState::Persisted])?;
        let ids = self.address(self.id.clone());
        resolve::<R>(ResourceOperation::Find, &ids).map(|(_, url)| url)
    }

    /// Returns `{instance path}/{suffix}`.
    pub(crate) fn child_path(
        &self,
        operation: &'static str,
        suffix: &str,
    ) -> Result<String, ResourceError> {
        Ok(format!("{}/{}", self.path(operation)?, suffix))
    }

    pub(crate) fn mark_deleted(&mut self) {
        tracing::debug!(resource = R::NAME, id = ?self.id, "Resource deleted");
        self.state = EntityState::Deleted;
    }

    /// Fails with [`ResourceError::InvalidState`] unless the state is allowed.
    pub(crate) fn ensure(
        &self,
        operation: &'static str,
        allowed: &[EntityState],
    ) -> Result<(), ResourceError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ResourceError::InvalidState {
                resource: R::NAME,
                operation,
                state: self.state,
            })
        }
    }

    fn address(&self, id: Option<String>) -> HashMap<&'static str, String> {
        let mut ids: HashMap<&'static str, String> =
            self.resource.parent_ids().into_iter().collect();
        if let Some(id) = id {
            ids.insert("id", id);
        }
        ids
    }

    async fn write(
        &self,
        path: &ResourcePath,
        url: &str,
        body: Value,
    ) -> Result<Value, ResourceError> {
        let response = match path.http_method {
            HttpMethod::Post => self.transport.post(url, Some(body)).await?,
            HttpMethod::Put => self.transport.put(url, body).await?,
            HttpMethod::Patch => self.transport.patch(url, body).await?,
            HttpMethod::Get | HttpMethod::Delete => {
                return Err(ResourceError::PathResolutionFailed {
                    resource: R::NAME,
                    operation: path.operation.as_str(),
                })
            }
        };
        Ok(response)
    }
}

impl<R: Resource> Deref for Entity<R> {
    type Target = R;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

impl<R: Resource> DerefMut for Entity<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.resource
    }
}

/// Selects and fills the path for `operation`.
fn resolve<R: Resource>(
    operation: ResourceOperation,
    ids: &HashMap<&str, String>,
) -> Result<(&'static ResourcePath, String), ResourceError> {
    let available: Vec<&str> = ids.keys().copied().collect();
    let path = get_path(R::PATHS, operation, &available).ok_or(
        ResourceError::PathResolutionFailed {
            resource: R::NAME,
            operation: operation.as_str(),
        },
    )?;
    Ok((path, build_path(path.template, ids)))
}

/// Converts a params struct to a query parameter map.
///
/// Nulls are skipped, arrays become comma-separated lists, and nested
/// objects are sent as JSON strings.
pub(crate) fn serialize_to_query<T: Serialize>(
    resource: &'static str,
    params: &T,
) -> Result<HashMap<String, String>, ResourceError> {
    let value = serde_json::to_value(params).map_err(ResourceError::serialization(resource))?;

    let mut query = HashMap::new();

    if let Value::Object(map) = value {
        for (key, val) in map {
            match val {
                Value::Null => {}
                Value::String(s) => {
                    query.insert(key, s);
                }
                Value::Number(n) => {
                    query.insert(key, n.to_string());
                }
                Value::Bool(b) => {
                    query.insert(key, b.to_string());
                }
                Value::Array(arr) => {
                    let values: Vec<String> = arr
                        .iter()
                        .filter_map(|v| match v {
                            Value::String(s) => Some(s.clone()),
                            Value::Number(n) => Some(n.to_string()),
                            _ => None,
                        })
                        .collect();
                    if !values.is_empty() {
                        query.insert(key, values.join(","));
                    }
                }
                Value::Object(_) => {
                    query.insert(key, val.to_string());
                }
            }
        }
    }

    Ok(query)
}
