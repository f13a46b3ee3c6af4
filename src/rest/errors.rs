//! Resource-specific error types for REST API operations.
//!
//! # Error Handling
//!
//! - [`ResourceError::MissingRequiredField`]: local construction was refused
//! - [`ResourceError::Parse`]: a response did not match the declared schema
//! - [`ResourceError::Remote`]: the API answered with a non-success status,
//!   including the last answer of an exhausted retry
//! - [`ResourceError::Transport`]: the request never produced an API answer
//! - [`ResourceError::InvalidState`]: the operation is not defined for the
//!   entity's lifecycle state
//!
//! None of these are retried or suppressed by the resource layer. A failed
//! operation leaves the entity exactly as it was before the call.
//!
//! # Example
//!
//! ```rust,ignore
//! use mailchimp_api::rest::{ResourceError, resources::Member};
//!
//! match Member::find(transport, "list-id", "someone@example.com").await {
//!     Ok(member) => println!("Status: {:?}", member.status),
//!     Err(ResourceError::Remote(e)) if e.is_not_found() => println!("Not subscribed"),
//!     Err(ResourceError::Remote(e)) => {
//!         for (field, messages) in &e.field_errors {
//!             println!("{}: {:?}", field, messages);
//!         }
//!     }
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::clients::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::rest::fields::ParseError;
use crate::rest::resource::EntityState;

/// A non-success response from the API.
///
/// Built from the problem document the API returns on failure. The raw body
/// is kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
    /// The HTTP status code.
    pub status: u16,
    /// Short problem title (e.g., "Resource Not Found").
    pub title: Option<String>,
    /// Human-readable explanation.
    pub detail: Option<String>,
    /// Per-field validation messages. Messages without a field use `base`.
    pub field_errors: HashMap<String, Vec<String>>,
    /// The parsed response body.
    pub body: Value,
    /// The problem instance id, for support requests.
    pub request_id: Option<String>,
}

impl RemoteError {
    /// Builds a remote error from an HTTP response error.
    #[must_use]
    pub fn from_response(error: HttpResponseError) -> Self {
        Self::from_parts(error.code, error.body, error.error_reference)
    }

    /// Builds a remote error from the last response of an exhausted retry.
    #[must_use]
    pub fn from_retries(error: MaxHttpRetriesExceededError) -> Self {
        Self::from_parts(error.code, error.body, error.error_reference)
    }

    fn from_parts(status: u16, body: Value, request_id: Option<String>) -> Self {
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(ToString::to_string);
        Self {
            status,
            title: text("title"),
            detail: text("detail"),
            field_errors: parse_validation_errors(&body),
            request_id,
            body,
        }
    }

    /// Returns `true` for 404 responses.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Returns `true` when the API rejected specific fields.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.status == 400 && !self.field_errors.is_empty()
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mailchimp API returned {}", self.status)?;
        if let Some(title) = &self.title {
            write!(f, " {title}")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        if !self.field_errors.is_empty() {
            let mut fields: Vec<&str> = self.field_errors.keys().map(String::as_str).collect();
            fields.sort_unstable();
            write!(f, " (fields: {})", fields.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}

/// Error type for REST resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A required attribute was absent at local construction time.
    #[error("Cannot build {resource}: missing required field '{field}'")]
    MissingRequiredField {
        /// The type name of the resource.
        resource: &'static str,
        /// The missing attribute.
        field: &'static str,
    },

    /// A response payload did not match the resource's declared schema.
    #[error("Failed to parse {resource}: {source}")]
    Parse {
        /// The type name of the resource.
        resource: &'static str,
        /// The underlying field error.
        #[source]
        source: ParseError,
    },

    /// The API answered with a non-success status.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The request failed before the API produced an answer.
    #[error(transparent)]
    Transport(HttpError),

    /// The operation is not defined for the entity's current state.
    #[error("Cannot {operation} {resource} in state {state}")]
    InvalidState {
        /// The type name of the resource.
        resource: &'static str,
        /// The operation being attempted.
        operation: &'static str,
        /// The entity's state at the time of the call.
        state: EntityState,
    },

    /// No valid path matches the available IDs and operation.
    #[error("Cannot resolve path for {resource}::{operation} with provided IDs")]
    PathResolutionFailed {
        /// The type name of the resource.
        resource: &'static str,
        /// The operation being attempted.
        operation: &'static str,
    },

    /// A request body or query could not be serialized.
    #[error("Failed to serialize {resource}: {message}")]
    Serialization {
        /// The type name of the resource.
        resource: &'static str,
        /// The serializer's message.
        message: String,
    },
}

impl From<HttpError> for ResourceError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Response(response) => Self::Remote(RemoteError::from_response(response)),
            HttpError::MaxRetries(retries) => Self::Remote(RemoteError::from_retries(retries)),
            other => Self::Transport(other),
        }
    }
}

impl ResourceError {
    /// Returns a closure that wraps a [`ParseError`] for `resource`.
    pub(crate) fn parse(resource: &'static str) -> impl Fn(ParseError) -> Self {
        move |source| Self::Parse { resource, source }
    }

    /// Returns a closure that wraps a serializer error for `resource`.
    pub(crate) fn serialization(resource: &'static str) -> impl Fn(serde_json::Error) -> Self {
        move |e| Self::Serialization {
            resource,
            message: e.to_string(),
        }
    }

    /// Returns the request ID if available.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Remote(e) => e.request_id.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if the API reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Remote(e) if e.is_not_found())
    }
}

/// Parses validation errors from a problem document.
///
/// The Marketing API reports them as:
/// ```json
/// {"errors": [{"field": "email_address", "message": "This value should be a valid email."}]}
/// ```
fn parse_validation_errors(body: &Value) -> HashMap<String, Vec<String>> {
    let mut result: HashMap<String, Vec<String>> = HashMap::new();

    if let Some(Value::Array(errors)) = body.get("errors") {
        for entry in errors {
            let (field, message) = match entry {
                Value::Object(map) => (
                    map.get("field").and_then(Value::as_str).unwrap_or_default(),
                    map.get("message").and_then(Value::as_str),
                ),
                Value::String(s) => ("", Some(s.as_str())),
                _ => continue,
            };
            let Some(message) = message else { continue };
            let field = if field.is_empty() { "base" } else { field };
            result
                .entry(field.to_string())
                .or_default()
                .push(message.to_string());
        }
    }

    result
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
    assert_send_sync::<RemoteError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::InvalidHttpRequestError;
    use serde_json::json;

    fn response_error(code: u16, body: Value) -> HttpResponseError {
        HttpResponseError {
            code,
            message: body.to_string(),
            body,
            error_reference: Some("req-1".to_string()),
        }
    }

    #[test]
    fn test_http_response_becomes_remote_error() {
        let body = json!({
            "title": "Invalid Resource",
            "status": 400,
            "detail": "Your merge fields were invalid.",
            "errors": [
                {"field": "FNAME", "message": "Please enter a value"},
                {"field": "FNAME", "message": "Too short"},
                {"field": "", "message": "General failure"}
            ]
        });
        let error: ResourceError = HttpError::Response(response_error(400, body)).into();

        let ResourceError::Remote(remote) = error else {
            panic!("Expected Remote variant");
        };
        assert_eq!(remote.status, 400);
        assert_eq!(remote.title.as_deref(), Some("Invalid Resource"));
        assert_eq!(remote.field_errors.get("FNAME").map(Vec::len), Some(2));
        assert_eq!(
            remote.field_errors.get("base"),
            Some(&vec!["General failure".to_string()])
        );
        assert!(remote.is_validation());
        assert_eq!(remote.request_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_not_found_detection() {
        let error: ResourceError =
            HttpError::Response(response_error(404, json!({"title": "Resource Not Found"})))
                .into();
        assert!(error.is_not_found());
        assert_eq!(error.request_id(), Some("req-1"));
        assert!(error.to_string().contains("404 Resource Not Found"));
    }

    #[test]
    fn test_exhausted_retries_become_remote_error() {
        let error: ResourceError = HttpError::MaxRetries(MaxHttpRetriesExceededError {
            code: 503,
            tries: 3,
            message: r#"{"title":"Service Unavailable"}"#.to_string(),
            body: json!({"title": "Service Unavailable", "detail": "Try again later."}),
            error_reference: Some("req-9".to_string()),
        })
        .into();

        assert!(matches!(
            error,
            ResourceError::Remote(ref e)
                if e.status == 503
                    && e.title.as_deref() == Some("Service Unavailable")
                    && e.detail.as_deref() == Some("Try again later.")
        ));
        assert_eq!(error.request_id(), Some("req-9"));
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_non_response_http_errors_stay_transport_errors() {
        let error: ResourceError =
            HttpError::InvalidRequest(InvalidHttpRequestError::EmptyPath).into();
        assert!(matches!(error, ResourceError::Transport(_)));
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_invalid_state_message_names_operation_and_state() {
        let error = ResourceError::InvalidState {
            resource: "Member",
            operation: "update",
            state: EntityState::Deleted,
        };
        let message = error.to_string();
        assert!(message.contains("update"));
        assert!(message.contains("Member"));
        assert!(message.contains("Deleted"));
    }

    #[test]
    fn test_parse_error_wraps_field_path() {
        let error = ResourceError::parse("Campaign")(ParseError::MissingField {
            field: "settings.title".to_string(),
        });
        assert!(error.to_string().contains("Campaign"));
        assert!(error.to_string().contains("settings.title"));
    }

    #[test]
    fn test_path_resolution_failed_includes_operation_context() {
        let error = ResourceError::PathResolutionFailed {
            resource: "AutomationEmail",
            operation: "create",
        };
        let message = error.to_string();
        assert!(message.contains("AutomationEmail"));
        assert!(message.contains("create"));
    }
}
