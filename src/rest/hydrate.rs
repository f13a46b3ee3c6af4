//! The "populate from raw JSON" contract shared by resources and sub-resources.

use serde_json::Value;

use crate::rest::fields::{FieldReader, ParseError};

/// A type that can be built from a raw JSON record.
///
/// Implementations read every field through [`FieldReader`] and build a
/// complete new value; they never merge with previously held state. Nested
/// sub-objects are hydrated recursively with [`FieldReader::nested`].
///
/// # Example
///
/// ```rust
/// use mailchimp_api::rest::{FieldReader, Hydrate, ParseError};
/// use serde_json::json;
///
/// struct Stats {
///     avg_open_rate: Option<f64>,
/// }
///
/// impl Hydrate for Stats {
///     fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
///         Ok(Self {
///             avg_open_rate: fields.double("avg_open_rate")?,
///         })
///     }
/// }
///
/// let stats = Stats::from_value(&json!({"avg_open_rate": 0.5})).unwrap();
/// assert_eq!(stats.avg_open_rate, Some(0.5));
/// ```
pub trait Hydrate: Sized {
    /// Builds a value from the fields of one JSON object.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] encountered.
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError>;

    /// Builds a value from a JSON value that must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] for non-objects, or any error from
    /// [`Hydrate::hydrate`].
    fn from_value(raw: &Value) -> Result<Self, ParseError> {
        Self::hydrate(&FieldReader::from_value(raw)?)
    }
}
