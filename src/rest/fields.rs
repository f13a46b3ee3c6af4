//! Type-checked, null-tolerant field extraction from raw JSON records.
//!
//! [`FieldReader`] wraps one JSON object and exposes typed getters. Every
//! getter follows the same contract:
//!
//! - absent key or JSON `null` yields `Ok(None)`
//! - a present value of the wrong JSON kind yields [`ParseError::TypeMismatch`]
//! - an enum string outside the declared wire values yields
//!   [`ParseError::UnknownVariant`] (exact, case-sensitive match)
//! - a timestamp that is not ISO-8601 with an explicit offset yields
//!   [`ParseError::InvalidTimestamp`]
//!
//! Nested getters report failures with the full field path, e.g.
//! `settings.title` or `tags[2].name`.
//!
//! # Example
//!
//! ```rust
//! use mailchimp_api::rest::{FieldReader, ParseError};
//! use serde_json::json;
//!
//! let raw = json!({"email_address": "a@b.com", "member_rating": "high"});
//! let fields = FieldReader::from_value(&raw).unwrap();
//!
//! assert_eq!(fields.string("email_address").unwrap().as_deref(), Some("a@b.com"));
//! assert_eq!(fields.string("language").unwrap(), None);
//! assert!(matches!(
//!     fields.int("member_rating"),
//!     Err(ParseError::TypeMismatch { .. })
//! ));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::Serializer;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::rest::hydrate::Hydrate;

/// An untyped JSON object as received from the API.
pub type RawRecord = Map<String, Value>;

/// The kind of a JSON value, used in parse diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    /// Returns the kind of `value`.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// A present field that could not be coerced to its declared type.
///
/// A parse error means the payload no longer matches the API contract; it is
/// never downgraded to an absent value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The record itself is not a JSON object.
    #[error("Expected a JSON object, found {actual}")]
    NotAnObject {
        /// The kind that was found instead.
        actual: JsonKind,
    },

    /// A field holds the wrong JSON kind.
    #[error("Field '{field}' expected {expected}, found {actual}")]
    TypeMismatch {
        /// Dotted path of the field.
        field: String,
        /// The expected shape.
        expected: &'static str,
        /// The kind that was found.
        actual: JsonKind,
    },

    /// An enum field holds a value outside its declared set.
    #[error("Field '{field}' has unknown value '{value}', expected one of: {expected}")]
    UnknownVariant {
        /// Dotted path of the field.
        field: String,
        /// The value that was found.
        value: String,
        /// Comma-separated list of accepted values.
        expected: String,
    },

    /// A timestamp field is not ISO-8601 with an explicit offset.
    #[error("Field '{field}' has value '{value}', which is not an ISO-8601 timestamp with offset")]
    InvalidTimestamp {
        /// Dotted path of the field.
        field: String,
        /// The value that was found.
        value: String,
    },

    /// A field required for hydration is absent.
    #[error("Required field '{field}' is missing")]
    MissingField {
        /// Dotted path of the field.
        field: String,
    },

    /// A response names a different record than the one it was fetched for.
    #[error("Field '{field}' changed from '{expected}' to '{value}'")]
    IdentifierChanged {
        /// Dotted path of the field.
        field: String,
        /// The identifier the entity is pinned to.
        expected: String,
        /// The identifier the response carried.
        value: String,
    },
}

impl ParseError {
    /// Prefixes the field path with the enclosing field name.
    #[must_use]
    pub fn within(self, parent: &str) -> Self {
        let join = |field: String| {
            if field.starts_with('[') {
                format!("{parent}{field}")
            } else {
                format!("{parent}.{field}")
            }
        };
        match self {
            Self::NotAnObject { actual } => Self::TypeMismatch {
                field: parent.to_string(),
                expected: "object",
                actual,
            },
            Self::TypeMismatch {
                field,
                expected,
                actual,
            } => Self::TypeMismatch {
                field: join(field),
                expected,
                actual,
            },
            Self::UnknownVariant {
                field,
                value,
                expected,
            } => Self::UnknownVariant {
                field: join(field),
                value,
                expected,
            },
            Self::InvalidTimestamp { field, value } => Self::InvalidTimestamp {
                field: join(field),
                value,
            },
            Self::MissingField { field } => Self::MissingField { field: join(field) },
            Self::IdentifierChanged {
                field,
                expected,
                value,
            } => Self::IdentifierChanged {
                field: join(field),
                expected,
                value,
            },
        }
    }

    /// Returns the dotted field path, if the error concerns a field.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::NotAnObject { .. } => None,
            Self::TypeMismatch { field, .. }
            | Self::UnknownVariant { field, .. }
            | Self::InvalidTimestamp { field, .. }
            | Self::IdentifierChanged { field, .. }
            | Self::MissingField { field } => Some(field),
        }
    }
}

/// An enumeration with a fixed set of lowercase wire values.
pub trait WireEnum: Sized + Copy + PartialEq + 'static {
    /// Every declared wire value with its variant.
    const VALUES: &'static [(&'static str, Self)];

    /// Looks up the variant for a wire value. Matching is exact.
    #[must_use]
    fn from_wire(value: &str) -> Option<Self> {
        Self::VALUES
            .iter()
            .find(|(wire, _)| *wire == value)
            .map(|(_, variant)| *variant)
    }

    /// Returns the wire value of this variant.
    #[must_use]
    fn as_wire(self) -> &'static str {
        Self::VALUES
            .iter()
            .find(|(_, variant)| *variant == self)
            .map_or("", |(wire, _)| wire)
    }
}

/// Declares a [`WireEnum`] with matching serde representation.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant, )+
        }

        impl $crate::rest::WireEnum for $name {
            const VALUES: &'static [(&'static str, Self)] = &[ $( ($wire, Self::$variant), )+ ];
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::rest::WireEnum::as_wire(*self))
            }
        }
    };
}

pub(crate) use wire_enum;

/// Read-only typed view over one JSON object.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    map: &'a RawRecord,
}

impl<'a> FieldReader<'a> {
    /// Wraps an object.
    #[must_use]
    pub const fn new(map: &'a RawRecord) -> Self {
        Self { map }
    }

    /// Wraps a value that must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] for any other JSON kind.
    pub fn from_value(value: &'a Value) -> Result<Self, ParseError> {
        value
            .as_object()
            .map(Self::new)
            .ok_or(ParseError::NotAnObject {
                actual: JsonKind::of(value),
            })
    }

    /// Returns `true` when the key is present with a non-null value.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.present(key).is_some()
    }

    /// Returns the raw value for passthrough fields.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&'a Value> {
        self.present(key)
    }

    fn present(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn mismatch(key: &str, expected: &'static str, actual: &Value) -> ParseError {
        ParseError::TypeMismatch {
            field: key.to_string(),
            expected,
            actual: JsonKind::of(actual),
        }
    }

    /// Reads a string field.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TypeMismatch`] if the value is not a string.
    pub fn string(&self, key: &str) -> Result<Option<String>, ParseError> {
        self.present(key)
            .map(|v| {
                v.as_str()
                    .map(ToString::to_string)
                    .ok_or_else(|| Self::mismatch(key, "string", v))
            })
            .transpose()
    }

    /// Reads a string field that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingField`] when absent, or
    /// [`ParseError::TypeMismatch`] if the value is not a string.
    pub fn required_string(&self, key: &str) -> Result<String, ParseError> {
        self.string(key)?.ok_or_else(|| ParseError::MissingField {
            field: key.to_string(),
        })
    }

    /// Reads an integer field.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TypeMismatch`] if the value is not an integer.
    pub fn int(&self, key: &str) -> Result<Option<i64>, ParseError> {
        self.present(key)
            .map(|v| v.as_i64().ok_or_else(|| Self::mismatch(key, "integer", v)))
            .transpose()
    }

    /// Reads a floating point field. Integers are widened.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TypeMismatch`] if the value is not a number.
    pub fn double(&self, key: &str) -> Result<Option<f64>, ParseError> {
        self.present(key)
            .map(|v| v.as_f64().ok_or_else(|| Self::mismatch(key, "number", v)))
            .transpose()
    }

    /// Reads a boolean field.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TypeMismatch`] if the value is not a boolean.
    pub fn boolean(&self, key: &str) -> Result<Option<bool>, ParseError> {
        self.present(key)
            .map(|v| v.as_bool().ok_or_else(|| Self::mismatch(key, "boolean", v)))
            .transpose()
    }

    /// Reads an enum field by exact wire value.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TypeMismatch`] if the value is not a string, or
    /// [`ParseError::UnknownVariant`] if it is not a declared wire value.
    pub fn enumeration<E: WireEnum>(&self, key: &str) -> Result<Option<E>, ParseError> {
        let Some(raw) = self.string(key)? else {
            return Ok(None);
        };
        E::from_wire(&raw)
            .map(Some)
            .ok_or_else(|| ParseError::UnknownVariant {
                field: key.to_string(),
                value: raw,
                expected: E::VALUES
                    .iter()
                    .map(|(wire, _)| *wire)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Reads an ISO-8601 timestamp with an explicit offset.
    ///
    /// The API sends `""` for unset times; that is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TypeMismatch`] if the value is not a string, or
    /// [`ParseError::InvalidTimestamp`] if it does not parse.
    pub fn timestamp(&self, key: &str) -> Result<Option<DateTime<FixedOffset>>, ParseError> {
        let Some(raw) = self.string(key)? else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(Some)
            .map_err(|_| ParseError::InvalidTimestamp {
                field: key.to_string(),
                value: raw,
            })
    }

    /// Returns a nested object for recursive hydration.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TypeMismatch`] if the value is not an object.
    pub fn object(&self, key: &str) -> Result<Option<&'a RawRecord>, ParseError> {
        self.present(key)
            .map(|v| v.as_object().ok_or_else(|| Self::mismatch(key, "object", v)))
            .transpose()
    }

    /// Returns a nested array.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TypeMismatch`] if the value is not an array.
    pub fn array(&self, key: &str) -> Result<Option<&'a Vec<Value>>, ParseError> {
        self.present(key)
            .map(|v| v.as_array().ok_or_else(|| Self::mismatch(key, "array", v)))
            .transpose()
    }

    /// Reads an array of strings.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TypeMismatch`] if the value or any element has the wrong kind.
    pub fn string_list(&self, key: &str) -> Result<Option<Vec<String>>, ParseError> {
        let Some(items) = self.array(key)? else {
            return Ok(None);
        };
        items
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_str()
                    .map(ToString::to_string)
                    .ok_or_else(|| Self::mismatch(&format!("{key}[{i}]"), "string", v))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Reads a string-to-boolean mapping, such as interest flags.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TypeMismatch`] if the value is not an object of booleans.
    pub fn bool_map(&self, key: &str) -> Result<Option<BTreeMap<String, bool>>, ParseError> {
        let Some(map) = self.object(key)? else {
            return Ok(None);
        };
        map.iter()
            .map(|(name, v)| {
                v.as_bool()
                    .map(|flag| (name.clone(), flag))
                    .ok_or_else(|| Self::mismatch(&format!("{key}.{name}"), "boolean", v))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Some)
    }

    /// Hydrates a sub-entity from a nested object.
    ///
    /// # Errors
    ///
    /// Returns any [`ParseError`] from the sub-entity, with its path prefixed.
    pub fn nested<T: Hydrate>(&self, key: &str) -> Result<Option<T>, ParseError> {
        self.object(key)?
            .map(|map| T::hydrate(&FieldReader::new(map)).map_err(|e| e.within(key)))
            .transpose()
    }

    /// Hydrates a list of sub-entities from a nested array of objects.
    ///
    /// # Errors
    ///
    /// Returns the first element's [`ParseError`], with an indexed path.
    pub fn nested_list<T: Hydrate>(&self, key: &str) -> Result<Option<Vec<T>>, ParseError> {
        let Some(items) = self.array(key)? else {
            return Ok(None);
        };
        items
            .iter()
            .enumerate()
            .map(|(i, v)| T::from_value(v).map_err(|e| e.within(&format!("{key}[{i}]"))))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

/// Serializes an optional timestamp as RFC 3339 with a numeric offset.
///
/// This is the form the API itself emits (`2017-02-02T21:17:45+00:00`), so
/// API timestamps are written back byte for byte. A `Z` suffix is written as
/// `+00:00`, and fractional seconds use the shortest of milli, micro or nano
/// precision that holds them.
pub(crate) fn serialize_timestamp<S: Serializer>(
    value: &Option<DateTime<FixedOffset>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
        None => serializer.serialize_none(),
    }
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ParseError>();
    assert_send_sync::<FieldReader<'static>>();
};
