//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use std::fmt;

/// A validated Mailchimp API key.
///
/// Mailchimp keys carry the account's data center as a suffix after the last
/// dash (`0123abcd-us21`). The data center selects the API host.
///
/// # Security
///
/// The `Debug` implementation masks the key, displaying only the data center:
/// `ApiKey(*****-us21)`.
///
/// # Example
///
/// ```rust
/// use mailchimp_api::ApiKey;
///
/// let key = ApiKey::new("0123abcd-us21").unwrap();
/// assert_eq!(key.data_center(), "us21");
/// assert_eq!(format!("{:?}", key), "ApiKey(*****-us21)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    key: String,
    dc_start: usize,
}

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty, or
    /// [`ConfigError::InvalidApiKey`] if it has no data center suffix.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }

        let dash = key.rfind('-').ok_or_else(|| ConfigError::InvalidApiKey {
            reason: "missing data center suffix".to_string(),
        })?;
        let (secret, dc) = (&key[..dash], &key[dash + 1..]);

        if secret.is_empty() {
            return Err(ConfigError::InvalidApiKey {
                reason: "key portion is empty".to_string(),
            });
        }
        if dc.is_empty() || !dc.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidApiKey {
                reason: format!("invalid data center '{dc}'"),
            });
        }

        Ok(Self {
            dc_start: dash + 1,
            key,
        })
    }

    /// Returns the data center the key belongs to (e.g., `us21`).
    #[must_use]
    pub fn data_center(&self) -> &str {
        &self.key[self.dc_start..]
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(*****-{})", self.data_center())
    }
}

/// A validated API root URL.
///
/// Used to override the data-center host, for example when routing through a
/// proxy or pointing the client at a local mock server. Trailing slashes are
/// trimmed so paths can be appended with a single `/`.
///
/// # Example
///
/// ```rust
/// use mailchimp_api::BaseUrl;
///
/// let url = BaseUrl::new("http://localhost:8080/3.0/").unwrap();
/// assert_eq!(url.as_ref(), "http://localhost:8080/3.0");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL has no `http` or
    /// `https` scheme or no host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/');

        let rest = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .ok_or_else(|| ConfigError::InvalidBaseUrl { url: url.clone() })?;

        let host = rest.split(['/', ':', '?', '#']).next().unwrap_or_default();
        if host.is_empty() {
            return Err(ConfigError::InvalidBaseUrl { url });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the default API root for a data center.
    #[must_use]
    pub fn for_data_center(dc: &str) -> Self {
        Self(format!("https://{dc}.api.mailchimp.com/3.0"))
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
