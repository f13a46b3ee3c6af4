//! Configuration types for the Mailchimp API SDK.
//!
//! # Overview
//!
//! - [`MailchimpConfig`]: The main configuration struct holding all SDK settings
//! - [`MailchimpConfigBuilder`]: A builder for constructing [`MailchimpConfig`] instances
//! - [`ApiKey`]: A validated API key newtype with masked debug output
//! - [`BaseUrl`]: A validated API root override
//!
//! # Example
//!
//! ```rust
//! use mailchimp_api::{MailchimpConfig, ApiKey};
//!
//! let config = MailchimpConfig::builder()
//!     .api_key(ApiKey::new("0123abcd-us21").unwrap())
//!     .page_size(250)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url().as_ref(), "https://us21.api.mailchimp.com/3.0");
//! ```

mod newtypes;

pub use newtypes::{ApiKey, BaseUrl};

use crate::error::ConfigError;

/// Default number of items requested per page by list iterators.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Largest page size the Marketing API accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Configuration for the Mailchimp API SDK.
///
/// # Thread Safety
///
/// `MailchimpConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
#[derive(Clone, Debug)]
pub struct MailchimpConfig {
    api_key: ApiKey,
    base_url: BaseUrl,
    user_agent_prefix: Option<String>,
    page_size: u32,
    tries: u32,
}

impl MailchimpConfig {
    /// Creates a new builder for constructing a `MailchimpConfig`.
    #[must_use]
    pub fn builder() -> MailchimpConfigBuilder {
        MailchimpConfigBuilder::new()
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API root, either the override or the key's data center host.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the page size used by list iterators.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns how many attempts a request gets before giving up on 429/5xx.
    #[must_use]
    pub const fn tries(&self) -> u32 {
        self.tries
    }
}

// Verify MailchimpConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MailchimpConfig>();
};

/// Builder for constructing [`MailchimpConfig`] instances.
///
/// The only required field is `api_key`.
///
/// # Defaults
///
/// - `base_url`: `https://{dc}.api.mailchimp.com/3.0`
/// - `page_size`: [`DEFAULT_PAGE_SIZE`]
/// - `tries`: `1` (no retries)
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct MailchimpConfigBuilder {
    api_key: Option<ApiKey>,
    base_url: Option<BaseUrl>,
    user_agent_prefix: Option<String>,
    page_size: Option<u32>,
    tries: Option<u32>,
}

impl MailchimpConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Overrides the API root.
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the page size used by list iterators.
    #[must_use]
    pub const fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Sets the number of attempts for rate-limited or failed requests.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = Some(tries);
        self
    }

    /// Builds the [`MailchimpConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key` is not set,
    /// or [`ConfigError::InvalidPageSize`] if the page size is outside `1..=1000`.
    pub fn build(self) -> Result<MailchimpConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;

        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidPageSize { size: page_size });
        }

        let base_url = self
            .base_url
            .unwrap_or_else(|| BaseUrl::for_data_center(api_key.data_center()));

        Ok(MailchimpConfig {
            api_key,
            base_url,
            user_agent_prefix: self.user_agent_prefix,
            page_size,
            tries: self.tries.unwrap_or(1).max(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ApiKey {
        ApiKey::new("0123abcd-us6").unwrap()
    }

    #[test]
    fn test_builder_requires_api_key() {
        let result = MailchimpConfigBuilder::new().build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "api_key" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = MailchimpConfig::builder().api_key(key()).build().unwrap();

        assert_eq!(
            config.base_url().as_ref(),
            "https://us6.api.mailchimp.com/3.0"
        );
        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(config.tries(), 1);
        assert!(config.user_agent_prefix().is_none());
    }

    #[test]
    fn test_builder_rejects_out_of_range_page_size() {
        let zero = MailchimpConfig::builder().api_key(key()).page_size(0).build();
        assert!(matches!(zero, Err(ConfigError::InvalidPageSize { size: 0 })));

        let huge = MailchimpConfig::builder()
            .api_key(key())
            .page_size(1001)
            .build();
        assert!(matches!(
            huge,
            Err(ConfigError::InvalidPageSize { size: 1001 })
        ));
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MailchimpConfig>();
    }

    #[test]
    fn test_config_debug_does_not_leak_key() {
        let config = MailchimpConfig::builder().api_key(key()).build().unwrap();
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("MailchimpConfig"));
        assert!(!debug_str.contains("0123abcd"));
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let config = MailchimpConfig::builder()
            .api_key(key())
            .base_url(BaseUrl::new("http://localhost:9000/3.0").unwrap())
            .user_agent_prefix("MyApp/1.0")
            .page_size(10)
            .tries(3)
            .build()
            .unwrap();

        assert_eq!(config.base_url().as_ref(), "http://localhost:9000/3.0");
        assert_eq!(config.user_agent_prefix(), Some("MyApp/1.0"));
        assert_eq!(config.page_size(), 10);
        assert_eq!(config.tries(), 3);
    }
}
