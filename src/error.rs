//! Error types for the Mailchimp API SDK.
//!
//! This module contains error types used throughout the SDK for configuration
//! and validation errors.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use mailchimp_api::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

/// Errors that can occur during SDK configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid Mailchimp API key.")]
    EmptyApiKey,

    /// API key does not carry a data center suffix.
    #[error("Invalid API key: {reason}. Expected format: '<key>-<dc>' (e.g., '0123abcd-us21').")]
    InvalidApiKey {
        /// Why the key was rejected.
        reason: String,
    },

    /// Base URL override is invalid.
    #[error("Invalid base URL '{url}'. Please provide a URL with scheme (e.g., 'https://us21.api.mailchimp.com/3.0').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Page size is outside the range the API accepts.
    #[error("Invalid page size {size}. The API accepts between 1 and 1000 items per page.")]
    InvalidPageSize {
        /// The rejected page size.
        size: u32,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_error_message() {
        let error = ConfigError::EmptyApiKey;
        let message = error.to_string();
        assert!(message.contains("API key cannot be empty"));
        assert!(message.contains("valid Mailchimp API key"));
    }

    #[test]
    fn test_invalid_api_key_error_message() {
        let error = ConfigError::InvalidApiKey {
            reason: "missing data center suffix".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("missing data center suffix"));
        assert!(message.contains("<key>-<dc>"));
    }

    #[test]
    fn test_invalid_page_size_error_message() {
        let message = ConfigError::InvalidPageSize { size: 0 }.to_string();
        assert!(message.contains("page size 0"));
    }

    #[test]
    fn test_missing_required_field_error_message() {
        let error = ConfigError::MissingRequiredField { field: "api_key" };
        let message = error.to_string();
        assert!(message.contains("api_key"));
        assert!(message.contains("must be set"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyApiKey;
        let _: &dyn std::error::Error = &error;
    }
}
