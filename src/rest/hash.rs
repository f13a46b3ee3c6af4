//! Subscriber addressing.
//!
//! List members are addressed by the MD5 hash of their lowercased email
//! address, so the same person always maps to the same path segment
//! regardless of how the address was capitalized.

use md5::{Digest, Md5};

/// Returns `true` if `value` looks like an email address.
///
/// This is a syntax check only: exactly one `@`, a non-empty local part, and
/// a domain made of at least two non-empty dot-separated labels. Whitespace
/// is rejected anywhere.
#[must_use]
pub fn is_email_address(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let mut labels = domain.split('.');
    let count = labels.clone().count();
    count >= 2 && labels.all(|label| !label.is_empty())
}

/// Derives the member address for an email address or existing hash.
///
/// Email addresses are trimmed, lowercased and hashed with MD5 (lowercase
/// hex). Anything else is returned unchanged, since it is taken to be an
/// already resolved hash or unique id.
///
/// ```rust
/// use mailchimp_api::rest::subscriber_hash;
///
/// let hash = subscriber_hash("Urist.McVankab@Freddiesjokes.com");
/// assert_eq!(hash, "62eeb292278cc15f5817cb78f7790b08");
/// assert_eq!(subscriber_hash(&hash), hash);
/// ```
#[must_use]
pub fn subscriber_hash(identifier: &str) -> String {
    let trimmed = identifier.trim();
    if !is_email_address(trimmed) {
        return identifier.to_string();
    }
    let digest = Md5::digest(trimmed.to_lowercase().as_bytes());
    format!("{digest:x}")
}
