//! Sub-entities embedded in more than one resource.
//!
//! These are not resources themselves (they have no paths and are never
//! addressed on their own). They are hydrated from a sub-object of their
//! parent's payload and owned by that parent.
//!
//! # Example
//!
//! ```rust
//! use mailchimp_api::rest::resources::common::Tracking;
//!
//! let tracking = Tracking {
//!     opens: Some(true),
//!     html_clicks: Some(true),
//!     text_clicks: Some(false),
//!     ..Default::default()
//! };
//! assert_eq!(
//!     serde_json::to_value(&tracking).unwrap(),
//!     serde_json::json!({"opens": true, "html_clicks": true, "text_clicks": false})
//! );
//! ```

mod report_summary;
mod tracking;

pub use report_summary::{EcommerceSummary, ReportSummary};
pub use tracking::Tracking;
