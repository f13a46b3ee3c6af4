//! Tracking options shared by campaigns and automation emails.

use serde::Serialize;

use crate::rest::{FieldReader, Hydrate, ParseError};

/// The tracking options for a campaign or automation email.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct Tracking {
    /// Whether to track opens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opens: Option<bool>,

    /// Whether to track clicks in the HTML version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_clicks: Option<bool>,

    /// Whether to track clicks in the plain-text version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_clicks: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_tracking: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecomm360: Option<bool>,

    /// The custom slug for Google Analytics tracking (max 50 characters).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_analytics: Option<String>,

    /// The custom slug for ClickTale tracking (max 50 characters).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clicktale: Option<String>,
}

impl Hydrate for Tracking {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            opens: fields.boolean("opens")?,
            html_clicks: fields.boolean("html_clicks")?,
            text_clicks: fields.boolean("text_clicks")?,
            goal_tracking: fields.boolean("goal_tracking")?,
            ecomm360: fields.boolean("ecomm360")?,
            google_analytics: fields.string("google_analytics")?,
            clicktale: fields.string("clicktale")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tracking_round_trips_present_fields() {
        let raw = json!({
            "opens": true,
            "html_clicks": true,
            "text_clicks": false,
            "goal_tracking": false,
            "ecomm360": false,
            "google_analytics": "",
            "clicktale": ""
        });

        let tracking = Tracking::from_value(&raw).unwrap();

        assert_eq!(serde_json::to_value(&tracking).unwrap(), raw);
    }

    #[test]
    fn test_tracking_rejects_string_flag() {
        let result = Tracking::from_value(&json!({"opens": "yes"}));
        assert!(matches!(result, Err(ParseError::TypeMismatch { .. })));
    }
}
