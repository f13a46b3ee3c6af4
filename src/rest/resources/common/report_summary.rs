//! Read-only report summaries embedded in sent campaigns.

use crate::rest::{FieldReader, Hydrate, ParseError};

/// A summary of opens, clicks and e-commerce results for a sent campaign.
///
/// Computed by the server; never sent back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    pub opens: Option<i64>,
    pub unique_opens: Option<i64>,
    pub open_rate: Option<f64>,
    pub clicks: Option<i64>,
    pub subscriber_clicks: Option<i64>,
    pub click_rate: Option<f64>,
    pub ecommerce: Option<EcommerceSummary>,
}

/// E-commerce totals attributed to a campaign.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EcommerceSummary {
    pub total_orders: Option<i64>,
    pub total_spent: Option<f64>,
    pub total_revenue: Option<f64>,
}

impl Hydrate for ReportSummary {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            opens: fields.int("opens")?,
            unique_opens: fields.int("unique_opens")?,
            open_rate: fields.double("open_rate")?,
            clicks: fields.int("clicks")?,
            subscriber_clicks: fields.int("subscriber_clicks")?,
            click_rate: fields.double("click_rate")?,
            ecommerce: fields.nested("ecommerce")?,
        })
    }
}

impl Hydrate for EcommerceSummary {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            total_orders: fields.int("total_orders")?,
            total_spent: fields.double("total_spent")?,
            total_revenue: fields.double("total_revenue")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_summary_hydrates_nested_ecommerce() {
        let summary = ReportSummary::from_value(&json!({
            "opens": 12,
            "unique_opens": 9,
            "open_rate": 0.45,
            "clicks": 3,
            "subscriber_clicks": 2,
            "click_rate": 0.1,
            "ecommerce": {"total_orders": 1, "total_spent": 19.5, "total_revenue": 19.5}
        }))
        .unwrap();

        assert_eq!(summary.unique_opens, Some(9));
        assert_eq!(
            summary.ecommerce.and_then(|e| e.total_orders),
            Some(1)
        );
    }

    #[test]
    fn test_nested_error_carries_parent_path() {
        let error = ReportSummary::from_value(&json!({"ecommerce": {"total_orders": "one"}}))
            .unwrap_err();
        assert_eq!(error.field(), Some("ecommerce.total_orders"));
    }
}
