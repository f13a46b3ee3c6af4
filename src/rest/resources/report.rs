//! Read-only campaign report records.
//!
//! These come from the `reports/{campaign_id}/...` endpoints and are listed
//! through the campaign's `click_reports()` and `product_activity()`.

use chrono::{DateTime, FixedOffset};

use crate::rest::{FieldReader, Hydrate, ParseError};

/// Click statistics for one URL in a campaign.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickReport {
    /// The URL's unique id.
    pub id: Option<String>,
    pub campaign_id: Option<String>,
    pub url: Option<String>,
    pub total_clicks: Option<i64>,
    pub click_percentage: Option<f64>,
    pub unique_clicks: Option<i64>,
    pub unique_click_percentage: Option<f64>,
    pub last_click: Option<DateTime<FixedOffset>>,
    /// Per-variant clicks for A/B split campaigns.
    pub ab_split: Option<AbSplit>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbSplit {
    pub a: Option<ClickSplit>,
    pub b: Option<ClickSplit>,
}

/// Clicks for one side of an A/B split.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickSplit {
    pub clicks: Option<i64>,
    pub click_percentage: Option<f64>,
    pub unique_clicks: Option<i64>,
    pub unique_click_percentage: Option<f64>,
}

impl ClickSplit {
    /// Reads a variant whose keys carry the variant suffix (`clicks_a`, ...).
    fn read(fields: &FieldReader<'_>, suffix: &str) -> Result<Self, ParseError> {
        Ok(Self {
            clicks: fields.int(&format!("clicks_{suffix}"))?,
            click_percentage: fields.double(&format!("click_percentage_{suffix}"))?,
            unique_clicks: fields.int(&format!("unique_clicks_{suffix}"))?,
            unique_click_percentage: fields
                .double(&format!("unique_click_percentage_{suffix}"))?,
        })
    }
}

impl Hydrate for AbSplit {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        let side = |key: &str| -> Result<Option<ClickSplit>, ParseError> {
            fields
                .object(key)?
                .map(|map| ClickSplit::read(&FieldReader::new(map), key).map_err(|e| e.within(key)))
                .transpose()
        };
        Ok(Self {
            a: side("a")?,
            b: side("b")?,
        })
    }
}

impl Hydrate for ClickReport {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            id: fields.string("id")?,
            campaign_id: fields.string("campaign_id")?,
            url: fields.string("url")?,
            total_clicks: fields.int("total_clicks")?,
            click_percentage: fields.double("click_percentage")?,
            unique_clicks: fields.int("unique_clicks")?,
            unique_click_percentage: fields.double("unique_click_percentage")?,
            last_click: fields.timestamp("last_click")?,
            ab_split: fields.nested("ab_split")?,
        })
    }
}

/// Revenue generated by one product in an e-commerce campaign.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EcommerceProductActivity {
    pub title: Option<String>,
    pub sku: Option<String>,
    pub image_url: Option<String>,
    pub total_revenue: Option<f64>,
    pub total_purchased: Option<f64>,
    pub currency_code: Option<String>,
    pub recommendation_total: Option<i64>,
    pub recommendation_purchased: Option<i64>,
}

impl Hydrate for EcommerceProductActivity {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            title: fields.string("title")?,
            sku: fields.string("sku")?,
            image_url: fields.string("image_url")?,
            total_revenue: fields.double("total_revenue")?,
            total_purchased: fields.double("total_purchased")?,
            currency_code: fields.string("currency_code")?,
            recommendation_total: fields.int("recommendation_total")?,
            recommendation_purchased: fields.int("recommendation_purchased")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_click_report_reads_suffixed_split_keys() {
        let raw = json!({
            "id": "u1",
            "campaign_id": "c1",
            "url": "https://example.com",
            "total_clicks": 12,
            "click_percentage": 0.4,
            "unique_clicks": 9,
            "unique_click_percentage": 0.3,
            "last_click": "2017-02-01T10:00:00+00:00",
            "ab_split": {
                "a": {"clicks_a": 5, "click_percentage_a": 0.2, "unique_clicks_a": 4, "unique_click_percentage_a": 0.1},
                "b": {"clicks_b": 7, "click_percentage_b": 0, "unique_clicks_b": 5, "unique_click_percentage_b": 0.2}
            }
        });

        let report = ClickReport::from_value(&raw).unwrap();

        let split = report.ab_split.unwrap();
        assert_eq!(split.a.as_ref().and_then(|a| a.clicks), Some(5));
        assert_eq!(split.b.as_ref().and_then(|b| b.click_percentage), Some(0.0));
        assert_eq!(report.total_clicks, Some(12));
    }

    #[test]
    fn test_split_error_names_variant_path() {
        let raw = json!({"ab_split": {"b": {"clicks_b": "many"}}});

        let err = ClickReport::from_value(&raw).unwrap_err();

        assert_eq!(err.field(), Some("ab_split.b.clicks_b"));
    }

    #[test]
    fn test_product_activity_widens_integer_totals() {
        let raw = json!({
            "title": "Socks",
            "sku": "SK-1",
            "total_revenue": 120,
            "total_purchased": 4,
            "currency_code": "USD",
            "recommendation_total": 2
        });

        let product = EcommerceProductActivity::from_value(&raw).unwrap();

        assert_eq!(product.total_revenue, Some(120.0));
        assert_eq!(product.total_purchased, Some(4.0));
        assert_eq!(product.recommendation_purchased, None);
    }
}
