//! Human-readable summaries of resources.
//!
//! Output is an indented `Label: value` block, one line per present field.
//! Absent fields are left out. Nothing here is parsed back; the layout may
//! change between releases.

use std::fmt::{self, Display, Formatter};

use crate::rest::resources::{
    AutomationEmail, Campaign, ClickReport, ClickSplit, EcommerceProductActivity, Member,
};

const INDENT: &str = "    ";

fn line<T: Display>(f: &mut Formatter<'_>, label: &str, value: Option<T>) -> fmt::Result {
    match value {
        Some(value) => writeln!(f, "{INDENT}{label}: {value}"),
        None => Ok(()),
    }
}

/// Writes the final line without a trailing newline.
fn last<T: Display>(f: &mut Formatter<'_>, label: &str, value: Option<T>) -> fmt::Result {
    write!(f, "{INDENT}{label}: ")?;
    match value {
        Some(value) => write!(f, "{value}"),
        None => write!(f, "-"),
    }
}

impl Display for Member {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Member:")?;
        line(f, "Id", self.id.as_deref())?;
        line(f, "Email", self.email_address.as_deref())?;
        line(f, "Email Id", self.unique_email_id.as_deref())?;
        line(f, "Email Type", self.email_type)?;
        line(f, "Status", self.status)?;
        line(f, "Signup", self.timestamp_signup)?;
        line(f, "Signup IP", self.ip_signup.as_deref().filter(|ip| !ip.is_empty()))?;
        line(f, "Opt-in", self.timestamp_opt)?;
        line(f, "Opt-in IP", self.ip_opt.as_deref().filter(|ip| !ip.is_empty()))?;
        line(f, "Rating", self.member_rating)?;
        line(f, "Last Changed", self.last_changed)?;
        line(f, "Language", self.language.as_deref().filter(|l| !l.is_empty()))?;
        line(f, "VIP", self.vip)?;
        line(f, "Email Client", self.email_client.as_deref().filter(|c| !c.is_empty()))?;
        if let Some(note) = self.last_note.as_ref().and_then(|n| n.note.as_deref()) {
            line(f, "Last Note", Some(note))?;
        }
        if let Some(fields) = self.merge_fields.as_ref().filter(|m| !m.is_empty()) {
            writeln!(f, "{INDENT}Merge Fields:")?;
            for (tag, value) in fields {
                match value.as_str() {
                    Some(text) => writeln!(f, "{INDENT}{INDENT}{tag}: {text}")?,
                    None => writeln!(f, "{INDENT}{INDENT}{tag}: {value}")?,
                }
            }
        }
        if let Some(interests) = self.interests.as_ref().filter(|m| !m.is_empty()) {
            writeln!(f, "{INDENT}Interests:")?;
            for (id, on) in interests {
                writeln!(f, "{INDENT}{INDENT}{id}: {on}")?;
            }
        }
        let tags: Vec<&str> = self
            .tags
            .iter()
            .flatten()
            .filter_map(|t| t.name.as_deref())
            .collect();
        last(f, "List Id", self.list_id.as_deref())?;
        if !tags.is_empty() {
            write!(f, "\n{INDENT}Tags: {}", tags.join(", "))?;
        }
        Ok(())
    }
}

impl Display for Campaign {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let title = self.settings.as_ref().and_then(|s| s.title.as_deref());
        writeln!(
            f,
            "Campaign: {} {}",
            self.id.as_deref().unwrap_or("-"),
            title.unwrap_or("")
        )?;
        line(f, "Web Id", self.web_id)?;
        line(f, "Type", self.campaign_type)?;
        line(f, "Status", self.status)?;
        line(f, "Content Type", self.content_type)?;
        line(f, "Created", self.create_time)?;
        match self.send_time {
            Some(sent) => line(f, "Sent", Some(sent))?,
            None => line(f, "Sent", Some("Draft"))?,
        }
        line(f, "Archive URL", self.archive_url.as_deref())?;
        if let Some(settings) = &self.settings {
            line(f, "Subject", settings.subject_line.as_deref())?;
            line(f, "From", settings.from_name.as_deref())?;
            line(f, "Reply To", settings.reply_to.as_deref())?;
        }
        if let Some(recipients) = &self.recipients {
            line(f, "List", recipients.list_name.as_deref().or(recipients.list_id.as_deref()))?;
            line(f, "Recipients", recipients.recipient_count)?;
        }
        if let Some(summary) = &self.report_summary {
            line(f, "Opens", summary.opens)?;
            line(f, "Clicks", summary.clicks)?;
        }
        last(f, "Emails Sent", self.emails_sent)
    }
}

impl Display for AutomationEmail {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let title = self.settings.as_ref().and_then(|s| s.title.as_deref());
        writeln!(
            f,
            "Automation Email: {} {}",
            self.id.as_deref().unwrap_or("-"),
            title.unwrap_or("")
        )?;
        line(f, "Workflow Id", self.workflow_id.as_deref())?;
        line(f, "Position", self.position)?;
        line(f, "Status", self.status)?;
        line(
            f,
            "Delay",
            self.delay.as_ref().and_then(|d| d.full_description.as_deref()),
        )?;
        line(f, "Created", self.create_time)?;
        line(f, "Started", self.start_time)?;
        line(
            f,
            "Subject",
            self.settings.as_ref().and_then(|s| s.subject_line.as_deref()),
        )?;
        last(f, "Emails Sent", self.emails_sent)
    }
}

fn split(f: &mut Formatter<'_>, name: &str, side: &ClickSplit) -> fmt::Result {
    write!(
        f,
        "\n{INDENT}Split {name}: {} clicks ({} unique)",
        side.clicks.unwrap_or(0),
        side.unique_clicks.unwrap_or(0)
    )
}

impl Display for ClickReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Click Report: {} {}",
            self.id.as_deref().unwrap_or("-"),
            self.url.as_deref().unwrap_or("")
        )?;
        line(f, "Total Clicks", self.total_clicks)?;
        line(f, "Click Percentage", self.click_percentage)?;
        line(f, "Unique Clicks", self.unique_clicks)?;
        line(f, "Unique Click Percentage", self.unique_click_percentage)?;
        line(f, "Last Click", self.last_click)?;
        last(f, "Campaign Id", self.campaign_id.as_deref())?;
        if let Some(ab) = &self.ab_split {
            if let Some(a) = &ab.a {
                split(f, "A", a)?;
            }
            if let Some(b) = &ab.b {
                split(f, "B", b)?;
            }
        }
        Ok(())
    }
}

impl Display for EcommerceProductActivity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Product: {}", self.title.as_deref().unwrap_or("-"))?;
        line(f, "SKU", self.sku.as_deref())?;
        line(f, "Image", self.image_url.as_deref())?;
        match (self.total_revenue, self.currency_code.as_deref()) {
            (Some(revenue), Some(currency)) => {
                writeln!(f, "{INDENT}Revenue: {revenue:.2} {currency}")?;
            }
            (revenue, _) => line(f, "Revenue", revenue)?,
        }
        line(f, "Recommended", self.recommendation_total)?;
        line(f, "Recommended Purchased", self.recommendation_purchased)?;
        last(f, "Purchased", self.total_purchased)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::resources::{CampaignSettings, MemberStatus, MemberTag};
    use crate::rest::Hydrate;
    use serde_json::json;

    #[test]
    fn test_member_summary_skips_absent_fields() {
        let member = Member {
            id: Some("h1".to_string()),
            email_address: Some("a@b.com".to_string()),
            status: Some(MemberStatus::Subscribed),
            list_id: Some("L1".to_string()),
            tags: Some(vec![MemberTag {
                name: Some("vip".to_string()),
                ..MemberTag::default()
            }]),
            ..Member::default()
        };

        let text = member.to_string();

        assert_eq!(
            text,
            "Member:\n    Id: h1\n    Email: a@b.com\n    Status: subscribed\n    List Id: L1\n    Tags: vip"
        );
    }

    #[test]
    fn test_member_summary_lists_merge_fields() {
        let member = Member::from_value(&json!({
            "id": "h1",
            "merge_fields": {"FNAME": "Urist", "SCORE": 7}
        }))
        .unwrap();

        let text = member.to_string();

        assert!(text.contains("Merge Fields:\n        FNAME: Urist\n        SCORE: 7\n"));
        assert!(text.ends_with("List Id: -"));
    }

    #[test]
    fn test_campaign_summary_marks_unsent_as_draft() {
        let campaign = Campaign {
            id: Some("c1".to_string()),
            settings: Some(CampaignSettings {
                title: Some("Spring".to_string()),
                ..CampaignSettings::default()
            }),
            emails_sent: Some(0),
            ..Campaign::default()
        };

        let text = campaign.to_string();

        assert!(text.starts_with("Campaign: c1 Spring\n"));
        assert!(text.contains("    Sent: Draft\n"));
        assert!(text.ends_with("    Emails Sent: 0"));
    }

    #[test]
    fn test_click_report_summary_includes_splits() {
        let report = ClickReport::from_value(&json!({
            "id": "u1",
            "url": "https://a",
            "total_clicks": 3,
            "campaign_id": "c1",
            "ab_split": {"a": {"clicks_a": 1, "unique_clicks_a": 1}, "b": {"clicks_b": 2}}
        }))
        .unwrap();

        let text = report.to_string();

        assert!(text.starts_with("Click Report: u1 https://a\n"));
        assert!(text.contains("    Campaign Id: c1\n    Split A: 1 clicks (1 unique)\n    Split B: 2 clicks (0 unique)"));
    }

    #[test]
    fn test_product_revenue_uses_currency() {
        let product = EcommerceProductActivity {
            title: Some("Socks".to_string()),
            total_revenue: Some(12.5),
            currency_code: Some("USD".to_string()),
            total_purchased: Some(2.0),
            ..EcommerceProductActivity::default()
        };

        assert_eq!(
            product.to_string(),
            "Product: Socks\n    Revenue: 12.50 USD\n    Purchased: 2"
        );
    }
}
