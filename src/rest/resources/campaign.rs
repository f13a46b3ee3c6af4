//! Campaign resource implementation.
//!
//! Besides the usual create/update/delete lifecycle, campaigns expose a set
//! of server actions (`send`, `schedule`, `replicate`, ...) under
//! `campaigns/{id}/actions/`, plus the read-only report endpoints under
//! `reports/{id}/`.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::clients::{HttpMethod, Transport};
use crate::rest::resources::common::{ReportSummary, Tracking};
use crate::rest::resources::report::{ClickReport, EcommerceProductActivity};
use crate::rest::{
    wire_enum, Entity, EntityState, FieldReader, Hydrate, Paginator, ParseError, Resource,
    ResourceError, ResourceOperation, ResourcePath,
};

wire_enum! {
    pub enum CampaignType {
        Regular => "regular",
        Plaintext => "plaintext",
        AbSplit => "absplit",
        Rss => "rss",
        Variate => "variate",
    }
}

wire_enum! {
    pub enum CampaignStatus {
        Save => "save",
        Paused => "paused",
        Schedule => "schedule",
        Sending => "sending",
        Sent => "sent",
        Canceled => "canceled",
        Canceling => "canceling",
        Archived => "archived",
    }
}

wire_enum! {
    /// How the campaign's content is put together.
    pub enum CampaignContentType {
        Template => "template",
        Html => "html",
        Url => "url",
        Multichannel => "multichannel",
    }
}

wire_enum! {
    /// Format of a test email.
    pub enum CampaignSendType {
        Html => "html",
        Plaintext => "plaintext",
    }
}

wire_enum! {
    pub enum ChecklistItemType {
        Success => "success",
        Warning => "warning",
        Error => "error",
    }
}

/// An email campaign.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct Campaign {
    #[serde(skip_serializing)]
    pub id: Option<String>,
    /// Id used in the web application's campaign URLs.
    #[serde(skip_serializing)]
    pub web_id: Option<i64>,
    #[serde(skip_serializing)]
    pub parent_campaign_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub campaign_type: Option<CampaignType>,
    #[serde(skip_serializing)]
    pub create_time: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing)]
    pub archive_url: Option<String>,
    #[serde(skip_serializing)]
    pub long_archive_url: Option<String>,
    #[serde(skip_serializing)]
    pub status: Option<CampaignStatus>,
    #[serde(skip_serializing)]
    pub emails_sent: Option<i64>,
    #[serde(skip_serializing)]
    pub send_time: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<CampaignContentType>,
    #[serde(skip_serializing)]
    pub needs_block_refresh: Option<bool>,
    #[serde(skip_serializing)]
    pub resendable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipients: Option<CampaignRecipients>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<CampaignSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<Tracking>,
    #[serde(skip_serializing)]
    pub report_summary: Option<ReportSummary>,
}

/// The list and segment a campaign is sent to.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct CampaignRecipients {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    #[serde(skip_serializing)]
    pub list_is_active: Option<bool>,
    #[serde(skip_serializing)]
    pub list_name: Option<String>,
    #[serde(skip_serializing)]
    pub segment_text: Option<String>,
    #[serde(skip_serializing)]
    pub recipient_count: Option<i64>,
    /// Segment conditions, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_opts: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct CampaignSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_text: Option<String>,
    /// Internal title, not shown to recipients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_conversation: Option<bool>,
    /// Merge tag used to personalize the To: field, e.g. `*|FNAME|*`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_footer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_css: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_tweet: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fb_comments: Option<bool>,
    #[serde(skip_serializing)]
    pub drag_and_drop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
}

/// Pre-send review of a campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendChecklist {
    pub is_ready: Option<bool>,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub item_type: Option<ChecklistItemType>,
    pub id: Option<i64>,
    pub heading: Option<String>,
    pub details: Option<String>,
}

/// Rendered content of a campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignContent {
    pub plain_text: Option<String>,
    pub html: Option<String>,
    pub archive_html: Option<String>,
}

/// A comment left on a campaign by a reviewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignFeedback {
    pub feedback_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub block_id: Option<i64>,
    pub message: Option<String>,
    pub is_complete: Option<bool>,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub source: Option<String>,
    pub campaign_id: Option<String>,
}

/// Local input for a new campaign. `campaign_type` is required.
#[derive(Debug, Clone, Default)]
pub struct CampaignDraft {
    pub campaign_type: Option<CampaignType>,
    pub content_type: Option<CampaignContentType>,
    pub recipients: Option<CampaignRecipients>,
    pub settings: Option<CampaignSettings>,
    pub tracking: Option<Tracking>,
}

/// Query parameters for listing campaigns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CampaignListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_fields: Option<Vec<String>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub campaign_type: Option<CampaignType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_send_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since_send_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since_create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_dir: Option<String>,
}

impl Campaign {
    /// Builds a campaign from a draft.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingRequiredField`] if `campaign_type` is
    /// absent.
    pub fn new(draft: CampaignDraft) -> Result<Self, ResourceError> {
        let campaign_type = draft
            .campaign_type
            .ok_or(ResourceError::MissingRequiredField {
                resource: Self::NAME,
                field: "type",
            })?;
        Ok(Self {
            campaign_type: Some(campaign_type),
            content_type: draft.content_type,
            recipients: draft.recipients,
            settings: draft.settings,
            tracking: draft.tracking,
            ..Self::default()
        })
    }

    /// Fetches a campaign by id.
    ///
    /// # Errors
    ///
    /// Returns any transport, remote or parse error.
    pub async fn find(transport: Arc<dyn Transport>, id: &str) -> Result<Entity<Self>, ResourceError> {
        Entity::find(transport, &[("id", id)]).await
    }

    /// Lists campaigns.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Serialization`] if `params` cannot be encoded.
    pub fn list(
        transport: Arc<dyn Transport>,
        params: Option<CampaignListParams>,
    ) -> Result<Paginator<Entity<Self>>, ResourceError> {
        Entity::list(transport, &[], params)
    }
}

impl CampaignDraft {
    /// Validates the draft and wraps it as a detached entity.
    ///
    /// # Errors
    ///
    /// Same as [`Campaign::new`].
    pub fn into_entity(self, transport: Arc<dyn Transport>) -> Result<Entity<Campaign>, ResourceError> {
        Ok(Entity::detached(transport, Campaign::new(self)?))
    }
}

impl Hydrate for Campaign {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            id: fields.string("id")?,
            web_id: fields.int("web_id")?,
            parent_campaign_id: fields.string("parent_campaign_id")?,
            campaign_type: fields.enumeration("type")?,
            create_time: fields.timestamp("create_time")?,
            archive_url: fields.string("archive_url")?,
            long_archive_url: fields.string("long_archive_url")?,
            status: fields.enumeration("status")?,
            emails_sent: fields.int("emails_sent")?,
            send_time: fields.timestamp("send_time")?,
            content_type: fields.enumeration("content_type")?,
            needs_block_refresh: fields.boolean("needs_block_refresh")?,
            resendable: fields.boolean("resendable")?,
            recipients: fields.nested("recipients")?,
            settings: fields.nested("settings")?,
            tracking: fields.nested("tracking")?,
            report_summary: fields.nested("report_summary")?,
        })
    }
}

impl Hydrate for CampaignRecipients {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            list_id: fields.string("list_id")?,
            list_is_active: fields.boolean("list_is_active")?,
            list_name: fields.string("list_name")?,
            segment_text: fields.string("segment_text")?,
            recipient_count: fields.int("recipient_count")?,
            segment_opts: fields.value("segment_opts").cloned(),
        })
    }
}

impl Hydrate for CampaignSettings {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            subject_line: fields.string("subject_line")?,
            preview_text: fields.string("preview_text")?,
            title: fields.string("title")?,
            from_name: fields.string("from_name")?,
            reply_to: fields.string("reply_to")?,
            use_conversation: fields.boolean("use_conversation")?,
            to_name: fields.string("to_name")?,
            folder_id: fields.string("folder_id")?,
            authenticate: fields.boolean("authenticate")?,
            auto_footer: fields.boolean("auto_footer")?,
            inline_css: fields.boolean("inline_css")?,
            auto_tweet: fields.boolean("auto_tweet")?,
            fb_comments: fields.boolean("fb_comments")?,
            drag_and_drop: fields.boolean("drag_and_drop")?,
            template_id: fields.int("template_id")?,
        })
    }
}

impl Hydrate for SendChecklist {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            is_ready: fields.boolean("is_ready")?,
            items: fields.nested_list("items")?.unwrap_or_default(),
        })
    }
}

impl Hydrate for ChecklistItem {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            item_type: fields.enumeration("type")?,
            id: fields.int("id")?,
            heading: fields.string("heading")?,
            details: fields.string("details")?,
        })
    }
}

impl Hydrate for CampaignContent {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            plain_text: fields.string("plain_text")?,
            html: fields.string("html")?,
            archive_html: fields.string("archive_html")?,
        })
    }
}

impl Hydrate for CampaignFeedback {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            feedback_id: fields.int("feedback_id")?,
            parent_id: fields.int("parent_id")?,
            block_id: fields.int("block_id")?,
            message: fields.string("message")?,
            is_complete: fields.boolean("is_complete")?,
            created_by: fields.string("created_by")?,
            created_at: fields.timestamp("created_at")?,
            updated_at: fields.timestamp("updated_at")?,
            source: fields.string("source")?,
            campaign_id: fields.string("campaign_id")?,
        })
    }
}

struct FeedbackEnvelope {
    feedback: Vec<CampaignFeedback>,
}

impl Hydrate for FeedbackEnvelope {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            feedback: fields.nested_list("feedback")?.unwrap_or_default(),
        })
    }
}

impl Resource for Campaign {
    type ListParams = CampaignListParams;

    const NAME: &'static str = "Campaign";
    const COLLECTION_KEY: &'static str = "campaigns";

    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Find,
            &["id"],
            "campaigns/{id}",
        ),
        ResourcePath::new(HttpMethod::Get, ResourceOperation::All, &[], "campaigns"),
        ResourcePath::new(HttpMethod::Post, ResourceOperation::Create, &[], "campaigns"),
        ResourcePath::new(
            HttpMethod::Patch,
            ResourceOperation::Update,
            &["id"],
            "campaigns/{id}",
        ),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Delete,
            &["id"],
            "campaigns/{id}",
        ),
    ];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The type and content type are fixed once the campaign exists.
    fn update_body(&self) -> Result<Value, serde_json::Error> {
        let mut body = self.writable_fields()?;
        if let Value::Object(map) = &mut body {
            map.remove("type");
            map.remove("content_type");
        }
        Ok(body)
    }
}

impl Entity<Campaign> {
    /// Replaces the campaign settings.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::update_with`].
    pub async fn update_settings(&mut self, settings: &CampaignSettings) -> Result<(), ResourceError> {
        let settings =
            serde_json::to_value(settings).map_err(ResourceError::serialization(Campaign::NAME))?;
        self.update_with(json!({ "settings": settings })).await
    }

    /// Sends the campaign immediately.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::perform`].
    pub async fn send(&self) -> Result<(), ResourceError> {
        self.perform("actions/send", None).await.map(drop)
    }

    /// Sends a test email to the given addresses.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::perform`].
    pub async fn send_test_email(
        &self,
        emails: &[&str],
        send_type: CampaignSendType,
    ) -> Result<(), ResourceError> {
        let body = json!({ "test_emails": emails, "send_type": send_type });
        self.perform("actions/test", Some(body)).await.map(drop)
    }

    /// Schedules delivery. The server only accepts times on the quarter
    /// hour.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::perform`].
    pub async fn schedule(&self, at: DateTime<Utc>, timewarp: bool) -> Result<(), ResourceError> {
        let body = json!({
            "schedule_time": at.to_rfc3339_opts(SecondsFormat::Secs, true),
            "timewarp": timewarp,
        });
        self.perform("actions/schedule", Some(body)).await.map(drop)
    }

    /// Unschedules a campaign that has not started sending.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::perform`].
    pub async fn unschedule(&self) -> Result<(), ResourceError> {
        self.perform("actions/unschedule", None).await.map(drop)
    }

    /// Pauses an RSS campaign.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::perform`].
    pub async fn pause(&self) -> Result<(), ResourceError> {
        self.perform("actions/pause", None).await.map(drop)
    }

    /// Resumes a paused RSS campaign.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::perform`].
    pub async fn resume(&self) -> Result<(), ResourceError> {
        self.perform("actions/resume", None).await.map(drop)
    }

    /// Stops a campaign that is currently sending.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::perform`].
    pub async fn cancel_send(&self) -> Result<(), ResourceError> {
        self.perform("actions/cancel-send", None).await.map(drop)
    }

    /// Copies a saved or sent campaign.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::perform_returning`].
    pub async fn replicate(&self) -> Result<Self, ResourceError> {
        self.perform_returning("actions/replicate", None).await
    }

    /// Creates a "resend to non-openers" copy of a sent campaign.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::perform_returning`].
    pub async fn create_resend(&self) -> Result<Self, ResourceError> {
        self.perform_returning("actions/create-resend", None).await
    }

    /// # Errors
    ///
    /// Same as [`Entity::fetch_child`].
    pub async fn send_checklist(&self) -> Result<SendChecklist, ResourceError> {
        self.fetch_child("send-checklist").await
    }

    /// # Errors
    ///
    /// Same as [`Entity::fetch_child`].
    pub async fn content(&self) -> Result<CampaignContent, ResourceError> {
        self.fetch_child("content").await
    }

    /// Returns every feedback comment.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::fetch_child`].
    pub async fn feedback(&self) -> Result<Vec<CampaignFeedback>, ResourceError> {
        let envelope: FeedbackEnvelope = self.fetch_child("feedback").await?;
        Ok(envelope.feedback)
    }

    /// # Errors
    ///
    /// Same as [`Entity::fetch_child`].
    pub async fn feedback_message(&self, feedback_id: i64) -> Result<CampaignFeedback, ResourceError> {
        self.fetch_child(&format!("feedback/{feedback_id}")).await
    }

    /// Adds a campaign-level comment, marked complete.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is
    /// `Persisted`, or any transport, remote or parse error.
    pub async fn create_feedback(&self, message: &str) -> Result<CampaignFeedback, ResourceError> {
        let url = self.child_path("create_feedback", "feedback")?;
        let body = json!({ "block_id": 0, "message": message, "is_complete": true });
        let response = self.transport().post(&url, Some(body)).await?;
        CampaignFeedback::from_value(&response).map_err(ResourceError::parse(Campaign::NAME))
    }

    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is
    /// `Persisted`, or any transport or remote error.
    pub async fn delete_feedback(&self, feedback_id: i64) -> Result<(), ResourceError> {
        let url = self.child_path("delete_feedback", &format!("feedback/{feedback_id}"))?;
        self.transport().delete(&url).await?;
        Ok(())
    }

    /// Lists click statistics for every URL in the campaign.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is `Persisted`.
    pub fn click_reports(&self) -> Result<Paginator<ClickReport>, ResourceError> {
        let url = self.report_path("click_reports", "click-details")?;
        Ok(Paginator::records(
            Arc::clone(self.transport()),
            url,
            "urls_clicked",
        ))
    }

    /// Lists revenue per product for an e-commerce campaign.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is `Persisted`.
    pub fn product_activity(&self) -> Result<Paginator<EcommerceProductActivity>, ResourceError> {
        let url = self.report_path("product_activity", "ecommerce-product-activity")?;
        Ok(Paginator::records(
            Arc::clone(self.transport()),
            url,
            "products",
        ))
    }

    fn report_path(&self, operation: &'static str, suffix: &str) -> Result<String, ResourceError> {
        self.ensure(operation, &[EntityState::Persisted])?;
        let id = self.id().ok_or(ResourceError::PathResolutionFailed {
            resource: Campaign::NAME,
            operation,
        })?;
        Ok(format!("reports/{}/{suffix}", urlencoding::encode(id)))
    }
}
