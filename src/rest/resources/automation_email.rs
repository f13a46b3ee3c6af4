//! Automation email resource implementation.
//!
//! Automation emails belong to a workflow and are created by the web
//! application, never through the API; only update, delete and the queue
//! operations are available.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::json;

use crate::clients::{HttpMethod, Transport};
use crate::rest::resources::campaign::CampaignRecipients;
use crate::rest::resources::common::{ReportSummary, Tracking};
use crate::rest::{
    subscriber_hash, wire_enum, Entity, FieldReader, Hydrate, Paginator, ParseError, Resource,
    ResourceError, ResourceOperation, ResourcePath,
};

wire_enum! {
    pub enum AutomationStatus {
        Save => "save",
        Paused => "paused",
        Sending => "sending",
    }
}

wire_enum! {
    pub enum DelayType {
        Now => "now",
        Day => "day",
        Hour => "hour",
        Week => "week",
    }
}

wire_enum! {
    pub enum DelayDirection {
        Before => "before",
        After => "after",
    }
}

/// One email in an automation workflow.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct AutomationEmail {
    #[serde(skip_serializing)]
    pub id: Option<String>,
    #[serde(skip_serializing)]
    pub web_id: Option<i64>,
    #[serde(skip_serializing)]
    pub workflow_id: Option<String>,
    /// Position in the workflow.
    #[serde(skip_serializing)]
    pub position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<AutomationDelay>,
    #[serde(skip_serializing)]
    pub create_time: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing)]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing)]
    pub archive_url: Option<String>,
    #[serde(skip_serializing)]
    pub status: Option<AutomationStatus>,
    #[serde(skip_serializing)]
    pub emails_sent: Option<i64>,
    #[serde(skip_serializing)]
    pub send_time: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing)]
    pub content_type: Option<String>,
    #[serde(skip_serializing)]
    pub needs_block_refresh: Option<bool>,
    #[serde(skip_serializing)]
    pub has_logo_merge_tag: Option<bool>,
    #[serde(skip_serializing)]
    pub recipients: Option<CampaignRecipients>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<AutomationEmailSettings>,
    #[serde(skip_serializing)]
    pub tracking: Option<Tracking>,
    #[serde(skip_serializing)]
    pub report_summary: Option<ReportSummary>,
}

/// When the email is sent relative to its trigger.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct AutomationDelay {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub delay_type: Option<DelayType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<DelayDirection>,
    /// The trigger, e.g. `signup` or `previous_campaign_sent`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing)]
    pub action_description: Option<String>,
    #[serde(skip_serializing)]
    pub full_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct AutomationEmailSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
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
    pub template_id: Option<i64>,
    #[serde(skip_serializing)]
    pub drag_and_drop: Option<bool>,
}

/// A subscriber waiting in an automation email's queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomationSubscriber {
    pub id: Option<String>,
    pub workflow_id: Option<String>,
    pub email_id: Option<String>,
    pub list_id: Option<String>,
    pub list_is_active: Option<bool>,
    pub email_address: Option<String>,
    pub next_send: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriberQueue {
    pub workflow_id: Option<String>,
    pub email_id: Option<String>,
    pub queue: Vec<AutomationSubscriber>,
    pub total_items: Option<i64>,
}

impl AutomationEmail {
    /// # Errors
    ///
    /// Returns any transport, remote or parse error.
    pub async fn find(
        transport: Arc<dyn Transport>,
        workflow_id: &str,
        id: &str,
    ) -> Result<Entity<Self>, ResourceError> {
        Entity::find(transport, &[("workflow_id", workflow_id), ("id", id)]).await
    }

    /// Lists the emails of a workflow.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::PathResolutionFailed`] only if the path table
    /// is inconsistent.
    pub fn list(
        transport: Arc<dyn Transport>,
        workflow_id: &str,
    ) -> Result<Paginator<Entity<Self>>, ResourceError> {
        Entity::list(transport, &[("workflow_id", workflow_id)], None)
    }
}

impl Hydrate for AutomationEmail {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            id: fields.string("id")?,
            web_id: fields.int("web_id")?,
            workflow_id: fields.string("workflow_id")?,
            position: fields.int("position")?,
            delay: fields.nested("delay")?,
            create_time: fields.timestamp("create_time")?,
            start_time: fields.timestamp("start_time")?,
            archive_url: fields.string("archive_url")?,
            status: fields.enumeration("status")?,
            emails_sent: fields.int("emails_sent")?,
            send_time: fields.timestamp("send_time")?,
            content_type: fields.string("content_type")?,
            needs_block_refresh: fields.boolean("needs_block_refresh")?,
            has_logo_merge_tag: fields.boolean("has_logo_merge_tag")?,
            recipients: fields.nested("recipients")?,
            settings: fields.nested("settings")?,
            tracking: fields.nested("tracking")?,
            report_summary: fields.nested("report_summary")?,
        })
    }
}

impl Hydrate for AutomationDelay {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            amount: fields.int("amount")?,
            delay_type: fields.enumeration("type")?,
            direction: fields.enumeration("direction")?,
            action: fields.string("action")?,
            action_description: fields.string("action_description")?,
            full_description: fields.string("full_description")?,
        })
    }
}

impl Hydrate for AutomationEmailSettings {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            subject_line: fields.string("subject_line")?,
            preview_text: fields.string("preview_text")?,
            title: fields.string("title")?,
            from_name: fields.string("from_name")?,
            reply_to: fields.string("reply_to")?,
            authenticate: fields.boolean("authenticate")?,
            auto_footer: fields.boolean("auto_footer")?,
            inline_css: fields.boolean("inline_css")?,
            auto_tweet: fields.boolean("auto_tweet")?,
            fb_comments: fields.boolean("fb_comments")?,
            template_id: fields.int("template_id")?,
            drag_and_drop: fields.boolean("drag_and_drop")?,
        })
    }
}

impl Hydrate for AutomationSubscriber {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            id: fields.string("id")?,
            workflow_id: fields.string("workflow_id")?,
            email_id: fields.string("email_id")?,
            list_id: fields.string("list_id")?,
            list_is_active: fields.boolean("list_is_active")?,
            email_address: fields.string("email_address")?,
            next_send: fields.timestamp("next_send")?,
        })
    }
}

impl Hydrate for SubscriberQueue {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            workflow_id: fields.string("workflow_id")?,
            email_id: fields.string("email_id")?,
            queue: fields.nested_list("queue")?.unwrap_or_default(),
            total_items: fields.int("total_items")?,
        })
    }
}

impl Resource for AutomationEmail {
    type ListParams = ();

    const NAME: &'static str = "AutomationEmail";
    const COLLECTION_KEY: &'static str = "emails";

    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Find,
            &["workflow_id", "id"],
            "automations/{workflow_id}/emails/{id}",
        ),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::All,
            &["workflow_id"],
            "automations/{workflow_id}/emails",
        ),
        ResourcePath::new(
            HttpMethod::Patch,
            ResourceOperation::Update,
            &["workflow_id", "id"],
            "automations/{workflow_id}/emails/{id}",
        ),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Delete,
            &["workflow_id", "id"],
            "automations/{workflow_id}/emails/{id}",
        ),
    ];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn parent_ids(&self) -> Vec<(&'static str, String)> {
        self.workflow_id
            .iter()
            .map(|id| ("workflow_id", id.clone()))
            .collect()
    }
}

impl Entity<AutomationEmail> {
    /// # Errors
    ///
    /// Same as [`Entity::perform`].
    pub async fn pause(&self) -> Result<(), ResourceError> {
        self.perform("actions/pause", None).await.map(drop)
    }

    /// # Errors
    ///
    /// Same as [`Entity::perform`].
    pub async fn start(&self) -> Result<(), ResourceError> {
        self.perform("actions/start", None).await.map(drop)
    }

    /// Returns the subscribers queued for this email.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::fetch_child`].
    pub async fn subscriber_queue(&self) -> Result<SubscriberQueue, ResourceError> {
        self.fetch_child("queue").await
    }

    /// Looks up one queued subscriber by email address or subscriber hash.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::fetch_child`].
    pub async fn subscriber(&self, email_or_hash: &str) -> Result<AutomationSubscriber, ResourceError> {
        let hash = subscriber_hash(email_or_hash);
        self.fetch_child(&format!("queue/{}", urlencoding::encode(&hash)))
            .await
    }

    /// Adds a list member to the queue, bypassing the workflow's trigger.
    ///
    /// The server documents a subscriber record in the response but usually
    /// answers with no content, so nothing is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is
    /// `Persisted`, or any transport or remote error.
    pub async fn add_subscriber(&self, email_address: &str) -> Result<(), ResourceError> {
        let url = self.child_path("add_subscriber", "queue")?;
        self.transport()
            .post(&url, Some(json!({ "email_address": email_address })))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::MockTransport;
    use crate::rest::EntityState;
    use serde_json::Value;

    fn email_json() -> Value {
        json!({
            "id": "b0d7d0a2a1",
            "web_id": 33,
            "workflow_id": "4e3c8b1f2d",
            "position": 1,
            "delay": {
                "amount": 1,
                "type": "day",
                "direction": "after",
                "action": "signup",
                "action_description": "after signup",
                "full_description": "1 day after signup"
            },
            "create_time": "2017-03-01T12:00:00+00:00",
            "start_time": "",
            "status": "sending",
            "emails_sent": 12,
            "content_type": "template",
            "has_logo_merge_tag": false,
            "recipients": {"list_id": "57afe96172", "list_name": "Freddie's Jokes"},
            "settings": {
                "subject_line": "Welcome",
                "title": "Welcome email",
                "from_name": "Freddie",
                "reply_to": "freddie@example.com",
                "authenticate": true,
                "template_id": 7,
                "drag_and_drop": true
            },
            "tracking": {"opens": true},
            "report_summary": {"opens": 4, "open_rate": 0.33}
        })
    }

    fn persisted(transport: &Arc<MockTransport>) -> Entity<AutomationEmail> {
        Entity::from_raw(transport.clone(), &email_json()).unwrap()
    }

    #[test]
    fn test_writable_subset_is_settings_and_delay() {
        let raw = email_json();
        let email = AutomationEmail::from_value(&raw).unwrap();

        let written = email.writable_fields().unwrap();

        assert_eq!(
            written,
            json!({
                "delay": {"amount": 1, "type": "day", "direction": "after", "action": "signup"},
                "settings": {
                    "subject_line": "Welcome",
                    "title": "Welcome email",
                    "from_name": "Freddie",
                    "reply_to": "freddie@example.com",
                    "authenticate": true
                }
            })
        );
    }

    #[test]
    fn test_create_has_no_path() {
        let transport = MockTransport::new();
        let mut email = Entity::detached(
            transport.clone(),
            AutomationEmail {
                workflow_id: Some("4e3c8b1f2d".to_string()),
                ..AutomationEmail::default()
            },
        );

        let result = tokio_test::block_on(email.create());

        assert!(matches!(
            result,
            Err(ResourceError::PathResolutionFailed {
                operation: "create",
                ..
            })
        ));
        assert_eq!(email.state(), EntityState::Detached);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_patches_nested_path() {
        let transport = MockTransport::new();
        transport.respond(email_json());
        let mut email = persisted(&transport);
        if let Some(delay) = email.delay.as_mut() {
            delay.amount = Some(2);
        }

        email.update().await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].method, HttpMethod::Patch);
        assert_eq!(calls[0].path, "automations/4e3c8b1f2d/emails/b0d7d0a2a1");
        assert_eq!(
            calls[0].body.as_ref().map(|b| b["delay"]["amount"].clone()),
            Some(json!(2))
        );
    }

    #[tokio::test]
    async fn test_queue_operations() {
        let transport = MockTransport::new();
        transport.respond(json!({}));
        transport.respond(json!({
            "workflow_id": "4e3c8b1f2d",
            "email_id": "b0d7d0a2a1",
            "queue": [{"id": "h1", "email_address": "a@b.com", "next_send": "2017-03-02T12:00:00+00:00"}],
            "total_items": 1
        }));
        transport.respond(json!({"id": "h1", "email_address": "a@b.com"}));
        let email = persisted(&transport);

        email.add_subscriber("a@b.com").await.unwrap();
        let queue = email.subscriber_queue().await.unwrap();
        let one = email.subscriber("A@B.com").await.unwrap();

        assert_eq!(queue.queue.len(), 1);
        assert!(queue.queue[0].next_send.is_some());
        assert_eq!(one.email_address.as_deref(), Some("a@b.com"));

        let calls = transport.calls();
        let base = "automations/4e3c8b1f2d/emails/b0d7d0a2a1/queue";
        assert_eq!(calls[0].path, base);
        assert_eq!(calls[0].body, Some(json!({"email_address": "a@b.com"})));
        assert_eq!(calls[1].path, base);
        assert_eq!(calls[2].path, format!("{base}/{}", subscriber_hash("a@b.com")));
    }

    #[tokio::test]
    async fn test_pause_and_start() {
        let transport = MockTransport::new();
        transport.respond(json!({}));
        transport.respond(json!({}));
        let email = persisted(&transport);

        email.pause().await.unwrap();
        email.start().await.unwrap();

        let calls = transport.calls();
        assert!(calls[0].path.ends_with("/emails/b0d7d0a2a1/actions/pause"));
        assert!(calls[1].path.ends_with("/emails/b0d7d0a2a1/actions/start"));
    }

    #[tokio::test]
    async fn test_list_workflow_emails() {
        let transport = MockTransport::new();
        transport.respond(json!({"emails": [email_json()], "total_items": 1}));

        let emails = AutomationEmail::list(transport.clone(), "4e3c8b1f2d")
            .unwrap()
            .collect_all()
            .await
            .unwrap();

        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].state(), EntityState::Persisted);
        assert_eq!(transport.calls()[0].path, "automations/4e3c8b1f2d/emails");
    }
}
