//! List member resource implementation.
//!
//! Members are addressed by the MD5 hash of their lowercased email address
//! (see [`subscriber_hash`]), so a member can be fetched or upserted without
//! ever having seen its server-issued id.
//!
//! # Example
//!
//! ```rust,ignore
//! use mailchimp_api::rest::resources::{Member, MemberStatus, TagStatus};
//!
//! let mut member = Member::find(transport, "57afe96172", "Urist@Example.com").await?;
//! member.apply_tag("customer", TagStatus::Active).await?;
//! member.change_status(MemberStatus::Unsubscribed).await?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::{json, Value};

use crate::clients::{HttpMethod, Transport};
use crate::rest::{
    subscriber_hash, wire_enum, Entity, EntityState, FieldReader, Hydrate, Paginator, ParseError, RawRecord,
    Resource, ResourceError, ResourceOperation, ResourcePath,
};

/// Embedded tag lists are truncated at this many entries.
const EMBEDDED_TAG_LIMIT: usize = 50;

wire_enum! {
    /// Subscription status of a list member.
    pub enum MemberStatus {
        Subscribed => "subscribed",
        Unsubscribed => "unsubscribed",
        Cleaned => "cleaned",
        Pending => "pending",
        Transactional => "transactional",
        Archived => "archived",
    }
}

wire_enum! {
    /// Email format a member asked to receive.
    pub enum EmailType {
        Html => "html",
        Text => "text",
    }
}

wire_enum! {
    /// Whether a tag is being added to or removed from a member.
    pub enum TagStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

/// A subscriber on a list (audience).
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct Member {
    /// The subscriber hash.
    #[serde(skip_serializing)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing)]
    pub unique_email_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_type: Option<EmailType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MemberStatus>,
    /// Status applied by an upsert when the member does not exist yet.
    /// Never returned by the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_if_new: Option<MemberStatus>,
    #[serde(skip_serializing)]
    pub unsubscribe_reason: Option<String>,
    /// Audience field values keyed by merge tag. Values are passed through
    /// untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_fields: Option<RawRecord>,
    /// Interest subscriptions keyed by interest id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<BTreeMap<String, bool>>,
    #[serde(skip_serializing)]
    pub stats: Option<MemberStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_signup: Option<String>,
    #[serde(
        serialize_with = "crate::rest::serialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp_signup: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_opt: Option<String>,
    #[serde(
        serialize_with = "crate::rest::serialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp_opt: Option<DateTime<FixedOffset>>,
    /// Star rating, 1 to 5.
    #[serde(skip_serializing)]
    pub member_rating: Option<i64>,
    #[serde(skip_serializing)]
    pub last_changed: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vip: Option<bool>,
    #[serde(skip_serializing)]
    pub email_client: Option<String>,
    #[serde(skip_serializing)]
    pub last_note: Option<LastNote>,
    #[serde(skip_serializing)]
    pub tags_count: Option<i64>,
    /// Up to 50 tags; see [`Entity::<Member>::all_tags`] for the full list.
    #[serde(skip_serializing)]
    pub tags: Option<Vec<MemberTag>>,
    #[serde(skip_serializing)]
    pub list_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberStats {
    pub avg_open_rate: Option<f64>,
    pub avg_click_rate: Option<f64>,
}

/// The most recent note added about a member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastNote {
    pub note_id: Option<i64>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub created_by: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberTag {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub date_added: Option<DateTime<FixedOffset>>,
}

/// A note attached to a member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberNote {
    pub id: Option<i64>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub created_by: Option<String>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub note: Option<String>,
    pub list_id: Option<String>,
    pub email_id: Option<String>,
}

/// One event from a member's recent activity feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberActivity {
    pub action: Option<String>,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub url: Option<String>,
    pub activity_type: Option<String>,
    pub campaign_id: Option<String>,
    pub title: Option<String>,
    pub parent_campaign: Option<String>,
}

/// Local input for a new member.
///
/// `list_id`, `email_address` and `status` are required by [`Member::new`].
#[derive(Debug, Clone, Default)]
pub struct MemberDraft {
    pub list_id: Option<String>,
    pub email_address: Option<String>,
    pub email_type: Option<EmailType>,
    pub status: Option<MemberStatus>,
    pub status_if_new: Option<MemberStatus>,
    pub merge_fields: Option<RawRecord>,
    pub interests: Option<BTreeMap<String, bool>>,
    pub language: Option<String>,
    pub vip: Option<bool>,
    pub ip_signup: Option<String>,
    pub timestamp_signup: Option<DateTime<FixedOffset>>,
    pub ip_opt: Option<String>,
    pub timestamp_opt: Option<DateTime<FixedOffset>>,
    /// Tag names applied on creation.
    pub tags: Vec<String>,
}

/// Query parameters for listing members.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemberListParams {
    /// Fields to return (comma-separated on the wire).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_type: Option<EmailType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MemberStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since_last_changed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_last_changed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vip_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_dir: Option<String>,
}

impl Member {
    /// Builds a member from a draft.
    ///
    /// The id is derived from the email address.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingRequiredField`] if `list_id`,
    /// `email_address` or `status` is absent.
    pub fn new(draft: MemberDraft) -> Result<Self, ResourceError> {
        let missing = |field| ResourceError::MissingRequiredField {
            resource: Self::NAME,
            field,
        };
        let list_id = draft.list_id.ok_or_else(|| missing("list_id"))?;
        let email_address = draft.email_address.ok_or_else(|| missing("email_address"))?;
        let status = draft.status.ok_or_else(|| missing("status"))?;

        let tags = draft
            .tags
            .into_iter()
            .map(|name| MemberTag {
                name: Some(name),
                ..MemberTag::default()
            })
            .collect();

        Ok(Self {
            id: Some(subscriber_hash(&email_address)),
            email_address: Some(email_address),
            email_type: draft.email_type,
            status: Some(status),
            status_if_new: draft.status_if_new,
            merge_fields: draft.merge_fields,
            interests: draft.interests,
            ip_signup: draft.ip_signup,
            timestamp_signup: draft.timestamp_signup,
            ip_opt: draft.ip_opt,
            timestamp_opt: draft.timestamp_opt,
            language: draft.language,
            vip: draft.vip,
            tags: Some(tags),
            list_id: Some(list_id),
            ..Self::default()
        })
    }

    /// Returns `true` if the embedded tag list contains `name`.
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags
            .iter()
            .flatten()
            .any(|tag| tag.name.as_deref() == Some(name))
    }

    /// Fetches a member by email address or subscriber hash.
    ///
    /// # Errors
    ///
    /// Returns any transport, remote or parse error.
    pub async fn find(
        transport: Arc<dyn Transport>,
        list_id: &str,
        email_or_hash: &str,
    ) -> Result<Entity<Self>, ResourceError> {
        let hash = subscriber_hash(email_or_hash);
        Entity::find(transport, &[("list_id", list_id), ("id", &hash)]).await
    }

    /// Lists the members of a list.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Serialization`] if `params` cannot be encoded.
    pub fn list(
        transport: Arc<dyn Transport>,
        list_id: &str,
        params: Option<MemberListParams>,
    ) -> Result<Paginator<Entity<Self>>, ResourceError> {
        Entity::list(transport, &[("list_id", list_id)], params)
    }
}

impl MemberDraft {
    /// Validates the draft and wraps it as a detached entity.
    ///
    /// # Errors
    ///
    /// Same as [`Member::new`].
    pub fn into_entity(self, transport: Arc<dyn Transport>) -> Result<Entity<Member>, ResourceError> {
        Ok(Entity::detached(transport, Member::new(self)?))
    }
}

impl Hydrate for Member {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            id: fields.string("id")?,
            email_address: fields.string("email_address")?,
            unique_email_id: fields.string("unique_email_id")?,
            email_type: fields.enumeration("email_type")?,
            status: fields.enumeration("status")?,
            status_if_new: None,
            unsubscribe_reason: fields.string("unsubscribe_reason")?,
            merge_fields: fields.object("merge_fields")?.cloned(),
            interests: fields.bool_map("interests")?,
            stats: fields.nested("stats")?,
            ip_signup: fields.string("ip_signup")?,
            timestamp_signup: fields.timestamp("timestamp_signup")?,
            ip_opt: fields.string("ip_opt")?,
            timestamp_opt: fields.timestamp("timestamp_opt")?,
            member_rating: fields.int("member_rating")?,
            last_changed: fields.timestamp("last_changed")?,
            language: fields.string("language")?,
            vip: fields.boolean("vip")?,
            email_client: fields.string("email_client")?,
            last_note: fields.nested("last_note")?,
            tags_count: fields.int("tags_count")?,
            tags: fields.nested_list("tags")?,
            list_id: fields.string("list_id")?,
        })
    }
}

impl Hydrate for MemberStats {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            avg_open_rate: fields.double("avg_open_rate")?,
            avg_click_rate: fields.double("avg_click_rate")?,
        })
    }
}

impl Hydrate for LastNote {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            note_id: fields.int("note_id")?,
            created_at: fields.timestamp("created_at")?,
            created_by: fields.string("created_by")?,
            note: fields.string("note")?,
        })
    }
}

impl Hydrate for MemberTag {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            id: fields.int("id")?,
            name: fields.string("name")?,
            date_added: fields.timestamp("date_added")?,
        })
    }
}

impl Hydrate for MemberNote {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            id: fields.int("id")?,
            created_at: fields.timestamp("created_at")?,
            created_by: fields.string("created_by")?,
            updated_at: fields.timestamp("updated_at")?,
            note: fields.string("note")?,
            list_id: fields.string("list_id")?,
            email_id: fields.string("email_id")?,
        })
    }
}

impl Hydrate for MemberActivity {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            action: fields.string("action")?,
            timestamp: fields.timestamp("timestamp")?,
            url: fields.string("url")?,
            activity_type: fields.string("type")?,
            campaign_id: fields.string("campaign_id")?,
            title: fields.string("title")?,
            parent_campaign: fields.string("parent_campaign")?,
        })
    }
}

/// The `/activity` envelope.
struct ActivityFeed {
    activity: Vec<MemberActivity>,
}

impl Hydrate for ActivityFeed {
    fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            activity: fields.nested_list("activity")?.unwrap_or_default(),
        })
    }
}

impl Resource for Member {
    type ListParams = MemberListParams;

    const NAME: &'static str = "Member";
    const COLLECTION_KEY: &'static str = "members";

    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Find,
            &["list_id", "id"],
            "lists/{list_id}/members/{id}",
        ),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::All,
            &["list_id"],
            "lists/{list_id}/members",
        ),
        ResourcePath::new(
            HttpMethod::Post,
            ResourceOperation::Create,
            &["list_id"],
            "lists/{list_id}/members",
        ),
        ResourcePath::new(
            HttpMethod::Patch,
            ResourceOperation::Update,
            &["list_id", "id"],
            "lists/{list_id}/members/{id}",
        ),
        ResourcePath::new(
            HttpMethod::Put,
            ResourceOperation::Upsert,
            &["list_id", "id"],
            "lists/{list_id}/members/{id}",
        ),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Delete,
            &["list_id", "id"],
            "lists/{list_id}/members/{id}",
        ),
    ];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn parent_ids(&self) -> Vec<(&'static str, String)> {
        self.list_id
            .iter()
            .map(|id| ("list_id", id.clone()))
            .collect()
    }

    fn natural_key(&self) -> Option<String> {
        self.email_address.as_deref().map(subscriber_hash)
    }

    /// Adds the embedded tag names, which only the create endpoint accepts.
    fn create_body(&self) -> Result<Value, serde_json::Error> {
        let mut body = self.writable_fields()?;
        let names: Vec<&str> = self
            .tags
            .iter()
            .flatten()
            .filter_map(|tag| tag.name.as_deref())
            .collect();
        if let (Value::Object(map), false) = (&mut body, names.is_empty()) {
            map.insert("tags".to_string(), json!(names));
        }
        Ok(body)
    }

    /// Defaults `status_if_new` to `subscribed`.
    fn upsert_body(&self) -> Result<Value, serde_json::Error> {
        let mut body = self.writable_fields()?;
        if let Value::Object(map) = &mut body {
            map.entry("status_if_new")
                .or_insert_with(|| json!(MemberStatus::Subscribed));
        }
        Ok(body)
    }
}

impl Entity<Member> {
    /// Changes the subscription status and re-hydrates from the response.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::update_with`].
    pub async fn change_status(&mut self, status: MemberStatus) -> Result<(), ResourceError> {
        self.update_with(json!({ "status": status })).await
    }

    /// Changes the member's email address.
    ///
    /// The subscriber hash is derived from the email address, so the member
    /// is re-addressed by the server. The member is returned as a new entity
    /// under its new id; this entity is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is
    /// `Persisted`, or any transport, remote or parse error.
    pub async fn change_email_address(&self, email_address: &str) -> Result<Self, ResourceError> {
        let url = self.path("change_email_address")?;
        let response = self
            .transport()
            .patch(&url, json!({ "email_address": email_address }))
            .await?;
        Self::from_raw(Arc::clone(self.transport()), &response)
    }

    /// Adds or removes one tag. The embedded tag list is not modified.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::perform`].
    pub async fn apply_tag(&self, name: &str, status: TagStatus) -> Result<(), ResourceError> {
        self.apply_tags(&[(name, status)]).await
    }

    /// Adds or removes tags in bulk. Unknown tags set active are created.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::perform`].
    pub async fn apply_tags(&self, tags: &[(&str, TagStatus)]) -> Result<(), ResourceError> {
        let tags: Vec<Value> = tags
            .iter()
            .map(|(name, status)| json!({ "name": name, "status": status }))
            .collect();
        self.perform("tags", Some(json!({ "tags": tags }))).await?;
        Ok(())
    }

    /// Returns the member's last 50 events.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::fetch_child`].
    pub async fn activities(&self) -> Result<Vec<MemberActivity>, ResourceError> {
        let feed: ActivityFeed = self.fetch_child("activity").await?;
        Ok(feed.activity)
    }

    /// Lists the notes on this member.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is `Persisted`.
    pub fn notes(&self) -> Result<Paginator<MemberNote>, ResourceError> {
        self.child_list("notes", "notes")
    }

    /// Fetches one note.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::fetch_child`].
    pub async fn note(&self, note_id: i64) -> Result<MemberNote, ResourceError> {
        self.fetch_child(&format!("notes/{note_id}")).await
    }

    /// Adds a note. Notes are limited to 1,000 characters.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is
    /// `Persisted`, or any transport, remote or parse error.
    pub async fn create_note(&self, note: &str) -> Result<MemberNote, ResourceError> {
        let url = self.child_path("create_note", "notes")?;
        let response = self
            .transport()
            .post(&url, Some(json!({ "note": note })))
            .await?;
        MemberNote::from_value(&response).map_err(ResourceError::parse(Member::NAME))
    }

    /// Replaces the text of a note.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::<Member>::create_note`].
    pub async fn update_note(&self, note_id: i64, note: &str) -> Result<MemberNote, ResourceError> {
        let url = self.child_path("update_note", &format!("notes/{note_id}"))?;
        let response = self
            .transport()
            .patch(&url, json!({ "note": note }))
            .await?;
        MemberNote::from_value(&response).map_err(ResourceError::parse(Member::NAME))
    }

    /// Deletes a note.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is
    /// `Persisted`, or any transport or remote error.
    pub async fn delete_note(&self, note_id: i64) -> Result<(), ResourceError> {
        let url = self.child_path("delete_note", &format!("notes/{note_id}"))?;
        self.transport().delete(&url).await?;
        Ok(())
    }

    /// Lists every tag on this member.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidState`] unless the entity is `Persisted`.
    pub fn tags(&self) -> Result<Paginator<MemberTag>, ResourceError> {
        self.child_list("tags", "tags")
    }

    /// Returns every tag on this member.
    ///
    /// The embedded list is complete when it holds fewer than 50 entries, in
    /// which case no request is made.
    ///
    /// # Errors
    ///
    /// Same as [`Paginator::try_next`].
    pub async fn all_tags(&self) -> Result<Vec<MemberTag>, ResourceError> {
        self.ensure("all_tags", &[EntityState::Persisted])?;
        match &self.resource().tags {
            Some(tags) if tags.len() < EMBEDDED_TAG_LIMIT => Ok(tags.clone()),
            _ => self.tags()?.collect_all().await,
        }
    }

    /// Permanently erases the member and its data. The entity becomes
    /// `Deleted`.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::perform`]; on error the entity stays `Persisted`.
    pub async fn delete_permanent(&mut self) -> Result<(), ResourceError> {
        self.perform("actions/delete-permanent", None).await?;
        self.mark_deleted();
        Ok(())
    }
}
