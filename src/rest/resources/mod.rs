//! Concrete Mailchimp Marketing API resources.
//!
//! Every resource here is a plain record implementing [`Resource`] and
//! [`Hydrate`], plus an `impl Entity<...>` block for its server actions.
//! The lifecycle itself (create, update, delete, refresh) comes from
//! [`Entity`].
//!
//! # Available Resources
//!
//! ## Member
//!
//! List members, addressed by the subscriber hash of their email address.
//! Nested under lists: `lists/{list_id}/members/{subscriber_hash}`
//!
//! ```rust,ignore
//! use mailchimp_api::rest::resources::{Member, MemberListParams, MemberStatus};
//!
//! // Find a member by email
//! let mut member = Member::find(transport.clone(), "57afe96172", "urist@example.com").await?;
//!
//! // List unsubscribed members
//! let params = MemberListParams {
//!     status: Some(MemberStatus::Unsubscribed),
//!     ..Default::default()
//! };
//! let mut members = Member::list(transport.clone(), "57afe96172", Some(params))?;
//! while let Some(member) = members.try_next().await? {
//!     println!("{}", *member);
//! }
//! ```
//!
//! ## Campaign
//!
//! Regular, plain-text, A/B and RSS campaigns, with their send actions and
//! report listings.
//!
//! ```rust,ignore
//! use mailchimp_api::rest::resources::Campaign;
//!
//! let campaign = Campaign::find(transport.clone(), "42694e9e57").await?;
//! let checklist = campaign.send_checklist().await?;
//! if checklist.is_ready == Some(true) {
//!     campaign.send().await?;
//! }
//! ```
//!
//! ## `AutomationEmail`
//!
//! Emails inside an automation workflow:
//! `automations/{workflow_id}/emails/{id}`
//!
//! ```rust,ignore
//! use mailchimp_api::rest::resources::AutomationEmail;
//!
//! let email = AutomationEmail::find(transport.clone(), "4e3c8b1f2d", "b0d7d0a2a1").await?;
//! email.add_subscriber("urist@example.com").await?;
//! ```
//!
//! [`Resource`]: crate::rest::Resource
//! [`Hydrate`]: crate::rest::Hydrate
//! [`Entity`]: crate::rest::Entity

mod automation_email;
mod campaign;
pub mod common;
mod member;
mod report;

pub use automation_email::{
    AutomationDelay, AutomationEmail, AutomationEmailSettings, AutomationStatus,
    AutomationSubscriber, DelayDirection, DelayType, SubscriberQueue,
};
pub use campaign::{
    Campaign, CampaignContent, CampaignContentType, CampaignDraft, CampaignFeedback,
    CampaignListParams, CampaignRecipients, CampaignSendType, CampaignSettings, CampaignStatus,
    CampaignType, ChecklistItem, ChecklistItemType, SendChecklist,
};
pub use common::{EcommerceSummary, ReportSummary, Tracking};
pub use member::{
    EmailType, LastNote, Member, MemberActivity, MemberDraft, MemberListParams, MemberNote,
    MemberStats, MemberStatus, MemberTag, TagStatus,
};
pub use report::{AbSplit, ClickReport, ClickSplit, EcommerceProductActivity};
