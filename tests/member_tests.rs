//! Integration tests for list member resources.
//!
//! These tests drive the full stack (entity lifecycle, path building,
//! HTTP client) against a local mock server.

use std::sync::Arc;

use mailchimp_api::rest::resources::{Member, MemberDraft, MemberStatus, TagStatus};
use mailchimp_api::rest::subscriber_hash;
use mailchimp_api::{ApiKey, BaseUrl, EntityState, HttpClient, MailchimpConfig, ResourceError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST: &str = "57afe96172";

fn transport_for(server: &MockServer) -> Arc<HttpClient> {
    let config = MailchimpConfig::builder()
        .api_key(ApiKey::new("0123abcd-us21").unwrap())
        .base_url(BaseUrl::new(format!("{}/3.0", server.uri())).unwrap())
        .build()
        .unwrap();
    Arc::new(HttpClient::new(&config).unwrap())
}

fn member_body(id: &str, email: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "email_address": email,
        "unique_email_id": "882e9bec19",
        "status": status,
        "merge_fields": {"FNAME": "", "LNAME": ""},
        "stats": {"avg_open_rate": 0, "avg_click_rate": 0},
        "timestamp_signup": "",
        "timestamp_opt": "2017-02-02T21:17:45+00:00",
        "member_rating": 2,
        "last_changed": "2017-02-02T21:17:45+00:00",
        "vip": false,
        "tags_count": 0,
        "tags": [],
        "list_id": LIST
    })
}

fn draft(email: &str) -> MemberDraft {
    MemberDraft {
        list_id: Some(LIST.to_string()),
        email_address: Some(email.to_string()),
        status: Some(MemberStatus::Subscribed),
        ..MemberDraft::default()
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_create_update_delete_lifecycle() {
    let server = MockServer::start().await;
    let member_path = format!("/3.0/lists/{LIST}/members/h1");

    Mock::given(method("POST"))
        .and(path(format!("/3.0/lists/{LIST}/members")))
        .and(body_json(json!({"email_address": "a@b.com", "status": "subscribed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(member_body("h1", "a@b.com", "subscribed")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(member_path.as_str()))
        .and(body_json(json!({"status": "unsubscribed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(member_body("h1", "a@b.com", "unsubscribed")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(member_path.as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut member = draft("a@b.com").into_entity(transport_for(&server)).unwrap();
    assert_eq!(member.state(), EntityState::Detached);

    member.create().await.unwrap();
    assert_eq!(member.state(), EntityState::Persisted);
    assert_eq!(member.id(), Some("h1"));

    member.change_status(MemberStatus::Unsubscribed).await.unwrap();
    assert_eq!(member.status, Some(MemberStatus::Unsubscribed));
    assert_eq!(member.id(), Some("h1"));

    member.delete().await.unwrap();
    assert_eq!(member.state(), EntityState::Deleted);

    // Rejected locally; the PATCH mock's expect(1) would fail otherwise.
    let result = member.change_status(MemberStatus::Subscribed).await;
    assert!(matches!(
        result,
        Err(ResourceError::InvalidState {
            state: EntityState::Deleted,
            ..
        })
    ));
}

#[tokio::test]
async fn test_add_or_update_is_idempotent_on_email() {
    let server = MockServer::start().await;
    let hash = subscriber_hash("Urist.McVankab@FreddiesJokes.com");
    assert_eq!(hash, "62eeb292278cc15f5817cb78f7790b08");

    Mock::given(method("PUT"))
        .and(path(format!("/3.0/lists/{LIST}/members/{hash}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(member_body(
            &hash,
            "urist.mcvankab@freddiesjokes.com",
            "subscribed",
        )))
        .expect(2)
        .mount(&server)
        .await;
    let transport = transport_for(&server);

    let mut first = draft("Urist.McVankab@FreddiesJokes.com")
        .into_entity(transport.clone())
        .unwrap();
    first.add_or_update().await.unwrap();

    let mut second = draft("urist.mcvankab@freddiesjokes.com")
        .into_entity(transport)
        .unwrap();
    second.add_or_update().await.unwrap();

    assert_eq!(first.id(), second.id());
    assert_eq!(first.state(), EntityState::Persisted);
}

#[tokio::test]
async fn test_validation_error_keeps_entity_detached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/3.0/lists/{LIST}/members")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "type": "https://mailchimp.com/developer/marketing/docs/errors/",
            "title": "Invalid Resource",
            "status": 400,
            "detail": "The resource submitted could not be validated.",
            "instance": "a1b2c3",
            "errors": [{"field": "email_address", "message": "This value should be a valid email."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut member = draft("a@b.com").into_entity(transport_for(&server)).unwrap();
    let result = member.create().await;

    match result {
        Err(ResourceError::Remote(e)) => {
            assert!(e.is_validation());
            assert_eq!(e.title.as_deref(), Some("Invalid Resource"));
            assert_eq!(
                e.field_errors.get("email_address").map(Vec::len),
                Some(1)
            );
            assert_eq!(e.request_id.as_deref(), Some("a1b2c3"));
        }
        other => panic!("Expected remote validation error, got {other:?}"),
    }
    assert_eq!(member.state(), EntityState::Detached);
    assert_eq!(member.id(), None);
}

#[tokio::test]
async fn test_find_missing_member_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/3.0/lists/{LIST}/members/{}",
            subscriber_hash("nobody@example.com")
        )))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "title": "Resource Not Found",
            "status": 404,
            "detail": "The requested resource could not be found."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = Member::find(transport_for(&server), LIST, "nobody@example.com").await;

    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_tags_are_posted_without_local_change() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/3.0/lists/{LIST}/members/h1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(member_body("h1", "a@b.com", "subscribed")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/3.0/lists/{LIST}/members/h1/tags")))
        .and(body_json(json!({"tags": [{"name": "customer", "status": "active"}]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let member = Member::find(transport_for(&server), LIST, "h1").await.unwrap();
    member.apply_tag("customer", TagStatus::Active).await.unwrap();

    assert!(!member.has_tag("customer"));
    assert_eq!(member.tags_count, Some(0));
}
