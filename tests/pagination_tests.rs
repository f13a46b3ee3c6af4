//! Integration tests for lazy pagination of list endpoints.

use std::sync::Arc;

use futures::TryStreamExt;
use mailchimp_api::rest::resources::{Member, MemberListParams, MemberStatus};
use mailchimp_api::{ApiKey, BaseUrl, HttpClient, MailchimpConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST: &str = "57afe96172";

fn transport_for(server: &MockServer, page_size: u32) -> Arc<HttpClient> {
    let config = MailchimpConfig::builder()
        .api_key(ApiKey::new("0123abcd-us21").unwrap())
        .base_url(BaseUrl::new(format!("{}/3.0", server.uri())).unwrap())
        .page_size(page_size)
        .build()
        .unwrap();
    Arc::new(HttpClient::new(&config).unwrap())
}

fn page(range: std::ops::Range<usize>, total: usize) -> Value {
    let members: Vec<Value> = range
        .map(|i| {
            json!({
                "id": format!("hash{i}"),
                "email_address": format!("member{i}@example.com"),
                "status": "subscribed",
                "list_id": LIST
            })
        })
        .collect();
    json!({"members": members, "list_id": LIST, "total_items": total})
}

async fn mount_page(server: &MockServer, offset: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/3.0/lists/{LIST}/members")))
        .and(query_param("offset", offset))
        .and(query_param("count", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

// ============================================================================
// Traversal
// ============================================================================

#[tokio::test]
async fn test_traversal_requests_each_page_once() {
    let server = MockServer::start().await;
    mount_page(&server, "0", page(0..10, 25)).await;
    mount_page(&server, "10", page(10..20, 25)).await;
    mount_page(&server, "20", page(20..25, 25)).await;

    let mut members = Member::list(transport_for(&server, 10), LIST, None).unwrap();
    let mut emails = Vec::new();
    while let Some(member) = members.try_next().await.unwrap() {
        emails.push(member.email_address.clone().unwrap());
    }

    assert_eq!(emails.len(), 25);
    assert_eq!(emails[0], "member0@example.com");
    assert_eq!(emails[24], "member24@example.com");
    assert_eq!(members.requests_made(), 3);
    assert_eq!(members.total_items(), Some(25));
}

#[tokio::test]
async fn test_empty_collection_makes_one_request() {
    let server = MockServer::start().await;
    mount_page(&server, "0", page(0..0, 0)).await;

    let members = Member::list(transport_for(&server, 10), LIST, None)
        .unwrap()
        .collect_all()
        .await
        .unwrap();

    assert!(members.is_empty());
}

#[tokio::test]
async fn test_filters_are_sent_with_every_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/3.0/lists/{LIST}/members")))
        .and(query_param("status", "unsubscribed"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0..10, 12)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/3.0/lists/{LIST}/members")))
        .and(query_param("status", "unsubscribed"))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(10..12, 12)))
        .expect(1)
        .mount(&server)
        .await;

    let params = MemberListParams {
        status: Some(MemberStatus::Unsubscribed),
        ..MemberListParams::default()
    };
    let members: Vec<_> = Member::list(transport_for(&server, 10), LIST, Some(params))
        .unwrap()
        .into_stream()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(members.len(), 12);
}

#[tokio::test]
async fn test_page_error_ends_traversal() {
    let server = MockServer::start().await;
    mount_page(&server, "0", page(0..10, 30)).await;
    Mock::given(method("GET"))
        .and(path(format!("/3.0/lists/{LIST}/members")))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "title": "Forbidden",
            "status": 403,
            "detail": "You do not have access to this list."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut members = Member::list(transport_for(&server, 10), LIST, None).unwrap();
    for _ in 0..10 {
        assert!(members.try_next().await.unwrap().is_some());
    }

    assert!(members.try_next().await.is_err());
    assert!(members.try_next().await.unwrap().is_none());
    assert_eq!(members.requests_made(), 2);
}
