//! Lazy traversal of offset-paged collection endpoints.
//!
//! List endpoints answer with an envelope such as
//!
//! ```json
//! {"members": [...], "list_id": "57afe96172", "total_items": 250}
//! ```
//!
//! and page with `offset` / `count` query parameters. A [`Paginator`] keeps
//! the cursor for one traversal and fetches the next page only when its
//! buffer runs dry. It stops after a page with zero items, or once the
//! offset reaches the `total_items` reported by the first page.
//!
//! Each page is an independent request. If the collection changes between
//! pages, items may be skipped or repeated; nothing is snapshotted. A
//! paginator cannot be restarted: build a new one to traverse again.
//!
//! # Example
//!
//! ```rust,ignore
//! use mailchimp_api::rest::{Entity, resources::Member};
//!
//! let mut members = Entity::<Member>::list(transport, &[("list_id", "57afe96172")], None)?;
//! while let Some(member) = members.try_next().await? {
//!     println!("{:?}", member.email_address);
//! }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use futures::Stream;
use serde_json::Value;

use crate::clients::{QueryParams, Transport};
use crate::config::MAX_PAGE_SIZE;
use crate::rest::fields::{FieldReader, ParseError};
use crate::rest::hydrate::Hydrate;
use crate::rest::resource::{Entity, Resource};
use crate::rest::ResourceError;

type Decode<T> = fn(&Arc<dyn Transport>, &Value) -> Result<T, ParseError>;

/// A forward-only, single-pass sequence over a paged collection.
pub struct Paginator<T> {
    transport: Arc<dyn Transport>,
    path: String,
    collection_key: &'static str,
    resource: &'static str,
    query: QueryParams,
    offset: u64,
    page_size: u32,
    total_items: Option<u64>,
    buffer: VecDeque<T>,
    requests_made: u32,
    exhausted: bool,
    decode: Decode<T>,
}

impl<T: Hydrate> Paginator<T> {
    /// Creates a paginator over plain records at `path`.
    ///
    /// `collection_key` names the items array of the envelope.
    #[must_use]
    pub fn records(
        transport: Arc<dyn Transport>,
        path: impl Into<String>,
        collection_key: &'static str,
    ) -> Self {
        Self::new(
            transport,
            path.into(),
            collection_key,
            collection_key,
            QueryParams::new(),
            decode_record::<T>,
        )
    }
}

impl<R: Resource> Paginator<Entity<R>> {
    /// Creates a paginator that yields persisted entities.
    pub(crate) fn entities(
        transport: Arc<dyn Transport>,
        path: String,
        collection_key: &'static str,
        resource: &'static str,
        query: QueryParams,
    ) -> Self {
        Self::new(
            transport,
            path,
            collection_key,
            resource,
            query,
            decode_entity::<R>,
        )
    }
}

impl<T> Paginator<T> {
    fn new(
        transport: Arc<dyn Transport>,
        path: String,
        collection_key: &'static str,
        resource: &'static str,
        query: QueryParams,
        decode: Decode<T>,
    ) -> Self {
        let page_size = transport.page_size().clamp(1, MAX_PAGE_SIZE);
        Self {
            transport,
            path,
            collection_key,
            resource,
            query,
            offset: 0,
            page_size,
            total_items: None,
            buffer: VecDeque::new(),
            requests_made: 0,
            exhausted: false,
            decode,
        }
    }

    /// Overrides the number of items requested per page.
    ///
    /// Clamped to `1..=1000`. Only meaningful before the first fetch.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Adds filter or sort parameters sent with every page request.
    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query.extend(query);
        self
    }

    /// Returns the page size in use.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the total reported by the first page, once fetched.
    #[must_use]
    pub const fn total_items(&self) -> Option<u64> {
        self.total_items
    }

    /// Returns the number of page requests issued so far.
    #[must_use]
    pub const fn requests_made(&self) -> u32 {
        self.requests_made
    }

    /// Returns the next item, fetching a page if the buffer is empty.
    ///
    /// Returns `Ok(None)` once the collection is exhausted. After an error
    /// the paginator is exhausted as well.
    ///
    /// # Errors
    ///
    /// Returns any transport or remote error from the page request, or
    /// [`ResourceError::Parse`] if the envelope or an item does not parse.
    pub async fn try_next(&mut self) -> Result<Option<T>, ResourceError> {
        if let Some(item) = self.buffer.pop_front() {
            return Ok(Some(item));
        }
        if self.exhausted {
            return Ok(None);
        }
        if let Err(e) = self.fetch_page().await {
            self.exhausted = true;
            return Err(e);
        }
        Ok(self.buffer.pop_front())
    }

    async fn fetch_page(&mut self) -> Result<(), ResourceError> {
        let mut query = self.query.clone();
        query.insert("offset".to_string(), self.offset.to_string());
        query.insert("count".to_string(), self.page_size.to_string());

        tracing::debug!(
            path = %self.path,
            offset = self.offset,
            count = self.page_size,
            "Fetching page"
        );
        self.requests_made += 1;
        let response = self.transport.get(&self.path, Some(query)).await?;

        let parse = ResourceError::parse(self.resource);
        let fields = FieldReader::from_value(&response).map_err(&parse)?;
        if self.total_items.is_none() {
            self.total_items = fields
                .int("total_items")
                .map_err(&parse)?
                .and_then(|n| u64::try_from(n).ok());
        }

        let key = self.collection_key;
        let items = fields.array(key).map_err(&parse)?.ok_or_else(|| {
            parse(ParseError::MissingField {
                field: key.to_string(),
            })
        })?;
        let page = items
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                (self.decode)(&self.transport, raw).map_err(|e| e.within(&format!("{key}[{i}]")))
            })
            .collect::<Result<Vec<T>, _>>()
            .map_err(&parse)?;

        self.offset += page.len() as u64;
        if page.is_empty() || self.total_items.is_some_and(|total| self.offset >= total) {
            self.exhausted = true;
        }
        self.buffer.extend(page);
        Ok(())
    }

    /// Drains the remaining items into a vector.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    pub async fn collect_all(mut self) -> Result<Vec<T>, ResourceError> {
        let mut all = Vec::new();
        while let Some(item) = self.try_next().await? {
            all.push(item);
        }
        Ok(all)
    }

    /// Converts the paginator into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<T, ResourceError>> {
        futures::stream::try_unfold(self, |mut pager| async move {
            let item = pager.try_next().await?;
            Ok(item.map(|item| (item, pager)))
        })
    }
}

impl<T> fmt::Debug for Paginator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("path", &self.path)
            .field("collection_key", &self.collection_key)
            .field("offset", &self.offset)
            .field("page_size", &self.page_size)
            .field("total_items", &self.total_items)
            .field("buffered", &self.buffer.len())
            .field("requests_made", &self.requests_made)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

fn decode_record<T: Hydrate>(_: &Arc<dyn Transport>, raw: &Value) -> Result<T, ParseError> {
    T::from_value(raw)
}

fn decode_entity<R: Resource>(
    transport: &Arc<dyn Transport>,
    raw: &Value,
) -> Result<Entity<R>, ParseError> {
    R::from_value(raw).map(|resource| Entity::persisted(Arc::clone(transport), resource))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::MockTransport;
    use futures::TryStreamExt;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Item {
        n: i64,
    }

    impl Hydrate for Item {
        fn hydrate(fields: &FieldReader<'_>) -> Result<Self, ParseError> {
            Ok(Self {
                n: fields.int("n")?.unwrap_or_default(),
            })
        }
    }

    fn page(range: std::ops::Range<i64>, total: i64) -> Value {
        let items: Vec<Value> = range.map(|n| json!({"n": n})).collect();
        json!({"items": items, "total_items": total})
    }

    fn numbers(items: &[Item]) -> Vec<i64> {
        items.iter().map(|i| i.n).collect()
    }

    // ========================================================================
    // Page request counts
    // ========================================================================

    #[tokio::test]
    async fn test_partial_last_page_issues_ceil_requests() {
        let transport = MockTransport::with_page_size(10);
        transport.respond(page(0..10, 25));
        transport.respond(page(10..20, 25));
        transport.respond(page(20..25, 25));

        let pager: Paginator<Item> = Paginator::records(transport.clone(), "things", "items");
        let all = pager.collect_all().await.unwrap();

        assert_eq!(numbers(&all), (0..25).collect::<Vec<_>>());
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_exact_multiple_stops_at_total() {
        let transport = MockTransport::with_page_size(10);
        transport.respond(page(0..10, 20));
        transport.respond(page(10..20, 20));

        let mut pager: Paginator<Item> = Paginator::records(transport.clone(), "things", "items");
        let mut seen = 0;
        while pager.try_next().await.unwrap().is_some() {
            seen += 1;
        }

        assert_eq!(seen, 20);
        assert_eq!(pager.requests_made(), 2);
        assert_eq!(pager.total_items(), Some(20));
        assert_eq!(pager.try_next().await.unwrap(), None);
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_collection_issues_one_request() {
        let transport = MockTransport::new();
        transport.respond(page(0..0, 0));

        let pager: Paginator<Item> = Paginator::records(transport.clone(), "things", "items");
        let all = pager.collect_all().await.unwrap();

        assert!(all.is_empty());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_without_total_stops_on_empty_page() {
        let transport = MockTransport::with_page_size(2);
        transport.respond(json!({"items": [{"n": 1}, {"n": 2}]}));
        transport.respond(json!({"items": []}));

        let pager: Paginator<Item> = Paginator::records(transport.clone(), "things", "items");
        let all = pager.collect_all().await.unwrap();

        assert_eq!(numbers(&all), vec![1, 2]);
        assert_eq!(transport.call_count(), 2);
    }

    // ========================================================================
    // Query parameters
    // ========================================================================

    #[tokio::test]
    async fn test_requests_carry_offset_count_and_filters() {
        let transport = MockTransport::with_page_size(2);
        transport.respond(page(0..2, 3));
        transport.respond(page(2..3, 3));

        let mut filters = QueryParams::new();
        filters.insert("status".to_string(), "subscribed".to_string());
        let pager: Paginator<Item> =
            Paginator::records(transport.clone(), "lists/L1/members", "items").with_query(filters);
        pager.collect_all().await.unwrap();

        let calls = transport.calls();
        let first = calls[0].query.clone().unwrap();
        let second = calls[1].query.clone().unwrap();
        assert_eq!(first.get("offset").map(String::as_str), Some("0"));
        assert_eq!(first.get("count").map(String::as_str), Some("2"));
        assert_eq!(first.get("status").map(String::as_str), Some("subscribed"));
        assert_eq!(second.get("offset").map(String::as_str), Some("2"));
        assert_eq!(calls[1].path, "lists/L1/members");
    }

    #[tokio::test]
    async fn test_page_size_override_is_clamped() {
        let transport = MockTransport::new();
        let pager: Paginator<Item> =
            Paginator::records(transport, "things", "items").with_page_size(5000);
        assert_eq!(pager.page_size(), MAX_PAGE_SIZE);
    }

    // ========================================================================
    // Errors
    // ========================================================================

    #[tokio::test]
    async fn test_bad_item_reports_indexed_path_and_fuses() {
        let transport = MockTransport::new();
        transport.respond(json!({"items": [{"n": 1}, {"n": "two"}], "total_items": 2}));

        let mut pager: Paginator<Item> = Paginator::records(transport.clone(), "things", "items");
        let error = pager.try_next().await.unwrap_err();

        match error {
            ResourceError::Parse { source, .. } => {
                assert_eq!(source.field(), Some("items[1].n"));
            }
            other => panic!("Expected Parse error, got {other:?}"),
        }
        assert_eq!(pager.try_next().await.unwrap(), None);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_items_key_is_parse_error() {
        let transport = MockTransport::new();
        transport.respond(json!({"total_items": 0}));

        let mut pager: Paginator<Item> = Paginator::records(transport, "things", "items");
        assert!(matches!(
            pager.try_next().await,
            Err(ResourceError::Parse {
                source: ParseError::MissingField { .. },
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_remote_error_propagates() {
        let transport = MockTransport::new();
        transport.fail(404, json!({"title": "Resource Not Found"}));

        let mut pager: Paginator<Item> = Paginator::records(transport, "things", "items");
        assert!(pager.try_next().await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_into_stream_yields_in_server_order() {
        let transport = MockTransport::with_page_size(2);
        transport.respond(page(0..2, 3));
        transport.respond(page(2..3, 3));

        let pager: Paginator<Item> = Paginator::records(transport, "things", "items");
        let items: Vec<Item> = pager.into_stream().try_collect().await.unwrap();

        assert_eq!(numbers(&items), vec![0, 1, 2]);
    }
}
