mod support;

use cma_api::TransportError;
use cma_engine::{ContentError, EntriesService};
use cma_types::PageRequest;
use reqwest::Method;
use serde_json::json;
use support::{RecordingTransport, entry_payload, page};

fn item(id: &str) -> serde_json::Value {
    entry_payload(id, 1, "post", json!({ "title": id }))
}

fn ids(entries: &[cma_types::Entry]) -> Vec<&str> {
    entries.iter().filter_map(|entry| entry.id()).collect()
}

#[tokio::test]
async fn listing_is_lazy() {
    let transport = RecordingTransport::new();
    let entries = EntriesService::new(transport.clone());

    let listing = entries.list("abc");

    assert_eq!(transport.request_count(), 0);
    assert!(!listing.is_exhausted());
    assert_eq!(listing.total(), None);
}

#[tokio::test]
async fn pages_arrive_in_order_until_exhausted() {
    let transport = RecordingTransport::new();
    transport.respond(page(3, 0, 2, vec![item("e1"), item("e2")]));
    transport.respond(page(3, 2, 2, vec![item("e3")]));
    let entries = EntriesService::new(transport.clone()).with_page_limit(2);

    let mut listing = entries.list("abc");
    let first = listing.next_page().await.expect("first page").expect("page");
    let second = listing.next_page().await.expect("second page").expect("page");
    let after = listing.next_page().await.expect("exhausted");

    assert_eq!(ids(&first), vec!["e1", "e2"]);
    assert_eq!(ids(&second), vec!["e3"]);
    assert!(after.is_none());
    assert!(listing.is_exhausted());
    assert_eq!(listing.total(), Some(3));

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].path, "/spaces/abc/entries");
    assert_eq!(requests[0].query_value("skip"), Some("0"));
    assert_eq!(requests[0].query_value("limit"), Some("2"));
    assert_eq!(requests[1].query_value("skip"), Some("2"));
}

#[tokio::test]
async fn empty_listing_yields_one_empty_page() {
    let transport = RecordingTransport::new();
    transport.respond(page(0, 0, 100, Vec::new()));
    let entries = EntriesService::new(transport.clone());

    let mut listing = entries.list("abc");
    let first = listing.next_page().await.expect("first page");

    assert_eq!(first.map(|items| items.len()), Some(0));
    assert!(listing.next_page().await.expect("exhausted").is_none());
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn invalid_space_is_reported_by_the_first_page() {
    let transport = RecordingTransport::new();
    let entries = EntriesService::new(transport.clone());

    let mut listing = entries.list("");
    let error = listing.next_page().await.expect_err("construction error");

    assert!(matches!(error, ContentError::InvalidRequest(_)));
    assert!(listing.next_page().await.expect("exhausted").is_none());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn failed_fetch_keeps_the_cursor() {
    let transport = RecordingTransport::new();
    transport.respond(page(4, 0, 2, vec![item("e1"), item("e2")]));
    transport.fail(503, "ServiceUnavailable");
    transport.respond(page(4, 2, 2, vec![item("e3"), item("e4")]));
    let entries = EntriesService::new(transport.clone()).with_page_limit(2);

    let mut listing = entries.list("abc");
    listing.next_page().await.expect("first page");
    let error = listing.next_page().await.expect_err("transient failure");
    assert!(matches!(
        error,
        ContentError::Transport(TransportError::Status { status: 503, .. })
    ));
    let retried = listing.next_page().await.expect("retry").expect("page");

    assert_eq!(ids(&retried), vec!["e3", "e4"]);
    let requests = transport.requests();
    assert_eq!(requests[1].query_value("skip"), Some("2"));
    assert_eq!(requests[2].query_value("skip"), Some("2"));
}

#[tokio::test]
async fn collect_remaining_drains_in_order_with_extra_query() {
    let transport = RecordingTransport::new();
    transport.respond(page(3, 1, 1, vec![item("e2")]));
    transport.respond(page(3, 2, 1, vec![item("e3")]));
    let entries = EntriesService::new(transport.clone());

    let mut listing = entries.list_with(
        "abc",
        PageRequest { skip: 1, limit: 1 },
        vec![("content_type".to_string(), "post".to_string())],
    );
    let all = listing.collect_remaining().await.expect("collect");

    assert_eq!(ids(&all), vec!["e2", "e3"]);
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|request| request.query_value("content_type") == Some("post")));
}

#[tokio::test]
async fn zero_page_limit_still_reads_every_entry() {
    let transport = RecordingTransport::new();
    transport.respond(page(3, 0, 1, vec![item("e1")]));
    transport.respond(page(3, 1, 1, vec![item("e2")]));
    transport.respond(page(3, 2, 1, vec![item("e3")]));
    let entries = EntriesService::new(transport.clone());

    let mut listing = entries.list_with("abc", PageRequest { skip: 0, limit: 0 }, Vec::new());
    let all = listing.collect_remaining().await.expect("collect");

    assert_eq!(ids(&all), vec!["e1", "e2", "e3"]);
    assert_eq!(listing.total(), Some(3));
    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|request| request.query_value("limit") == Some("1")));
}

#[tokio::test]
async fn get_fetches_a_single_entry() {
    let transport = RecordingTransport::new();
    transport.respond(item("e1"));
    let entries = EntriesService::new(transport.clone());

    let entry = entries.get("abc", "e1").await.expect("get");

    assert_eq!(entry.id(), Some("e1"));
    assert_eq!(entry.content_type_id(), Some("post"));
    assert_eq!(transport.requests()[0].path, "/spaces/abc/entries/e1");
}

#[tokio::test]
async fn get_returns_the_actual_failure() {
    let transport = RecordingTransport::new();
    transport.fail(404, "NotFound");
    transport.respond(json!({ "sys": 42 }));
    let entries = EntriesService::new(transport.clone());

    let missing = entries.get("abc", "e1").await.expect_err("not found");
    assert!(matches!(
        missing,
        ContentError::Transport(TransportError::Status { status: 404, .. })
    ));

    let garbled = entries.get("abc", "e1").await.expect_err("decode failure");
    assert!(matches!(garbled, ContentError::Decode { .. }));
}
