//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config → AuditClient → EventCollector →
//! HTTP requests against an audit API that rejects offsets past its ceiling

use chrono::{DateTime, Duration, FixedOffset};
use hermes_audit::engine::{CollectConfig, EventCollector};
use hermes_audit::event::{format_time, parse_time};
use hermes_audit::http::HttpClientConfig;
use hermes_audit::query::{GetOptions, ListOptions};
use hermes_audit::types::BackoffType;
use hermes_audit::{AuditClient, Config, Error};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::time::Duration as StdDuration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

// ============================================================================
// Mock Audit API
// ============================================================================

fn base_time() -> DateTime<FixedOffset> {
    parse_time("2024-06-01T00:00:00Z").unwrap()
}

fn time_of(n: usize) -> DateTime<FixedOffset> {
    base_time() - Duration::seconds(n as i64)
}

/// Newest-first event listing that honours `lte` time bounds and answers
/// 500 for offsets at or past `max_offset`
struct EventListing {
    len: usize,
    page_size: usize,
    max_offset: usize,
}

impl Respond for EventListing {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let params: HashMap<String, String> = request.url.query_pairs().into_owned().collect();

        let offset: usize = params
            .get("offset")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        if offset >= self.max_offset {
            return ResponseTemplate::new(500).set_body_string("offset exceeds maximum");
        }

        let limit = params
            .get("limit")
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.page_size)
            .min(self.page_size);
        let upper = params
            .get("time")
            .and_then(|t| t.strip_prefix("lte:"))
            .and_then(|t| parse_time(t).ok());

        let matching: Vec<usize> = (0..self.len)
            .filter(|n| upper.map_or(true, |u| time_of(*n) <= u))
            .collect();
        let events: Vec<serde_json::Value> = matching
            .iter()
            .skip(offset)
            .take(limit)
            .map(|n| {
                json!({
                    "id": format!("e{n:04}"),
                    "eventTime": format_time(&time_of(*n)),
                    "action": "update",
                    "outcome": "success",
                    "observer": {"typeURI": "service/compute", "id": "nova"}
                })
            })
            .collect();

        let mut body = json!({ "events": events, "total": matching.len() });
        if offset + limit < matching.len() {
            body["next"] = json!(format!(
                "http://hermes-host:8788/v1/events?limit={limit}&offset={}",
                offset + limit
            ));
        }
        ResponseTemplate::new(200).set_body_json(body)
    }
}

async fn mount_listing(server: &MockServer, listing: EventListing) {
    Mock::given(method("GET"))
        .and(path("/v1/events"))
        .respond_with(listing)
        .mount(server)
        .await;
}

fn fast_client(server: &MockServer) -> AuditClient {
    let config = HttpClientConfig::builder()
        .base_url(format!("{}/v1", server.uri()))
        .auth_token("test-token")
        .backoff(
            BackoffType::Constant,
            StdDuration::from_millis(10),
            StdDuration::from_millis(50),
        )
        .no_rate_limit()
        .build();
    AuditClient::with_config(config).unwrap()
}

async fn requested_offsets(server: &MockServer) -> Vec<usize> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "offset")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap_or(0)
        })
        .collect()
}

// ============================================================================
// Collection Tests
// ============================================================================

#[tokio::test]
async fn test_collect_all_pages() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        EventListing {
            len: 25,
            page_size: 10,
            max_offset: 10_000,
        },
    )
    .await;

    let collector = EventCollector::new(fast_client(&server));
    let events = collector.collect(ListOptions::new()).await.unwrap();

    assert_eq!(events.len(), 25);
    assert_eq!(events[0].id, "e0000");
    assert_eq!(events[24].id, "e0024");
    assert_eq!(requested_offsets(&server).await, vec![0, 10, 20]);
}

#[tokio::test]
async fn test_collect_continues_past_lowered_ceiling() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        EventListing {
            len: 45,
            page_size: 10,
            max_offset: 20,
        },
    )
    .await;

    let collector = EventCollector::new(fast_client(&server))
        .with_config(CollectConfig::new().with_max_offset(20));

    let mut events = Vec::new();
    let stats = collector
        .collect_into(ListOptions::new().with_sort("time:desc"), &mut events)
        .await
        .unwrap();

    assert_eq!(events.len(), 45);
    let unique: HashSet<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(unique.len(), 45);
    assert_eq!(stats.continuations, 2);
    assert_eq!(stats.duplicates_skipped, 2);
    assert!(requested_offsets(&server).await.iter().all(|o| *o < 20));

    let requests = server.received_requests().await.unwrap_or_default();
    let cursors: Vec<String> = requests
        .iter()
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "time")
                .map(|(_, v)| v.into_owned())
        })
        .collect();
    assert_eq!(
        cursors.first().map(String::as_str),
        Some(format!("lte:{}", format_time(&time_of(19))).as_str())
    );
}

#[tokio::test]
async fn test_collect_respects_limit() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        EventListing {
            len: 100,
            page_size: 10,
            max_offset: 10_000,
        },
    )
    .await;

    let collector = EventCollector::new(fast_client(&server))
        .with_config(CollectConfig::new().with_total_limit(15));
    let events = collector.collect(ListOptions::new()).await.unwrap();

    assert_eq!(events.len(), 20);
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2);
    assert!(requests[0]
        .url
        .query_pairs()
        .any(|(k, v)| k == "limit" && v == "15"));
}

#[tokio::test]
async fn test_collect_retries_transient_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/events"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_listing(
        &server,
        EventListing {
            len: 5,
            page_size: 10,
            max_offset: 10_000,
        },
    )
    .await;

    let events = EventCollector::new(fast_client(&server))
        .collect(ListOptions::new())
        .await
        .unwrap();

    assert_eq!(events.len(), 5);
}

#[tokio::test]
async fn test_collect_failure_keeps_partial_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/events"))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_listing(
        &server,
        EventListing {
            len: 30,
            page_size: 10,
            max_offset: 10_000,
        },
    )
    .await;

    let collector = EventCollector::new(fast_client(&server));
    let mut events = Vec::new();
    let err = collector
        .collect_into(ListOptions::new(), &mut events)
        .await
        .unwrap_err();

    assert_eq!(events.len(), 10);
    assert!(matches!(
        err,
        Error::Collect {
            offset: 10,
            collected: 10,
            ..
        }
    ));
    assert!(matches!(err.root(), Error::HttpStatus { status: 403, .. }));
}

// ============================================================================
// Config Tests
// ============================================================================

#[tokio::test]
async fn test_config_file_to_client() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/events/e0001"))
        .and(query_param("project_id", "p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "e0001",
            "eventTime": "2024-06-01T00:00:00.123456+00:00",
            "action": "delete",
            "outcome": "failure"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hermes.yaml");
    std::fs::write(
        &path,
        format!(
            "endpoint: {}/v1\ntoken: test-token\nproject_id: p-1\nhttp:\n  max_retries: 0\n",
            server.uri()
        ),
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    let client = AuditClient::with_config(config.http_client_config().unwrap()).unwrap();
    let options = GetOptions {
        project_id: config.project_id.clone(),
        domain_id: None,
    };
    let event = client.get_event("e0001", &options).await.unwrap();

    assert_eq!(event.action, "delete");
    assert_eq!(format_time(&event.event_time), "2024-06-01T00:00:00.123456Z");
}
