//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use crate::types::BackoffType;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config(base_url: String) -> HttpClientConfigBuilder {
    HttpClientConfig::builder()
        .base_url(base_url)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .no_rate_limit()
}

fn backoff_client(backoff_type: BackoffType, initial_ms: u64, max_ms: u64) -> HttpClient {
    let config = HttpClientConfig::builder()
        .backoff(
            backoff_type,
            Duration::from_millis(initial_ms),
            Duration::from_millis(max_ms),
        )
        .build();
    HttpClient::with_config(config).unwrap()
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.base_url.is_none());
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::new(10, 10)));
    assert!(config.user_agent.starts_with("hermes-audit/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://hermes.example.com/v1")
        .timeout(Duration::from_secs(60))
        .max_retries(5)
        .auth_token("gAAAAAB-token")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(
        config.base_url.as_deref(),
        Some("https://hermes.example.com/v1")
    );
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.max_retries, 5);
    assert_eq!(
        config.default_headers.get(AUTH_TOKEN_HEADER).map(String::as_str),
        Some("gAAAAAB-token")
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_request_config_keeps_repeated_params() {
    let config = RequestConfig::new()
        .query("time", "gte:2024-01-01T00:00:00Z")
        .query("time", "lte:2024-02-01T00:00:00Z")
        .query_params(vec![("limit".into(), "10".into())])
        .timeout(Duration::from_secs(10))
        .retries(2);

    assert_eq!(config.query.len(), 3);
    assert_eq!(config.query[0].0, "time");
    assert_eq!(config.query[1].1, "lte:2024-02-01T00:00:00Z");
    assert_eq!(config.timeout, Some(Duration::from_secs(10)));
    assert_eq!(config.max_retries, Some(2));
}

#[test]
fn test_build_url() {
    let config = HttpClientConfig::builder()
        .base_url("https://hermes.example.com/v1/")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    assert_eq!(
        client.build_url("/events"),
        "https://hermes.example.com/v1/events"
    );
    assert_eq!(
        client.build_url("http://other.example.com/events"),
        "http://other.example.com/events"
    );
}

// ============================================================================
// Backoff Tests
// ============================================================================

#[test_case(BackoffType::Constant, 4, 10_000, 100 ; "constant")]
#[test_case(BackoffType::Linear, 2, 10_000, 300 ; "linear")]
#[test_case(BackoffType::Exponential, 1, 10_000, 200 ; "exponential")]
#[test_case(BackoffType::Exponential, 3, 10_000, 800 ; "exponential later")]
#[test_case(BackoffType::Exponential, 40, 500, 500 ; "capped")]
fn test_calculate_backoff(kind: BackoffType, attempt: u32, max_ms: u64, expected_ms: u64) {
    let client = backoff_client(kind, 100, max_ms);
    assert_eq!(
        client.calculate_backoff(attempt),
        Duration::from_millis(expected_ms)
    );
}

// ============================================================================
// Request Tests
// ============================================================================

#[tokio::test]
async fn test_get_sends_token_and_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/events"))
        .and(header(AUTH_TOKEN_HEADER, "secret"))
        .and(query_param("limit", "10"))
        .and(query_param("sort", "time:desc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = fast_config(format!("{}/v1", mock_server.uri()))
        .auth_token("secret")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let body = client
        .get_text(
            "events",
            RequestConfig::new()
                .query("limit", "10")
                .query("sort", "time:desc"),
        )
        .await
        .unwrap();

    assert_eq!(body, "{}");
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Event not found\n"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config(mock_server.uri()).build()).unwrap();
    let err = client
        .get("/events/missing", RequestConfig::new())
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Event not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_retry_on_503() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config(mock_server.uri()).max_retries(3).build())
        .unwrap();
    let response = client.get("/events", RequestConfig::new()).await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_retry_after_429() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config(mock_server.uri()).max_retries(2).build())
        .unwrap();
    let body = client.get_text("/events", RequestConfig::new()).await.unwrap();

    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_persistent_429_is_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config(mock_server.uri()).max_retries(1).build())
        .unwrap();
    let err = client
        .get("/events", RequestConfig::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RateLimited { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_server_error_after_retries_keeps_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/attributes/action"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config(mock_server.uri()).max_retries(2).build())
        .unwrap();
    let err = client
        .get("/attributes/action", RequestConfig::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::HttpStatus { status: 500, ref body } if body == "Internal Server Error"
    ));
}

#[tokio::test]
async fn test_per_request_retry_override() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config(mock_server.uri()).max_retries(5).build())
        .unwrap();
    let err = client
        .get("/events", RequestConfig::new().retries(0))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 502, .. }));
}

#[test]
fn test_http_client_debug_hides_headers() {
    let config = HttpClientConfig::builder().auth_token("secret").build();
    let client = HttpClient::with_config(config).unwrap();
    let debug = format!("{client:?}");
    assert!(debug.contains("HttpClient"));
    assert!(!debug.contains("secret"));
}

// ============================================================================
// Rate Limiter Tests
// ============================================================================

#[test]
fn test_rate_limiter_config_default() {
    let config = RateLimiterConfig::default();
    assert_eq!(config.requests_per_second, 10);
    assert_eq!(config.burst_size, 10);
}

#[tokio::test]
async fn test_rate_limiter_allows_burst() {
    let limiter = RateLimiter::new(&RateLimiterConfig::new(1, 5));

    for _ in 0..5 {
        assert!(limiter.try_acquire());
    }
    assert!(!limiter.try_acquire());
}

#[tokio::test]
async fn test_rate_limiter_zero_values_still_work() {
    let limiter = RateLimiter::new(&RateLimiterConfig::new(0, 0));
    assert!(limiter.try_acquire());
}

#[tokio::test]
async fn test_client_with_rate_limiter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .rate_limit(RateLimiterConfig::new(100, 10))
        .build();
    let client = HttpClient::with_config(config).unwrap();
    assert!(client.has_rate_limiter());

    for _ in 0..3 {
        client.get("/events", RequestConfig::new()).await.unwrap();
    }
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config(mock_server.uri()).max_retries(0).build())
        .unwrap();
    let err = client
        .get(
            "/events",
            RequestConfig::new().timeout(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { timeout_ms: 50 }));
}
