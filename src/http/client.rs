//! Retrying HTTP client
//!
//! Each attempt waits on the rate limiter, sends the request and is then
//! classified. Throttling (429), gateway failures, timeouts and refused
//! connections are retried; a 429 waits for `Retry-After`, everything else
//! backs off. Any other error status fails at once with the trimmed body.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use crate::query::QueryParams;
use crate::types::{Backoff, BackoffType};
use reqwest::{Client, Method, Response, StatusCode};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the Keystone token
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Client-wide settings
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Relative request paths are joined onto this
    pub base_url: Option<String>,
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    pub backoff: Backoff,
    /// `None` disables rate limiting
    pub rate_limit: Option<RateLimiterConfig>,
    /// Sent with every request; holds the auth token
    pub default_headers: BTreeMap<String, String>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff: Backoff::default(),
            rate_limit: Some(RateLimiterConfig::default()),
            default_headers: BTreeMap::new(),
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

impl HttpClientConfig {
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builds an [`HttpClientConfig`] starting from the defaults
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Delay policy between retries
    pub fn backoff(mut self, kind: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff = Backoff::new(kind, initial, max);
        self
    }

    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Header sent with every request
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(name.into(), value.into());
        self
    }

    /// Send `token` as `X-Auth-Token` on every request
    pub fn auth_token(self, token: impl Into<String>) -> Self {
        self.header(AUTH_TOKEN_HEADER, token)
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Per-request parameters and overrides
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters in send order; keys may repeat
    pub query: QueryParams,
    pub headers: BTreeMap<String, String>,
    /// Overrides the client timeout
    pub timeout: Option<Duration>,
    /// Overrides the client retry count
    pub max_retries: Option<u32>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn query_params(mut self, params: QueryParams) -> Self {
        self.query.extend(params);
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
}

/// Result of a single attempt
enum Attempt {
    Success(Response),
    /// Worth another try; `wait` overrides the backoff delay
    Retry { error: Error, wait: Option<Duration> },
    Fail(Error),
}

/// HTTP client shared by all audit API calls
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    pub async fn get(&self, path: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::GET, path, config).await
    }

    /// GET and read the whole body
    pub async fn get_text(&self, path: &str, config: RequestConfig) -> Result<String> {
        let response = self.get(path, config).await?;
        Ok(response.text().await?)
    }

    /// Send a request, retrying transient failures
    ///
    /// After the last retry the error of the final attempt is returned.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<Response> {
        let url = self.build_url(path);
        let retries = config.max_retries.unwrap_or(self.config.max_retries);
        let timeout = config.timeout.unwrap_or(self.config.timeout);

        for attempt in 0..=retries {
            if let Some(limiter) = &self.rate_limiter {
                limiter.wait().await;
            }

            let (error, wait) = match self.attempt(&method, &url, &config, timeout).await {
                Attempt::Success(response) => {
                    debug!(%method, %url, attempt, "Request succeeded");
                    return Ok(response);
                }
                Attempt::Fail(error) => return Err(error),
                Attempt::Retry { error, wait } => (error, wait),
            };
            if attempt == retries {
                return Err(error);
            }

            let wait = wait.unwrap_or_else(|| self.calculate_backoff(attempt));
            warn!(
                "{method} {url} failed ({error}), attempt {}/{}, retrying in {wait:?}",
                attempt + 1,
                retries + 1
            );
            tokio::time::sleep(wait).await;
        }

        Err(Error::MaxRetriesExceeded {
            max_retries: retries,
        })
    }

    async fn attempt(
        &self,
        method: &Method,
        url: &str,
        config: &RequestConfig,
        timeout: Duration,
    ) -> Attempt {
        let mut request = self.client.request(method.clone(), url).timeout(timeout);
        for (name, value) in self.config.default_headers.iter().chain(&config.headers) {
            request = request.header(name.as_str(), value.as_str());
        }
        if !config.query.is_empty() {
            request = request.query(&config.query);
        }

        match request.send().await {
            Ok(response) => classify(response).await,
            Err(e) if e.is_timeout() => Attempt::Retry {
                error: Error::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                },
                wait: None,
            },
            Err(e) if e.is_connect() => Attempt::Retry {
                error: Error::Http(e),
                wait: None,
            },
            Err(e) => Attempt::Fail(Error::Http(e)),
        }
    }

    /// Join a relative path onto the base URL; absolute URLs pass through
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        match &self.config.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => path.to_string(),
        }
    }

    /// Backoff delay after attempt number `attempt` (zero based)
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        self.config.backoff.delay(attempt)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // default headers hold the token
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("max_retries", &self.config.max_retries)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

async fn classify(response: Response) -> Attempt {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return Attempt::Success(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_seconds = retry_after(&response);
        return Attempt::Retry {
            error: Error::RateLimited {
                retry_after_seconds,
            },
            wait: Some(Duration::from_secs(retry_after_seconds)),
        };
    }

    let body = response.text().await.unwrap_or_default();
    let error = Error::http_status(status.as_u16(), body.trim());
    if is_retryable_status(status) {
        Attempt::Retry { error, wait: None }
    } else {
        Attempt::Fail(error)
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 502 | 503 | 504)
}

/// `Retry-After` in seconds, 1 when absent or not a number
fn retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(1)
}
