//! Audit API client
//!
//! Thin typed layer over `HttpClient` for the three audit endpoints:
//! event listing, single event lookup and attribute enumeration.

use crate::error::{Error, Result};
use crate::event::Event;
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::pagination::{Page, PageFetcher};
use crate::query::{AttributeListOptions, GetOptions, ListOptions, ATTRIBUTE_NAMES};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

const EVENTS_PATH: &str = "events";
const ATTRIBUTES_PATH: &str = "attributes";

/// Typed client for the audit event API
#[derive(Debug)]
pub struct AuditClient {
    http: HttpClient,
}

impl AuditClient {
    /// Create a client for `endpoint`, authenticating with `token` if given
    pub fn new(endpoint: &str, token: Option<&str>) -> Result<Self> {
        let mut builder = HttpClientConfig::builder().base_url(endpoint);
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            builder = builder.auth_token(token);
        }
        Self::with_config(builder.build())
    }

    /// Create a client from a full HTTP configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        if config.base_url.as_deref().map_or(true, str::is_empty) {
            return Err(Error::missing_field("endpoint"));
        }
        Ok(Self {
            http: HttpClient::with_config(config)?,
        })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Fetch one page of the event listing
    pub async fn list_events_page(&self, options: &ListOptions) -> Result<Page> {
        let query = options.to_query();
        debug!(?query, "Listing events");

        let body = self
            .http
            .get_text(EVENTS_PATH, RequestConfig::new().query_params(query))
            .await?;
        Page::from_json(&body)
    }

    /// Fetch a single event by id
    pub async fn get_event(&self, id: &str, options: &GetOptions) -> Result<Event> {
        let id = id.trim();
        if id.is_empty() || id.contains('/') {
            return Err(Error::invalid_value("id", format!("invalid event id '{id}'")));
        }

        let body = self
            .http
            .get_text(
                &self.event_url(id)?,
                RequestConfig::new().query_params(options.to_query()),
            )
            .await?;
        serde_json::from_str(&body)
            .map_err(|e| Error::decode(format!("Failed to extract event: {e}")))
    }

    /// Absolute URL of one event, with `id` encoded as a single path segment
    fn event_url(&self, id: &str) -> Result<String> {
        let mut url = Url::parse(&self.http.build_url(EVENTS_PATH))
            .map_err(|e| Error::invalid_value("endpoint", e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| Error::invalid_value("endpoint", "not a hierarchical URL"))?
            .push(id);
        Ok(url.into())
    }

    /// List the distinct values of an event attribute
    ///
    /// The server answers with a single JSON array; there is no paging.
    pub async fn list_attributes(
        &self,
        name: &str,
        options: &AttributeListOptions,
    ) -> Result<Vec<String>> {
        if !ATTRIBUTE_NAMES.contains(&name) {
            return Err(Error::invalid_value(
                "attribute",
                format!(
                    "unknown attribute '{name}', expected one of: {}",
                    ATTRIBUTE_NAMES.join(", ")
                ),
            ));
        }

        let result = self
            .http
            .get_text(
                &format!("{ATTRIBUTES_PATH}/{name}"),
                RequestConfig::new().query_params(options.to_query()),
            )
            .await;

        let body = match result {
            Ok(body) => body,
            // large attribute sets overwhelm the server
            Err(Error::HttpStatus { status: 500, body }) => {
                return Err(Error::http_status(
                    500,
                    format!(
                        "{body}: please try to decrease the amount of the attributes \
                         in output, e.g. set \"--limit 100\""
                    ),
                ))
            }
            Err(e) => return Err(e),
        };

        serde_json::from_str(&body)
            .map_err(|e| Error::decode(format!("Failed to extract attributes: {e}")))
    }
}

#[async_trait]
impl PageFetcher for AuditClient {
    async fn fetch_page(&self, options: &ListOptions) -> Result<Page> {
        self.list_events_page(options).await
    }
}
