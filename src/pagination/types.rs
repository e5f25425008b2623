//! Pagination types and traits
//!
//! Defines the page shape returned by the audit API and the fetch seam the
//! collection engine drives.

use crate::error::{Error, Result};
use crate::event::Event;
use crate::query::ListOptions;
use async_trait::async_trait;
use serde::Deserialize;

/// One page of an event listing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Page {
    /// Events in server order
    #[serde(default)]
    pub events: Vec<Event>,
    /// Server-reported total for the whole query
    #[serde(default)]
    pub total: Option<u64>,
    /// Link to the next page; absent on the last page
    #[serde(default)]
    pub next: Option<String>,
    /// Link to the previous page
    #[serde(default)]
    pub previous: Option<String>,
}

impl Page {
    /// Create a page from events and a next link
    pub fn new(events: Vec<Event>, next: Option<String>) -> Self {
        Self {
            events,
            next,
            ..Default::default()
        }
    }

    /// Set the total hint
    #[must_use]
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Decode a page from a response body
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("Failed to extract events: {e}")))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Where pagination goes after a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    /// Request the next page at this offset
    Continue {
        /// Offset carried by the next page link
        offset: u32,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// Performs one page request
///
/// Implementations own transport concerns (auth, retries, timeouts) and must
/// return the same page for identical options.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page described by `options`
    async fn fetch_page(&self, options: &ListOptions) -> Result<Page>;
}
