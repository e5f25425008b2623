//! Offset ceiling detection and continuation planning
//!
//! The audit API rejects offsets at or beyond its maximum. When a walk is
//! about to cross it, collection restarts from offset zero with a time bound
//! at the last collected event.

use crate::error::{Error, Result};
use crate::event::{format_time, Event};
use crate::query::{DateFilter, ListOptions};
use chrono::{DateTime, FixedOffset};

/// Maximum offset the audit API accepts
pub const DEFAULT_MAX_OFFSET: u32 = 10_000;

/// Whether requesting `next_offset` would cross the ceiling
pub fn crosses_ceiling(next_offset: u32, max_offset: u32) -> bool {
    next_offset >= max_offset
}

/// How to resume a walk that hit the offset ceiling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationPlan {
    /// `lte` when results are newest first, `gte` otherwise
    pub filter: DateFilter,
    /// Timestamp of the last collected event
    pub cursor: DateTime<FixedOffset>,
    /// Page size for the resumed walk, when the remaining count is known
    pub page_limit: Option<u32>,
}

impl ContinuationPlan {
    /// Plan a continuation from the events collected so far
    pub fn from_history(
        collected: &[Event],
        options: &ListOptions,
        total_limit: usize,
        max_offset: u32,
    ) -> Result<Self> {
        let last = collected
            .last()
            .ok_or(Error::CeilingWithoutHistory { max_offset })?;

        let filter = if options.sort.time_descending() {
            DateFilter::Lte
        } else {
            DateFilter::Gte
        };

        let page_limit = total_limit
            .checked_sub(collected.len())
            .filter(|delta| *delta > 0 && *delta <= max_offset as usize)
            .map(|delta| delta as u32);

        Ok(Self {
            filter,
            cursor: last.event_time,
            page_limit,
        })
    }

    /// Rewrite the options for the resumed walk
    pub fn apply(&self, options: &mut ListOptions) {
        options.upsert_time_bound(self.filter, self.cursor);
        options.offset = 0;
        if let Some(limit) = self.page_limit {
            options.limit = limit;
        }
    }

    /// The cursor as it is sent to the server
    pub fn describe(&self) -> String {
        format!("{}:{}", self.filter, format_time(&self.cursor))
    }
}
