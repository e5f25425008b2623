//! Engine types
//!
//! Configuration, statistics, cancellation and progress reporting for event
//! collection.

use super::ceiling::DEFAULT_MAX_OFFSET;
use super::window::DEFAULT_WINDOW;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration for a collection run
#[derive(Debug, Clone)]
pub struct CollectConfig {
    /// Total events wanted (0 = unlimited)
    pub total_limit: usize,
    /// Deduplicate across page boundaries
    pub precise: bool,
    /// Records compared on each side of a boundary
    pub window: usize,
    /// Highest offset the server accepts
    pub max_offset: u32,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            total_limit: 0,
            precise: true,
            window: DEFAULT_WINDOW,
            max_offset: DEFAULT_MAX_OFFSET,
        }
    }
}

impl CollectConfig {
    /// Create a new collect config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total limit
    #[must_use]
    pub fn with_total_limit(mut self, limit: usize) -> Self {
        self.total_limit = limit;
        self
    }

    /// Enable or disable boundary deduplication
    #[must_use]
    pub fn with_precise(mut self, precise: bool) -> Self {
        self.precise = precise;
        self
    }

    /// Set the deduplication window
    #[must_use]
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the offset ceiling
    #[must_use]
    pub fn with_max_offset(mut self, max_offset: u32) -> Self {
        self.max_offset = max_offset;
        self
    }

    /// Whether a finite limit was requested
    pub fn is_bounded(&self) -> bool {
        self.total_limit > 0
    }

    /// Page size of the first request
    pub fn initial_page_size(&self) -> u32 {
        if self.is_bounded() && self.total_limit <= self.max_offset as usize {
            self.total_limit as u32
        } else {
            self.max_offset
        }
    }
}

/// Statistics from a collection run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectStats {
    /// Pages fetched across all walks
    pub pages_fetched: usize,
    /// Events in the result
    pub events_collected: usize,
    /// Events dropped by boundary deduplication
    pub duplicates_skipped: usize,
    /// Times the walk restarted from a time cursor
    pub continuations: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl CollectStats {
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    pub fn add_skipped(&mut self, count: usize) {
        self.duplicates_skipped += count;
    }

    pub fn add_continuation(&mut self) {
        self.continuations += 1;
    }
}

/// Cooperative cancellation signal, checked between pages
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the current page still completes
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Progress side channel
///
/// Purely informational; nothing reported here influences collection.
pub trait Progress: Send + Sync {
    /// Progress became measurable with this expected total
    fn start(&self, _total: u64) {}

    /// Events collected so far
    fn update(&self, _collected: usize) {}

    /// Collection ended, successfully or not
    fn finish(&self) {}
}

/// Progress sink that reports nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}

/// Expected total to show progress against, if worth showing
///
/// Progress is only shown for listings that need more than one walk: the
/// requested limit when it is at least the ceiling and the server has more,
/// otherwise the server total when it exceeds the ceiling.
pub fn progress_total(
    total_hint: Option<u64>,
    total_limit: usize,
    max_offset: u32,
    collected: usize,
) -> Option<u64> {
    let total = total_hint?;
    if collected > max_offset as usize || collected == total_limit {
        return None;
    }

    let limit = total_limit as u64;
    if total_limit >= max_offset as usize && total > limit {
        Some(limit)
    } else if total > u64::from(max_offset) {
        Some(total)
    } else {
        None
    }
}
