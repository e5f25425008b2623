//! Event collection engine
//!
//! Walks an offset-paginated event listing that rejects offsets beyond a
//! fixed ceiling, and still returns arbitrarily large result sets.
//!
//! # Overview
//!
//! The engine provides:
//! - `EventCollector` - drives a `PageFetcher` page by page
//! - Sliding-window deduplication at page boundaries
//! - Ceiling detection: before the next offset would reach the ceiling the
//!   walk restarts at offset zero, bounded by the timestamp of the last
//!   collected event
//!
//! Pages are fetched strictly one after another. Each page is appended
//! whole before cancellation is checked, so the collected events are always
//! consistent, including after a failure.

mod ceiling;
mod types;
mod window;

pub use ceiling::{crosses_ceiling, ContinuationPlan, DEFAULT_MAX_OFFSET};
pub use types::{progress_total, CancelFlag, CollectConfig, CollectStats, NoProgress, Progress};
pub use window::{append_all, append_deduplicated, DEFAULT_WINDOW};

use crate::error::{Error, Result};
use crate::event::Event;
use crate::pagination::{next_offset, total_hint, NextPage, PageFetcher};
use crate::query::ListOptions;
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Collect events with default settings into `events`
///
/// `total_limit` of 0 means unlimited. Once the limit is reached no further
/// pages are requested, but the last page is kept whole, so the result may
/// hold slightly more than `total_limit` events; trimming is up to the
/// caller. On failure `events` keeps everything collected before the failing
/// step.
pub async fn collect_events<F: PageFetcher>(
    fetcher: F,
    options: ListOptions,
    total_limit: usize,
    precise: bool,
    events: &mut Vec<Event>,
) -> Result<CollectStats> {
    let config = CollectConfig::new()
        .with_total_limit(total_limit)
        .with_precise(precise);
    EventCollector::new(fetcher)
        .with_config(config)
        .collect_into(options, events)
        .await
}

/// Next step of a collection run
#[derive(Debug)]
enum Step {
    /// Request the page described by the current options
    Fetch,
    /// Restart the walk from a time cursor
    Continue(ContinuationPlan),
    Done,
}

/// Per-run bookkeeping
#[derive(Default)]
struct Run {
    stats: CollectStats,
    progress_started: bool,
    last_cursor: Option<DateTime<FixedOffset>>,
}

/// Drives a page fetcher through a complete listing
pub struct EventCollector<F> {
    fetcher: F,
    config: CollectConfig,
    cancel: CancelFlag,
    progress: Arc<dyn Progress>,
}

impl<F: PageFetcher> EventCollector<F> {
    /// Create a new collector
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            config: CollectConfig::default(),
            cancel: CancelFlag::new(),
            progress: Arc::new(NoProgress),
        }
    }

    /// Set collection configuration
    #[must_use]
    pub fn with_config(mut self, config: CollectConfig) -> Self {
        self.config = config;
        self
    }

    /// Observe an externally controlled cancellation flag
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Report progress to `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn config(&self) -> &CollectConfig {
        &self.config
    }

    /// Collect the whole listing
    pub async fn collect(&self, options: ListOptions) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        self.collect_into(options, &mut events).await?;
        Ok(events)
    }

    /// Collect the whole listing into `events`
    ///
    /// On error, `events` keeps everything collected before the failing
    /// step and the error carries the offset and count at that point.
    pub async fn collect_into(
        &self,
        mut options: ListOptions,
        events: &mut Vec<Event>,
    ) -> Result<CollectStats> {
        let start = Instant::now();
        let mut run = Run::default();

        options.offset = 0;
        options.limit = self.config.initial_page_size();

        let mut step = Step::Fetch;
        let outcome = loop {
            let next = match step {
                Step::Fetch => self.fetch_step(&mut options, events, &mut run).await,
                Step::Continue(plan) => self.continue_step(plan, &mut options, &mut run),
                Step::Done => break Ok(()),
            };
            match next {
                Ok(next) => step = next,
                Err(e) => break Err(Error::collect(options.offset, events.len(), e)),
            }
        };

        if run.progress_started {
            self.progress.finish();
        }
        outcome?;

        run.stats.events_collected = events.len();
        run.stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            events = run.stats.events_collected,
            pages = run.stats.pages_fetched,
            continuations = run.stats.continuations,
            skipped = run.stats.duplicates_skipped,
            "Event collection complete"
        );

        Ok(run.stats)
    }

    /// Fetch one page, accumulate it and decide where to go next
    async fn fetch_step(
        &self,
        options: &mut ListOptions,
        events: &mut Vec<Event>,
        run: &mut Run,
    ) -> Result<Step> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let page = self.fetcher.fetch_page(options).await?;
        run.stats.add_page();

        let received = page.len();
        let hint = total_hint(&page);
        let next = next_offset(&page);
        let skipped = if self.config.precise {
            append_deduplicated(events, page.events, self.config.window)
        } else {
            append_all(events, page.events)
        };
        run.stats.add_skipped(skipped);

        debug!(
            offset = options.offset,
            received,
            skipped,
            collected = events.len(),
            "Fetched event page"
        );
        self.report_progress(hint, events.len(), run);

        if self.config.is_bounded() && events.len() >= self.config.total_limit {
            return Ok(Step::Done);
        }

        match next? {
            NextPage::Done => Ok(Step::Done),
            NextPage::Continue { offset } if crosses_ceiling(offset, self.config.max_offset) => {
                let plan = ContinuationPlan::from_history(
                    events,
                    options,
                    self.config.total_limit,
                    self.config.max_offset,
                )?;
                Ok(Step::Continue(plan))
            }
            NextPage::Continue { offset } => {
                options.offset = offset;
                Ok(Step::Fetch)
            }
        }
    }

    /// Rewrite the options to resume from a time cursor
    fn continue_step(
        &self,
        plan: ContinuationPlan,
        options: &mut ListOptions,
        run: &mut Run,
    ) -> Result<Step> {
        if run.last_cursor == Some(plan.cursor) {
            return Err(Error::ContinuationStalled {
                cursor: plan.describe(),
            });
        }
        run.last_cursor = Some(plan.cursor);

        plan.apply(options);
        run.stats.add_continuation();
        info!(
            cursor = %plan.describe(),
            page_limit = options.limit,
            continuation = run.stats.continuations,
            "Offset ceiling reached, continuing from time cursor"
        );

        Ok(Step::Fetch)
    }

    fn report_progress(&self, hint: Option<u64>, collected: usize, run: &mut Run) {
        if !run.progress_started {
            if let Some(total) = progress_total(
                hint,
                self.config.total_limit,
                self.config.max_offset,
                collected,
            ) {
                self.progress.start(total);
                run.progress_started = true;
            }
        }
        if run.progress_started {
            self.progress.update(collected);
        }
    }
}

impl<F> std::fmt::Debug for EventCollector<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCollector")
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
