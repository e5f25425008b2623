//! Progress reporting through the log

use crate::engine::Progress;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Logs collection progress in ten percent steps
#[derive(Debug, Default)]
pub struct LogProgress {
    total: AtomicU64,
    last_step: AtomicU64,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progress for LogProgress {
    fn start(&self, total: u64) {
        self.total.store(total, Ordering::SeqCst);
        info!(total, "Collecting events");
    }

    fn update(&self, collected: usize) {
        let total = self.total.load(Ordering::SeqCst);
        if total == 0 {
            return;
        }
        let step = (collected as u64 * 10 / total).min(10);
        if step > self.last_step.fetch_max(step, Ordering::SeqCst) {
            info!(collected, total, percent = step * 10, "Collection progress");
        }
    }

    fn finish(&self) {
        debug!("Progress reporting finished");
    }
}
