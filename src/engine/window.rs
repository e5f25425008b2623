//! Sliding-window deduplication
//!
//! Duplicates only appear where two pagination walks meet, so each incoming
//! page is compared against the tail of what has already been collected
//! instead of the whole history. This keeps the cost at O(W) per page
//! boundary; duplicates further than W positions from the boundary are not
//! detected.

use crate::event::Event;

/// Default number of records compared on each side of a page boundary
pub const DEFAULT_WINDOW: usize = 100;

/// Append a page, skipping records already present near the boundary
///
/// The first `window` incoming records (page indices `0..window`) are each
/// compared against the last `window` records collected before this page,
/// scanning backward from the most recent one. From index `window` onward
/// the rest of the page is appended unchecked. Records with an empty id are
/// never treated as duplicates. Returns the number of records skipped.
pub fn append_deduplicated(collected: &mut Vec<Event>, page: Vec<Event>, window: usize) -> usize {
    let boundary = collected.len();
    let start = boundary.saturating_sub(window);
    let mut skipped = 0;

    let mut incoming = page.into_iter().enumerate();
    for (index, event) in incoming.by_ref() {
        if index >= window {
            collected.push(event);
            break;
        }
        let seen = !event.id.is_empty()
            && collected[start..boundary]
                .iter()
                .rev()
                .any(|prior| prior.id == event.id);
        if seen {
            skipped += 1;
        } else {
            collected.push(event);
        }
    }
    collected.extend(incoming.map(|(_, event)| event));

    skipped
}

/// Append a page without any duplicate check
pub fn append_all(collected: &mut Vec<Event>, page: Vec<Event>) -> usize {
    collected.extend(page);
    0
}
