//! Pagination module
//!
//! The audit API pages by numeric offset and links each page to the next one.
//!
//! # Overview
//!
//! `PageFetcher` is the seam between the collection engine and the transport:
//! the engine hands it a `ListOptions`, gets back a decoded `Page`, and uses
//! `next_offset` to decide where the walk goes next.

mod offset;
mod types;

pub use offset::{next_offset, total_hint};
pub use types::{NextPage, Page, PageFetcher};
