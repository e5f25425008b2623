// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Hermes Audit
//!
//! Client and CLI for audit event APIs that page by numeric offset and
//! refuse offsets past a fixed ceiling (10,000 by default).
//!
//! ## Features
//!
//! - **Unbounded listings**: when the next offset would reach the ceiling,
//!   collection restarts at offset zero bounded by the last event's time
//! - **Boundary deduplication**: events repeated where pages or walks meet
//!   are dropped with a sliding window
//! - **Retrying HTTP**: backoff, rate limiting and token auth
//! - **CLI**: `list`, `show` and `attributes` with table, value, CSV, JSON
//!   and YAML output
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hermes_audit::{collect_events, AuditClient, ListOptions, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = AuditClient::new("https://hermes.example.com/v1", Some("token"))?;
//!     let options = ListOptions::new().with_sort("time:desc");
//!
//!     // all matching events, however many
//!     let mut events = Vec::new();
//!     collect_events(client, options, 0, true, &mut events).await?;
//!     println!("{} events", events.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ cli: list / show / attributes          output: formatting  │
//! └───────────────────────────┬────────────────────────────────┘
//!                             │
//! ┌───────────────────────────┴────────────────────────────────┐
//! │ engine: EventCollector                                     │
//! │   window (dedup)   ceiling (continuation)   progress       │
//! └───────────────────────────┬────────────────────────────────┘
//!                             │ PageFetcher
//! ┌──────────────┬────────────┴──────┬─────────────────────────┐
//! │ client       │ pagination        │ query                   │
//! │ AuditClient  │ Page, next_offset │ ListOptions, DateQuery  │
//! ├──────────────┴───────────────────┴─────────────────────────┤
//! │ http: retry, backoff, rate limit                           │
//! └────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Audit event records
pub mod event;

/// Query options and their wire encoding
pub mod query;

/// Page shape and next-offset detection
pub mod pagination;

/// Event collection across the offset ceiling
pub mod engine;

/// HTTP client with retry and rate limiting
pub mod http;

/// Audit API client
pub mod client;

/// Configuration loading
pub mod config;

/// Event and attribute printing
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use client::AuditClient;
pub use config::Config;
pub use engine::{collect_events, CancelFlag, CollectConfig, CollectStats, EventCollector};
pub use event::Event;
pub use pagination::{Page, PageFetcher};
pub use query::ListOptions;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
