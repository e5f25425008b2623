//! CLI module
//!
//! Command-line interface for the audit event API.
//!
//! # Commands
//!
//! - `list` - Collect events matching filters, across the offset ceiling
//! - `show` - Fetch events by id
//! - `attributes` - List the distinct values of an event attribute

mod commands;
mod progress;
mod runner;

pub use commands::{AttributesArgs, Cli, Commands, ListArgs, ScopeArgs, ShowArgs};
pub use progress::LogProgress;
pub use runner::{failure_hint, Runner};
