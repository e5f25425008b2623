//! Audit event module
//!
//! CADF event records as returned by the audit API, plus the timestamp
//! parsing shared by the wire format and the CLI time filters.

mod time;
mod types;

pub use time::{format_time, parse_time};
pub use types::{Attachment, Event, Host, Initiator, Observer, Reason, Target, DEFAULT_COLUMNS};

#[cfg(test)]
mod tests;
