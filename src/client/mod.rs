//! Audit API client module
//!
//! `AuditClient` is the production `PageFetcher`: it encodes `ListOptions`
//! into a request, sends it through the retrying HTTP client and decodes
//! the page body.

mod audit;

pub use audit::AuditClient;
