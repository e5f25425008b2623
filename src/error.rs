//! Error types for hermes-audit
//!
//! One enum covers the crate. Failures inside an event collection run are
//! wrapped in [`Error::Collect`], which records how far the run got; use
//! [`Error::root`] to look at the underlying cause.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // ------------------------------------------------------------------------
    // Event collection
    // ------------------------------------------------------------------------
    #[error("Event collection failed at offset {offset} after {collected} events: {source}")]
    Collect {
        offset: u32,
        collected: usize,
        #[source]
        source: Box<Error>,
    },

    #[error(
        "Offset ceiling of {max_offset} reached before any event was collected; \
         narrow the filters to continue"
    )]
    CeilingWithoutHistory { max_offset: u32 },

    #[error(
        "Continuation stalled at {cursor}: more than a full page window of events share \
         this timestamp; narrow the filters to continue"
    )]
    ContinuationStalled { cursor: String },

    #[error("Cannot find the next page offset in '{next}': {message}")]
    OffsetParse { next: String, message: String },

    #[error("Event collection cancelled")]
    Cancelled,

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Throttled by the server, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("No response within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Gave up after {max_retries} retries")]
    MaxRetriesExceeded { max_retries: u32 },

    // ------------------------------------------------------------------------
    // Payloads
    // ------------------------------------------------------------------------
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Invalid time '{value}': {message}")]
    InvalidTime { value: String, message: String },

    #[error("Invalid JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ------------------------------------------------------------------------
    // Configuration and input
    // ------------------------------------------------------------------------
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------
    #[error("Cannot write output: {message}")]
    Output { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn invalid_time(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTime {
            value: value.into(),
            message: message.into(),
        }
    }

    pub fn offset_parse(next: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OffsetParse {
            next: next.into(),
            message: message.into(),
        }
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Attach the position a collection run failed at
    pub fn collect(offset: u32, collected: usize, source: Error) -> Self {
        Self::Collect {
            offset,
            collected,
            source: Box::new(source),
        }
    }

    /// The cause behind any collection context
    pub fn root(&self) -> &Error {
        match self {
            Error::Collect { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the run was stopped by the caller
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), Error::Cancelled)
    }

    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self.root() {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Prefix errors with what was being attempted
pub trait ResultExt<T> {
    fn context(self, message: impl Into<String>) -> Result<T>;

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        let message = message.into();
        self.with_context(|| message)
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::Other(format!("{}: {}", f(), e.into())))
    }
}
