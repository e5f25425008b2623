//! Query option types
//!
//! Filter names and the `gt`/`gte`/`lt`/`lte` vocabulary are part of the
//! audit API contract and are emitted verbatim.

use crate::error::{Error, Result};
use crate::event::format_time;
use chrono::{DateTime, FixedOffset};
use std::fmt;
use std::str::FromStr;

/// Query string as ordered name/value pairs
pub type QueryParams = Vec<(String, String)>;

// ============================================================================
// Date Filters
// ============================================================================

/// Comparison operator of a time filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFilter {
    /// Strictly after
    Gt,
    /// At or after
    Gte,
    /// Strictly before
    Lt,
    /// At or before
    Lte,
}

impl DateFilter {
    /// Wire name of the operator
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Gte),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Lte),
            other => Err(Error::invalid_value(
                "time",
                format!("unknown date filter '{other}', expected one of gt, gte, lt, lte"),
            )),
        }
    }
}

/// A single time constraint
///
/// Without an operator the query means "equal", sent as a `gte`/`lte` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateQuery {
    /// The boundary timestamp
    pub date: DateTime<FixedOffset>,
    /// Comparison operator, `None` for equality
    pub filter: Option<DateFilter>,
}

impl DateQuery {
    /// An equality constraint
    pub fn exact(date: DateTime<FixedOffset>) -> Self {
        Self { date, filter: None }
    }

    /// A bounded constraint
    pub fn bound(filter: DateFilter, date: DateTime<FixedOffset>) -> Self {
        Self {
            date,
            filter: Some(filter),
        }
    }

    /// Render as the `time` parameter fragment
    pub fn to_param(&self) -> String {
        let date = format_time(&self.date);
        match self.filter {
            Some(filter) => format!("{filter}:{date}"),
            None => format!("{}:{date},{}:{date}", DateFilter::Gte, DateFilter::Lte),
        }
    }
}

// ============================================================================
// Sorting
// ============================================================================

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One `field[:direction]` entry of a sort specification
///
/// The direction is kept as written so unknown values reach the server
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: Option<String>,
}

impl SortKey {
    /// Parsed direction, if it is one of `asc`/`desc`
    pub fn direction(&self) -> Option<SortDirection> {
        match self.direction.as_deref() {
            Some("asc") => Some(SortDirection::Asc),
            Some("desc") => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.direction {
            Some(direction) => write!(f, "{}:{direction}", self.field),
            None => f.write_str(&self.field),
        }
    }
}

/// Ordered list of sort keys, e.g. `time:desc,action`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Parse a comma-separated sort specification
    pub fn parse(spec: &str) -> Self {
        let keys = spec
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once(':') {
                Some((field, direction)) => SortKey {
                    field: field.to_string(),
                    direction: Some(direction.to_string()),
                },
                None => SortKey {
                    field: entry.to_string(),
                    direction: None,
                },
            })
            .collect();
        Self { keys }
    }

    /// Build from several specifications, as given by repeated flags
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> Self {
        let joined: Vec<&str> = parts.iter().map(AsRef::as_ref).collect();
        Self::parse(&joined.join(","))
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether results arrive newest first
    ///
    /// The first `time` key decides: only an explicit `desc` means
    /// descending. Without any `time` key the server default (newest first)
    /// applies.
    pub fn time_descending(&self) -> bool {
        self.keys
            .iter()
            .find(|key| key.field == "time")
            .map_or(true, |key| key.direction() == Some(SortDirection::Desc))
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.keys.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(","))
    }
}

// ============================================================================
// List Options
// ============================================================================

/// Filters, sorting and paging for an event listing
///
/// The engine rewrites `limit`, `offset` and `time` between pagination
/// rounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub observer_type: Option<String>,
    pub target_id: Option<String>,
    pub target_type: Option<String>,
    pub initiator_id: Option<String>,
    pub initiator_type: Option<String>,
    pub initiator_name: Option<String>,
    pub action: Option<String>,
    pub outcome: Option<String>,
    pub request_path: Option<String>,
    pub domain_id: Option<String>,
    pub project_id: Option<String>,
    pub search: Option<String>,
    /// Time constraints, combined by the server
    pub time: Vec<DateQuery>,
    pub sort: SortSpec,
    /// Page size
    pub limit: u32,
    pub offset: u32,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sort(mut self, spec: &str) -> Self {
        self.sort = SortSpec::parse(spec);
        self
    }

    #[must_use]
    pub fn with_time(mut self, query: DateQuery) -> Self {
        self.time.push(query);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the timestamp of every `filter` bound, or add one if none exists
    pub fn upsert_time_bound(&mut self, filter: DateFilter, date: DateTime<FixedOffset>) {
        let mut found = false;
        for query in &mut self.time {
            if query.filter == Some(filter) {
                query.date = date;
                found = true;
            }
        }
        if !found {
            self.time.push(DateQuery::bound(filter, date));
        }
    }

    /// Equality filters as wire name/value pairs, empty values omitted
    pub fn filters(&self) -> QueryParams {
        let fields = [
            ("observer_type", &self.observer_type),
            ("target_id", &self.target_id),
            ("target_type", &self.target_type),
            ("initiator_id", &self.initiator_id),
            ("initiator_type", &self.initiator_type),
            ("initiator_name", &self.initiator_name),
            ("action", &self.action),
            ("outcome", &self.outcome),
            ("request_path", &self.request_path),
            ("domain_id", &self.domain_id),
            ("project_id", &self.project_id),
            ("search", &self.search),
        ];

        fields
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    /// The full query string for one page request
    pub fn to_query(&self) -> QueryParams {
        let mut params = self.filters();

        if !self.time.is_empty() {
            let time: Vec<String> = self.time.iter().map(DateQuery::to_param).collect();
            params.push(("time".into(), time.join(",")));
        }
        if !self.sort.is_empty() {
            params.push(("sort".into(), self.sort.to_string()));
        }
        if self.limit > 0 {
            params.push(("limit".into(), self.limit.to_string()));
        }
        if self.offset > 0 {
            params.push(("offset".into(), self.offset.to_string()));
        }

        params
    }
}

// ============================================================================
// Get / Attribute Options
// ============================================================================

/// Scope for fetching a single event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetOptions {
    pub project_id: Option<String>,
    pub domain_id: Option<String>,
}

impl GetOptions {
    pub fn to_query(&self) -> QueryParams {
        scope_params(self.project_id.as_deref(), self.domain_id.as_deref())
    }
}

/// Attribute names the API can enumerate
pub const ATTRIBUTE_NAMES: &[&str] = &[
    "observer_type",
    "target_type",
    "target_id",
    "initiator_type",
    "initiator_id",
    "initiator_name",
    "action",
    "outcome",
];

/// Options for listing the distinct values of an attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeListOptions {
    pub max_depth: u32,
    pub limit: u32,
    pub project_id: Option<String>,
    pub domain_id: Option<String>,
}

impl AttributeListOptions {
    pub fn to_query(&self) -> QueryParams {
        let mut params = Vec::new();
        if self.max_depth > 0 {
            params.push(("max_depth".into(), self.max_depth.to_string()));
        }
        if self.limit > 0 {
            params.push(("limit".into(), self.limit.to_string()));
        }
        params.extend(scope_params(
            self.project_id.as_deref(),
            self.domain_id.as_deref(),
        ));
        params
    }
}

fn scope_params(project_id: Option<&str>, domain_id: Option<&str>) -> QueryParams {
    let mut params = Vec::new();
    if let Some(domain_id) = domain_id.filter(|v| !v.is_empty()) {
        params.push(("domain_id".into(), domain_id.to_string()));
    }
    if let Some(project_id) = project_id.filter(|v| !v.is_empty()) {
        params.push(("project_id".into(), project_id.to_string()));
    }
    params
}
