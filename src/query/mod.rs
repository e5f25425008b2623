//! Query module
//!
//! List, get and attribute options for the audit API, and their encoding
//! into query parameters.

mod types;

pub use types::{
    AttributeListOptions, DateFilter, DateQuery, GetOptions, ListOptions, QueryParams,
    SortDirection, SortKey, SortSpec, ATTRIBUTE_NAMES,
};
