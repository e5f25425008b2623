//! Continuation link handling
//!
//! The audit API paginates by numeric offset and embeds the next offset in
//! the `next` link of each page.

use super::types::{NextPage, Page};
use crate::error::{Error, Result};
use url::Url;

/// Base used to resolve relative next links
const RELATIVE_BASE: &str = "http://localhost/";

/// Extract the offset of the next page from a page's continuation link
///
/// A missing or empty link means the listing is complete. A link without
/// exactly one integer `offset` parameter is an error: the walk cannot
/// resume safely from it.
pub fn next_offset(page: &Page) -> Result<NextPage> {
    let next = match page.next.as_deref().map(str::trim) {
        Some(next) if !next.is_empty() => next,
        _ => return Ok(NextPage::Done),
    };

    let url = parse_link(next)
        .map_err(|e| Error::offset_parse(next, format!("failed to parse next url: {e}")))?;

    let offsets: Vec<String> = url
        .query_pairs()
        .filter(|(key, _)| key == "offset")
        .map(|(_, value)| value.into_owned())
        .collect();

    match offsets.as_slice() {
        [offset] => offset
            .parse::<u32>()
            .map(|offset| NextPage::Continue { offset })
            .map_err(|e| Error::offset_parse(next, e.to_string())),
        [] => Err(Error::offset_parse(next, "link carries no offset")),
        _ => Err(Error::offset_parse(next, "link carries several offsets")),
    }
}

/// The server-reported total, used for progress sizing only
pub fn total_hint(page: &Page) -> Option<u64> {
    page.total
}

fn parse_link(link: &str) -> std::result::Result<Url, url::ParseError> {
    match Url::parse(link) {
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)?.join(link),
        other => other,
    }
}
