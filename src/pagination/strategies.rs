//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{NextPage, Paginator};
use crate::cursor::{Cursor, SearchAfterCursor};
use crate::error::{Error, Result};
use crate::normalize::lookup;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Query/argument name carrying the forward cursor or search-after token
pub const AFTER_PARAM: &str = "after";
/// Query parameter name for offset
pub const OFFSET_PARAM: &str = "offset";
/// Query parameter name for limit
pub const LIMIT_PARAM: &str = "limit";

fn wrong_shape(cursor: &Cursor, driver: &str) -> Error {
    Error::invalid_cursor(format!(
        "{} cursor cannot resume {driver} pagination",
        cursor.shape()
    ))
}

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Forward-cursor pagination over a GraphQL connection
///
/// Reads `hasNextPage` and `endCursor` from the `pageInfo` object. The end
/// cursor is passed back verbatim.
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    /// Path to the `pageInfo` object in the response
    pub page_info_path: String,
}

impl CursorPaginator {
    /// Create a new cursor paginator
    pub fn new(page_info_path: impl Into<String>) -> Self {
        Self {
            page_info_path: page_info_path.into(),
        }
    }

    fn incoming<'a>(&self, current: Option<&'a Cursor>) -> Result<Option<&'a str>> {
        match current {
            None => Ok(None),
            Some(Cursor::Simple(simple)) => Ok(Some(simple.cursor.as_str())),
            Some(other) => Err(wrong_shape(other, "cursor")),
        }
    }
}

impl Paginator for CursorPaginator {
    fn initial_params(&self, current: Option<&Cursor>) -> Result<HashMap<String, String>> {
        let mut params = HashMap::new();
        if let Some(cursor) = self.incoming(current)? {
            params.insert(AFTER_PARAM.to_string(), cursor.to_string());
        }
        Ok(params)
    }

    fn next_page(
        &self,
        body: &Value,
        records_count: usize,
        current: Option<&Cursor>,
    ) -> Result<NextPage> {
        let incoming = self.incoming(current)?;

        if records_count == 0 {
            return Ok(NextPage::Done);
        }

        let Some(page_info) = lookup(body, &self.page_info_path) else {
            debug!("No pageInfo at '{}', treating as last page", self.page_info_path);
            return Ok(NextPage::Done);
        };

        let has_next = page_info
            .get("hasNextPage")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let end_cursor = page_info
            .get("endCursor")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty());

        match end_cursor {
            Some(end) if has_next => {
                if incoming == Some(end) {
                    warn!("Vendor returned the request cursor as endCursor, stopping");
                    return Ok(NextPage::Done);
                }
                Ok(NextPage::Continue(Cursor::simple(end)))
            }
            _ => Ok(NextPage::Done),
        }
    }
}

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination
///
/// The next offset is the current offset plus the records returned. A short
/// or empty page ends the sequence.
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    /// Number of records per page
    pub page_size: u32,
}

impl OffsetPaginator {
    /// Create a new offset paginator
    pub fn new(page_size: u32) -> Self {
        Self { page_size }
    }

    /// Offset the page was requested at (0 without a cursor)
    pub fn current_offset(&self, current: Option<&Cursor>) -> Result<u64> {
        match current {
            None => Ok(0),
            Some(Cursor::Simple(simple)) if simple.cursor.is_empty() => Ok(0),
            Some(Cursor::Simple(simple)) => simple.cursor.parse::<u64>().map_err(|_| {
                Error::invalid_cursor(format!("offset '{}' is not a number", simple.cursor))
            }),
            Some(other) => Err(wrong_shape(other, "offset")),
        }
    }
}

impl Paginator for OffsetPaginator {
    fn initial_params(&self, current: Option<&Cursor>) -> Result<HashMap<String, String>> {
        let mut params = HashMap::new();
        params.insert(
            OFFSET_PARAM.to_string(),
            self.current_offset(current)?.to_string(),
        );
        params.insert(LIMIT_PARAM.to_string(), self.page_size.to_string());
        Ok(params)
    }

    fn next_page(
        &self,
        _body: &Value,
        records_count: usize,
        current: Option<&Cursor>,
    ) -> Result<NextPage> {
        let offset = self.current_offset(current)?;

        // If we got fewer records than limit, we're done
        if records_count == 0 || records_count < self.page_size as usize {
            return Ok(NextPage::Done);
        }

        let next = offset.checked_add(records_count as u64).ok_or_else(|| {
            Error::invalid_cursor(format!("offset {offset} cannot advance by {records_count}"))
        })?;
        Ok(NextPage::Continue(Cursor::offset(next)))
    }
}

// ============================================================================
// Search-After Pagination
// ============================================================================

/// Search-after pagination over the combined alerts endpoint
///
/// An empty `after` in the pagination block ends the sequence regardless of
/// the reported total, which the vendor only approximates.
#[derive(Debug, Clone)]
pub struct SearchAfterPaginator {
    /// Path to the pagination block in the response
    pub pagination_path: String,
    /// Number of records per page
    pub page_size: u32,
}

impl SearchAfterPaginator {
    /// Create a new search-after paginator
    pub fn new(pagination_path: impl Into<String>, page_size: u32) -> Self {
        Self {
            pagination_path: pagination_path.into(),
            page_size,
        }
    }

    fn incoming<'a>(&self, current: Option<&'a Cursor>) -> Result<Option<&'a SearchAfterCursor>> {
        match current {
            None => Ok(None),
            Some(Cursor::SearchAfter(state)) => Ok(Some(state)),
            Some(other) => Err(wrong_shape(other, "search-after")),
        }
    }
}

impl Paginator for SearchAfterPaginator {
    fn initial_params(&self, current: Option<&Cursor>) -> Result<HashMap<String, String>> {
        let after = match self.incoming(current)? {
            Some(state) => state.relay_token()?,
            None => String::new(),
        };

        let mut params = HashMap::new();
        params.insert(AFTER_PARAM.to_string(), after);
        params.insert(LIMIT_PARAM.to_string(), self.page_size.to_string());
        Ok(params)
    }

    fn next_page(
        &self,
        body: &Value,
        records_count: usize,
        current: Option<&Cursor>,
    ) -> Result<NextPage> {
        let incoming = self.incoming(current)?;
        let fetched_before = incoming.map_or(0, |state| state.total_fetched);

        let block = lookup(body, &self.pagination_path);
        let after = block
            .and_then(|b| b.get(AFTER_PARAM))
            .and_then(Value::as_str)
            .filter(|a| !a.is_empty());

        let Some(after) = after else {
            return Ok(NextPage::Done);
        };
        if records_count == 0 {
            return Ok(NextPage::Done);
        }

        let reported_total = block
            .and_then(|b| b.get("total"))
            .and_then(Value::as_u64)
            .unwrap_or(0);

        let reported_relation = block
            .and_then(|b| b.get("total_relation"))
            .and_then(|r| serde_json::from_value(r.clone()).ok());
        let next = SearchAfterCursor::from_vendor_after(
            after,
            reported_total,
            reported_relation,
            fetched_before.saturating_add(records_count as u64),
        );

        if incoming.is_some_and(|state| state.same_position(&next)) {
            warn!("Vendor returned the same search-after position, stopping");
            return Ok(NextPage::Done);
        }

        Ok(NextPage::Continue(Cursor::SearchAfter(next)))
    }
}
