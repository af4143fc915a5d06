//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use super::strategies::{CursorPaginator, OffsetPaginator, SearchAfterPaginator};
use crate::cursor::Cursor;
use crate::error::Result;
use serde_json::Value;
use std::collections::HashMap;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available, resume from this cursor
    Continue(Cursor),
    /// No more pages
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue(_))
    }

    /// Cursor to resume from, if any
    pub fn cursor(&self) -> Option<&Cursor> {
        match self {
            Self::Continue(cursor) => Some(cursor),
            Self::Done => None,
        }
    }

    /// Consume into the cursor to resume from
    pub fn into_cursor(self) -> Option<Cursor> {
        match self {
            Self::Continue(cursor) => Some(cursor),
            Self::Done => None,
        }
    }
}

/// Core trait for pagination strategies
///
/// `current` is the decoded, non-empty cursor the page was requested with.
/// Implementations reject cursor shapes they did not issue.
pub trait Paginator: Send + Sync {
    /// Continuation parameters for the request about to be sent
    fn initial_params(&self, current: Option<&Cursor>) -> Result<HashMap<String, String>>;

    /// Process a response and determine if there's a next page
    fn next_page(
        &self,
        body: &Value,
        records_count: usize,
        current: Option<&Cursor>,
    ) -> Result<NextPage>;
}

/// The three pagination strategies, dispatched by entity binding
#[derive(Debug, Clone)]
pub enum PageDriver {
    /// GraphQL `pageInfo` forward cursor
    Cursor(CursorPaginator),
    /// REST `offset`/`limit`
    Offset(OffsetPaginator),
    /// REST search-after token
    SearchAfter(SearchAfterPaginator),
}

impl Paginator for PageDriver {
    fn initial_params(&self, current: Option<&Cursor>) -> Result<HashMap<String, String>> {
        match self {
            Self::Cursor(p) => p.initial_params(current),
            Self::Offset(p) => p.initial_params(current),
            Self::SearchAfter(p) => p.initial_params(current),
        }
    }

    fn next_page(
        &self,
        body: &Value,
        records_count: usize,
        current: Option<&Cursor>,
    ) -> Result<NextPage> {
        match self {
            Self::Cursor(p) => p.next_page(body, records_count, current),
            Self::Offset(p) => p.next_page(body, records_count, current),
            Self::SearchAfter(p) => p.next_page(body, records_count, current),
        }
    }
}
