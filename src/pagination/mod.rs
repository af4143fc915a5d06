//! Pagination module
//!
//! Supports: GraphQL forward cursor, REST offset, REST search-after
//!
//! # Overview
//!
//! Each strategy reads one page response plus the cursor that requested it
//! and decides the cursor for the next call, or that the sequence is over.
//! A zero-record page always ends the sequence.

mod strategies;
mod types;

pub use strategies::{
    CursorPaginator, OffsetPaginator, SearchAfterPaginator, AFTER_PARAM, LIMIT_PARAM,
    OFFSET_PARAM,
};
pub use types::{NextPage, PageDriver, Paginator};
