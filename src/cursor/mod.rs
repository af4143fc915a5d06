//! Cursor codec module
//!
//! # Overview
//!
//! Every paginated entity resumes from a [`Cursor`]. Callers only ever see
//! the encoded token: base64 of the cursor's canonical JSON.
//!
//! - simple cursors encode as `{"cursor":"<value>"}`
//! - search-after cursors encode their full state, including the running
//!   `total_fetched` count

mod codec;
mod types;

pub use codec::{decode, encode, VendorAfterToken};
pub use types::{Cursor, SearchAfterCursor, SimpleCursor, TotalRelation};

#[cfg(test)]
mod tests;
