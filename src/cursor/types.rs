//! Composite cursor types
//!
//! One sum type covers every continuation shape the connector issues. The
//! shape is implied by the driver that produced it; drivers reject shapes
//! they did not issue.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Composite continuation value handed to callers as an opaque token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cursor {
    /// Vendor forward cursor, or a decimal offset
    Simple(SimpleCursor),
    /// Search-after state for the combined alerts endpoint
    SearchAfter(SearchAfterCursor),
}

impl Cursor {
    /// Create a simple cursor
    pub fn simple(cursor: impl Into<String>) -> Self {
        Self::Simple(SimpleCursor {
            cursor: cursor.into(),
        })
    }

    /// Create a simple cursor carrying an offset
    pub fn offset(offset: u64) -> Self {
        Self::simple(offset.to_string())
    }

    /// A present-but-empty cursor means "first page"
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Simple(simple) => simple.cursor.is_empty(),
            Self::SearchAfter(search_after) => {
                search_after.after.is_empty() && search_after.vendor_after.is_empty()
            }
        }
    }

    /// Inner string of a simple cursor
    pub fn as_simple(&self) -> Option<&str> {
        match self {
            Self::Simple(simple) => Some(&simple.cursor),
            Self::SearchAfter(_) => None,
        }
    }

    /// Search-after state, if this is a search-after cursor
    pub fn as_search_after(&self) -> Option<&SearchAfterCursor> {
        match self {
            Self::Simple(_) => None,
            Self::SearchAfter(search_after) => Some(search_after),
        }
    }

    /// Short shape name for error messages
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Simple(_) => "simple",
            Self::SearchAfter(_) => "search-after",
        }
    }
}

/// `{"cursor": "<value>"}`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimpleCursor {
    /// Vendor cursor or decimal offset
    pub cursor: String,
}

/// Whether `total_hits` is exact or a lower bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalRelation {
    /// Total hits is exact
    #[default]
    Eq,
    /// Total hits is a lower bound
    Gte,
}

/// Search-after continuation state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchAfterCursor {
    /// Vendor token schema version
    pub version: String,
    /// Approximate total hit count reported by the vendor
    pub total_hits: u64,
    /// Qualifier for `total_hits`
    pub total_relation: TotalRelation,
    /// Vendor cluster/shard identifier
    pub cluster_id: String,
    /// Sort-key values of the last record returned
    pub after: Vec<Value>,
    /// Records fetched so far across all pages
    pub total_fetched: u64,
    /// Vendor `after` token exactly as issued, relayed on the next request
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vendor_after: String,
}

impl SearchAfterCursor {
    /// Whether two states point at the same position in the result set
    ///
    /// Sort-key tuples are compared when both sides have one; opaque vendor
    /// tokens are compared otherwise.
    pub fn same_position(&self, other: &Self) -> bool {
        if !self.after.is_empty() && !other.after.is_empty() {
            return self.after == other.after;
        }
        !self.vendor_after.is_empty() && self.vendor_after == other.vendor_after
    }
}
