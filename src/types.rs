//! Common types used throughout the connector
//!
//! Page requests and results, and the generic record shape handed to the
//! downstream sync engine.

use crate::entity::EntityKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Default number of records per page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Page Request
// ============================================================================

/// One page fetch, immutable for the duration of the call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Entity kind to fetch
    pub entity: EntityKind,
    /// Number of records per page
    pub page_size: u32,
    /// Opaque cursor token issued by a previous page (None = first page)
    pub cursor: Option<String>,
    /// Vendor filter expression (REST entities only)
    pub filter: Option<String>,
    /// API version tag; None uses the entity's default
    pub api_version: Option<String>,
    /// Include archived entities (GraphQL entity queries only)
    pub archived: bool,
    /// Include only enabled entities (GraphQL entity queries only)
    pub enabled: bool,
    /// Per-call transport timeout
    pub timeout: Duration,
}

impl PageRequest {
    /// Create a first-page request with default settings
    pub fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            page_size: DEFAULT_PAGE_SIZE,
            cursor: None,
            filter: None,
            api_version: None,
            archived: false,
            enabled: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the cursor token
    #[must_use]
    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor;
        self
    }

    /// Set the filter expression
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the API version
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Set the archived flag
    #[must_use]
    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    /// Set the enabled flag
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the per-call timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// API version to use, falling back to the entity default
    pub fn api_version(&self) -> &str {
        self.api_version
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.entity.default_api_version())
    }
}

// ============================================================================
// Page Result
// ============================================================================

/// Records of one page plus the token to resume from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    /// Normalized records, in vendor order
    pub records: Vec<Record>,
    /// Opaque cursor token for the next page (None on the last page)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// HTTP status of the final transport call
    pub status: u16,
}

impl PageResult {
    /// Whether this was the final page
    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

// ============================================================================
// Records
// ============================================================================

/// A typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Bool(bool),
    Int64(i64),
    Double(f64),
    DateTime(DateTime<Utc>),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// String contents, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer contents, if this is an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(n) => Some(*n),
            _ => None,
        }
    }

    /// Timestamp contents, if this is a timestamp
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }
}

/// A normalized record: attributes plus named child collections
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    /// Attribute values keyed by declared attribute name
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Child records keyed by child selector path
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, Vec<Record>>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an attribute
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Look up a child collection
    pub fn child(&self, path: &str) -> Option<&[Record]> {
        self.children.get(path).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let request = PageRequest::new(EntityKind::User);
        assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);
        assert!(request.cursor.is_none());
        assert!(!request.archived);
        assert!(request.enabled);
        assert_eq!(request.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_page_request_api_version_fallback() {
        let request = PageRequest::new(EntityKind::Alert);
        assert_eq!(request.api_version(), "v2");

        let request = request.with_api_version("v3");
        assert_eq!(request.api_version(), "v3");

        let request = PageRequest::new(EntityKind::Detection).with_api_version("");
        assert_eq!(request.api_version(), "v1");
    }

    #[test]
    fn test_record_serialization() {
        let mut record = Record::new();
        record
            .attributes
            .insert("id".to_string(), AttributeValue::String("u-1".to_string()));
        record
            .attributes
            .insert("score".to_string(), AttributeValue::Int64(7));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"attributes": {"id": "u-1", "score": 7}}));
    }
}
