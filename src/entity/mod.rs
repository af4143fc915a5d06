//! Entity kinds and their vendor bindings
//!
//! Every entity kind maps to exactly one surface (GraphQL or REST), one
//! pagination strategy, and one default selector tree. The table is closed:
//! adding a kind means adding a variant and a binding.

mod selectors;

pub use selectors::{default_selector, BUILTIN_SELECTORS};

use crate::error::{Error, Result};
use crate::pagination::{CursorPaginator, OffsetPaginator, PageDriver, SearchAfterPaginator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Path of the combined search-after pagination block
pub const SEARCH_AFTER_PAGINATION_PATH: &str = "meta.pagination";

/// Path of REST record arrays
pub const REST_RECORDS_PATH: &str = "resources";

// ============================================================================
// Entity Kind
// ============================================================================

/// Externally identified record category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntityKind {
    /// Identity-protection user entities
    User,
    /// Identity-protection endpoint entities
    Endpoint,
    /// Identity-protection incidents
    Incident,
    /// Endpoint detection summaries
    Detection,
    /// Unified alerts, offset paged
    Alert,
    /// Unified alerts, search-after paged
    CombinedAlert,
}

impl EntityKind {
    /// All entity kinds, in table order
    pub const ALL: [EntityKind; 6] = [
        Self::User,
        Self::Endpoint,
        Self::Incident,
        Self::Detection,
        Self::Alert,
        Self::CombinedAlert,
    ];

    /// External name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Endpoint => "Endpoint",
            Self::Incident => "Incident",
            Self::Detection => "Detection",
            Self::Alert => "Alert",
            Self::CombinedAlert => "CombinedAlert",
        }
    }

    /// API version used when the request does not name one
    pub fn default_api_version(&self) -> &'static str {
        match self {
            Self::Alert => "v2",
            _ => "v1",
        }
    }

    /// Vendor binding for this kind
    pub fn binding(&self) -> EntityBinding {
        match self {
            Self::User => EntityBinding::graphql(*self, "entities", "RISK_SCORE"),
            Self::Endpoint => EntityBinding::graphql(*self, "entities", "RISK_SCORE"),
            Self::Incident => EntityBinding::graphql(*self, "incidents", "END_TIME"),
            Self::Detection => EntityBinding {
                kind: *self,
                driver: DriverKind::Offset,
                sort_key: None,
                endpoint: Endpoint::ListThenDetail {
                    list: "/detects/queries/detects",
                    detail: "/detects/entities/summaries/GET",
                    ids_field: "ids",
                },
            },
            Self::Alert => EntityBinding {
                kind: *self,
                driver: DriverKind::Offset,
                sort_key: None,
                endpoint: Endpoint::ListThenDetail {
                    list: "/alerts/queries/alerts",
                    detail: "/alerts/entities/alerts",
                    ids_field: "composite_ids",
                },
            },
            Self::CombinedAlert => EntityBinding {
                kind: *self,
                driver: DriverKind::SearchAfter,
                sort_key: None,
                endpoint: Endpoint::Combined {
                    path: "/alerts/combined/alerts",
                    sort: "created_timestamp|desc",
                },
            },
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .or_else(|| match name.to_ascii_lowercase().as_str() {
                "combined_alert" | "combined-alert" => Some(Self::CombinedAlert),
                _ => None,
            })
            .ok_or_else(|| Error::unsupported_entity(s))
    }
}

impl TryFrom<String> for EntityKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        kind.as_str().to_string()
    }
}

// ============================================================================
// Binding
// ============================================================================

/// Pagination strategy used by an entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    /// GraphQL forward cursor
    Cursor,
    /// REST offset and limit
    Offset,
    /// REST search-after token
    SearchAfter,
}

/// Vendor surface an entity kind is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "surface", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Endpoint {
    /// GraphQL connection under `data.<root>`
    #[serde(rename = "graphql")]
    GraphQl { root: &'static str },
    /// REST id listing followed by a detail lookup
    ListThenDetail {
        list: &'static str,
        detail: &'static str,
        ids_field: &'static str,
    },
    /// REST combined search-after endpoint
    Combined {
        path: &'static str,
        sort: &'static str,
    },
}

/// Static binding of one entity kind to its vendor surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityBinding {
    /// Entity kind
    pub kind: EntityKind,
    /// Pagination strategy
    pub driver: DriverKind,
    /// GraphQL sort key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<&'static str>,
    /// Vendor surface
    pub endpoint: Endpoint,
}

impl EntityBinding {
    fn graphql(kind: EntityKind, root: &'static str, sort_key: &'static str) -> Self {
        Self {
            kind,
            driver: DriverKind::Cursor,
            sort_key: Some(sort_key),
            endpoint: Endpoint::GraphQl { root },
        }
    }

    /// Whether this kind is read through GraphQL
    pub fn is_graphql(&self) -> bool {
        matches!(self.endpoint, Endpoint::GraphQl { .. })
    }

    /// Dot path of the record array in a page response
    pub fn records_path(&self) -> String {
        match self.endpoint {
            Endpoint::GraphQl { root } => format!("data.{root}.nodes"),
            _ => REST_RECORDS_PATH.to_string(),
        }
    }

    /// Pagination strategy for a page size
    pub fn paginator(&self, page_size: u32) -> PageDriver {
        match (self.driver, self.endpoint) {
            (DriverKind::Cursor, Endpoint::GraphQl { root }) => {
                PageDriver::Cursor(CursorPaginator::new(format!("data.{root}.pageInfo")))
            }
            (DriverKind::SearchAfter, _) => PageDriver::SearchAfter(SearchAfterPaginator::new(
                SEARCH_AFTER_PAGINATION_PATH,
                page_size,
            )),
            _ => PageDriver::Offset(OffsetPaginator::new(page_size)),
        }
    }
}
