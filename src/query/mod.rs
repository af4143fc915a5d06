//! GraphQL query construction
//!
//! Selects the entity-specific document builder for a page request. Only
//! GraphQL-surface entities have a builder; REST entities are rejected.

mod builders;

pub use builders::{endpoint_query, incident_query, string_literal, user_query};

use crate::entity::EntityKind;
use crate::error::{Error, Result};
use crate::types::PageRequest;
use serde_json::{json, Value};

/// Build the GraphQL document for one page of an entity kind
pub fn build(kind: EntityKind, request: &PageRequest, cursor: Option<&str>) -> Result<String> {
    match kind {
        EntityKind::User => user_query(request, cursor),
        EntityKind::Endpoint => endpoint_query(request, cursor),
        EntityKind::Incident => incident_query(request, cursor),
        EntityKind::Detection | EntityKind::Alert | EntityKind::CombinedAlert => {
            Err(Error::unsupported_entity(kind.as_str()))
        }
    }
}

/// Transport body for a GraphQL document
pub fn graphql_body(query: &str) -> Value {
    json!({ "query": query, "variables": null })
}

#[cfg(test)]
mod tests;
