//! GraphQL document builders
//!
//! Builders are pure: the same request and cursor always render the same
//! bytes, so tests can rebuild the exact body a page fetch sends.

use crate::entity::EntityKind;
use crate::error::{Error, Result};
use crate::types::PageRequest;

const PAGE_INFO: &str = "pageInfo { hasNextPage endCursor }";

const USER_FIELDS: &str = "entityId primaryDisplayName secondaryDisplayName type \
riskScore riskScoreSeverity archived creationTime emailAddresses \
roles { type } riskFactors { type severity } \
accounts { __typename \
... on ActiveDirectoryAccountDescriptor { dataSource domain samAccountName upn ou department title objectSid enabled creationTime passwordAttributes { lastChange strength } } \
... on SsoUserAccountDescriptor { dataSource mostRecentActivity title creationTime passwordAttributes { lastChange } } }";

const ENDPOINT_FIELDS: &str = "entityId primaryDisplayName secondaryDisplayName type \
riskScore riskScoreSeverity archived creationTime \
roles { type } riskFactors { type severity } \
accounts { __typename \
... on ActiveDirectoryAccountDescriptor { dataSource domain samAccountName ou objectSid enabled creationTime } \
... on HostAccountDescriptor { dataSource hostName lastIpAddress mostRecentActivity } }";

const INCIDENT_FIELDS: &str = "incidentId type startTime endTime lifeCycleStage severity markedAsRead \
compromisedEntities { entityId primaryDisplayName type riskScore } \
alertEvents { alertId alertType timestamp }";

/// Render a cursor as a GraphQL string literal
///
/// JSON string escaping is a subset of GraphQL string escaping.
pub fn string_literal(value: &str) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn after_clause(cursor: Option<&str>) -> Result<String> {
    match cursor.filter(|c| !c.is_empty()) {
        Some(cursor) => Ok(format!(", after: {}", string_literal(cursor)?)),
        None => Ok(String::new()),
    }
}

/// Sort key from the entity binding table
fn sort_key(kind: EntityKind) -> Result<&'static str> {
    kind.binding()
        .sort_key
        .ok_or_else(|| Error::unsupported_entity(kind.as_str()))
}

fn entities_query(
    kind: EntityKind,
    entity_type: &str,
    fields: &str,
    request: &PageRequest,
    cursor: Option<&str>,
) -> Result<String> {
    Ok(format!(
        "{{ entities(types: [{entity_type}], archived: {archived}, enabled: {enabled}, \
first: {first}, sortKey: {sort_key}, sortOrder: DESCENDING{after}) \
{{ {PAGE_INFO} nodes {{ {fields} }} }} }}",
        sort_key = sort_key(kind)?,
        archived = request.archived,
        enabled = request.enabled,
        first = request.page_size,
        after = after_clause(cursor)?,
    ))
}

/// Identity entities of type USER, riskiest first
pub fn user_query(request: &PageRequest, cursor: Option<&str>) -> Result<String> {
    entities_query(EntityKind::User, "USER", USER_FIELDS, request, cursor)
}

/// Identity entities of type ENDPOINT, riskiest first
pub fn endpoint_query(request: &PageRequest, cursor: Option<&str>) -> Result<String> {
    entities_query(EntityKind::Endpoint, "ENDPOINT", ENDPOINT_FIELDS, request, cursor)
}

/// Incidents, most recently ended first
///
/// The archived and enabled flags do not apply to incidents.
pub fn incident_query(request: &PageRequest, cursor: Option<&str>) -> Result<String> {
    Ok(format!(
        "{{ incidents(first: {first}, sortKey: {sort_key}, sortOrder: DESCENDING{after}) \
{{ {PAGE_INFO} nodes {{ {INCIDENT_FIELDS} }} }} }}",
        sort_key = sort_key(EntityKind::Incident)?,
        first = request.page_size,
        after = after_clause(cursor)?,
    ))
}
