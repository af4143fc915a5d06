//! Default selector trees embedded in the binary
//!
//! Each entity kind ships a YAML selector tree. Configuration may replace it
//! per kind; otherwise the embedded tree is parsed once when the connector is
//! built.

use super::EntityKind;
use crate::error::{Error, Result};
use crate::normalize::EntitySelector;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Built-in selector YAML definitions
pub static BUILTIN_SELECTORS: LazyLock<HashMap<EntityKind, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // Identity protection (GraphQL)
    m.insert(EntityKind::User, include_str!("../../selectors/user.yaml"));
    m.insert(
        EntityKind::Endpoint,
        include_str!("../../selectors/endpoint.yaml"),
    );
    m.insert(
        EntityKind::Incident,
        include_str!("../../selectors/incident.yaml"),
    );

    // Detections and alerts (REST)
    m.insert(
        EntityKind::Detection,
        include_str!("../../selectors/detection.yaml"),
    );
    m.insert(EntityKind::Alert, include_str!("../../selectors/alert.yaml"));
    m.insert(
        EntityKind::CombinedAlert,
        include_str!("../../selectors/alert.yaml"),
    );

    m
});

/// Parse the built-in selector tree for an entity kind
pub fn default_selector(kind: EntityKind) -> Result<EntitySelector> {
    let yaml = BUILTIN_SELECTORS
        .get(&kind)
        .ok_or_else(|| Error::config(format!("no built-in selector for {kind}")))?;
    serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("built-in selector for {kind} is invalid: {e}")))
}
