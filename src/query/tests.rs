//! Tests for query builders

use super::*;
use crate::error::ErrorCode;
use pretty_assertions::assert_eq;
use test_case::test_case;

fn request(kind: EntityKind) -> PageRequest {
    PageRequest::new(kind).with_page_size(2)
}

#[test]
fn test_user_query_first_page() {
    let query = build(EntityKind::User, &request(EntityKind::User), None).unwrap();

    assert!(query.starts_with(
        "{ entities(types: [USER], archived: false, enabled: true, first: 2, \
sortKey: RISK_SCORE, sortOrder: DESCENDING) {"
    ));
    assert!(query.contains("pageInfo { hasNextPage endCursor }"));
    assert!(query.contains("accounts { __typename"));
    assert!(!query.contains("after:"));
}

#[test]
fn test_user_query_with_cursor() {
    let query = build(EntityKind::User, &request(EntityKind::User), Some("YWJj")).unwrap();
    assert!(query.contains("sortOrder: DESCENDING, after: \"YWJj\")"));
}

#[test]
fn test_empty_cursor_renders_no_after_clause() {
    let with_empty = build(EntityKind::User, &request(EntityKind::User), Some("")).unwrap();
    let without = build(EntityKind::User, &request(EntityKind::User), None).unwrap();
    assert_eq!(with_empty, without);
}

#[test]
fn test_endpoint_query_flags() {
    let request = request(EntityKind::Endpoint)
        .with_archived(true)
        .with_enabled(false);
    let query = build(EntityKind::Endpoint, &request, None).unwrap();
    assert!(query.contains("types: [ENDPOINT], archived: true, enabled: false, first: 2"));
    assert!(query.contains("... on HostAccountDescriptor"));
}

#[test]
fn test_incident_query_ignores_entity_flags() {
    let request = request(EntityKind::Incident).with_archived(true);
    let query = build(EntityKind::Incident, &request, Some("c1")).unwrap();
    assert!(query.starts_with(
        "{ incidents(first: 2, sortKey: END_TIME, sortOrder: DESCENDING, after: \"c1\") {"
    ));
    assert!(!query.contains("archived"));
}

#[test_case(EntityKind::User ; "user")]
#[test_case(EntityKind::Endpoint ; "endpoint")]
#[test_case(EntityKind::Incident ; "incident")]
fn test_builders_are_deterministic(kind: EntityKind) {
    let first = build(kind, &request(kind), Some("Y3Vyc29y")).unwrap();
    let second = build(kind, &request(kind), Some("Y3Vyc29y")).unwrap();
    assert_eq!(first, second);
}

#[test_case(EntityKind::Detection ; "detection")]
#[test_case(EntityKind::Alert ; "alert")]
#[test_case(EntityKind::CombinedAlert ; "combined alert")]
fn test_rest_entities_have_no_query(kind: EntityKind) {
    let err = build(kind, &request(kind), None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnsupportedEntity);
}

#[test]
fn test_cursor_cannot_break_out_of_literal() {
    let hostile = "x\") { nodes { secret } } #\\\n";
    let query = build(EntityKind::Incident, &request(EntityKind::Incident), Some(hostile)).unwrap();
    assert!(query.contains(r#"after: "x\") { nodes { secret } } #\\\n")"#));
}

#[test]
fn test_string_literal_escapes() {
    assert_eq!(string_literal("plain").unwrap(), "\"plain\"");
    assert_eq!(string_literal("a\"b").unwrap(), r#""a\"b""#);
    assert_eq!(string_literal("a\\b").unwrap(), r#""a\\b""#);
    assert_eq!(string_literal("a\u{1}b").unwrap(), r#""a\u0001b""#);
}

#[test]
fn test_graphql_body() {
    let body = graphql_body("{ incidents { nodes { incidentId } } }");
    assert_eq!(
        body,
        serde_json::json!({
            "query": "{ incidents { nodes { incidentId } } }",
            "variables": null
        })
    );
}

#[test_case(EntityKind::User ; "user")]
#[test_case(EntityKind::Endpoint ; "endpoint")]
#[test_case(EntityKind::Incident ; "incident")]
fn test_sort_key_comes_from_binding(kind: EntityKind) {
    let sort_key = kind.binding().sort_key.unwrap();
    let query = build(kind, &request(kind), None).unwrap();
    assert!(query.contains(&format!("sortKey: {sort_key}, sortOrder: DESCENDING")));
}
