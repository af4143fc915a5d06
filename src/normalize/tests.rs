//! Tests for the normalize module

use super::*;
use crate::error::ErrorCode;
use crate::types::AttributeValue;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

const AD_ACCOUNTS: &str = "$.accounts[?(@.__typename == 'ActiveDirectoryAccountDescriptor')]";
const SSO_ACCOUNTS: &str = "$.accounts[?(@.__typename == 'SsoUserAccountDescriptor')]";

fn user_selector() -> EntitySelector {
    EntitySelector::new(vec![
        AttributeSelector::new("entityId", AttributeType::String),
        AttributeSelector::new("riskScore", AttributeType::Double),
        AttributeSelector::new("archived", AttributeType::Bool),
        AttributeSelector::new("creationTime", AttributeType::DateTime),
        AttributeSelector::list("roles", AttributeType::String),
    ])
    .with_child(
        ChildSelector::new(AD_ACCOUNTS).with_attributes(vec![
            AttributeSelector::new("samAccountName", AttributeType::String),
            AttributeSelector::new("passwordAttributes.lastChange", AttributeType::DateTime),
        ]),
    )
    .with_child(
        ChildSelector::new(SSO_ACCOUNTS)
            .with_attributes(vec![AttributeSelector::new("dataSource", AttributeType::String)]),
    )
}

fn raw_user() -> serde_json::Value {
    json!({
        "entityId": "e-100",
        "riskScore": 0.72,
        "archived": false,
        "creationTime": "2024-03-01T10:15:00.000Z",
        "roles": ["HumanUserAccountRole", "AdminAccountRole"],
        "accounts": [
            {
                "__typename": "ActiveDirectoryAccountDescriptor",
                "samAccountName": "alice",
                "passwordAttributes": {"lastChange": "2024-02-01T00:00:00Z"}
            },
            {"__typename": "SsoUserAccountDescriptor", "dataSource": "OKTA"},
            {"__typename": "ActiveDirectoryAccountDescriptor", "samAccountName": "alice-adm"},
            {"__typename": "AzureCloudServiceAdapterDescriptor", "dataSource": "AZURE"}
        ]
    })
}

// ============================================================================
// Attribute Coercion
// ============================================================================

#[test]
fn test_normalize_top_level_attributes() {
    let record = normalize(&raw_user(), &user_selector()).unwrap();

    assert_eq!(record.get("entityId").and_then(AttributeValue::as_str), Some("e-100"));
    assert_eq!(record.get("riskScore"), Some(&AttributeValue::Double(0.72)));
    assert_eq!(record.get("archived"), Some(&AttributeValue::Bool(false)));
    assert_eq!(
        record.get("creationTime").and_then(AttributeValue::as_datetime),
        Some(&Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap())
    );
    assert_eq!(
        record.get("roles"),
        Some(&AttributeValue::List(vec![
            AttributeValue::String("HumanUserAccountRole".to_string()),
            AttributeValue::String("AdminAccountRole".to_string()),
        ]))
    );
}

#[test]
fn test_missing_attributes_are_absent() {
    let raw = json!({"entityId": "e-1", "riskScore": null});
    let record = normalize(&raw, &user_selector()).unwrap();

    assert!(record.get("riskScore").is_none());
    assert!(record.get("archived").is_none());
    assert!(record.get("creationTime").is_none());
    assert_eq!(record.attributes.len(), 2);
}

#[test]
fn test_missing_list_attribute_is_empty_list() {
    let raw = json!({"entityId": "e-1"});
    let record = normalize(&raw, &user_selector()).unwrap();
    assert_eq!(record.get("roles"), Some(&AttributeValue::List(vec![])));
}

#[test_case(json!(42), AttributeType::Int64, AttributeValue::Int64(42) ; "integer")]
#[test_case(json!("42"), AttributeType::Int64, AttributeValue::Int64(42) ; "integer from string")]
#[test_case(json!(3.0), AttributeType::Int64, AttributeValue::Int64(3) ; "integral float")]
#[test_case(json!(1.5), AttributeType::Double, AttributeValue::Double(1.5) ; "double")]
#[test_case(json!(true), AttributeType::Bool, AttributeValue::Bool(true) ; "boolean")]
#[test_case(json!("FALSE"), AttributeType::Bool, AttributeValue::Bool(false) ; "boolean from string")]
#[test_case(json!(17), AttributeType::String, AttributeValue::String("17".to_string()) ; "number as string")]
fn test_coercion(raw: serde_json::Value, kind: AttributeType, expected: AttributeValue) {
    let selector = EntitySelector::new(vec![AttributeSelector::new("value", kind)]);
    let record = normalize(&json!({"value": raw}), &selector).unwrap();
    assert_eq!(record.get("value"), Some(&expected));
}

#[test_case("2024-05-06T07:08:09Z" ; "zulu")]
#[test_case("2024-05-06T09:08:09+02:00" ; "offset")]
#[test_case("2024-05-06T07:08:09" ; "naive")]
fn test_timestamp_formats(raw: &str) {
    let selector =
        EntitySelector::new(vec![AttributeSelector::new("at", AttributeType::DateTime)]);
    let record = normalize(&json!({"at": raw}), &selector).unwrap();
    assert_eq!(
        record.get("at").and_then(AttributeValue::as_datetime),
        Some(&Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap())
    );
}

#[test_case(json!("yesterday"), AttributeType::DateTime ; "bad timestamp")]
#[test_case(json!("many"), AttributeType::Int64 ; "bad integer")]
#[test_case(json!(7), AttributeType::Bool ; "number as boolean")]
#[test_case(json!(2.5), AttributeType::Int64 ; "fractional integer")]
fn test_coercion_failure(raw: serde_json::Value, kind: AttributeType) {
    let selector = EntitySelector::new(vec![AttributeSelector::new("value", kind)]);
    let err = normalize(&json!({"value": raw}), &selector).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidResponse);
    assert!(err.to_string().contains("'value'"));
}

// ============================================================================
// Child Selectors
// ============================================================================

#[test]
fn test_child_selectors_are_disjoint() {
    let record = normalize(&raw_user(), &user_selector()).unwrap();

    let ad = record.child(AD_ACCOUNTS).unwrap();
    assert_eq!(ad.len(), 2);
    assert_eq!(
        ad[0].get("samAccountName").and_then(AttributeValue::as_str),
        Some("alice")
    );
    assert_eq!(
        ad[1].get("samAccountName").and_then(AttributeValue::as_str),
        Some("alice-adm")
    );
    assert!(ad.iter().all(|r| r.get("dataSource").is_none()));

    let sso = record.child(SSO_ACCOUNTS).unwrap();
    assert_eq!(sso.len(), 1);
    assert_eq!(
        sso[0].get("dataSource").and_then(AttributeValue::as_str),
        Some("OKTA")
    );

    // The Azure element matches neither selector
    let total: usize = record.children.values().map(Vec::len).sum();
    assert_eq!(total, 3);
}

#[test]
fn test_nested_attribute_paths_in_children() {
    let record = normalize(&raw_user(), &user_selector()).unwrap();
    let ad = record.child(AD_ACCOUNTS).unwrap();
    assert!(ad[0]
        .get("passwordAttributes.lastChange")
        .and_then(AttributeValue::as_datetime)
        .is_some());
    assert!(ad[1].get("passwordAttributes.lastChange").is_none());
}

#[test]
fn test_absent_child_array_is_absent() {
    let raw = json!({"entityId": "e-1"});
    let record = normalize(&raw, &user_selector()).unwrap();
    assert!(record.children.is_empty());
}

#[test]
fn test_absent_child_array_expected_as_list() {
    let selector = EntitySelector::default()
        .with_child(ChildSelector::new("$.riskFactors").expecting_list());
    let record = normalize(&json!({}), &selector).unwrap();
    assert_eq!(record.child("$.riskFactors"), Some(&[][..]));
}

#[test]
fn test_present_array_without_matches_is_empty() {
    let raw = json!({"accounts": [{"__typename": "AzureCloudServiceAdapterDescriptor"}]});
    let record = normalize(&raw, &user_selector()).unwrap();
    assert_eq!(record.child(AD_ACCOUNTS).map(<[_]>::len), Some(0));
}

#[test]
fn test_plain_child_path_and_nesting() {
    let selector = EntitySelector::new(vec![AttributeSelector::new("incidentId", AttributeType::String)])
        .with_child(
            ChildSelector::new("$.compromisedEntities")
                .with_attributes(vec![AttributeSelector::new("entityId", AttributeType::String)])
                .with_child(
                    ChildSelector::new("$.riskFactors").with_attributes(vec![
                        AttributeSelector::new("type", AttributeType::String),
                        AttributeSelector::new("severity", AttributeType::String),
                    ]),
                ),
        );

    let raw = json!({
        "incidentId": "INC-1",
        "compromisedEntities": [
            {"entityId": "a", "riskFactors": [{"type": "WEAK_PASSWORD", "severity": "HIGH"}]},
            {"entityId": "b"}
        ]
    });

    let record = normalize(&raw, &selector).unwrap();
    let entities = record.child("$.compromisedEntities").unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].child("$.riskFactors").unwrap().len(), 1);
    assert!(entities[1].child("$.riskFactors").is_none());
}

#[test]
fn test_object_child_becomes_single_record() {
    let selector = EntitySelector::default().with_child(
        ChildSelector::new("$.device")
            .with_attributes(vec![AttributeSelector::new("hostname", AttributeType::String)]),
    );
    let record = normalize(&json!({"device": {"hostname": "ws-01"}}), &selector).unwrap();
    let device = record.child("$.device").unwrap();
    assert_eq!(device.len(), 1);
    assert_eq!(device[0].get("hostname").and_then(AttributeValue::as_str), Some("ws-01"));
}

// ============================================================================
// Record Extraction
// ============================================================================

#[test]
fn test_records_at() {
    let body = json!({"data": {"entities": {"nodes": [{"a": 1}, {"a": 2}]}}});
    assert_eq!(records_at(&body, "data.entities.nodes").unwrap().len(), 2);

    let body = json!({"resources": null});
    assert!(records_at(&body, "resources").unwrap().is_empty());

    let err = records_at(&json!({}), "resources").unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidResponse);
}

#[test]
fn test_normalize_all_preserves_order() {
    let selector = EntitySelector::new(vec![AttributeSelector::new("id", AttributeType::String)]);
    let raws = vec![json!({"id": "b"}), json!({"id": "a"})];
    let records = normalize_all(&raws, &selector).unwrap();
    let ids: Vec<_> = records
        .iter()
        .filter_map(|r| r.get("id").and_then(AttributeValue::as_str))
        .collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[test]
fn test_selector_from_yaml() {
    let yaml = r#"
attributes:
  - name: entityId
  - name: riskScore
    type: double
  - name: roles
    type: string
    list: true
children:
  - path: "$.riskFactors"
    expect_list: true
    attributes:
      - name: type
"#;
    let selector: EntitySelector = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(selector.attributes.len(), 3);
    assert_eq!(selector.attributes[0].kind, AttributeType::String);
    assert_eq!(selector.attributes[1].kind, AttributeType::Double);
    assert!(selector.attributes[2].list);
    assert!(selector.children[0].expect_list);
}

#[test]
fn test_malformed_child_filter() {
    let selector = EntitySelector::new(vec![]).with_child(ChildSelector::new("$.accounts[?(@.type =="));
    let err = normalize(&raw_user(), &selector).unwrap_err();
    assert!(matches!(err, crate::error::Error::JsonPath { .. }));
    assert_eq!(err.code(), ErrorCode::InvalidResponse);
}
