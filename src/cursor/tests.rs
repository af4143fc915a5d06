//! Tests for the cursor codec

use super::*;
use crate::error::ErrorCode;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn search_after_fixture() -> Cursor {
    Cursor::SearchAfter(SearchAfterCursor {
        version: "v1".to_string(),
        total_hits: 1520,
        total_relation: TotalRelation::Gte,
        cluster_id: "us-1".to_string(),
        after: vec![json!(1_700_000_000_000_i64), json!("ind:abc:123")],
        total_fetched: 200,
        vendor_after: String::new(),
    })
}

// ============================================================================
// Encode / Decode
// ============================================================================

#[test]
fn test_simple_cursor_wire_format() {
    let token = encode(&Cursor::simple("MjAyNC0wMQ==")).unwrap();
    let raw = STANDARD.decode(&token).unwrap();
    assert_eq!(
        String::from_utf8(raw).unwrap(),
        r#"{"cursor":"MjAyNC0wMQ=="}"#
    );
}

#[test]
fn test_search_after_wire_format() {
    let token = encode(&search_after_fixture()).unwrap();
    let raw: serde_json::Value = serde_json::from_slice(&STANDARD.decode(&token).unwrap()).unwrap();
    assert_eq!(
        raw,
        json!({
            "version": "v1",
            "total_hits": 1520,
            "total_relation": "gte",
            "cluster_id": "us-1",
            "after": [1_700_000_000_000_i64, "ind:abc:123"],
            "total_fetched": 200
        })
    );
}

#[test_case(Cursor::simple("abc") ; "vendor cursor")]
#[test_case(Cursor::offset(400) ; "offset")]
#[test_case(Cursor::simple("") ; "empty placeholder")]
#[test_case(Cursor::simple("quote\"and\\slash") ; "escaped characters")]
#[test_case(search_after_fixture() ; "search after")]
#[test_case(Cursor::SearchAfter(SearchAfterCursor::default()) ; "zero valued search after")]
fn test_round_trip(cursor: Cursor) {
    let token = encode(&cursor).unwrap();
    assert_eq!(decode(Some(&token)).unwrap(), Some(cursor));
}

#[test]
fn test_encode_is_deterministic() {
    let cursor = search_after_fixture();
    assert_eq!(encode(&cursor).unwrap(), encode(&cursor).unwrap());
}

#[test]
fn test_decode_absent_is_first_page() {
    assert_eq!(decode(None).unwrap(), None);
    assert_eq!(decode(Some("")).unwrap(), None);
}

#[test]
fn test_explicit_empty_differs_from_absent() {
    let token = encode(&Cursor::simple("")).unwrap();
    let decoded = decode(Some(&token)).unwrap().unwrap();
    assert!(decoded.is_empty());
    assert_eq!(decoded.as_simple(), Some(""));
}

#[test_case("not base64!!" ; "bad base64")]
#[test_case("bm90IGpzb24=" ; "not json")]
#[test_case("eyJvdGhlciI6MX0=" ; "unknown object")]
#[test_case("eyJjdXJzb3IiOiJ4IiwiZXh0cmEiOjF9" ; "simple with extra field")]
fn test_decode_malformed(token: &str) {
    let err = decode(Some(token)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidCursor);
}

// ============================================================================
// Cursor helpers
// ============================================================================

#[test]
fn test_cursor_shapes() {
    let simple = Cursor::simple("x");
    assert_eq!(simple.shape(), "simple");
    assert!(simple.as_search_after().is_none());

    let search_after = search_after_fixture();
    assert_eq!(search_after.shape(), "search-after");
    assert!(search_after.as_simple().is_none());
    assert!(!search_after.is_empty());
    assert!(Cursor::SearchAfter(SearchAfterCursor::default()).is_empty());
}

// ============================================================================
// Vendor token
// ============================================================================

#[test]
fn test_vendor_token_parse() {
    let raw = json!({
        "version": "v1",
        "total_hits": 12,
        "total_relation": "eq",
        "clusterId": "eu-2",
        "after": [1_699_999_999_000_i64, "alert-9"]
    });
    let token = STANDARD.encode(serde_json::to_vec(&raw).unwrap());

    let parsed = VendorAfterToken::parse(&token).unwrap();
    assert_eq!(parsed.version, "v1");
    assert_eq!(parsed.total_hits, Some(12));
    assert_eq!(parsed.cluster_id, "eu-2");
    assert_eq!(parsed.after.len(), 2);

    let cursor = SearchAfterCursor::from_vendor_token(&parsed, 99, 4);
    assert_eq!(cursor.total_hits, 12);
    assert_eq!(cursor.total_fetched, 4);
    assert_eq!(cursor.total_relation, TotalRelation::Eq);
}

#[test]
fn test_vendor_token_falls_back_to_reported_total() {
    let token = VendorAfterToken {
        version: "v1".to_string(),
        total_hits: None,
        total_relation: None,
        cluster_id: "c".to_string(),
        after: vec![json!(1)],
    };
    let cursor = SearchAfterCursor::from_vendor_token(&token, 57, 0);
    assert_eq!(cursor.total_hits, 57);
    assert_eq!(cursor.total_relation, TotalRelation::Eq);
}

#[test]
fn test_vendor_token_round_trip_through_cursor() {
    let cursor = search_after_fixture();
    let state = cursor.as_search_after().unwrap();
    let vendor = state.to_vendor_token();
    let reparsed = VendorAfterToken::parse(&vendor.encode().unwrap()).unwrap();

    assert_eq!(reparsed, vendor);
    assert_eq!(
        SearchAfterCursor::from_vendor_token(&reparsed, 0, state.total_fetched),
        *state
    );
}

#[test]
fn test_relay_token_prefers_vendor_bytes() {
    let raw = json!({"version": "v1", "clusterId": "eu-2", "after": [3], "extra": true});
    let vendor = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&raw).unwrap());

    let state = SearchAfterCursor::from_vendor_after(&vendor, 40, None, 2);
    assert_eq!(state.relay_token().unwrap(), vendor);
    assert_eq!(state.after, vec![json!(3)]);

    let decoded = decode(Some(&encode(&Cursor::SearchAfter(state.clone())).unwrap())).unwrap();
    assert_eq!(decoded, Some(Cursor::SearchAfter(state)));
}

#[test]
fn test_relay_token_without_vendor_bytes_re_encodes() {
    let cursor = search_after_fixture();
    let state = cursor.as_search_after().unwrap();
    let relayed = VendorAfterToken::parse(&state.relay_token().unwrap()).unwrap();
    assert_eq!(relayed.after, state.after);
}

#[test]
fn test_opaque_vendor_after_is_not_empty() {
    let state = SearchAfterCursor::from_vendor_after("opaque", 0, Some(TotalRelation::Gte), 1);
    assert_eq!(state.total_relation, TotalRelation::Gte);
    assert!(!Cursor::SearchAfter(state).is_empty());
}

#[test]
fn test_same_position() {
    let first = SearchAfterCursor::from_vendor_after("opaque-a", 0, None, 1);
    let second = SearchAfterCursor::from_vendor_after("opaque-b", 0, None, 2);
    assert!(first.same_position(&first.clone()));
    assert!(!first.same_position(&second));
    assert!(!SearchAfterCursor::default().same_position(&SearchAfterCursor::default()));
}

#[test]
fn test_vendor_token_garbage() {
    let err = VendorAfterToken::parse("%%%").unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidResponse);
}
