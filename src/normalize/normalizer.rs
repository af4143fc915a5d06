//! Selector-driven record normalization

use super::types::{AttributeSelector, AttributeType, ChildSelector, EntitySelector};
use crate::error::{Error, Result};
use crate::types::{AttributeValue, Record};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Normalize one raw record against a selector tree
pub fn normalize(raw: &Value, selector: &EntitySelector) -> Result<Record> {
    normalize_node(raw, &selector.attributes, &selector.children)
}

/// Normalize a page of raw records, preserving order
pub fn normalize_all(raws: &[Value], selector: &EntitySelector) -> Result<Vec<Record>> {
    raws.iter().map(|raw| normalize(raw, selector)).collect()
}

/// Extract the raw record array at `path` in a response body
///
/// `null` is an empty page; a missing path is a malformed response.
pub fn records_at(body: &Value, path: &str) -> Result<Vec<Value>> {
    match lookup(body, path) {
        Some(Value::Array(arr)) => Ok(arr.clone()),
        Some(Value::Null) => Ok(Vec::new()),
        Some(other) => Ok(vec![other.clone()]),
        None => Err(Error::invalid_response(format!(
            "response has no records at '{path}'"
        ))),
    }
}

fn normalize_node(
    raw: &Value,
    attributes: &[AttributeSelector],
    children: &[ChildSelector],
) -> Result<Record> {
    let mut record = Record::new();

    for attribute in attributes {
        if let Some(value) = extract_attribute(raw, attribute)? {
            record.attributes.insert(attribute.name.clone(), value);
        }
    }

    // Each selector sees the whole raw record; two selectors may pick disjoint
    // subsets of the same array.
    for child in children {
        match select_children(raw, &child.path)? {
            Some(elements) => {
                let records = elements
                    .iter()
                    .map(|element| normalize_node(element, &child.attributes, &child.children))
                    .collect::<Result<Vec<_>>>()?;
                record.children.insert(child.path.clone(), records);
            }
            None if child.expect_list => {
                record.children.insert(child.path.clone(), Vec::new());
            }
            None => {}
        }
    }

    Ok(record)
}

fn extract_attribute(raw: &Value, attribute: &AttributeSelector) -> Result<Option<AttributeValue>> {
    let value = match lookup(raw, &attribute.name) {
        None | Some(Value::Null) => {
            return Ok(attribute.list.then(|| AttributeValue::List(Vec::new())));
        }
        Some(value) => value,
    };

    if !attribute.list {
        return coerce(value, attribute.kind, &attribute.name).map(Some);
    }

    let items = match value {
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| coerce(item, attribute.kind, &attribute.name))
            .collect::<Result<Vec<_>>>()?,
        single => vec![coerce(single, attribute.kind, &attribute.name)?],
    };
    Ok(Some(AttributeValue::List(items)))
}

/// Evaluate a child path expression against a raw record
///
/// Returns `None` when the source collection is absent.
fn select_children(raw: &Value, path: &str) -> Result<Option<Vec<Value>>> {
    let source = match lookup(raw, base_path(path)) {
        None | Some(Value::Null) => return Ok(None),
        Some(source) => source,
    };

    if path.contains('[') {
        return extract_with_jsonpath(raw, path).map(Some);
    }

    match source {
        Value::Array(arr) => Ok(Some(arr.iter().filter(|v| !v.is_null()).cloned().collect())),
        Value::Object(_) => Ok(Some(vec![source.clone()])),
        _ => Err(Error::normalize(
            path,
            "child path does not point at an object or array",
        )),
    }
}

/// Portion of a path expression before any bracket segment
fn base_path(path: &str) -> &str {
    match path.find('[') {
        Some(pos) => &path[..pos],
        None => path,
    }
}

/// Walk a dot path (`$.a.b` or `a.b`) through nested objects
pub(crate) fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix('$').unwrap_or(path);
    let path = path.strip_prefix('.').unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Evaluate a full JSONPath expression (filters, wildcards)
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let expression = if path.starts_with('$') {
        path.to_string()
    } else {
        format!("$.{path}")
    };

    let jp = JsonPath::try_from(expression.as_str())
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{path}': {e}")))?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}

fn coerce(value: &Value, kind: AttributeType, name: &str) -> Result<AttributeValue> {
    let mismatch = || {
        Error::normalize(
            name,
            format!("expected {}, found {value}", type_name(kind)),
        )
    };

    match kind {
        AttributeType::String => Ok(AttributeValue::String(match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => other.to_string(),
        })),
        AttributeType::Bool => match value {
            Value::Bool(b) => Ok(AttributeValue::Bool(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(AttributeValue::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(AttributeValue::Bool(false)),
            _ => Err(mismatch()),
        },
        AttributeType::Int64 => match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(AttributeValue::Int64)
                .ok_or_else(mismatch),
            Value::String(s) => s
                .parse::<i64>()
                .map(AttributeValue::Int64)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        AttributeType::Double => match value {
            Value::Number(n) => n.as_f64().map(AttributeValue::Double).ok_or_else(mismatch),
            Value::String(s) => s
                .parse::<f64>()
                .map(AttributeValue::Double)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        AttributeType::DateTime => match value {
            Value::String(s) => parse_datetime(s)
                .map(AttributeValue::DateTime)
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
    }
}

/// Parse ISO-8601 timestamps; offset-less values are taken as UTC
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn type_name(kind: AttributeType) -> &'static str {
    match kind {
        AttributeType::String => "string",
        AttributeType::Bool => "boolean",
        AttributeType::Int64 => "integer",
        AttributeType::Double => "number",
        AttributeType::DateTime => "ISO-8601 timestamp",
    }
}
