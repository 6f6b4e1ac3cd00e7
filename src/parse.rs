//! Ingestion helpers: rows, rule bundles and options from JSON or YAML text.
//!
//! YAML is read through `serde-saphyr` into a `serde_json::Value`, then mapped
//! onto the crate types. JSON input goes through the same path since it is a
//! YAML subset. These helpers only deserialize; nothing here validates.

use crate::context::ValidationOptions;
use crate::error::{ParseError, ParseErrorKind};
use crate::types::{Row, Rule};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse a sequence of mappings into rows.
pub fn parse_rows(input: &str) -> Result<Vec<Row>, ParseError> {
    match read_value(input)? {
        Value::Array(items) => from_items(items, ""),
        _ => Err(ParseError::type_mismatch(
            "rows must be a sequence of mappings",
            None,
        )),
    }
}

/// Parse a rule bundle: a bare sequence of rules or a mapping with a `rules`
/// sequence.
pub fn parse_rules(input: &str) -> Result<Vec<Rule>, ParseError> {
    match read_value(input)? {
        Value::Array(items) => from_items(items, ""),
        Value::Object(mut map) => match map.remove("rules") {
            Some(Value::Array(items)) => from_items(items, "rules"),
            Some(_) => Err(ParseError::type_mismatch(
                "'rules' must be a sequence",
                Some("rules".to_string()),
            )),
            None => Err(ParseError::type_mismatch(
                "rule bundle must contain a 'rules' sequence",
                None,
            )),
        },
        _ => Err(ParseError::type_mismatch(
            "rule bundle must be a sequence or a mapping",
            None,
        )),
    }
}

/// Parse validation options. Omitted fields keep their defaults.
pub fn parse_options(input: &str) -> Result<ValidationOptions, ParseError> {
    let value = read_value(input)?;
    if !value.is_object() {
        return Err(ParseError::type_mismatch("options must be a mapping", None));
    }
    serde_json::from_value(value).map_err(|e| json_error(e, None))
}

fn read_value(input: &str) -> Result<Value, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::syntax("empty input"));
    }
    check_multi_document(input)?;

    serde_saphyr::from_str(input).map_err(|e| ParseError::syntax(e.to_string()))
}

fn from_items<T: DeserializeOwned>(items: Vec<Value>, prefix: &str) -> Result<Vec<T>, ParseError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item).map_err(|e| json_error(e, Some(format!("{}[{}]", prefix, i))))
        })
        .collect()
}

fn json_error(e: serde_json::Error, path: Option<String>) -> ParseError {
    let message = e.to_string();
    ParseError {
        kind: classify_json_error(&message),
        message,
        path,
    }
}

/// Only `---` at column 0 counts as a document marker.
fn check_multi_document(input: &str) -> Result<(), ParseError> {
    let markers = input
        .lines()
        .filter(|line| line.starts_with("---") && line[3..].trim().is_empty())
        .count();
    if markers > 1 {
        return Err(ParseError::syntax("multi-document YAML is not supported"));
    }
    Ok(())
}

fn classify_json_error(msg: &str) -> ParseErrorKind {
    let lower = msg.to_lowercase();
    if lower.contains("unknown variant") {
        ParseErrorKind::UnknownVariant
    } else {
        ParseErrorKind::TypeMismatch
    }
}
