//! Kind-directed conversion between JSON values and [`FieldValue`]s.
//!
//! | Kind | Wire form |
//! |------|-----------|
//! | `string` | JSON string |
//! | `integer` | JSON integer within `i64` |
//! | `number` | any JSON number |
//! | `boolean` | JSON boolean |
//! | `date-time` | RFC 3339 string; any offset accepted, held as UTC, written with `Z` |
//! | `date` | `YYYY-MM-DD` string |
//! | `byte-array` | standard base64 string |
//! | `uuid` | hyphenated UUID string |
//! | `any` | any JSON value, untouched |

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use polymodel_core::{DeserializeError, FieldKind, FieldValue, ScalarKind};
use serde_json::{Map, Number, Value};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Convert a non-null scalar JSON value.
pub fn read_scalar(kind: ScalarKind, value: &Value, path: &str) -> Result<FieldValue, DeserializeError> {
    let mismatch = || DeserializeError::mismatch(path, kind);
    let coerced = match kind {
        ScalarKind::String => value.as_str().map(|s| FieldValue::String(s.to_string())),
        ScalarKind::Integer => value.as_i64().map(FieldValue::Integer),
        ScalarKind::Number => value.as_f64().map(FieldValue::Number),
        ScalarKind::Boolean => value.as_bool().map(FieldValue::Boolean),
        ScalarKind::DateTime => value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| FieldValue::DateTime(dt.with_timezone(&Utc))),
        ScalarKind::Date => value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            .map(FieldValue::Date),
        ScalarKind::ByteArray => value
            .as_str()
            .and_then(|s| STANDARD.decode(s).ok())
            .map(FieldValue::Bytes),
        ScalarKind::Uuid => value
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(FieldValue::Uuid),
        ScalarKind::Any => Some(FieldValue::Any(value.clone())),
    };
    coerced.ok_or_else(mismatch)
}

/// Convert a list element or map entry of a collection kind. `null`
/// entries are kept as [`FieldValue::Null`].
pub fn read_entries<F>(
    kind: &FieldKind,
    value: &Value,
    path: &str,
    mut read_element: F,
) -> Result<FieldValue, DeserializeError>
where
    F: FnMut(&FieldKind, &Value, &str) -> Result<FieldValue, DeserializeError>,
{
    match (kind, value) {
        (FieldKind::Collection(element), Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Null => Ok(FieldValue::Null),
                item => read_element(element, item, &format!("{path}[{i}]")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::List),
        (FieldKind::Dictionary(element), Value::Object(entries)) => entries
            .iter()
            .map(|(key, item)| {
                let entry = match item {
                    Value::Null => Ok(FieldValue::Null),
                    item => read_element(element, item, &format!("{path}[{key}]")),
                };
                entry.map(|v| (key.clone(), v))
            })
            .collect::<Result<_, _>>()
            .map(FieldValue::Map),
        _ => Err(DeserializeError::mismatch(path, kind)),
    }
}

/// Convert a value that is not a nested instance back to JSON.
///
/// Nested instances are written by the serializer, which passes them in
/// through `write_nested`.
pub fn write_value<F>(value: &FieldValue, write_nested: &F) -> Value
where
    F: Fn(&polymodel_core::ModelInstance) -> Value,
{
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::String(s) => Value::String(s.clone()),
        FieldValue::Integer(i) => Value::Number((*i).into()),
        FieldValue::Number(n) => Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
        FieldValue::Boolean(b) => Value::Bool(*b),
        FieldValue::DateTime(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        FieldValue::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
        FieldValue::Bytes(bytes) => Value::String(STANDARD.encode(bytes)),
        FieldValue::Uuid(u) => Value::String(u.hyphenated().to_string()),
        FieldValue::Any(raw) => raw.clone(),
        FieldValue::Nested(instance) => write_nested(instance),
        FieldValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| write_value(item, write_nested))
                .collect(),
        ),
        FieldValue::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), write_value(item, write_nested)))
                .collect::<Map<String, Value>>(),
        ),
    }
}
