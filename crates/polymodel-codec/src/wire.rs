//! Reading and writing properties addressed by a [`WirePath`].
//!
//! Plain fields are a single map lookup. Flattened fields walk (or create)
//! intermediate objects, so `properties.resourceId` lands in
//! `{"properties": {"resourceId": ...}}`.

use polymodel_core::WirePath;
use serde_json::{Map, Value};

/// Outcome of looking up a wire path.
#[derive(Debug, PartialEq)]
pub enum Lookup<'a> {
    /// The property exists and is not `null`.
    Found(&'a Value),
    /// The property, or one of its intermediate objects, is absent or
    /// `null`.
    Absent,
    /// An intermediate segment holds something other than an object.
    Blocked {
        /// The segment that is not an object.
        segment: String,
    },
}

/// Look up `path` inside `doc`.
pub fn get<'a>(doc: &'a Map<String, Value>, path: &WirePath) -> Lookup<'a> {
    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        return Lookup::Absent;
    };

    let mut current = doc;
    for segment in parents {
        match current.get(segment) {
            None | Some(Value::Null) => return Lookup::Absent,
            Some(Value::Object(inner)) => current = inner,
            Some(_) => {
                return Lookup::Blocked {
                    segment: segment.clone(),
                }
            }
        }
    }

    match current.get(last) {
        None | Some(Value::Null) => Lookup::Absent,
        Some(value) => Lookup::Found(value),
    }
}

/// Write `value` at `path`, creating intermediate objects as needed.
///
/// An intermediate segment already holding a non-object is replaced by an
/// object.
pub fn put(doc: &mut Map<String, Value>, path: &WirePath, value: Value) {
    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = doc;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            tracing::warn!(segment = %segment, "replacing non-object with flattened container");
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(inner) => inner,
            _ => return,
        };
    }
    current.insert(last.clone(), value);
}

/// JSON type name used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn plain_lookup() {
        let doc = object(json!({"species": "king", "location": null}));
        assert_eq!(
            get(&doc, &WirePath::single("species")),
            Lookup::Found(&json!("king"))
        );
        assert_eq!(get(&doc, &WirePath::single("location")), Lookup::Absent);
        assert_eq!(get(&doc, &WirePath::single("iswild")), Lookup::Absent);
    }

    #[test]
    fn flattened_lookup() {
        let doc = object(json!({"properties": {"resourceId": "/subscriptions/1"}, "x": 3}));
        let path = WirePath::dotted("properties.resourceId");
        assert_eq!(get(&doc, &path), Lookup::Found(&json!("/subscriptions/1")));
        assert_eq!(get(&doc, &WirePath::dotted("missing.resourceId")), Lookup::Absent);
        assert_eq!(
            get(&doc, &WirePath::dotted("x.y")),
            Lookup::Blocked {
                segment: "x".into()
            }
        );
    }

    #[test]
    fn put_creates_and_shares_containers() {
        let mut doc = Map::new();
        put(&mut doc, &WirePath::dotted("properties.resourceId"), json!("r"));
        put(&mut doc, &WirePath::dotted("properties.maxEventsPerBatch"), json!(10));
        put(&mut doc, &WirePath::single("endpointType"), json!("AzureFunction"));
        assert_eq!(
            Value::Object(doc),
            json!({
                "properties": {"resourceId": "r", "maxEventsPerBatch": 10},
                "endpointType": "AzureFunction"
            })
        );
    }

    #[test]
    fn put_replaces_blocking_scalars() {
        let mut doc = object(json!({"properties": 1}));
        put(&mut doc, &WirePath::dotted("properties.a"), json!(true));
        assert_eq!(Value::Object(doc), json!({"properties": {"a": true}}));
    }
}
