//! Model instance → wire document.
//!
//! The discriminator property comes first, then each level's own fields,
//! root level first, in declaration order. Absent fields are omitted.
//! Output order is stable, which keeps documents reproducible and diffs
//! readable.

use polymodel_core::{FieldValue, ModelInstance};
use serde_json::{Map, Value};

use crate::coerce::write_value;
use crate::wire;

/// Controls which fields reach the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Leave out server-populated (read-only) fields, as a request body
    /// must.
    pub omit_read_only: bool,
}

impl SerializeOptions {
    /// Options for request bodies.
    pub fn request() -> Self {
        Self {
            omit_read_only: true,
        }
    }
}

/// Serialize every declared field of `instance`.
pub fn serialize(instance: &ModelInstance) -> Value {
    serialize_with(instance, SerializeOptions::default())
}

/// Serialize `instance` according to `options`. Nested instances are
/// serialized with the same options.
pub fn serialize_with(instance: &ModelInstance, options: SerializeOptions) -> Value {
    Value::Object(to_map(instance, options))
}

fn to_map(instance: &ModelInstance, options: SerializeOptions) -> Map<String, Value> {
    let variant = instance.variant();
    let mut doc = Map::new();
    doc.insert(
        variant.discriminator_property().to_string(),
        Value::String(variant.discriminator().to_string()),
    );

    let write_nested = |nested: &ModelInstance| serialize_with(nested, options);
    for (_, field) in variant.fields() {
        if options.omit_read_only && field.is_read_only() {
            continue;
        }
        match instance.get(field.name()) {
            None | Some(FieldValue::Null) => {}
            Some(value) => wire::put(&mut doc, field.wire_path(), write_value(value, &write_nested)),
        }
    }
    doc
}
