//! Wire document → model instance.
//!
//! 1. Read the discriminator property.
//! 2. Resolve it through the [`TypeRegistry`].
//! 3. Walk the ancestor chain root to leaf, reading each level's own
//!    fields from their wire paths and coercing them by kind.
//! 4. Return the populated instance. Validation is a separate step.
//!
//! Properties that match no field at any level are ignored, so documents
//! from a newer server schema still parse.

use std::collections::HashSet;
use std::sync::Arc;

use polymodel_core::{
    DeserializeError, FieldKind, FieldValue, ModelInstance, TypeRegistry, ValidationError,
    VariantDescriptor,
};
use serde_json::{Map, Value};

use crate::coerce::{read_entries, read_scalar};
use crate::serialize::{serialize, serialize_with, SerializeOptions};
use crate::wire::{self, Lookup};

/// Marker used as the field name of errors about the document root.
const ROOT: &str = "$";

/// Serializer/deserializer bound to a published registry.
#[derive(Debug, Clone)]
pub struct Codec {
    registry: TypeRegistry,
}

impl Codec {
    pub fn new(registry: TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Deserialize a document of any registered family.
    ///
    /// The discriminator is read from the first discriminator property
    /// (across all registered families) present in the document.
    ///
    /// # Errors
    ///
    /// `NotAnObject`, `MissingDiscriminator`, `UnrecognizedVariant` or
    /// `FieldTypeMismatch`. No partial instance is returned on failure.
    pub fn deserialize(&self, doc: &Value) -> Result<ModelInstance, DeserializeError> {
        let object = as_object(doc)?;
        let properties = self.registry.discriminator_properties();
        let found = properties
            .iter()
            .find_map(|property| match object.get(property) {
                None | Some(Value::Null) => None,
                Some(value) => Some((property, value)),
            });
        let Some((property, value)) = found else {
            return Err(DeserializeError::MissingDiscriminator {
                expected: properties.to_vec(),
            });
        };

        let variant = self.resolve_tag(property, value)?;
        if variant.discriminator_property() != property {
            // Registered, but in a family keyed by another property.
            return Err(DeserializeError::UnrecognizedVariant {
                discriminator: variant.discriminator().to_string(),
            });
        }
        self.populate(object, variant)
    }

    /// Deserialize a document that must be `base` or one of its
    /// descendants.
    ///
    /// # Errors
    ///
    /// As [`deserialize`](Self::deserialize), plus `IncompatibleVariant`
    /// when the document names a variant outside `base`'s subtree.
    pub fn deserialize_as(&self, doc: &Value, base: &str) -> Result<ModelInstance, DeserializeError> {
        let object = as_object(doc)?;
        let base_variant = self.resolve_name(base)?;
        let property = base_variant.discriminator_property();
        let Some(value) = object.get(property).filter(|value| !value.is_null()) else {
            return Err(DeserializeError::MissingDiscriminator {
                expected: vec![property.to_string()],
            });
        };
        let variant = self.resolve_tag(property, value)?;
        if !variant.is_a(base) {
            return Err(DeserializeError::IncompatibleVariant {
                field_name: ROOT.to_string(),
                expected: base.to_string(),
                found: variant.discriminator().to_string(),
            });
        }
        self.populate(object, variant)
    }

    /// Parse JSON text and [`deserialize`](Self::deserialize) it.
    pub fn deserialize_str(&self, text: &str) -> Result<ModelInstance, DeserializeError> {
        let doc: Value = serde_json::from_str(text)?;
        self.deserialize(&doc)
    }

    /// Serialize every declared field of `instance`.
    pub fn serialize(&self, instance: &ModelInstance) -> Value {
        serialize(instance)
    }

    /// Serialize `instance` to compact JSON text.
    pub fn serialize_string(&self, instance: &ModelInstance) -> String {
        serialize(instance).to_string()
    }

    /// Validate `instance`, then serialize it as a request body (read-only
    /// fields omitted).
    ///
    /// # Errors
    ///
    /// The first [`ValidationError`]; nothing is serialized in that case.
    pub fn prepare_request(&self, instance: &ModelInstance) -> Result<Value, ValidationError> {
        instance.validate()?;
        Ok(serialize_with(instance, SerializeOptions::request()))
    }

    fn resolve_name(&self, discriminator: &str) -> Result<Arc<VariantDescriptor>, DeserializeError> {
        self.registry
            .resolve(discriminator)
            .map_err(|_| DeserializeError::UnrecognizedVariant {
                discriminator: discriminator.to_string(),
            })
    }

    fn resolve_tag(&self, property: &str, value: &Value) -> Result<Arc<VariantDescriptor>, DeserializeError> {
        let Some(tag) = value.as_str() else {
            return Err(DeserializeError::mismatch(property, "discriminator string"));
        };
        let variant = self.resolve_name(tag)?;
        tracing::debug!(discriminator = tag, "resolved variant");
        Ok(variant)
    }

    fn populate(
        &self,
        object: &Map<String, Value>,
        variant: Arc<VariantDescriptor>,
    ) -> Result<ModelInstance, DeserializeError> {
        let mut values = Vec::new();
        let mut consumed: HashSet<&str> = HashSet::new();
        consumed.insert(variant.discriminator_property());

        for (_, field) in variant.fields() {
            consumed.insert(field.wire_path().head());
            match wire::get(object, field.wire_path()) {
                Lookup::Absent => {}
                Lookup::Found(value) => {
                    let coerced = self.read_kind(field.kind(), value, field.name())?;
                    values.push((field.name().to_string(), coerced));
                }
                Lookup::Blocked { segment } => {
                    return Err(DeserializeError::mismatch(
                        field.name(),
                        format!("object at wire segment {segment:?}"),
                    ));
                }
            }
        }

        for key in object.keys() {
            if !consumed.contains(key.as_str()) {
                tracing::trace!(
                    property = %key,
                    variant = variant.discriminator(),
                    "ignoring undeclared property"
                );
            }
        }

        let mut instance = ModelInstance::new(variant);
        for (name, value) in values {
            instance.set(name, value);
        }
        Ok(instance)
    }

    fn read_kind(&self, kind: &FieldKind, value: &Value, path: &str) -> Result<FieldValue, DeserializeError> {
        match kind {
            FieldKind::Scalar(scalar) => read_scalar(*scalar, value, path),
            FieldKind::Nested(declared) => self.read_nested(declared, value, path),
            FieldKind::Collection(_) | FieldKind::Dictionary(_) => {
                read_entries(kind, value, path, |element, item, item_path| {
                    self.read_kind(element, item, item_path)
                })
            }
        }
    }

    /// A nested document names its own variant when it carries the
    /// family's discriminator property; otherwise the declared variant is
    /// used.
    fn read_nested(&self, declared: &str, value: &Value, path: &str) -> Result<FieldValue, DeserializeError> {
        let Value::Object(object) = value else {
            return Err(DeserializeError::mismatch(path, declared));
        };
        let base = self.resolve_name(declared)?;
        let variant = match object.get(base.discriminator_property()) {
            None | Some(Value::Null) => base,
            Some(tag) => {
                let variant = self
                    .resolve_tag(base.discriminator_property(), tag)
                    .map_err(|e| e.within(path))?;
                if !variant.is_a(declared) {
                    return Err(DeserializeError::IncompatibleVariant {
                        field_name: path.to_string(),
                        expected: declared.to_string(),
                        found: variant.discriminator().to_string(),
                    });
                }
                variant
            }
        };
        self.populate(object, variant)
            .map(FieldValue::from)
            .map_err(|e| e.within(path))
    }
}

fn as_object(doc: &Value) -> Result<&Map<String, Value>, DeserializeError> {
    match doc {
        Value::Object(object) => Ok(object),
        other => Err(DeserializeError::NotAnObject {
            found: wire::type_name(other),
        }),
    }
}
