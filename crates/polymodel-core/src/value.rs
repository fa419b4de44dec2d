//! # Model Instances
//!
//! A [`ModelInstance`] is a bag of [`FieldValue`]s keyed by semantic field
//! name and tagged with the [`VariantDescriptor`] that produced it.
//!
//! Instances may hold absent required fields. A partially populated wire
//! document has to be representable before validation rejects it, so
//! presence is only guaranteed after [`ModelInstance::validate`] succeeds.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::descriptor::VariantDescriptor;
use crate::error::ValidationError;

/// A single field value.
///
/// `Null` only appears inside lists and maps. A top-level field that is
/// absent simply has no entry in the instance.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Any(serde_json::Value),
    Nested(Box<ModelInstance>),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Numeric view used by numeric constraints.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&ModelInstance> {
        match self {
            Self::Nested(instance) => Some(instance),
            _ => None,
        }
    }

    /// Element count of lists and maps.
    pub fn item_count(&self) -> Option<usize> {
        match self {
            Self::List(items) => Some(items.len()),
            Self::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<Uuid> for FieldValue {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<ModelInstance> for FieldValue {
    fn from(instance: ModelInstance) -> Self {
        Self::Nested(Box::new(instance))
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        Self::List(items)
    }
}

/// An instance of one registered variant.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    variant: Arc<VariantDescriptor>,
    values: BTreeMap<String, FieldValue>,
}

impl ModelInstance {
    /// An empty instance of `variant`.
    pub fn new(variant: Arc<VariantDescriptor>) -> Self {
        Self {
            variant,
            values: BTreeMap::new(),
        }
    }

    /// The variant this instance was produced for.
    pub fn variant(&self) -> &Arc<VariantDescriptor> {
        &self.variant
    }

    pub fn discriminator(&self) -> &str {
        self.variant.discriminator()
    }

    /// Set a field, returning the previous value. The instance is an
    /// opaque bag: names not declared in the chain are stored but never
    /// serialized.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.values.insert(name.into(), value.into())
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.values.remove(name)
    }

    /// True when the field holds a non-null value.
    pub fn is_present(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(|v| !v.is_null())
    }

    /// All stored values, ordered by field name.
    pub fn values(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Validate against the instance's own variant chain.
    pub fn validate(&self) -> Result<(), ValidationError> {
        crate::validate::validate(self, &self.variant)
    }
}

/// Two instances are equal when they carry the same discriminator and the
/// same field values.
impl PartialEq for ModelInstance {
    fn eq(&self, other: &Self) -> bool {
        self.variant.discriminator() == other.variant.discriminator() && self.values == other.values
    }
}
