//! # Field and Variant Descriptors
//!
//! The data tables generated model code registers instead of hand-written
//! serialization attributes. A [`FieldDescriptor`] describes one model
//! attribute; a [`VariantDescriptor`] describes one concrete model type, its
//! parent, its own fields and an optional custom validation hook.
//!
//! ## Inheritance
//!
//! Inheritance is an explicit parent reference, not language-level
//! subclassing. A descriptor can only name a parent that has already been
//! built (`Arc<VariantDescriptor>`), so every chain is acyclic and ends at a
//! root. Chain traversal is a plain list walk via
//! [`VariantDescriptor::ancestry`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::value::ModelInstance;

/// Custom validation rule attached to one level of an ancestor chain.
///
/// Receives the whole instance; returns a message on rejection.
pub type ValidateHook = Arc<dyn Fn(&ModelInstance) -> Result<(), String> + Send + Sync>;

/// Semantic type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarKind {
    String,
    Integer,
    Number,
    Boolean,
    /// RFC 3339 timestamp, held in UTC.
    DateTime,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// Standard base64 on the wire.
    ByteArray,
    Uuid,
    /// Any JSON value, passed through untouched.
    Any,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::DateTime => "date-time",
            Self::Date => "date",
            Self::ByteArray => "byte-array",
            Self::Uuid => "uuid",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

/// Semantic type of a field, driving coercion in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// A nested model of the named variant or any of its descendants.
    Nested(String),
    /// A JSON array of elements of the inner kind.
    Collection(Box<FieldKind>),
    /// A JSON object with string keys and values of the inner kind.
    Dictionary(Box<FieldKind>),
}

impl FieldKind {
    /// Shorthand for a nested model field.
    pub fn nested(discriminator: impl Into<String>) -> Self {
        Self::Nested(discriminator.into())
    }

    /// Shorthand for an array of `element`.
    pub fn list(element: FieldKind) -> Self {
        Self::Collection(Box::new(element))
    }

    /// Shorthand for a string-keyed map of `value`.
    pub fn map(value: FieldKind) -> Self {
        Self::Dictionary(Box::new(value))
    }
}

impl From<ScalarKind> for FieldKind {
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::Nested(variant) => write!(f, "{variant}"),
            Self::Collection(element) => write!(f, "list<{element}>"),
            Self::Dictionary(value) => write!(f, "map<{value}>"),
        }
    }
}

/// Location of a property in a wire document.
///
/// Plain fields have a single segment. Flattened fields address a property
/// inside intermediate objects: `properties.resourceId` has two segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WirePath(Vec<String>);

impl WirePath {
    /// A single-segment path, taken verbatim.
    pub fn single(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    /// Split a dotted wire name into segments. `\.` is a literal dot.
    pub fn dotted(wire_name: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = wire_name.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' if chars.peek() == Some(&'.') => {
                    current.push('.');
                    chars.next();
                }
                '.' => segments.push(std::mem::take(&mut current)),
                other => current.push(other),
            }
        }
        segments.push(current);
        Self(segments)
    }

    /// The path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The outermost segment, i.e. the top-level property name.
    pub fn head(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or_default()
    }

    /// True when the path descends into intermediate objects.
    pub fn is_nested(&self) -> bool {
        self.0.len() > 1
    }
}

impl fmt::Display for WirePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.replace('.', "\\."))?;
        }
        Ok(())
    }
}

/// One model attribute.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    wire_name: String,
    wire_path: WirePath,
    required: bool,
    read_only: bool,
    kind: FieldKind,
    constraints: Vec<Constraint>,
}

impl FieldDescriptor {
    /// An optional field whose wire name equals its semantic name.
    pub fn new(name: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        let name = name.into();
        Self {
            wire_path: WirePath::single(name.clone()),
            wire_name: name.clone(),
            name,
            required: false,
            read_only: false,
            kind: kind.into(),
            constraints: Vec::new(),
        }
    }

    /// Use a wire name that differs from the semantic name.
    pub fn wire_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = wire_name.into();
        self.wire_path = WirePath::single(self.wire_name.clone());
        self
    }

    /// Interpret the wire name as a dotted path into nested objects.
    pub fn flattened(mut self) -> Self {
        self.wire_path = WirePath::dotted(&self.wire_name);
        self
    }

    /// Mark the field required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field server-populated; it is left out of request bodies.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Attach a constraint checked during validation.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared wire name, as written (dots included for flattened
    /// fields).
    pub fn wire(&self) -> &str {
        &self.wire_name
    }

    pub fn wire_path(&self) -> &WirePath {
        &self.wire_path
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }
}

/// One concrete model type in a polymorphic family.
pub struct VariantDescriptor {
    discriminator: String,
    discriminator_property: String,
    parent: Option<Arc<VariantDescriptor>>,
    own_fields: Vec<FieldDescriptor>,
    validate_hook: Option<ValidateHook>,
}

impl VariantDescriptor {
    /// Start a root variant whose family carries its discriminator in
    /// `discriminator_property` (e.g. `"fishtype"`).
    pub fn root(
        discriminator: impl Into<String>,
        discriminator_property: impl Into<String>,
    ) -> VariantBuilder {
        VariantBuilder {
            discriminator: discriminator.into(),
            discriminator_property: discriminator_property.into(),
            parent: None,
            own_fields: Vec::new(),
            validate_hook: None,
        }
    }

    /// Start a variant extending `parent`. The discriminator property is
    /// inherited from the family root.
    pub fn extends(discriminator: impl Into<String>, parent: &Arc<VariantDescriptor>) -> VariantBuilder {
        VariantBuilder {
            discriminator: discriminator.into(),
            discriminator_property: parent.discriminator_property.clone(),
            parent: Some(Arc::clone(parent)),
            own_fields: Vec::new(),
            validate_hook: None,
        }
    }

    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    /// Name of the wire property holding the discriminator.
    pub fn discriminator_property(&self) -> &str {
        &self.discriminator_property
    }

    pub fn parent(&self) -> Option<&Arc<VariantDescriptor>> {
        self.parent.as_ref()
    }

    /// Fields declared by this level only.
    pub fn own_fields(&self) -> &[FieldDescriptor] {
        &self.own_fields
    }

    pub fn validate_hook(&self) -> Option<&ValidateHook> {
        self.validate_hook.as_ref()
    }

    /// The ancestor chain from the family root down to `self`.
    pub fn ancestry(&self) -> Vec<&VariantDescriptor> {
        let mut chain = Vec::new();
        let mut cursor = Some(self);
        while let Some(level) = cursor {
            chain.push(level);
            cursor = level.parent.as_deref();
        }
        chain.reverse();
        chain
    }

    /// The family root.
    pub fn root_variant(&self) -> &VariantDescriptor {
        let mut cursor = self;
        while let Some(parent) = cursor.parent.as_deref() {
            cursor = parent;
        }
        cursor
    }

    /// Every field in the chain, root fields first, paired with the level
    /// that declares it.
    pub fn fields(&self) -> impl Iterator<Item = (&VariantDescriptor, &FieldDescriptor)> {
        self.ancestry()
            .into_iter()
            .flat_map(|level| level.own_fields.iter().map(move |field| (level, field)))
    }

    /// Look up a field by semantic name anywhere in the chain.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().map(|(_, field)| field).find(|f| f.name == name)
    }

    /// True when `discriminator` names `self` or one of its ancestors.
    pub fn is_a(&self, discriminator: &str) -> bool {
        let mut cursor = Some(self);
        while let Some(level) = cursor {
            if level.discriminator == discriminator {
                return true;
            }
            cursor = level.parent.as_deref();
        }
        false
    }
}

impl fmt::Debug for VariantDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantDescriptor")
            .field("discriminator", &self.discriminator)
            .field("discriminator_property", &self.discriminator_property)
            .field("parent", &self.parent.as_ref().map(|p| p.discriminator.as_str()))
            .field("own_fields", &self.own_fields)
            .field("validate_hook", &self.validate_hook.is_some())
            .finish()
    }
}

/// Builder returned by [`VariantDescriptor::root`] and
/// [`VariantDescriptor::extends`].
pub struct VariantBuilder {
    discriminator: String,
    discriminator_property: String,
    parent: Option<Arc<VariantDescriptor>>,
    own_fields: Vec<FieldDescriptor>,
    validate_hook: Option<ValidateHook>,
}

impl VariantBuilder {
    /// Append an own field. Field order is preserved on the wire.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.own_fields.push(field);
        self
    }

    /// Attach a custom validation hook for this level.
    pub fn hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ModelInstance) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validate_hook = Some(Arc::new(hook));
        self
    }

    /// Attach an already shared hook.
    pub fn shared_hook(mut self, hook: ValidateHook) -> Self {
        self.validate_hook = Some(hook);
        self
    }

    pub fn build(self) -> Arc<VariantDescriptor> {
        Arc::new(VariantDescriptor {
            discriminator: self.discriminator,
            discriminator_property: self.discriminator_property,
            parent: self.parent,
            own_fields: self.own_fields,
            validate_hook: self.validate_hook,
        })
    }
}
