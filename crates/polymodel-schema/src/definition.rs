//! # Definition Documents
//!
//! The serde model of a definition set: the static list of variants a
//! registry is built from. A code generator emits one entry per schema
//! type; humans can write them too.
//!
//! ```yaml
//! variants:
//!   - discriminator: fish
//!     discriminator_property: fishtype
//!     fields:
//!       - { name: species, kind: string }
//!       - { name: length, kind: number, required: true }
//!       - { name: siblings, kind: { list: { nested: fish } } }
//!   - discriminator: shark
//!     parent: fish
//!     hook: shark_rules
//!     fields:
//!       - { name: birthday, kind: date-time, required: true }
//! ```

use polymodel_core::{Constraint, FieldDescriptor, FieldKind, ScalarKind};
use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;

/// A whole definition document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionSet {
    /// Variants in any order; parents may follow their children.
    #[serde(default)]
    pub variants: Vec<VariantDef>,
}

/// One variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantDef {
    pub discriminator: String,
    /// Required on family roots; descendants inherit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator_property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Name of a hook in the [`HookTable`](crate::HookTable).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// One field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    pub name: String,
    /// Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire_name: Option<String>,
    pub kind: KindDef,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub read_only: bool,
    /// Treat `wire_name` as a dotted path into nested objects.
    #[serde(default)]
    pub flatten: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintDef>,
}

/// A field kind as written in a definition: a bare scalar name, or a
/// single-key map for compound kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KindDef {
    Scalar(ScalarKind),
    Compound(CompoundKindDef),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundKindDef {
    List(Box<KindDef>),
    Map(Box<KindDef>),
    Nested(String),
}

impl KindDef {
    /// Convert to the runtime kind.
    pub fn to_kind(&self) -> FieldKind {
        match self {
            Self::Scalar(scalar) => FieldKind::Scalar(*scalar),
            Self::Compound(CompoundKindDef::List(inner)) => FieldKind::list(inner.to_kind()),
            Self::Compound(CompoundKindDef::Map(inner)) => FieldKind::map(inner.to_kind()),
            Self::Compound(CompoundKindDef::Nested(variant)) => FieldKind::nested(variant.clone()),
        }
    }

    /// Every variant this kind refers to, at any depth.
    pub fn nested_variants(&self) -> Vec<&str> {
        match self {
            Self::Scalar(_) => Vec::new(),
            Self::Compound(CompoundKindDef::List(inner) | CompoundKindDef::Map(inner)) => {
                inner.nested_variants()
            }
            Self::Compound(CompoundKindDef::Nested(variant)) => vec![variant.as_str()],
        }
    }
}

/// A constraint as written in a definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintDef {
    MaxLength(usize),
    MinLength(usize),
    Pattern(String),
    InclusiveMaximum(f64),
    InclusiveMinimum(f64),
    ExclusiveMaximum(f64),
    ExclusiveMinimum(f64),
    MultipleOf(f64),
    MaxItems(usize),
    MinItems(usize),
    UniqueItems,
}

impl ConstraintDef {
    fn compile(&self) -> Result<Constraint, regex::Error> {
        Ok(match self {
            Self::MaxLength(n) => Constraint::MaxLength(*n),
            Self::MinLength(n) => Constraint::MinLength(*n),
            Self::Pattern(p) => Constraint::pattern(p)?,
            Self::InclusiveMaximum(n) => Constraint::InclusiveMaximum(*n),
            Self::InclusiveMinimum(n) => Constraint::InclusiveMinimum(*n),
            Self::ExclusiveMaximum(n) => Constraint::ExclusiveMaximum(*n),
            Self::ExclusiveMinimum(n) => Constraint::ExclusiveMinimum(*n),
            Self::MultipleOf(n) => Constraint::MultipleOf(*n),
            Self::MaxItems(n) => Constraint::MaxItems(*n),
            Self::MinItems(n) => Constraint::MinItems(*n),
            Self::UniqueItems => Constraint::UniqueItems,
        })
    }
}

impl FieldDef {
    /// Build the runtime descriptor. `owner` names the variant for error
    /// reports.
    pub fn to_descriptor(&self, owner: &str) -> Result<FieldDescriptor, DefinitionError> {
        let mut field = FieldDescriptor::new(self.name.clone(), self.kind.to_kind());
        if let Some(wire_name) = &self.wire_name {
            field = field.wire_name(wire_name.clone());
        }
        if self.flatten {
            field = field.flattened();
        }
        if self.required {
            field = field.required();
        }
        if self.read_only {
            field = field.read_only();
        }
        for def in &self.constraints {
            let constraint = def.compile().map_err(|source| DefinitionError::InvalidPattern {
                discriminator: owner.to_string(),
                field: self.name.clone(),
                source,
            })?;
            field = field.constraint(constraint);
        }
        Ok(field)
    }
}
