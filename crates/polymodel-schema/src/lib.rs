//! # polymodel-schema — Definition Sets
//!
//! Describes a polymorphic type hierarchy as data instead of code, and
//! builds a published [`TypeRegistry`](polymodel_core::TypeRegistry) from
//! it.
//!
//! ## Definition Documents (`definition`)
//!
//! The serde model of a YAML or JSON definition file: variants, their
//! parents, fields, wire names, constraints and named hooks.
//!
//! ## Loading (`load`)
//!
//! - [`DefinitionSet::load`] reads a file, choosing YAML or JSON by
//!   extension.
//! - [`DefinitionSet::build_registry`] orders variants parents-first,
//!   rejects cycles and dangling references, binds hooks from a
//!   [`HookTable`] and publishes the registry.
//!
//! ## Crate Policy
//!
//! - Depends only on `polymodel-core` internally.
//! - Definition files are a trust boundary: unknown keys are rejected and
//!   every reference is checked before any descriptor is built.

pub mod definition;
pub mod error;
pub mod hooks;
pub mod load;

pub use definition::{CompoundKindDef, ConstraintDef, DefinitionSet, FieldDef, KindDef, VariantDef};
pub use error::DefinitionError;
pub use hooks::HookTable;
