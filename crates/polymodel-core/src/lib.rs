//! # polymodel-core — Runtime Contract for Polymorphic Models
//!
//! Generated client-SDK models (a `Fish` family specialised by `Salmon`,
//! `Shark`, `Sawshark`, ...) do not carry their own serialization
//! attributes or hand-written `validate()` overrides. Instead the generator
//! emits one [`VariantDescriptor`] registration per schema type, and this
//! crate provides the machinery every model shares.
//!
//! ## Key Design Principles
//!
//! 1. **Inheritance is data.** A variant names its parent through an
//!    `Arc<VariantDescriptor>`; chains are walked as lists, never through
//!    virtual dispatch.
//!
//! 2. **Wire names are data.** [`FieldDescriptor`] tables carry wire names,
//!    flattening and constraints, built once at startup.
//!
//! 3. **Publish once, read everywhere.** [`RegistryBuilder::publish`] is
//!    the only way to obtain a [`TypeRegistry`], and a published registry
//!    cannot be extended.
//!
//! 4. **Validation is a typed result.** [`validate`] returns
//!    `Result<(), ValidationError>` and stops at the first failure, walking
//!    root to leaf.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Wire-format conversion lives in `polymodel-codec`; this crate never
//!   touches JSON text.

pub mod constraint;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod validate;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use constraint::Constraint;
pub use descriptor::{
    FieldDescriptor, FieldKind, ScalarKind, ValidateHook, VariantBuilder, VariantDescriptor,
    WirePath,
};
pub use error::{DeserializeError, RegistryError, ValidationError};
pub use registry::{global, publish_global, RegistryBuilder, TypeRegistry};
pub use validate::validate;
pub use value::{FieldValue, ModelInstance};
