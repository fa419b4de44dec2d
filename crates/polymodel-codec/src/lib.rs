//! # polymodel-codec — Wire Format for Polymorphic Models
//!
//! Converts between [`ModelInstance`](polymodel_core::ModelInstance)s and
//! JSON wire documents.
//!
//! ## Wire Format
//!
//! - One discriminator property per document, named by the family root
//!   (e.g. `"fishtype": "shark"`).
//! - Every field of the ancestor chain appears flat in the same object,
//!   under its wire name. Flattened fields nest under dotted wire paths
//!   (`properties.resourceId`).
//! - Undeclared properties are ignored on input.
//!
//! ## Phases
//!
//! Deserialization and validation are separate. [`Codec::deserialize`]
//! returns an instance that may still lack required fields; callers decide
//! when to call `validate()`. [`Codec::prepare_request`] bundles
//! validation with request serialization for outgoing bodies.

pub mod coerce;
pub mod deserialize;
pub mod serialize;
pub mod wire;

pub use deserialize::Codec;
pub use serialize::{serialize, serialize_with, SerializeOptions};
