//! Errors raised while loading a definition set or building a registry from
//! it.

use polymodel_core::RegistryError;
use thiserror::Error;

/// Failure while loading or compiling a definition set.
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// The definition file could not be read.
    #[error("cannot read definitions from '{path}': {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The definition text is not a valid definition document.
    #[error("invalid definitions in '{path}': {reason}")]
    Parse {
        /// Path (or `<inline>`) of the document.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// Two entries share a discriminator.
    #[error("variant {discriminator:?} is defined more than once")]
    Duplicate {
        /// The repeated discriminator.
        discriminator: String,
    },

    /// An entry names a parent that is not defined.
    #[error("variant {discriminator:?} extends undefined variant {parent:?}")]
    UnknownParent {
        /// The child variant.
        discriminator: String,
        /// The missing parent.
        parent: String,
    },

    /// Parent links form a cycle.
    #[error("inheritance cycle: {}", cycle.join(" -> "))]
    CyclicInheritance {
        /// The discriminators on the cycle, closing back on the first.
        cycle: Vec<String>,
    },

    /// A field refers to a nested variant that is not defined.
    #[error("field {field:?} of {discriminator:?} refers to undefined variant {nested:?}")]
    UnknownNestedVariant {
        /// Variant declaring the field.
        discriminator: String,
        /// The field.
        field: String,
        /// The missing nested variant.
        nested: String,
    },

    /// An entry names a hook the hook table does not provide.
    #[error("variant {discriminator:?} uses unknown hook {hook:?}")]
    UnknownHook {
        /// Variant naming the hook.
        discriminator: String,
        /// The missing hook name.
        hook: String,
    },

    /// A `pattern` constraint does not compile.
    #[error("field {field:?} of {discriminator:?} has an invalid pattern: {source}")]
    InvalidPattern {
        /// Variant declaring the field.
        discriminator: String,
        /// The field.
        field: String,
        /// Regex compilation error.
        source: regex::Error,
    },

    /// The entry is structurally wrong, e.g. a root without a
    /// discriminator property.
    #[error("variant {discriminator:?} is invalid: {reason}")]
    Invalid {
        /// The offending variant.
        discriminator: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The registry rejected a built descriptor.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}
