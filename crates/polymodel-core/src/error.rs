//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types returned by the registry, the validator and the
//! codec. All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Every failure is recoverable and returned to the caller; nothing in
//!   this crate panics on bad input.
//! - Every component surfaces the first failure it encounters. There is no
//!   partial-error aggregation.
//! - Registry and deserialization errors name the offending discriminator.
//!   Validation and field-level errors name the offending field.

use thiserror::Error;

/// Failure while building or querying a type registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The discriminator is already bound to another variant.
    #[error("discriminator {discriminator:?} is already registered")]
    DuplicateDiscriminator {
        /// The clashing discriminator value.
        discriminator: String,
    },

    /// No variant is registered under the discriminator.
    #[error("no variant registered for discriminator {discriminator:?}")]
    UnknownDiscriminator {
        /// The discriminator value that was looked up.
        discriminator: String,
    },

    /// The variant's parent is not the descriptor registered under the
    /// parent's discriminator.
    #[error("variant {discriminator:?} extends {parent:?}, which is not registered")]
    UnregisteredParent {
        /// The variant being registered.
        discriminator: String,
        /// The discriminator of its parent.
        parent: String,
    },

    /// Two own fields of one variant share a semantic name.
    #[error("variant {discriminator:?} declares field {field:?} twice")]
    DuplicateField {
        /// The variant declaring the field.
        discriminator: String,
        /// The repeated field name.
        field: String,
    },

    /// An own field redeclares a field inherited from an ancestor.
    #[error("variant {discriminator:?} redeclares field {field:?} inherited from {ancestor:?}")]
    ShadowedField {
        /// The variant declaring the field.
        discriminator: String,
        /// The redeclared field name.
        field: String,
        /// The ancestor that already declares it.
        ancestor: String,
    },

    /// Two fields in one ancestor chain map to the same wire name, or a
    /// field uses the discriminator property as its wire name.
    #[error("variant {discriminator:?} maps more than one property to wire name {wire_name:?}")]
    WireNameCollision {
        /// The variant whose chain contains the collision.
        discriminator: String,
        /// The contested wire name.
        wire_name: String,
    },

    /// A process-wide registry has already been published.
    #[error("a process-wide type registry has already been published")]
    AlreadyPublished,
}

/// Failure while validating a model instance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field holds no value.
    #[error("required field {field_name:?} is missing")]
    MissingRequiredField {
        /// Semantic name of the missing field, prefixed with its path when
        /// the field belongs to a nested instance.
        field_name: String,
    },

    /// A present field violates one of its declared constraints.
    #[error("field {field_name:?} violates {rule}: {detail}")]
    ConstraintViolated {
        /// Semantic name (or path) of the offending field.
        field_name: String,
        /// The rule that failed, e.g. `max_length`.
        rule: String,
        /// What was expected and what was found.
        detail: String,
    },

    /// A variant's custom validation hook rejected the instance.
    #[error("custom validation for {level_discriminator:?} failed: {detail}")]
    CustomValidationFailed {
        /// Discriminator of the chain level whose hook failed.
        level_discriminator: String,
        /// Message returned by the hook.
        detail: String,
    },
}

impl ValidationError {
    /// Prefix the field name with the path of the enclosing field, so that
    /// failures inside nested instances read as `siblings[0].length`.
    pub fn within(self, path: &str) -> Self {
        match self {
            Self::MissingRequiredField { field_name } => Self::MissingRequiredField {
                field_name: format!("{path}.{field_name}"),
            },
            Self::ConstraintViolated {
                field_name,
                rule,
                detail,
            } => Self::ConstraintViolated {
                field_name: format!("{path}.{field_name}"),
                rule,
                detail,
            },
            Self::CustomValidationFailed {
                level_discriminator,
                detail,
            } => Self::CustomValidationFailed {
                level_discriminator,
                detail: format!("{path}: {detail}"),
            },
        }
    }

    /// The field this error names, if any.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::MissingRequiredField { field_name }
            | Self::ConstraintViolated { field_name, .. } => Some(field_name),
            Self::CustomValidationFailed { .. } => None,
        }
    }
}

/// Failure while reading a wire document into a model instance.
#[derive(Error, Debug)]
pub enum DeserializeError {
    /// The document is not a JSON object.
    #[error("wire document must be a JSON object, got {found}")]
    NotAnObject {
        /// JSON type that was found instead.
        found: &'static str,
    },

    /// None of the expected discriminator properties is present.
    #[error("wire document has no discriminator property (expected one of {expected:?})")]
    MissingDiscriminator {
        /// Discriminator property names that were looked for.
        expected: Vec<String>,
    },

    /// The discriminator value is not registered.
    #[error("unrecognized variant {discriminator:?}")]
    UnrecognizedVariant {
        /// The discriminator value read from the document.
        discriminator: String,
    },

    /// The document names a registered variant that does not descend from
    /// the variant the caller (or the enclosing field) expects.
    #[error("field {field_name:?} expects a {expected:?} but the document is a {found:?}")]
    IncompatibleVariant {
        /// Field (or `$` for the document root) holding the document.
        field_name: String,
        /// Expected base discriminator.
        expected: String,
        /// Discriminator found in the document.
        found: String,
    },

    /// A property could not be coerced to the kind its field declares.
    #[error("field {field_name:?} expected {expected_kind}")]
    FieldTypeMismatch {
        /// Semantic name (or path) of the offending field.
        field_name: String,
        /// Human-readable form of the declared kind.
        expected_kind: String,
    },

    /// The text is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeserializeError {
    /// Shorthand for [`DeserializeError::FieldTypeMismatch`].
    pub fn mismatch(field_name: impl Into<String>, expected_kind: impl ToString) -> Self {
        Self::FieldTypeMismatch {
            field_name: field_name.into(),
            expected_kind: expected_kind.to_string(),
        }
    }

    /// Prefix field-level errors with the path of the enclosing field.
    pub fn within(self, path: &str) -> Self {
        match self {
            Self::FieldTypeMismatch {
                field_name,
                expected_kind,
            } => Self::FieldTypeMismatch {
                field_name: format!("{path}.{field_name}"),
                expected_kind,
            },
            Self::IncompatibleVariant {
                field_name,
                expected,
                found,
            } => Self::IncompatibleVariant {
                field_name: format!("{path}.{field_name}"),
                expected,
                found,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_names_the_field() {
        let err = ValidationError::MissingRequiredField {
            field_name: "birthday".into(),
        };
        assert_eq!(err.to_string(), r#"required field "birthday" is missing"#);
        assert_eq!(err.field_name(), Some("birthday"));
    }

    #[test]
    fn within_prefixes_nested_paths() {
        let err = ValidationError::MissingRequiredField {
            field_name: "length".into(),
        }
        .within("siblings[1]");
        assert_eq!(err.field_name(), Some("siblings[1].length"));

        let err = DeserializeError::mismatch("age", "integer").within("siblings[0]");
        assert!(err.to_string().contains("siblings[0].age"));
    }

    #[test]
    fn within_leaves_discriminator_errors_alone() {
        let err = DeserializeError::UnrecognizedVariant {
            discriminator: "dolphin".into(),
        }
        .within("siblings[0]");
        assert!(matches!(
            err,
            DeserializeError::UnrecognizedVariant { ref discriminator } if discriminator == "dolphin"
        ));
    }
}
