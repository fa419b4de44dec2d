//! # Cascading Validation
//!
//! Walks an instance's ancestor chain from the family root down to the
//! leaf. At every level, in order:
//!
//! 1. each required own field must be present;
//! 2. each present own field must satisfy its constraints;
//! 3. nested instances held by own fields (directly, or inside lists and
//!    maps) are validated against their own chains;
//! 4. the level's custom hook, if any, runs.
//!
//! The first failure ends the walk. Root-to-leaf order means a derived
//! level's hook can assume every inherited required field is present, and
//! ancestor hooks always run before descendant hooks.

use crate::descriptor::VariantDescriptor;
use crate::error::ValidationError;
use crate::value::{FieldValue, ModelInstance};

/// Validate `instance` against the chain ending at `leaf`.
///
/// # Errors
///
/// Returns the first `MissingRequiredField`, `ConstraintViolated` or
/// `CustomValidationFailed` encountered.
pub fn validate(instance: &ModelInstance, leaf: &VariantDescriptor) -> Result<(), ValidationError> {
    for level in leaf.ancestry() {
        validate_level(instance, level)?;
    }
    Ok(())
}

fn validate_level(instance: &ModelInstance, level: &VariantDescriptor) -> Result<(), ValidationError> {
    for field in level.own_fields() {
        if field.is_required() && !instance.is_present(field.name()) {
            return Err(ValidationError::MissingRequiredField {
                field_name: field.name().to_string(),
            });
        }
    }

    for field in level.own_fields() {
        let Some(value) = instance.get(field.name()) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        for constraint in field.constraints() {
            constraint
                .check(value)
                .map_err(|detail| ValidationError::ConstraintViolated {
                    field_name: field.name().to_string(),
                    rule: constraint.rule().to_string(),
                    detail,
                })?;
        }
    }

    for field in level.own_fields() {
        if let Some(value) = instance.get(field.name()) {
            cascade(value, field.name())?;
        }
    }

    if let Some(hook) = level.validate_hook() {
        hook(instance).map_err(|detail| ValidationError::CustomValidationFailed {
            level_discriminator: level.discriminator().to_string(),
            detail,
        })?;
    }
    Ok(())
}

fn cascade(value: &FieldValue, path: &str) -> Result<(), ValidationError> {
    match value {
        FieldValue::Nested(nested) => nested.validate().map_err(|e| e.within(path)),
        FieldValue::List(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| cascade(item, &format!("{path}[{i}]"))),
        FieldValue::Map(entries) => entries
            .iter()
            .try_for_each(|(key, item)| cascade(item, &format!("{path}[{key}]"))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::constraint::Constraint;
    use crate::descriptor::{FieldDescriptor, FieldKind, ScalarKind};

    fn fish() -> Arc<VariantDescriptor> {
        VariantDescriptor::root("fish", "fishtype")
            .field(FieldDescriptor::new("species", ScalarKind::String))
            .field(FieldDescriptor::new("length", ScalarKind::Number).required())
            .field(FieldDescriptor::new("siblings", FieldKind::list(FieldKind::nested("fish"))))
            .build()
    }

    fn shark(fish: &Arc<VariantDescriptor>) -> Arc<VariantDescriptor> {
        VariantDescriptor::extends("shark", fish)
            .field(FieldDescriptor::new("age", ScalarKind::Integer))
            .field(FieldDescriptor::new("birthday", ScalarKind::DateTime).required())
            .build()
    }

    fn birthday() -> FieldValue {
        FieldValue::DateTime(Utc.with_ymd_and_hms(2012, 1, 5, 1, 0, 0).unwrap())
    }

    #[test]
    fn complete_instance_passes() {
        let shark = shark(&fish());
        let instance = ModelInstance::new(shark)
            .with("length", 10.0)
            .with("birthday", birthday());
        assert!(instance.validate().is_ok());
    }

    #[test]
    fn missing_birthday_is_reported() {
        let shark = shark(&fish());
        let instance = ModelInstance::new(Arc::clone(&shark))
            .with("length", 10.0)
            .with("age", 6i64)
            .with("species", "predator");
        assert_eq!(
            validate(&instance, &shark).unwrap_err(),
            ValidationError::MissingRequiredField {
                field_name: "birthday".into()
            }
        );
    }

    #[test]
    fn parent_field_fails_before_derived_field() {
        let shark = shark(&fish());
        let instance = ModelInstance::new(shark);
        assert_eq!(
            instance.validate().unwrap_err().field_name(),
            Some("length")
        );
    }

    #[test]
    fn parent_failure_skips_leaf_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let fish = fish();
        let shark = VariantDescriptor::extends("shark", &fish)
            .hook(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                Err("always fails".into())
            })
            .build();

        let err = ModelInstance::new(shark).validate().unwrap_err();
        assert!(matches!(err, ValidationError::MissingRequiredField { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn hook_failure_names_its_level() {
        let fish = fish();
        let shark = VariantDescriptor::extends("shark", &fish)
            .field(FieldDescriptor::new("age", ScalarKind::Integer))
            .hook(|instance| match instance.get("age").and_then(FieldValue::as_i64) {
                Some(age) if age < 0 => Err(format!("age {age} is negative")),
                _ => Ok(()),
            })
            .build();
        let instance = ModelInstance::new(shark).with("length", 1.0).with("age", -1i64);
        assert_eq!(
            instance.validate().unwrap_err(),
            ValidationError::CustomValidationFailed {
                level_discriminator: "shark".into(),
                detail: "age -1 is negative".into()
            }
        );
    }

    #[test]
    fn ancestor_hooks_run_first() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (a, b) = (Arc::clone(&order), Arc::clone(&order));
        let fish = VariantDescriptor::root("fish", "fishtype")
            .hook(move |_| {
                a.lock().unwrap().push("fish");
                Ok(())
            })
            .build();
        let shark = VariantDescriptor::extends("shark", &fish)
            .hook(move |_| {
                b.lock().unwrap().push("shark");
                Ok(())
            })
            .build();
        ModelInstance::new(shark).validate().unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["fish", "shark"]);
    }

    #[test]
    fn constraints_name_field_and_rule() {
        let fish = VariantDescriptor::root("fish", "fishtype")
            .field(
                FieldDescriptor::new("species", ScalarKind::String)
                    .constraint(Constraint::MaxLength(5)),
            )
            .build();
        let instance = ModelInstance::new(fish).with("species", "hammerhead");
        match instance.validate().unwrap_err() {
            ValidationError::ConstraintViolated { field_name, rule, .. } => {
                assert_eq!(field_name, "species");
                assert_eq!(rule, "max_length");
            }
            other => panic!("expected ConstraintViolated, got {other}"),
        }
    }

    #[test]
    fn nested_siblings_are_validated_with_a_path() {
        let fish = fish();
        let shark = shark(&fish);
        let sibling = ModelInstance::new(Arc::clone(&shark)).with("length", 2.0);
        let instance = ModelInstance::new(shark)
            .with("length", 10.0)
            .with("birthday", birthday())
            .with("siblings", vec![FieldValue::from(sibling)]);

        assert_eq!(
            instance.validate().unwrap_err(),
            ValidationError::MissingRequiredField {
                field_name: "siblings[0].birthday".into()
            }
        );
    }
}
