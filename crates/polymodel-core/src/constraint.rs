//! # Field Constraints
//!
//! Declarative rules that generated models check in their `validate()`
//! step beyond presence: string length and pattern, numeric bounds, and
//! collection size and uniqueness.
//!
//! A constraint only applies to the value shapes it understands. A length
//! rule on an integer field, for example, is skipped rather than failed;
//! kind mismatches are the deserializer's job.

use std::fmt;

use regex::Regex;

use crate::value::FieldValue;

/// One rule attached to a [`FieldDescriptor`](crate::FieldDescriptor).
#[derive(Debug, Clone)]
pub enum Constraint {
    MaxLength(usize),
    MinLength(usize),
    /// Anchoring is up to the pattern author.
    Pattern(Regex),
    InclusiveMaximum(f64),
    InclusiveMinimum(f64),
    ExclusiveMaximum(f64),
    ExclusiveMinimum(f64),
    MultipleOf(f64),
    MaxItems(usize),
    MinItems(usize),
    UniqueItems,
}

impl Constraint {
    /// Compile a `Pattern` constraint.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    /// Stable rule name used in error reports.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::MaxLength(_) => "max_length",
            Self::MinLength(_) => "min_length",
            Self::Pattern(_) => "pattern",
            Self::InclusiveMaximum(_) => "inclusive_maximum",
            Self::InclusiveMinimum(_) => "inclusive_minimum",
            Self::ExclusiveMaximum(_) => "exclusive_maximum",
            Self::ExclusiveMinimum(_) => "exclusive_minimum",
            Self::MultipleOf(_) => "multiple_of",
            Self::MaxItems(_) => "max_items",
            Self::MinItems(_) => "min_items",
            Self::UniqueItems => "unique_items",
        }
    }

    /// Check `value`, returning a description of the violation.
    pub fn check(&self, value: &FieldValue) -> Result<(), String> {
        match self {
            Self::MaxLength(max) => match text_len(value) {
                Some(len) if len > *max => Err(format!("length {len} exceeds {max}")),
                _ => Ok(()),
            },
            Self::MinLength(min) => match text_len(value) {
                Some(len) if len < *min => Err(format!("length {len} is below {min}")),
                _ => Ok(()),
            },
            Self::Pattern(re) => match value {
                FieldValue::String(s) if !re.is_match(s) => {
                    Err(format!("{s:?} does not match {:?}", re.as_str()))
                }
                _ => Ok(()),
            },
            Self::InclusiveMaximum(bound) => numeric(value, |n| n <= *bound, "<=", *bound),
            Self::InclusiveMinimum(bound) => numeric(value, |n| n >= *bound, ">=", *bound),
            Self::ExclusiveMaximum(bound) => numeric(value, |n| n < *bound, "<", *bound),
            Self::ExclusiveMinimum(bound) => numeric(value, |n| n > *bound, ">", *bound),
            Self::MultipleOf(step) => match value.as_f64() {
                Some(n) if *step != 0.0 && !is_multiple(n, *step) => {
                    Err(format!("{n} is not a multiple of {step}"))
                }
                _ => Ok(()),
            },
            Self::MaxItems(max) => match value.item_count() {
                Some(count) if count > *max => Err(format!("{count} items exceed {max}")),
                _ => Ok(()),
            },
            Self::MinItems(min) => match value.item_count() {
                Some(count) if count < *min => Err(format!("{count} items are below {min}")),
                _ => Ok(()),
            },
            Self::UniqueItems => match value {
                FieldValue::List(items) => {
                    for (i, item) in items.iter().enumerate() {
                        if items[..i].contains(item) {
                            return Err(format!("item {i} repeats an earlier item"));
                        }
                    }
                    Ok(())
                }
                _ => Ok(()),
            },
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxLength(n) | Self::MinLength(n) | Self::MaxItems(n) | Self::MinItems(n) => {
                write!(f, "{}={n}", self.rule())
            }
            Self::Pattern(re) => write!(f, "pattern={}", re.as_str()),
            Self::InclusiveMaximum(n)
            | Self::InclusiveMinimum(n)
            | Self::ExclusiveMaximum(n)
            | Self::ExclusiveMinimum(n)
            | Self::MultipleOf(n) => write!(f, "{}={n}", self.rule()),
            Self::UniqueItems => f.write_str("unique_items"),
        }
    }
}

/// Tolerates the rounding error of decimal steps such as `0.1`.
fn is_multiple(n: f64, step: f64) -> bool {
    let quotient = n / step;
    (quotient - quotient.round()).abs() <= 1e-9 * quotient.abs().max(1.0)
}

fn text_len(value: &FieldValue) -> Option<usize> {
    match value {
        FieldValue::String(s) => Some(s.chars().count()),
        _ => None,
    }
}

fn numeric(value: &FieldValue, ok: impl Fn(f64) -> bool, op: &str, bound: f64) -> Result<(), String> {
    match value.as_f64() {
        Some(n) if !ok(n) => Err(format!("{n} is not {op} {bound}")),
        _ => Ok(()),
    }
}
