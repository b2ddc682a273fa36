//! Literal value validation
//!
//! Each declared type with a literal form runs the same validator chain:
//! required-ness, format, pattern, numeric range, enumerated values. The
//! chain stops at the first validator that reports an error since later
//! validators assume the earlier ones passed.

use procedit_core_types::{TypeId, TypeUnion};
use regex::Regex;
use std::collections::HashMap;

use crate::errors::{EngineError, Result};
use crate::model::{EngineSpec, LiteralFormat, TypeSpec, ValidationCode, ValidationError};

/// Literal validator with every type pattern compiled up front
#[derive(Debug, Clone, Default)]
pub struct LiteralValidator {
    patterns: HashMap<TypeId, Regex>,
}

impl LiteralValidator {
    /// Compile the `pattern` of every declared type
    ///
    /// Patterns must match the whole literal, so each is anchored on both ends.
    ///
    /// # Errors
    /// `InvalidPattern` if any pattern fails to compile.
    pub fn new(spec: &EngineSpec) -> Result<Self> {
        let mut patterns = HashMap::new();
        for (type_id, type_spec) in &spec.types {
            if let Some(pattern) = &type_spec.pattern {
                let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
                    EngineError::InvalidPattern {
                        type_id: type_id.clone(),
                        reason: e.to_string(),
                    }
                })?;
                patterns.insert(type_id.clone(), regex);
            }
        }
        Ok(Self { patterns })
    }

    /// Validate `text` against a value's current type union
    ///
    /// Valid when any member accepts the text; otherwise the first member's
    /// errors are reported.
    pub fn validate(
        &self,
        text: &str,
        type_id: &TypeUnion,
        required: bool,
        spec: &EngineSpec,
    ) -> Vec<ValidationError> {
        let mut first_errors = None;
        for member in type_id {
            let errors = self.validate_member(text, member, required, spec);
            if errors.is_empty() {
                return errors;
            }
            first_errors.get_or_insert(errors);
        }
        first_errors.unwrap_or_else(|| {
            vec![ValidationError::new(
                ValidationCode::NoLiteralForm,
                "Value has no type",
            )]
        })
    }

    /// Whether one member type on its own accepts `text`
    pub fn accepts(&self, text: &str, type_id: &str, spec: &EngineSpec) -> bool {
        self.validate_member(text, type_id, false, spec).is_empty()
    }

    fn validate_member(
        &self,
        text: &str,
        type_id: &str,
        required: bool,
        spec: &EngineSpec,
    ) -> Vec<ValidationError> {
        let Some(type_spec) = spec.type_spec(type_id).filter(|t| t.has_literal_form()) else {
            return vec![ValidationError::new(
                ValidationCode::NoLiteralForm,
                format!("Type {} has no literal form", type_id),
            )];
        };

        if text.is_empty() {
            return if required {
                vec![invalid("A value is required")]
            } else {
                Vec::new()
            };
        }

        let chain = [
            check_format(text, type_spec),
            self.check_pattern(text, type_id),
            check_range(text, type_spec),
            check_values(text, type_spec),
        ];
        chain.into_iter().flatten().take(1).collect()
    }

    fn check_pattern(&self, text: &str, type_id: &str) -> Option<ValidationError> {
        let regex = self.patterns.get(type_id)?;
        (!regex.is_match(text)).then(|| invalid(format!("'{}' does not match {}", text, regex)))
    }
}

fn invalid(message: impl Into<String>) -> ValidationError {
    ValidationError::new(ValidationCode::MissingOrInvalidValue, message)
}

fn check_format(text: &str, type_spec: &TypeSpec) -> Option<ValidationError> {
    let format = type_spec.literal?;
    let ok = match format {
        LiteralFormat::Text => true,
        LiteralFormat::Integer => text.parse::<i64>().is_ok(),
        LiteralFormat::Decimal => text.parse::<f64>().is_ok_and(f64::is_finite),
        LiteralFormat::Boolean => text == "true" || text == "false",
    };
    (!ok).then(|| invalid(format!("'{}' is not a valid {:?} literal", text, format)))
}

fn check_range(text: &str, type_spec: &TypeSpec) -> Option<ValidationError> {
    if type_spec.min.is_none() && type_spec.max.is_none() {
        return None;
    }
    let number = text.parse::<f64>().ok()?;
    if let Some(min) = type_spec.min.filter(|min| number < *min) {
        return Some(invalid(format!("{} is below the minimum {}", text, min)));
    }
    if let Some(max) = type_spec.max.filter(|max| number > *max) {
        return Some(invalid(format!("{} is above the maximum {}", text, max)));
    }
    None
}

fn check_values(text: &str, type_spec: &TypeSpec) -> Option<ValidationError> {
    let values = type_spec.values.as_ref()?;
    (!values.iter().any(|v| v == text))
        .then(|| invalid(format!("'{}' is not one of {}", text, values.join(", "))))
}
