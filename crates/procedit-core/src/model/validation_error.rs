use serde::{Deserialize, Serialize};

/// Classification of a recoverable, node-attached validation problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    /// Literal fails its type's validator chain
    MissingOrInvalidValue,
    /// Compound type left in literal-entry mode
    NoLiteralForm,
    /// Reference is structurally unreachable
    InvalidReference,
    /// Reference may read a binding that was never produced
    UncheckedReference,
    /// Computed type does not satisfy the declared parameter type
    UnsatisfiedInputTypeMismatch,
}

impl ValidationCode {
    /// Stable wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::MissingOrInvalidValue => "MISSING_OR_INVALID_VALUE",
            ValidationCode::NoLiteralForm => "NO_LITERAL_FORM",
            ValidationCode::InvalidReference => "INVALID_REFERENCE",
            ValidationCode::UncheckedReference => "UNCHECKED_REFERENCE",
            ValidationCode::UnsatisfiedInputTypeMismatch => "UNSATISFIED_INPUT_TYPE_MISMATCH",
        }
    }

    /// Warnings do not block; everything else does
    pub fn is_blocking(&self) -> bool {
        !matches!(self, ValidationCode::UncheckedReference)
    }
}

impl std::fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation problem recorded on a content node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub code: ValidationCode,
    pub message: String,

    /// Parameter the problem belongs to, for errors raised on a callable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl ValidationError {
    pub fn new(code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            parameter: None,
        }
    }

    pub fn for_parameter(
        code: ValidationCode,
        parameter: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            parameter: Some(parameter.into()),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.code.is_blocking()
    }
}
