use thiserror::Error;

use crate::model::{ContentKey, ContentKind};

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all fatal
/// errors raised by the engine. Each kind maps to a stable error code that can
/// be used for programmatic error handling, testing, and external responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural
    NotFound,
    WrongKind,
    DetachedNode,
    InvalidIndex,
    InvalidMove,

    // Contract
    NotMultiValued,
    NotAList,
    TypeNotAllowed,

    // Specification
    UnknownType,
    UnknownCallable,
    UnknownParameter,
    MissingOutput,
    CycleDetected,
    InvalidPattern,

    // Configuration
    UnresolvedReference,
    InvalidPath,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::WrongKind => "ERR_WRONG_KIND",
            ExErrorKind::DetachedNode => "ERR_DETACHED_NODE",
            ExErrorKind::InvalidIndex => "ERR_INVALID_INDEX",
            ExErrorKind::InvalidMove => "ERR_INVALID_MOVE",
            ExErrorKind::NotMultiValued => "ERR_NOT_MULTI_VALUED",
            ExErrorKind::NotAList => "ERR_NOT_A_LIST",
            ExErrorKind::TypeNotAllowed => "ERR_TYPE_NOT_ALLOWED",
            ExErrorKind::UnknownType => "ERR_UNKNOWN_TYPE",
            ExErrorKind::UnknownCallable => "ERR_UNKNOWN_CALLABLE",
            ExErrorKind::UnknownParameter => "ERR_UNKNOWN_PARAMETER",
            ExErrorKind::MissingOutput => "ERR_MISSING_OUTPUT",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::InvalidPattern => "ERR_INVALID_PATTERN",
            ExErrorKind::UnresolvedReference => "ERR_UNRESOLVED_REFERENCE",
            ExErrorKind::InvalidPath => "ERR_INVALID_PATH",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// This error type provides a structured representation of errors with
/// classification fields for programmatic handling and rich context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (content key, type id, callable name, file path)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Fatal contract violations raised by engine operations
///
/// Recoverable problems (bad literals, unreachable references, type
/// mismatches) are never returned here; they are recorded on the affected
/// node as `ValidationError`s.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    // ===== Structural Errors =====
    /// Key is not present in the content store
    #[error("Content node not found: {key}")]
    NodeNotFound { key: ContentKey },

    /// Node exists but is of a different kind than the operation requires
    #[error("Content node {key} is a {actual}, expected {expected}")]
    WrongNodeKind {
        key: ContentKey,
        expected: ContentKind,
        actual: ContentKind,
    },

    /// Node has no parent where one is required
    #[error("Content node {key} is not attached to a parent")]
    DetachedNode { key: ContentKey },

    /// Node is not an executable (Action or Control)
    #[error("Content node {key} is not an executable")]
    NotAnExecutable { key: ContentKey },

    /// Index outside the bounds of an ordered child list
    #[error("Index {index} out of range for {key} (len {len})")]
    IndexOutOfRange {
        key: ContentKey,
        index: usize,
        len: usize,
    },

    /// Executable cannot be moved to the requested position
    #[error("Cannot move {key}: {reason}")]
    InvalidMove { key: ContentKey, reason: String },

    /// Only expressions and executables can be deleted
    #[error("Content node {key} ({kind}) cannot be deleted")]
    NotDeletable { key: ContentKey, kind: ContentKind },

    // ===== Contract Errors =====
    /// Argument accepts exactly one expression
    #[error("Argument {key} does not accept multiple values")]
    NotMultiValued { key: ContentKey },

    /// Node does not own an ordered child list
    #[error("Content node {key} is not a reorderable list")]
    NotAList { key: ContentKey },

    /// Type is outside the allowed type of the owning argument
    #[error("Type {type_id} is not allowed at {key}")]
    TypeNotAllowed { key: ContentKey, type_id: String },

    // ===== Specification Errors =====
    /// Type referenced but never declared
    #[error("Unknown type: {type_id}")]
    UnknownType { type_id: String },

    /// The declared type hierarchy is cyclic
    #[error("Type hierarchy cycle detected at type {type_id}")]
    TypeCycleDetected { type_id: String },

    /// A literal pattern in the type catalog does not compile
    #[error("Invalid pattern for type {type_id}: {reason}")]
    InvalidPattern { type_id: String, reason: String },

    #[error("Unknown process: {name}")]
    UnknownProcess { name: String },

    #[error("Unknown action: {name}")]
    UnknownAction { name: String },

    #[error("Unknown function: {name}")]
    UnknownFunction { name: String },

    /// Configuration names a parameter the callable does not declare
    #[error("Unknown parameter {parameter} for {callable}")]
    UnknownParameter { callable: String, parameter: String },

    /// Callable has no output but one is required
    #[error("Callable {callable} declares no output")]
    MissingOutput { callable: String },

    // ===== Configuration Errors =====
    /// Reference coordinates do not address an output-producing action
    #[error("Reference coordinates {coordinates:?} do not resolve to an output variable")]
    UnresolvedCoordinates { coordinates: Vec<usize> },

    /// Reference names a process input that does not exist
    #[error("Unknown process input: {name}")]
    UnknownInput { name: String },

    /// Property path cannot be walked from the variable's type
    #[error("Invalid property path: {path:?}")]
    InvalidPath { path: Vec<String> },

    // ===== Generic Errors =====
    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<EngineError> for ExError {
    fn from(err: EngineError) -> Self {
        let message = err.to_string();
        match err {
            EngineError::NodeNotFound { key } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(key.to_string())
                .with_message(message),

            EngineError::WrongNodeKind { key, .. } => ExError::new(ExErrorKind::WrongKind)
                .with_entity_id(key.to_string())
                .with_message(message),

            EngineError::DetachedNode { key } => ExError::new(ExErrorKind::DetachedNode)
                .with_entity_id(key.to_string())
                .with_message(message),

            EngineError::NotAnExecutable { key } => ExError::new(ExErrorKind::WrongKind)
                .with_entity_id(key.to_string())
                .with_message(message),

            EngineError::IndexOutOfRange { key, .. } => ExError::new(ExErrorKind::InvalidIndex)
                .with_entity_id(key.to_string())
                .with_message(message),

            EngineError::InvalidMove { key, .. } => ExError::new(ExErrorKind::InvalidMove)
                .with_entity_id(key.to_string())
                .with_message(message),

            EngineError::NotDeletable { key, .. } => ExError::new(ExErrorKind::WrongKind)
                .with_entity_id(key.to_string())
                .with_op("delete_item")
                .with_message(message),

            EngineError::NotMultiValued { key } => ExError::new(ExErrorKind::NotMultiValued)
                .with_entity_id(key.to_string())
                .with_message(message),

            EngineError::NotAList { key } => ExError::new(ExErrorKind::NotAList)
                .with_entity_id(key.to_string())
                .with_message(message),

            EngineError::TypeNotAllowed { key, .. } => ExError::new(ExErrorKind::TypeNotAllowed)
                .with_entity_id(key.to_string())
                .with_message(message),

            EngineError::UnknownType { type_id } => ExError::new(ExErrorKind::UnknownType)
                .with_entity_id(type_id)
                .with_message(message),

            EngineError::TypeCycleDetected { type_id } => ExError::new(ExErrorKind::CycleDetected)
                .with_entity_id(type_id)
                .with_op("build_type_system")
                .with_message(message),

            EngineError::InvalidPattern { type_id, .. } => {
                ExError::new(ExErrorKind::InvalidPattern)
                    .with_entity_id(type_id)
                    .with_op("load_catalog")
                    .with_message(message)
            }

            EngineError::UnknownProcess { name }
            | EngineError::UnknownAction { name }
            | EngineError::UnknownFunction { name } => ExError::new(ExErrorKind::UnknownCallable)
                .with_entity_id(name)
                .with_message(message),

            EngineError::UnknownParameter { callable, .. } => {
                ExError::new(ExErrorKind::UnknownParameter)
                    .with_entity_id(callable)
                    .with_message(message)
            }

            EngineError::MissingOutput { callable } => ExError::new(ExErrorKind::MissingOutput)
                .with_entity_id(callable)
                .with_message(message),

            EngineError::UnresolvedCoordinates { .. } | EngineError::UnknownInput { .. } => {
                ExError::new(ExErrorKind::UnresolvedReference)
                    .with_op("construct")
                    .with_message(message)
            }

            EngineError::InvalidPath { .. } => {
                ExError::new(ExErrorKind::InvalidPath).with_message(message)
            }

            EngineError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            EngineError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to EngineError
impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization {
            message: err.to_string(),
        }
    }
}
