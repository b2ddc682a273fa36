//! Error handling for procedit-store
//!
//! Wraps procedit-core ExError with store-specific helpers

use procedit_core::errors::{ExError, ExErrorKind};
use procedit_core::EngineError;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a document parse error
pub fn parse_error(document: &str, reason: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("parse")
        .with_message(format!("Failed to parse {}: {}", document, reason))
}

/// Create a document render error
pub fn render_error(reason: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("render")
        .with_message(reason.to_string())
}

/// Create an unsupported file format error
pub fn unsupported_format(path: &str) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("detect_format")
        .with_entity_id(path)
        .with_message("Unsupported file extension, expected .yaml, .yml or .json")
}

/// Create an IO error
pub fn io_error(operation: &str, path: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_entity_id(path)
        .with_message(err.to_string())
}

/// Wrap an engine error raised while opening a document
pub fn engine_error(operation: &str, err: EngineError) -> ExError {
    let source: ExError = err.into();
    ExError::new(source.kind())
        .with_op(operation.to_string())
        .with_message(source.message().to_string())
        .with_source(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use procedit_core::ContentKey;

    #[test]
    fn test_engine_error_keeps_kind_and_source() {
        let err = engine_error(
            "open_session",
            EngineError::NodeNotFound {
                key: ContentKey::new(1),
            },
        );
        assert_eq!(err.kind(), ExErrorKind::NotFound);
        assert_eq!(err.op(), Some("open_session"));
        assert!(err.source_error().is_some());
    }

    #[test]
    fn test_io_error_names_path() {
        let err = io_error(
            "read",
            "spec.yaml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code(), "ERR_IO");
        assert_eq!(err.entity_id(), Some("spec.yaml"));
    }
}
