//! Error types for predsql.

use thiserror::Error;

/// The main error type for predsql operations.
#[derive(Debug, Error)]
pub enum PredError {
    /// A predicate node shape with no lowering rule.
    #[error("Unsupported construct in {node}: {detail}")]
    Unsupported { node: &'static str, detail: String },

    /// A member with no resolvable storage column.
    #[error("Cannot resolve column for member '{member}' of entity '{entity}'")]
    UnresolvableColumn { entity: String, member: String },

    /// The entity type is not registered in the schema.
    #[error("Unknown entity type: '{0}'")]
    UnknownEntity(String),

    /// The dialect cannot express the requested feature.
    #[error("Dialect '{dialect}' does not support {feature}")]
    UnsupportedDialect {
        dialect: String,
        feature: &'static str,
    },

    /// A registered value converter rejected a value.
    #[error(
        "Converter '{converter}' rejected {value} for member '{member}' of entity '{entity}': {reason}"
    )]
    Conversion {
        converter: String,
        entity: String,
        member: String,
        value: String,
        reason: String,
    },

    /// Failed to parse predicate text.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// Inconsistent entity metadata.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// A value the driver cannot bind.
    #[error("Cannot bind parameter @{index}: {reason}")]
    Binding { index: usize, reason: String },

    /// No rows where at least one was expected.
    #[error("No rows found")]
    NotFound,

    /// More than one row where exactly one was expected.
    #[error("Expected exactly one row, found {0}")]
    NotSingle(usize),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PredError {
    /// Create an unsupported-construct error for the given node kind.
    pub fn unsupported(node: &'static str, detail: impl Into<String>) -> Self {
        Self::Unsupported {
            node,
            detail: detail.into(),
        }
    }

    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create an unresolvable-column error.
    pub fn column(entity: impl Into<String>, member: impl Into<String>) -> Self {
        Self::UnresolvableColumn {
            entity: entity.into(),
            member: member.into(),
        }
    }

    /// Create an unsupported-dialect error.
    pub fn dialect(dialect: impl Into<String>, feature: &'static str) -> Self {
        Self::UnsupportedDialect {
            dialect: dialect.into(),
            feature,
        }
    }
}

/// Result type alias for predsql operations.
pub type PredResult<T> = Result<T, PredError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PredError::parse(5, "unexpected character");
        assert_eq!(
            err.to_string(),
            "Parse error at position 5: unexpected character"
        );
    }

    #[test]
    fn test_column_error_names_entity_and_member() {
        let err = PredError::column("SomeEntity", "missing");
        assert_eq!(
            err.to_string(),
            "Cannot resolve column for member 'missing' of entity 'SomeEntity'"
        );
    }

    #[test]
    fn test_dialect_error_names_dialect() {
        let err = PredError::dialect("mysql", "native array membership");
        assert_eq!(
            err.to_string(),
            "Dialect 'mysql' does not support native array membership"
        );
    }
}
