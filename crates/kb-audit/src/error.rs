//! Error types for the knowledge-base auditor
//!
//! Per-document failures are never errors here: they travel as data
//! (`LoadOutcome::Unreadable`, `TraversalError`) so that a run always
//! reaches the report. `AuditError` covers the few conditions that do
//! stop an operation: persisting a report, bad CLI input, broken config.

use thiserror::Error;

/// Main error type for audit operations
#[derive(Error, Debug)]
pub enum AuditError {
    /// Invalid input data or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File access or I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Checklist could not be read or parsed
    #[error("Checklist error: {0}")]
    Checklist(String),

    /// A fact pattern failed to compile
    #[error("Pattern '{id}' is invalid: {message}")]
    Pattern { id: String, message: String },

    /// Serialization of console output failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuditError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AuditError::InvalidInput(msg.into())
    }

    /// Create a checklist error
    pub fn checklist(msg: impl Into<String>) -> Self {
        AuditError::Checklist(msg.into())
    }

    /// Create a pattern compilation error
    pub fn pattern(id: impl Into<String>, msg: impl Into<String>) -> Self {
        AuditError::Pattern {
            id: id.into(),
            message: msg.into(),
        }
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AuditError::InvalidInput(_)
                | AuditError::Checklist(_)
                | AuditError::Pattern { .. }
        )
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        AuditError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        AuditError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for AuditError {
    fn from(err: serde_yaml::Error) -> Self {
        AuditError::Checklist(format!("YAML error: {}", err))
    }
}

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuditError::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "Invalid input: test error");

        let err = AuditError::pattern("price_weekday", "unclosed group");
        assert_eq!(
            err.to_string(),
            "Pattern 'price_weekday' is invalid: unclosed group"
        );
    }

    #[test]
    fn test_is_user_error() {
        assert!(AuditError::invalid_input("x").is_user_error());
        assert!(AuditError::checklist("x").is_user_error());
        assert!(!AuditError::Io("disk full".to_string()).is_user_error());
    }

    #[test]
    fn test_yaml_error_maps_to_checklist() {
        let err: AuditError = serde_yaml::from_str::<Vec<String>>("{not: [a list")
            .unwrap_err()
            .into();
        assert!(matches!(err, AuditError::Checklist(_)));
    }
}
