use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Schema error: {0}")]
    SchemaError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl AppError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Internal(_) => "internal",
            AppError::ValidationError(_) => "validation",
            AppError::ParseError(_) => "parse",
            AppError::SchemaError(_) => "schema",
            AppError::IoError(_) => "io",
        }
    }

    /// Errors caused by the uploaded file or the caller's input rather than the host
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::ValidationError(_) | AppError::ParseError(_) | AppError::SchemaError(_)
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_kind() {
        let err = AppError::SchemaError("missing required column(s): IMEI2".to_string());
        assert_eq!(
            err.to_string(),
            "Schema error: missing required column(s): IMEI2"
        );
        assert_eq!(err.kind(), "schema");
    }

    #[test]
    fn test_user_facing_split() {
        assert!(AppError::ParseError("bad zip".into()).is_user_facing());
        assert!(AppError::ValidationError("empty".into()).is_user_facing());
        assert!(!AppError::Internal("pool closed".into()).is_user_facing());
        assert!(!AppError::from(std::io::Error::other("disk")).is_user_facing());
    }
}
