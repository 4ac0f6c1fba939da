use std::path::PathBuf;

use hyper::StatusCode;
use shared::types::ValidationError;
use thiserror::Error;

/// Durable read or write of the product document failed.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed product document {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode product list: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Every way a single command can fail. None of these are fatal to the
/// process; each is scoped to the command that raised it.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Product name is required for a new entry (id {0})")]
    MissingName(String),

    #[error("Store failure: {0}")]
    Store(#[from] StoreError),

    #[error("{0} command was interrupted before it finished")]
    Interrupted(&'static str),
}

impl CommandError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Validation(v) => v.to_code(),
            Self::NotFound(_) => "NOT_FOUND",
            Self::MissingName(_) => "MISSING_NAME",
            Self::Store(_) => "STORE_FAILURE",
            Self::Interrupted(_) => "INTERRUPTED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::MissingName(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Interrupted(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message safe to hand back to the caller. Store details stay in the log.
    pub fn to_message(&self) -> String {
        match self {
            Self::Store(_) => "Internal server error while saving products".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_map_to_client_statuses() {
        let not_found = CommandError::NotFound("A1".into());
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_code(), "NOT_FOUND");

        let missing = CommandError::MissingName("A1".into());
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let invalid = CommandError::from(ValidationError::InvalidStock);
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_message(), "Stock must be a non-negative integer");
        assert_eq!(invalid.to_code(), "INVALID_STOCK");

        let interrupted = CommandError::Interrupted("save-scan");
        assert_eq!(interrupted.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(interrupted.to_code(), "INTERRUPTED");
    }

    #[test]
    fn store_failure_hides_io_detail_from_caller() {
        let err = CommandError::from(StoreError::Io {
            action: "write",
            path: PathBuf::from("/secret/products.json"),
            source: std::io::Error::other("disk full"),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_message().contains("/secret"));
        assert!(err.to_string().contains("disk full"));
    }
}
