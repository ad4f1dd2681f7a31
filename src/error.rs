//! Application error types.
//!
//! The exploration model itself never fails; these errors come from the
//! edges of the system (data sources, dataset files, configuration and
//! command-line input).

use thiserror::Error;

/// Application-level errors for graph-explorer.
#[derive(Error, Debug)]
pub enum AppError {
    // Data source errors
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Relationship {relationship} references unknown node {node}")]
    DanglingRelationship { relationship: String, node: String },

    #[error("Dataset parse error: {0}")]
    Dataset(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Input errors
    #[error("Invalid exploration step '{0}': expected explore:<id>, unexplore:<id> or <id>")]
    InvalidStep(String),

    #[error("Grouping threshold must be at least 1, got {0}")]
    InvalidThreshold(usize),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// Short machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NodeNotFound(_) => "NODE_NOT_FOUND",
            AppError::DanglingRelationship { .. } => "DANGLING_RELATIONSHIP",
            AppError::Dataset(_) => "DATASET_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::InvalidStep(_) => "INVALID_STEP",
            AppError::InvalidThreshold(_) => "INVALID_THRESHOLD",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NodeNotFound("a".into()).code(), "NODE_NOT_FOUND");
        assert_eq!(AppError::InvalidThreshold(0).code(), "INVALID_THRESHOLD");
    }

    #[test]
    fn test_dangling_relationship_message() {
        let err = AppError::DanglingRelationship {
            relationship: "r1".to_string(),
            node: "ghost".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Relationship r1 references unknown node ghost"
        );
    }
}
