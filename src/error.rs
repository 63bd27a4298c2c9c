//! Error types for mailcompat
//!
//! The analysis core never fails: absent data is reported through `Option`.
//! These errors come from the host layer (loading documents, parsing config,
//! building custom knowledge bases, parsing CLI filters).

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompatError {
    #[error("Duplicate feature in knowledge base: {0}")]
    DuplicateFeature(String),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Unknown email client: {0}")]
    UnknownClient(String),

    #[error("Unknown feature category: {0}")]
    UnknownCategory(String),

    #[error("Unknown level bucket: {0} (expected high, medium, low or unknown)")]
    UnknownLevelBucket(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(#[source] serde_json::Error),

    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error on line {line}: {message}")]
    Config { line: usize, message: String },
}

/// Serializable form of an error for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub error_code: &'static str,
    pub message: String,
    pub exit_code: i32,
}

impl CompatError {
    /// Stable error code category
    pub fn error_code(&self) -> &'static str {
        match self {
            CompatError::DuplicateFeature(_) => "DUPLICATE_FEATURE",
            CompatError::UnknownFeature(_) => "UNKNOWN_FEATURE",
            CompatError::UnknownClient(_) => "UNKNOWN_CLIENT",
            CompatError::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            CompatError::UnknownLevelBucket(_) => "UNKNOWN_LEVEL_BUCKET",
            CompatError::InvalidDocument(_) => "INVALID_DOCUMENT",
            CompatError::Io { .. } => "IO_ERROR",
            CompatError::Config { .. } => "CONFIG_ERROR",
        }
    }

    /// Process exit code for the CLI
    ///
    /// 1 and 2 are taken by report verdicts, so errors start at 3.
    pub fn exit_code(&self) -> i32 {
        match self {
            CompatError::Io { .. } => 4,
            _ => 3,
        }
    }

    pub fn to_record(&self) -> ErrorRecord {
        ErrorRecord {
            error_code: self.error_code(),
            message: self.to_string(),
            exit_code: self.exit_code(),
        }
    }

    /// Format error as a JSON string
    pub fn to_json(&self) -> String {
        let record = self.to_record();
        serde_json::to_string(&record).unwrap_or_else(|_| {
            format!(
                r#"{{"error_code":"{}","exit_code":{}}}"#,
                record.error_code, record.exit_code
            )
        })
    }
}
