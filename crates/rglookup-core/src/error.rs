//! Error types for rglookup

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid identifier: {reason}")]
    InvalidFormat { reason: String },

    #[error("no lookup for {entity} by {identifier}")]
    NotFoundKind { entity: String, identifier: String },

    #[error("query execution failed: {0}")]
    QueryExecution(String),

    #[error("entity {entity} is missing property `{property}`")]
    DataIntegrity { entity: String, property: String },

    #[error("stream write failed: {0}")]
    StreamWrite(String),

    #[error("{stage} timed out after {after_ms}ms")]
    Timeout { stage: &'static str, after_ms: u64 },

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            reason: reason.into(),
        }
    }

    pub fn not_found_kind(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFoundKind {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn data_integrity(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Self::DataIntegrity {
            entity: entity.into(),
            property: property.into(),
        }
    }

    pub fn timeout(stage: &'static str, after: std::time::Duration) -> Self {
        Self::Timeout {
            stage,
            after_ms: after.as_millis() as u64,
        }
    }

    /// Stable status code reported in error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat { .. } => "Neo.ClientError.Request.InvalidFormat",
            Self::NotFoundKind { .. } => "Neo.ClientError.Request.NotFoundKind",
            Self::QueryExecution(_) => "Neo.DatabaseError.Statement.ExecutionFailed",
            Self::DataIntegrity { .. } => "Neo.DatabaseError.General.DataIntegrity",
            Self::StreamWrite(_) => "Neo.TransientError.Request.StreamWrite",
            Self::Timeout { .. } => "Neo.TransientError.Request.Timeout",
            Self::ConfigError(_) | Self::IoError(_) | Self::JsonError(_) => {
                "Neo.DatabaseError.General.UnknownError"
            }
        }
    }

    /// True when the caller, not the server or store, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidFormat { .. } | Self::NotFoundKind { .. })
    }
}
