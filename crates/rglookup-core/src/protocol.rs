//! Wire payloads shared by the gateway and its clients

use crate::error::Error;
use crate::types::{EntityKind, IdentifierKind};
use serde::{Deserialize, Serialize};

/// Error body returned for failures detected before streaming starts.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub message: String,
    pub errors: Vec<ErrorEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorEntry {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            errors: vec![ErrorEntry {
                code: code.into(),
                message: message.clone(),
            }],
            message,
        }
    }
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

/// One supported lookup, as listed by `GET /catalog`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub path: String,
    pub entity: EntityKind,
    pub identifier: IdentifierKind,
    pub field: String,
    pub exact: bool,
}
