//! Mapping lookup failures onto HTTP responses
//!
//! Only failures detected before the first body byte reach this mapping. Once
//! streaming has begun, errors abort the body instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rglookup_core::{Error, ErrorResponse};
use tracing::{debug, error};

#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidFormat { .. } => StatusCode::BAD_REQUEST,
            Error::NotFoundKind { .. } => StatusCode::NOT_FOUND,
            Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.0.code(), "lookup failed: {}", self.0);
        } else {
            debug!(code = self.0.code(), "lookup rejected: {}", self.0);
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError(Error::invalid_format("x")).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError(Error::not_found_kind("grant", "doi")).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError(Error::QueryExecution("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError(Error::data_integrity("k", "title")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError(Error::timeout("query", std::time::Duration::from_secs(1))).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
