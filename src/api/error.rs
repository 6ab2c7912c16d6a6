//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.
//!
//! Every error body is `{message, request_id}`. Server-side failures get a
//! generic message; the underlying error text travels in the response
//! extensions as [`ErrorDetail`] and is only rendered in development mode
//! (see [`attach_error_detail`]).

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::api::state::AppState;
use crate::report::ReportError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Report assembly failed
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Missing, unknown or inactive caller
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks the required role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Shorthand for a 400 caused by a bad request parameter
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::Report(ReportError::InvalidArgument(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Report(ReportError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            ApiError::Report(ReportError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Report(ReportError::DependencyUnavailable(_))
            | ApiError::Report(ReportError::DataConsistency(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show any caller
    fn public_message(&self) -> String {
        if self.status().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub request_id: String,
}

/// Internal error text attached to error responses
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                status = status.as_u16(),
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                status = status.as_u16(),
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            message: self.public_message(),
            request_id,
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(ErrorDetail(self.to_string()));
        response
    }
}

/// Add the `error` detail field to error bodies in development mode
pub async fn attach_error_detail(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if !state.exposes_error_details() {
        return response;
    }
    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to buffer error body");
            return parts.status.into_response();
        }
    };

    let body = match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(serde_json::Value::Object(mut map)) => {
            map.insert("error".to_string(), serde_json::Value::String(detail));
            serde_json::to_vec(&map).unwrap_or_else(|_| bytes.to_vec())
        }
        _ => bytes.to_vec(),
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(body))
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::invalid("bad id").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(ReportError::NotFound("Blade 1".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unauthorized("missing".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("manager only".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(ReportError::from(StoreError::Lock("poisoned".into()))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(ReportError::DataConsistency("ghost".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = ApiError::from(ReportError::from(StoreError::Lock("poisoned".into())));
        assert_eq!(err.public_message(), "Internal server error");

        let err = ApiError::from(ReportError::NotFound("Client 9".into()));
        assert_eq!(err.public_message(), "Client 9 not found");
    }

    #[test]
    fn test_response_carries_detail_extension() {
        let response = ApiError::Internal("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response.extensions().get::<ErrorDetail>().unwrap();
        assert!(detail.0.contains("disk on fire"));
    }
}
