//! Caller identity
//!
//! Credentials are validated by the gateway in front of this service, which
//! forwards the authenticated operator id in the `x-operator-id` header.
//! Handlers take a [`Caller`] to require an active operator.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::report::ReportError;
use crate::store::{Operator, Role};

/// Header carrying the authenticated operator id
pub const OPERATOR_HEADER: &str = "x-operator-id";

/// The active operator making the request
#[derive(Debug, Clone)]
pub struct Caller(pub Operator);

impl Caller {
    pub fn operator(&self) -> &Operator {
        &self.0
    }

    /// Reject callers that are not managers
    pub fn require_manager(&self) -> Result<(), ApiError> {
        match self.0.role {
            Role::Manager => Ok(()),
            Role::Operator => Err(ApiError::Forbidden(format!(
                "operator {} is not a manager",
                self.0.id
            ))),
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(OPERATOR_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("missing operator identity".to_string()))?;

        let id: i64 = raw
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| ApiError::Unauthorized("malformed operator identity".to_string()))?;

        let operator = state
            .store
            .operator(id)
            .await
            .map_err(ReportError::from)?
            .ok_or_else(|| ApiError::Unauthorized(format!("unknown operator {}", id)))?;

        if !operator.active {
            return Err(ApiError::Unauthorized(format!("operator {} is inactive", id)));
        }

        tracing::debug!(operator_id = id, role = %operator.role, "Resolved caller");
        Ok(Caller(operator))
    }
}
