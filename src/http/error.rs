//! Rejection taxonomy and JSON error responses.

use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::observability::metrics;

/// Message sent to the caller for faults that are ours, not theirs.
const INTERNAL_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

/// Every way the pipeline refuses a request before its handler runs.
///
/// The 4xx variants are user-caused and render their message verbatim;
/// `Dependency` and `Internal` are the system's own faults and collapse
/// to a generic line so internals never leak.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("malformed authorization header")]
    MalformedHeader,

    #[error("malformed authorization token")]
    MalformedToken,

    #[error("invalid or expired authorization token")]
    InvalidOrExpiredToken,

    #[error("authentication required")]
    AuthenticationRequired,

    #[error("user not activated")]
    NotActivated,

    #[error("user does not have the required permission")]
    MissingPermission,

    #[error("rate limit exceeded")]
    RateLimited,

    /// External store failure or timeout.
    #[error("dependency failure: {0}")]
    Dependency(String),

    /// Recovered panic or broken pipeline wiring.
    #[error("internal fault: {0}")]
    Internal(String),
}

/// Wire shape of every rejection body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    status: u16,
}

impl GateError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedHeader
            | Self::MalformedToken
            | Self::InvalidOrExpiredToken
            | Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::NotActivated | Self::MissingPermission => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Dependency(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the caller.
    pub fn public_message(&self) -> String {
        if self.is_server_fault() {
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    fn is_server_fault(&self) -> bool {
        matches!(self, Self::Dependency(_) | Self::Internal(_))
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::MalformedHeader => "malformed_header",
            Self::MalformedToken => "malformed_token",
            Self::InvalidOrExpiredToken => "invalid_token",
            Self::AuthenticationRequired => "authentication_required",
            Self::NotActivated => "not_activated",
            Self::MissingPermission => "missing_permission",
            Self::RateLimited => "rate_limited",
            Self::Dependency(_) => "dependency_failure",
            Self::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            message: self.public_message(),
            status: status.as_u16(),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Convert a rejection into its response, logging server faults with
/// request context first and counting every rejection.
pub fn reject(err: GateError, method: &Method, uri: &Uri) -> Response {
    if err.is_server_fault() {
        tracing::error!(method = %method, url = %uri, cause = %err, "Request failed");
    }
    metrics::record_rejection(err.reason());
    err.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(GateError::MalformedHeader.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(GateError::AuthenticationRequired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(GateError::NotActivated.status(), StatusCode::FORBIDDEN);
        assert_eq!(GateError::MissingPermission.status(), StatusCode::FORBIDDEN);
        assert_eq!(GateError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            GateError::Dependency("db down".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_faults_never_leak_details() {
        let err = GateError::Dependency("connection refused to 10.0.0.5:5432".into());
        assert!(!err.public_message().contains("10.0.0.5"));

        let err = GateError::MissingPermission;
        assert_eq!(err.public_message(), "user does not have the required permission");
    }

    #[test]
    fn unauthorized_responses_carry_challenge() {
        let response = GateError::InvalidOrExpiredToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
