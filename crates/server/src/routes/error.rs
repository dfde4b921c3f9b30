use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chainrest_core::{
    metrics::record_failure_response,
    pipeline::{resolve_failure, RouteError},
    upstream::UpstreamError,
};

/// Failure of a route handler, rendered through [`resolve_failure`].
#[derive(Debug)]
pub struct ApiError(pub RouteError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(RouteError::bad_request(message))
    }
}

impl From<RouteError> for ApiError {
    fn from(error: RouteError) -> Self {
        Self(error)
    }
}

impl From<UpstreamError> for ApiError {
    fn from(error: UpstreamError) -> Self {
        Self(RouteError::Upstream(error))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let failure = resolve_failure(&self.0);
        record_failure_response(failure.status);

        let status =
            StatusCode::from_u16(failure.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(failure.body)).into_response()
    }
}
