//! Request ids for log correlation.
//!
//! Every request gets an `x-request-id` (kept when the caller sent one, otherwise a UUID v4)
//! that is echoed on the response and recorded on the request's trace span.

use axum::http::{header::HeaderValue, HeaderName, Request};
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::MakeSpan,
};
use tracing::Span;
use uuid::Uuid;

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Clone, Copy, Default)]
pub struct UuidRequestIdGenerator;

impl MakeRequestId for UuidRequestIdGenerator {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).ok()?))
    }
}

/// Set and propagate layers, in that order. Apply propagate first so it wraps the handler
/// and sees the id that set inserted.
#[must_use]
pub fn create_request_id_layers(
) -> (SetRequestIdLayer<UuidRequestIdGenerator>, PropagateRequestIdLayer) {
    (
        SetRequestIdLayer::new(X_REQUEST_ID.clone(), UuidRequestIdGenerator),
        PropagateRequestIdLayer::new(X_REQUEST_ID.clone()),
    )
}

/// Opens one `request` span per request carrying the method, path and request id.
#[derive(Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = %request_id,
        )
    }
}
