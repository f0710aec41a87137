// Request-scoped trace correlation.
//
// Each request gets a trace id, taken from `X-Trace-Id` when the caller sends
// one. The id lives in a `RequestContext` request extension that handlers pass
// down to the service explicitly, and in the `request` span that wraps the
// whole request so every log line inside it carries the id. This middleware is
// the outermost layer, so timed-out requests are traced and echoed too.

use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::AppError;

pub const TRACE_HEADER: &str = "x-trace-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub trace_id: String,
}

impl RequestContext {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
        }
    }

    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}

pub async fn trace_middleware(mut request: Request, next: Next) -> Response {
    let context = request
        .headers()
        .get(TRACE_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(RequestContext::new)
        .unwrap_or_else(RequestContext::generate);

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let span = tracing::info_span!(
        "request",
        trace_id = %context.trace_id,
        method   = %method,
        path     = %path,
    );

    request.extensions_mut().insert(context.clone());
    let started = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;

    // The timeout layer answers with an empty 408.
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(CONTENT_TYPE)
    {
        response =
            span.in_scope(|| AppError::Timeout("request timed out".into()).into_response());
    }

    if let Ok(value) = HeaderValue::from_str(&context.trace_id) {
        response.headers_mut().insert(TRACE_HEADER, value);
    }

    span.in_scope(|| {
        tracing::info!(
            status     = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Completed '{method} {path}'"
        );
    });

    response
}
