//! Per-request correlation ids.
//!
//! The id is taken from the inbound headers or generated, stored in the
//! request extensions for the trace span, kept in a task-local for log
//! events raised deeper in the request, and echoed in the response.

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const CORRELATION_ID_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");
pub const TRACE_ID_HEADER: HeaderName = HeaderName::from_static("x-trace-id");

tokio::task_local! {
    /// Correlation id of the request running on this task.
    static CURRENT_CORRELATION_ID: CorrelationId;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// `X-Correlation-ID`, else `X-Trace-Id`, else a fresh UUID v4.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let inbound = [&CORRELATION_ID_HEADER, &TRACE_ID_HEADER]
            .into_iter()
            .filter_map(|name| request.headers().get(name))
            .filter_map(|value| value.to_str().ok())
            .map(str::trim)
            .find(|value| !value.is_empty());

        match inbound {
            Some(id) => Self(id.to_string()),
            None => Self(Uuid::new_v4().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Correlation id of the current request, if called inside one.
pub fn current_correlation_id() -> Option<String> {
    CURRENT_CORRELATION_ID
        .try_with(|id| id.0.clone())
        .ok()
}

/// Middleware that assigns the correlation id.
///
/// Add it AFTER the TraceLayer so it runs first and the span can read the
/// id from the request extensions.
pub async fn correlation_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let id = CorrelationId::from_request(&request);
    request.extensions_mut().insert(id.clone());

    let mut response = CURRENT_CORRELATION_ID
        .scope(id.clone(), next.run(request))
        .await;

    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_prefers_correlation_header() {
        let id = CorrelationId::from_request(&request(&[
            ("X-Trace-Id", "trace-1"),
            ("X-Correlation-ID", "corr-1"),
        ]));
        assert_eq!(id.as_str(), "corr-1");
    }

    #[test]
    fn test_falls_back_to_trace_header() {
        let id = CorrelationId::from_request(&request(&[("X-Trace-Id", "trace-1")]));
        assert_eq!(id.as_str(), "trace-1");
    }

    #[test]
    fn test_generates_uuid() {
        let id = CorrelationId::from_request(&request(&[("X-Correlation-ID", "  ")]));
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_current_id_outside_request() {
        assert_eq!(current_correlation_id(), None);
    }
}
