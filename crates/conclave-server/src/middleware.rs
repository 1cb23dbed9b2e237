use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use uuid::Uuid;

/// Extract the trace id from an `X-Cloud-Trace-Context` header.
/// Header format: TRACE_ID/SPAN_ID;o=TRACE_TRUE
pub fn parse_cloud_trace_context(value: &str) -> Option<&str> {
    let trace = value.split('/').next()?.trim();
    if trace.is_empty() {
        None
    } else {
        Some(trace)
    }
}

/// Request-context middleware: pick or mint a request id, emit one access
/// log line per request, and echo the id back so clients can correlate.
pub async fn request_context(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let trace_id = req
        .headers()
        .get("x-cloud-trace-context")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cloud_trace_context)
        .map(|s| s.to_string());
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .or_else(|| trace_id.clone())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status_code = response.status().as_u16(),
        duration_ms,
        "request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().entry("x-request-id").or_insert(value);
    }
    if let Some(trace) = trace_id {
        if let Ok(value) = HeaderValue::from_str(&trace) {
            response.headers_mut().entry("x-trace-id").or_insert(value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cloud_trace_header() {
        assert_eq!(
            parse_cloud_trace_context("105445aa7843bc8bf206b12000100000/1;o=1"),
            Some("105445aa7843bc8bf206b12000100000")
        );
        assert_eq!(parse_cloud_trace_context("abc"), Some("abc"));
        assert_eq!(parse_cloud_trace_context(""), None);
        assert_eq!(parse_cloud_trace_context("/1;o=1"), None);
    }
}
