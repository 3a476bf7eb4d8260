//! Shared utilities for integration tests.

use std::path::PathBuf;

use alb_http_adapter::{AlbTargetGroupRequest, InvocationContext, ResponseWriter};
use axum::http::Request;
use bytes::Bytes;

/// Load a JSON fixture from `tests/fixtures` as a raw value.
pub fn load_fixture_json(name: &str) -> serde_json::Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let raw = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
    serde_json::from_str(&raw).unwrap()
}

/// Load an ALB event fixture from `tests/fixtures`.
pub fn load_event(name: &str) -> AlbTargetGroupRequest {
    serde_json::from_value(load_fixture_json(name)).unwrap()
}

/// An invocation context whose deadline is far in the future.
#[allow(dead_code)]
pub fn invocation(request_id: &str) -> InvocationContext {
    InvocationContext::new(
        request_id,
        u64::MAX / 2,
        "arn:aws:lambda:us-east-1:123456789012:function:alb-adapter-test",
    )
}

/// Writer-style handler that mirrors the request back.
///
/// Request headers are copied, the method and URI are reported through
/// `x-echo-method` and `x-echo-uri`, and the body is written unchanged.
#[allow(dead_code)]
pub fn echo(writer: &mut dyn ResponseWriter, request: Request<Bytes>) {
    let headers = writer.headers_mut();
    for (name, value) in request.headers() {
        headers.append(name, value.clone());
    }
    headers.insert("x-echo-method", request.method().as_str().parse().unwrap());
    headers.insert("x-echo-uri", request.uri().to_string().parse().unwrap());
    writer.write_body(request.body()).unwrap();
}
