//! Dispatch to `tower::Service` handlers such as an `axum::Router`.
//!
//! # Responsibilities
//! - Drive the service once per invocation
//! - Replay its status, headers and body through [`ResponseWriter`]
//! - Apply the same fail-safe as the writer-style [`Adapter`](super::Adapter)

use std::time::Instant;

use axum::body::{Body, HttpBody};
use axum::http::response::Parts;
use axum::http::{Request, Response};
use axum::BoxError;
use bytes::Bytes;
use tower::{Service, ServiceExt};
use tracing::Instrument;

use super::{complete, fallback, invocation_span, to_json, AdapterError};
use crate::config::TranslatorConfig;
use crate::context::InvocationContext;
use crate::event::{AlbTargetGroupRequest, AlbTargetGroupResponse};
use crate::http::{RequestTranslator, ResponseCapture, ResponseWriter};

/// Dispatches ALB events to a cloneable `tower::Service`.
#[derive(Debug, Clone)]
pub struct ServiceAdapter<S> {
    translator: RequestTranslator,
    service: S,
}

impl<S, B> ServiceAdapter<S>
where
    S: Service<Request<Body>, Response = Response<B>> + Clone,
    S::Error: Into<BoxError>,
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    pub fn new(service: S) -> Self {
        Self::with_config(service, &TranslatorConfig::default())
    }

    pub fn with_config(service: S, config: &TranslatorConfig) -> Self {
        Self {
            translator: RequestTranslator::new(config),
            service,
        }
    }

    /// See [`RequestTranslator::strip_base_path`].
    pub fn strip_base_path(&mut self, base_path: &str) -> &str {
        self.translator.strip_base_path(base_path)
    }

    pub fn translator(&self) -> &RequestTranslator {
        &self.translator
    }

    pub async fn proxy(&self, event: &AlbTargetGroupRequest) -> AlbTargetGroupResponse {
        self.dispatch(None, event).await
    }

    pub async fn proxy_with_context(
        &self,
        invocation: &InvocationContext,
        event: &AlbTargetGroupRequest,
    ) -> AlbTargetGroupResponse {
        self.dispatch(Some(invocation), event).await
    }

    pub async fn proxy_json(
        &self,
        invocation: Option<&InvocationContext>,
        payload: serde_json::Value,
    ) -> serde_json::Value {
        let start_time = Instant::now();
        let response = match serde_json::from_value::<AlbTargetGroupRequest>(payload) {
            Ok(event) => self.dispatch(invocation, &event).await,
            Err(e) => fallback(AdapterError::from(e), start_time),
        };
        to_json(response)
    }

    pub async fn try_proxy_with_context(
        &self,
        invocation: Option<&InvocationContext>,
        event: &AlbTargetGroupRequest,
    ) -> Result<AlbTargetGroupResponse, AdapterError> {
        let request = self.translator.translate::<Body>(event, invocation)?;

        let response = self
            .service
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| AdapterError::Service(e.into()))?;

        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), usize::MAX)
            .await
            .map_err(AdapterError::Body)?;

        let mut capture = ResponseCapture::new();
        replay(&mut capture, &parts, &body)?;
        Ok(capture.finalize()?)
    }

    async fn dispatch(
        &self,
        invocation: Option<&InvocationContext>,
        event: &AlbTargetGroupRequest,
    ) -> AlbTargetGroupResponse {
        let start_time = Instant::now();
        let span = invocation_span(invocation, event);

        async {
            match self.try_proxy_with_context(invocation, event).await {
                Ok(response) => complete(response, start_time),
                Err(e) => fallback(e, start_time),
            }
        }
        .instrument(span)
        .await
    }
}

/// Status first, so the body write does not imply 200.
fn replay(writer: &mut dyn ResponseWriter, parts: &Parts, body: &[u8]) -> Result<(), AdapterError> {
    for (name, value) in &parts.headers {
        writer.headers_mut().append(name, value.clone());
    }
    writer.set_status(parts.status);
    if !body.is_empty() {
        writer.write_body(body)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{header, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::convert::Infallible;

    fn event(method: &str, path: &str) -> AlbTargetGroupRequest {
        AlbTargetGroupRequest {
            http_method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    fn app() -> Router {
        Router::new()
            .route("/users/{id}", get(|Path(id): Path<String>| async move { format!("user {id}") }))
            .route(
                "/echo",
                post(|body: Bytes| async move { (StatusCode::CREATED, body) }),
            )
            .route(
                "/json",
                get(|| async { Json(serde_json::json!({"ok": true})) }),
            )
    }

    #[tokio::test]
    async fn test_router_dispatch() {
        let adapter = ServiceAdapter::new(app());

        let response = adapter.proxy(&event("GET", "/users/42")).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "user 42");
        assert_eq!(
            response.multi_value_headers["content-type"],
            vec!["text/plain; charset=utf-8"]
        );
    }

    #[tokio::test]
    async fn test_router_status_and_body() {
        let adapter = ServiceAdapter::new(app());
        let mut event = event("POST", "/echo");
        event.body = "payload".into();

        let response = adapter.proxy(&event).await;
        assert_eq!(response.status_code, 201);
        assert_eq!(response.status_description, "201");
        assert_eq!(response.body, "payload");
    }

    #[tokio::test]
    async fn test_router_json() {
        let adapter = ServiceAdapter::new(app());

        let response = adapter.proxy(&event("GET", "/json")).await;
        assert_eq!(response.body, r#"{"ok":true}"#);
        assert_eq!(
            response.multi_value_headers["content-type"],
            vec!["application/json"]
        );
    }

    #[tokio::test]
    async fn test_router_not_found() {
        let adapter = ServiceAdapter::new(app());

        let response = adapter.proxy(&event("GET", "/missing")).await;
        assert_eq!(response.status_code, 404);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_base_path_stripped_before_routing() {
        let mut adapter = ServiceAdapter::new(app());
        adapter.strip_base_path("/v1");

        let response = adapter.proxy(&event("GET", "/v1/users/7")).await;
        assert_eq!(response.body, "user 7");
    }

    #[tokio::test]
    async fn test_service_error_yields_gateway_timeout() {
        let failing = tower::service_fn(|_: Request<Body>| async {
            Err::<Response<Body>, _>(std::io::Error::other("backend down"))
        });
        let adapter = ServiceAdapter::new(failing);

        let response = adapter.proxy(&event("GET", "/")).await;
        assert_eq!(response, AlbTargetGroupResponse::gateway_timeout());

        let err = adapter
            .try_proxy_with_context(None, &event("GET", "/"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Service(_)));
    }

    #[tokio::test]
    async fn test_headers_replayed() {
        let service = tower::service_fn(|_: Request<Body>| async {
            let response = Response::builder()
                .status(StatusCode::FOUND)
                .header(header::LOCATION, "/login")
                .header(header::SET_COOKIE, "a=1")
                .header(header::SET_COOKIE, "b=2")
                .body(Body::empty())
                .unwrap();
            Ok::<_, Infallible>(response)
        });
        let adapter = ServiceAdapter::new(service);

        let response = adapter.proxy(&event("GET", "/")).await;
        assert_eq!(response.status_code, 302);
        assert_eq!(response.multi_value_headers["location"], vec!["/login"]);
        assert_eq!(response.multi_value_headers["set-cookie"], vec!["a=1", "b=2"]);
        assert!(!response.multi_value_headers.contains_key("content-type"));
    }
}
