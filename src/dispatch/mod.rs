//! Translate-and-dispatch entry points.
//!
//! # Data Flow
//! ```text
//! (InvocationContext, AlbTargetGroupRequest)
//!     → RequestTranslator::translate
//!     → handler (Handler::serve or tower::Service::call)
//!         writes into a fresh ResponseCapture
//!     → ResponseCapture::finalize
//!     → AlbTargetGroupResponse
//!
//! Any failure along the way:
//!     → error logged + failure metric
//!     → AlbTargetGroupResponse::gateway_timeout()
//! ```
//!
//! # Design Decisions
//! - The host always receives a well-formed record; raw errors stop here
//! - `try_*` variants expose the error for hosts that want it
//! - One capture per invocation, never shared

pub mod service;

use std::time::Instant;

use axum::http::Request;
use axum::BoxError;
use bytes::Bytes;
use thiserror::Error;
use tracing::Span;

use crate::config::TranslatorConfig;
use crate::context::InvocationContext;
use crate::event::{AlbTargetGroupRequest, AlbTargetGroupResponse};
use crate::http::{CaptureError, RequestTranslator, ResponseCapture, ResponseWriter, TranslateError};
use crate::observability::metrics::{self, FailureStage};

pub use service::ServiceAdapter;

/// Errors that prevent an invocation from producing a response.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("could not deserialize ALB event: {0}")]
    Event(#[from] serde_json::Error),

    #[error("could not convert ALB event to request: {0}")]
    Translate(#[from] TranslateError),

    #[error("handler service failed: {0}")]
    Service(BoxError),

    #[error("could not read handler response body: {0}")]
    Body(axum::Error),

    #[error("could not replay handler response: {0}")]
    Write(#[from] std::io::Error),

    #[error("error while generating ALB response: {0}")]
    Capture(#[from] CaptureError),
}

impl AdapterError {
    fn stage(&self) -> FailureStage {
        match self {
            AdapterError::Event(_) => FailureStage::Event,
            AdapterError::Translate(_) => FailureStage::Translate,
            AdapterError::Service(_) | AdapterError::Body(_) => FailureStage::Handler,
            AdapterError::Write(_) | AdapterError::Capture(_) => FailureStage::Capture,
        }
    }
}

/// Writer-style request handling logic.
///
/// The handler populates the response synchronously through `writer`.
pub trait Handler {
    fn serve(&self, writer: &mut dyn ResponseWriter, request: Request<Bytes>);
}

impl<F> Handler for F
where
    F: Fn(&mut dyn ResponseWriter, Request<Bytes>),
{
    fn serve(&self, writer: &mut dyn ResponseWriter, request: Request<Bytes>) {
        self(writer, request)
    }
}

/// Dispatches ALB events to a writer-style [`Handler`].
pub struct Adapter<H> {
    translator: RequestTranslator,
    handler: H,
}

impl<H: Handler> Adapter<H> {
    /// Create an adapter with the default translator configuration.
    pub fn new(handler: H) -> Self {
        Self::with_config(handler, &TranslatorConfig::default())
    }

    pub fn with_config(handler: H, config: &TranslatorConfig) -> Self {
        Self {
            translator: RequestTranslator::new(config),
            handler,
        }
    }

    /// See [`RequestTranslator::strip_base_path`].
    pub fn strip_base_path(&mut self, base_path: &str) -> &str {
        self.translator.strip_base_path(base_path)
    }

    pub fn translator(&self) -> &RequestTranslator {
        &self.translator
    }

    /// Handle an event outside of a Lambda invocation.
    pub fn proxy(&self, event: &AlbTargetGroupRequest) -> AlbTargetGroupResponse {
        self.dispatch(None, event)
    }

    /// Handle an event, attaching the invocation identity to the request.
    pub fn proxy_with_context(
        &self,
        invocation: &InvocationContext,
        event: &AlbTargetGroupRequest,
    ) -> AlbTargetGroupResponse {
        self.dispatch(Some(invocation), event)
    }

    /// Handle a raw JSON payload and return the JSON response record.
    pub fn proxy_json(
        &self,
        invocation: Option<&InvocationContext>,
        payload: serde_json::Value,
    ) -> serde_json::Value {
        let start_time = Instant::now();
        let response = match serde_json::from_value::<AlbTargetGroupRequest>(payload) {
            Ok(event) => self.dispatch(invocation, &event),
            Err(e) => fallback(AdapterError::from(e), start_time),
        };
        to_json(response)
    }

    /// Like [`proxy_with_context`](Self::proxy_with_context) but returns the
    /// error instead of the fallback record.
    pub fn try_proxy_with_context(
        &self,
        invocation: Option<&InvocationContext>,
        event: &AlbTargetGroupRequest,
    ) -> Result<AlbTargetGroupResponse, AdapterError> {
        let request = self.translator.translate::<Bytes>(event, invocation)?;

        let mut capture = ResponseCapture::new();
        self.handler.serve(&mut capture, request);

        Ok(capture.finalize()?)
    }

    fn dispatch(
        &self,
        invocation: Option<&InvocationContext>,
        event: &AlbTargetGroupRequest,
    ) -> AlbTargetGroupResponse {
        let start_time = Instant::now();
        let span = invocation_span(invocation, event);
        let _enter = span.enter();

        match self.try_proxy_with_context(invocation, event) {
            Ok(response) => complete(response, start_time),
            Err(e) => fallback(e, start_time),
        }
    }
}

pub(crate) fn invocation_span(
    invocation: Option<&InvocationContext>,
    event: &AlbTargetGroupRequest,
) -> Span {
    tracing::info_span!(
        "alb_invocation",
        request_id = invocation.map(|i| i.request_id.as_str()).unwrap_or("none"),
        target_group = %event.request_context.elb.target_group_arn,
    )
}

pub(crate) fn complete(
    response: AlbTargetGroupResponse,
    start_time: Instant,
) -> AlbTargetGroupResponse {
    tracing::debug!(
        status = response.status_code,
        base64 = response.is_base64_encoded,
        "Invocation complete"
    );
    metrics::record_invocation(response.status_code, start_time);
    response
}

pub(crate) fn fallback(error: AdapterError, start_time: Instant) -> AlbTargetGroupResponse {
    let stage = error.stage();
    tracing::error!(error = %error, stage = stage.as_str(), "Returning gateway timeout");
    metrics::record_failure(stage);

    let response = AlbTargetGroupResponse::gateway_timeout();
    metrics::record_invocation(response.status_code, start_time);
    response
}

pub(crate) fn to_json(response: AlbTargetGroupResponse) -> serde_json::Value {
    serde_json::to_value(response).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Could not serialize ALB response");
        serde_json::json!({
            "statusCode": 504,
            "statusDescription": "504",
            "multiValueHeaders": {},
            "body": "",
            "isBase64Encoded": false,
        })
    })
}
