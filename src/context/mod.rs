//! Invocation metadata attached to translated requests.
//!
//! # Data Flow
//! ```text
//! Lambda invocation (request id, deadline, function identity)
//!   + AlbTargetGroupRequestContext (from the event)
//!     → RequestMetadata (private extension type)
//!     → request.extensions()
//!     → RequestExt accessors in handler code
//! ```
//!
//! # Design Decisions
//! - Stored in `http::Extensions`, keyed by a private type nobody else can name
//! - Read-only once attached: accessors hand out shared references only
//! - Invocation identity is optional; the ALB context is always attached

use std::env;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::http::Request;
use serde::{Deserialize, Serialize};

use crate::event::AlbTargetGroupRequestContext;

/// Identity of the current Lambda invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct InvocationContext {
    /// AWS request id of the invocation.
    pub request_id: String,

    /// Execution deadline in milliseconds since the Unix epoch.
    pub deadline_ms: u64,

    pub invoked_function_arn: String,

    pub xray_trace_id: Option<String>,

    pub identity: FunctionIdentity,
}

impl InvocationContext {
    pub fn new(
        request_id: impl Into<String>,
        deadline_ms: u64,
        invoked_function_arn: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            deadline_ms,
            invoked_function_arn: invoked_function_arn.into(),
            xray_trace_id: None,
            identity: FunctionIdentity::default(),
        }
    }

    pub fn with_identity(mut self, identity: FunctionIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_xray_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.xray_trace_id = Some(trace_id.into());
        self
    }

    /// The deadline as a point in time.
    pub fn deadline(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.deadline_ms)
    }

    /// Time left before the deadline, or `None` once it has passed.
    pub fn remaining_time(&self) -> Option<Duration> {
        self.deadline().duration_since(SystemTime::now()).ok()
    }
}

/// Static identity of the deployed function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FunctionIdentity {
    pub function_name: String,
    pub function_version: String,
    pub memory_limit_mb: u32,
    pub log_group_name: String,
    pub log_stream_name: String,
}

impl FunctionIdentity {
    /// Read the identity the Lambda runtime exports into the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            function_name: lookup("AWS_LAMBDA_FUNCTION_NAME").unwrap_or_default(),
            function_version: lookup("AWS_LAMBDA_FUNCTION_VERSION").unwrap_or_default(),
            memory_limit_mb: lookup("AWS_LAMBDA_FUNCTION_MEMORY_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            log_group_name: lookup("AWS_LAMBDA_LOG_GROUP_NAME").unwrap_or_default(),
            log_stream_name: lookup("AWS_LAMBDA_LOG_STREAM_NAME").unwrap_or_default(),
        }
    }
}

/// Extension value carrying both halves of the metadata.
///
/// The type is private to the crate, so the extension slot cannot be read,
/// replaced, or shadowed by unrelated code sharing the request.
#[derive(Debug, Clone)]
pub(crate) struct RequestMetadata {
    pub(crate) invocation: Option<InvocationContext>,
    pub(crate) alb: AlbTargetGroupRequestContext,
}

impl RequestMetadata {
    pub(crate) fn attach<B>(self, request: &mut Request<B>) {
        request.extensions_mut().insert(self);
    }
}

/// Accessors for metadata attached during translation.
pub trait RequestExt {
    /// Identity of the invocation that produced this request, if known.
    fn invocation_context(&self) -> Option<&InvocationContext>;

    /// The ALB request context of the originating event.
    fn alb_context(&self) -> Option<&AlbTargetGroupRequestContext>;
}

impl<B> RequestExt for Request<B> {
    fn invocation_context(&self) -> Option<&InvocationContext> {
        self.extensions()
            .get::<RequestMetadata>()
            .and_then(|m| m.invocation.as_ref())
    }

    fn alb_context(&self) -> Option<&AlbTargetGroupRequestContext> {
        self.extensions().get::<RequestMetadata>().map(|m| &m.alb)
    }
}
