//! Metrics collection.
//!
//! # Metrics
//! - `alb_adapter_invocations_total` (counter): invocations by response status
//! - `alb_adapter_invocation_duration_seconds` (histogram): time spent per invocation
//! - `alb_adapter_failures_total` (counter): adapter failures by stage

use std::time::Instant;

/// Stage at which the adapter gave up and substituted the fallback record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Event,
    Translate,
    Handler,
    Capture,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::Event => "event",
            FailureStage::Translate => "translate",
            FailureStage::Handler => "handler",
            FailureStage::Capture => "capture",
        }
    }
}

/// Record a completed invocation.
pub fn record_invocation(status: u16, start_time: Instant) {
    metrics::counter!("alb_adapter_invocations_total", "status" => status.to_string())
        .increment(1);
    metrics::histogram!("alb_adapter_invocation_duration_seconds")
        .record(start_time.elapsed().as_secs_f64());
}

/// Record an adapter failure.
pub fn record_failure(stage: FailureStage) {
    metrics::counter!("alb_adapter_failures_total", "stage" => stage.as_str()).increment(1);
}
