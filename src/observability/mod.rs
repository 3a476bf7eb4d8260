//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch / http subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and histograms via the `metrics` facade)
//!
//! Consumers:
//!     → CloudWatch Logs (stdout, plain or JSON lines)
//!     → Whatever metrics recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Every invocation runs inside an `alb_invocation` span
//! - No recorder is installed here; without one metric calls are no-ops

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
