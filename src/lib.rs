//! ALB target-group events as ordinary HTTP requests.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                  ALB HTTP ADAPTER                 │
//!                      │                                                   │
//!   Lambda runtime     │  ┌─────────┐    ┌─────────────┐    ┌───────────┐  │
//!   ───────────────────┼─▶│  event  │───▶│    http     │───▶│  handler  │  │
//!   (context, event)   │  │ (serde) │    │ translator  │    │ (yours)   │  │
//!                      │  └─────────┘    └─────────────┘    └─────┬─────┘  │
//!                      │                        ▲                 │        │
//!                      │                 ┌──────┴──────┐          ▼        │
//!                      │                 │   context   │   ┌────────────┐  │
//!                      │                 │ (extension) │   │  response  │  │
//!                      │                 └─────────────┘   │  capture   │  │
//!   ALB response       │  ┌──────────┐                     └─────┬──────┘  │
//!   ◀──────────────────┼──│ dispatch │◀──────────────────────────┘         │
//!                      │  │ fail-safe│                                      │
//!                      │  └──────────┘                                      │
//!                      └──────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`event`]: wire types exchanged with the load balancer
//! - [`http`]: request translation and response capture
//! - [`context`]: invocation identity carried on translated requests
//! - [`dispatch`]: entry points that never leak an error to the host
//! - [`config`]: TOML and environment configuration
//! - [`observability`]: logging and metrics

pub mod config;
pub mod context;
pub mod dispatch;
pub mod event;
pub mod http;
pub mod observability;

pub use config::AdapterConfig;
pub use context::{InvocationContext, RequestExt};
pub use dispatch::{Adapter, AdapterError, Handler, ServiceAdapter};
pub use event::{AlbTargetGroupRequest, AlbTargetGroupResponse};
pub use http::{RequestTranslator, ResponseCapture, ResponseWriter};
