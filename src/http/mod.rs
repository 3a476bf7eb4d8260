//! HTTP translation subsystem.
//!
//! # Data Flow
//! ```text
//! AlbTargetGroupRequest
//!     → request.rs (decode body, strip base path, resolve URL, copy headers)
//!     → query.rs (encode query parameters)
//!     → http::Request<B> + RequestMetadata extension
//!     → [handler writes through ResponseWriter]
//!     → response.rs (status default, sniff.rs content type, buffer body)
//!     → AlbTargetGroupResponse
//! ```

pub mod query;
pub mod request;
pub mod response;
pub mod sniff;

pub use request::{RequestTranslator, TranslateError};
pub use response::{CaptureError, ResponseCapture, ResponseWriter};
pub use sniff::detect_content_type;
