//! Response capture and conversion to ALB records.
//!
//! # Responsibilities
//! - Accept handler output through the [`ResponseWriter`] contract
//! - Default the status to 200 on the first body write
//! - Sniff a Content-Type when the handler did not set one
//! - Materialize an [`AlbTargetGroupResponse`]
//!
//! # Design Decisions
//! - "Status unset" is `None`, never a magic number
//! - `finalize` consumes the capture, so nothing can be written afterwards
//! - Bodies that are valid UTF-8 go out as text, everything else as base64

use std::collections::HashMap;
use std::io;

use axum::http::header::{HeaderValue, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::{BufMut, BytesMut};
use thiserror::Error;

use crate::event::{status_description, AlbTargetGroupResponse};
use crate::http::sniff::detect_content_type;

/// Errors raised while finalizing a captured response.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The handler neither wrote a body nor set a status.
    #[error("status code not set on response")]
    StatusNotSet,
}

/// The contract handlers write their response through.
pub trait ResponseWriter {
    /// Live, mutable response headers.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Append `buf` to the body, returning the number of bytes written.
    ///
    /// The first write implies `200 OK` unless a status was set before.
    fn write_body(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Set the response status. Should be called before writing the body.
    fn set_status(&mut self, status: StatusCode);
}

/// In-memory [`ResponseWriter`] for a single invocation.
#[derive(Debug, Default)]
pub struct ResponseCapture {
    headers: HeaderMap,
    body: BytesMut,
    status: Option<StatusCode>,
}

impl ResponseCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// The status set so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Convert the captured output into an ALB response record.
    pub fn finalize(self) -> Result<AlbTargetGroupResponse, CaptureError> {
        let status = self.status.ok_or(CaptureError::StatusNotSet)?;

        let (body, is_base64_encoded) = match std::str::from_utf8(&self.body) {
            Ok(text) => (text.to_string(), false),
            Err(_) => (STANDARD.encode(&self.body), true),
        };

        Ok(AlbTargetGroupResponse {
            status_code: status.as_u16(),
            status_description: status_description(status),
            multi_value_headers: multi_value_headers(&self.headers),
            body,
            is_base64_encoded,
        })
    }
}

impl ResponseWriter for ResponseCapture {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_body(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }

        if !self.headers.contains_key(CONTENT_TYPE) {
            let sniffed = detect_content_type(buf);
            self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(sniffed));
        }

        self.body.put_slice(buf);
        Ok(buf.len())
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }
}

impl io::Write for ResponseCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_body(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn multi_value_headers(headers: &HeaderMap) -> HashMap<String, Vec<String>> {
    let mut out: HashMap<String, Vec<String>> = HashMap::with_capacity(headers.keys_len());
    for (name, value) in headers {
        out.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    out
}
