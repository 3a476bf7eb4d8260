//! ALB event to HTTP request translation.
//!
//! # Responsibilities
//! - Decode base64 bodies
//! - Strip the configured base path and resolve an absolute URL
//! - Encode query parameters (multi-value first, single-value fallback)
//! - Copy headers and attach invocation metadata as a request extension
//!
//! # Design Decisions
//! - Translation is pure: no I/O, no environment reads, no retries
//! - The inbound event is borrowed and never modified
//! - Headers that cannot be represented are dropped with a warning

use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{HeaderMap, Method, Request, Uri};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use bytes::Bytes;
use thiserror::Error;

use crate::config::TranslatorConfig;
use crate::context::{InvocationContext, RequestMetadata};
use crate::event::AlbTargetGroupRequest;
use crate::http::query::encode_query;

/// Errors raised while translating an event into a request.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The body was flagged as base64 but did not decode.
    #[error("could not decode base64 body: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),

    #[error("could not build request URI {uri:?}: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },
}

/// Translates ALB events into HTTP requests.
#[derive(Debug, Clone)]
pub struct RequestTranslator {
    virtual_host: String,
    strip_base_path: Option<String>,
}

impl Default for RequestTranslator {
    fn default() -> Self {
        Self::new(&TranslatorConfig::default())
    }
}

impl RequestTranslator {
    /// Create a translator from explicit configuration.
    pub fn new(config: &TranslatorConfig) -> Self {
        let mut translator = Self {
            virtual_host: config.resolved_virtual_host(),
            strip_base_path: None,
        };
        if let Some(base) = &config.strip_base_path {
            translator.strip_base_path(base);
        }
        translator
    }

    /// Origin prepended to every translated path.
    pub fn virtual_host(&self) -> &str {
        &self.virtual_host
    }

    /// Remove `base_path` from the front of every subsequent request path.
    ///
    /// The prefix is normalized to a leading slash and no trailing slash.
    /// A blank value clears the setting. Returns the stored prefix.
    pub fn strip_base_path(&mut self, base_path: &str) -> &str {
        let trimmed = base_path.trim_matches(' ');
        if trimmed.is_empty() {
            self.strip_base_path = None;
            return "";
        }

        let mut normalized = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        if normalized.ends_with('/') {
            normalized.pop();
        }

        self.strip_base_path = (!normalized.is_empty()).then_some(normalized);
        self.base_path()
    }

    /// The currently configured base path, empty when none.
    pub fn base_path(&self) -> &str {
        self.strip_base_path.as_deref().unwrap_or("")
    }

    /// Translate `event` into a request.
    ///
    /// The ALB request context is always attached; the invocation identity
    /// only when `invocation` is given. `B` is typically `axum::body::Body`
    /// for services or `Bytes` for writer-style handlers.
    pub fn translate<B>(
        &self,
        event: &AlbTargetGroupRequest,
        invocation: Option<&InvocationContext>,
    ) -> Result<Request<B>, TranslateError>
    where
        B: From<Bytes>,
    {
        let body = decode_body(event)?;
        let path = self.normalize_path(&event.path);

        let mut uri = format!("{}{}", self.virtual_host, path);
        if let Some(query) = encode_query(event) {
            uri.push('?');
            uri.push_str(&query);
        }

        let method = parse_method(&event.http_method)?;
        let uri = Uri::try_from(uri.as_str()).map_err(|source| TranslateError::InvalidUri {
            uri: uri.clone(),
            source,
        })?;

        tracing::debug!(
            method = %method,
            path = %event.path,
            uri = %uri,
            base64 = event.is_base64_encoded,
            "Translating ALB event"
        );

        let mut request = Request::new(B::from(body));
        *request.method_mut() = method;
        *request.uri_mut() = uri;
        copy_headers(event, request.headers_mut());

        RequestMetadata {
            invocation: invocation.cloned(),
            alb: event.request_context.clone(),
        }
        .attach(&mut request);

        Ok(request)
    }

    fn normalize_path(&self, path: &str) -> String {
        let stripped = match self.strip_base_path.as_deref() {
            Some(base) if base.len() > 1 && path.starts_with(base) => &path[base.len()..],
            _ => path,
        };

        if stripped.starts_with('/') {
            stripped.to_string()
        } else {
            format!("/{stripped}")
        }
    }
}

/// Standard alphabet with required padding, tolerant of non-zero trailing bits.
const BODY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

fn decode_body(event: &AlbTargetGroupRequest) -> Result<Bytes, TranslateError> {
    if event.is_base64_encoded {
        // Line breaks inside the payload are ignored.
        let compact: Vec<u8> = event
            .body
            .bytes()
            .filter(|&b| b != b'\r' && b != b'\n')
            .collect();
        Ok(Bytes::from(BODY_ENGINE.decode(compact)?))
    } else {
        Ok(Bytes::from(event.body.clone()))
    }
}

fn parse_method(method: &str) -> Result<Method, TranslateError> {
    if method.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| TranslateError::InvalidMethod(method.to_string()))
}

fn copy_headers(event: &AlbTargetGroupRequest, headers: &mut HeaderMap) {
    if !event.multi_value_headers.is_empty() {
        for (name, values) in &event.multi_value_headers {
            for value in values {
                append_header(headers, name, value);
            }
        }
    } else {
        for (name, value) in &event.headers {
            append_header(headers, name, value);
        }
    }
}

fn append_header(headers: &mut HeaderMap, name: &str, value: &str) {
    match (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(value)) => {
            headers.append(name, value);
        }
        _ => {
            tracing::warn!(header = %name, "Dropping header that is not valid HTTP");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_VIRTUAL_HOST;
    use crate::context::RequestExt;
    use crate::event::{AlbTargetGroupRequestContext, ElbContext};

    fn get(path: &str) -> AlbTargetGroupRequest {
        AlbTargetGroupRequest {
            http_method: "GET".into(),
            path: path.into(),
            ..Default::default()
        }
    }

    fn translate(translator: &RequestTranslator, event: &AlbTargetGroupRequest) -> Request<Bytes> {
        translator.translate(event, None).unwrap()
    }

    #[test]
    fn test_strip_base_path_normalization() {
        let mut translator = RequestTranslator::default();
        assert_eq!(translator.strip_base_path("api"), "/api");
        assert_eq!(translator.strip_base_path("/api/"), "/api");
        assert_eq!(translator.strip_base_path("  /v1  "), "/v1");
        assert_eq!(translator.strip_base_path("   "), "");
        assert_eq!(translator.base_path(), "");
        assert_eq!(translator.strip_base_path("/"), "");
    }

    #[test]
    fn test_strip_base_path_applied() {
        let mut translator = RequestTranslator::default();
        translator.strip_base_path("/api");

        let req = translate(&translator, &get("/api/users"));
        assert_eq!(req.uri().path(), "/users");

        let req = translate(&translator, &get("/api"));
        assert_eq!(req.uri().path(), "/");

        let req = translate(&translator, &get("/other/api/users"));
        assert_eq!(req.uri().path(), "/other/api/users");
    }

    #[test]
    fn test_clearing_base_path() {
        let mut translator = RequestTranslator::default();
        translator.strip_base_path("/api");
        translator.strip_base_path("");

        let req = translate(&translator, &get("/api/users"));
        assert_eq!(req.uri().path(), "/api/users");
    }

    #[test]
    fn test_base_path_from_config() {
        let translator = RequestTranslator::new(&TranslatorConfig {
            virtual_host: None,
            strip_base_path: Some("stage/".into()),
        });
        assert_eq!(translator.base_path(), "/stage");
    }

    #[test]
    fn test_default_virtual_host() {
        let translator = RequestTranslator::default();
        let req = translate(&translator, &get("/users"));
        assert_eq!(req.uri().to_string(), format!("{DEFAULT_VIRTUAL_HOST}/users"));
        assert_eq!(req.uri().host(), Some("aws-serverless-rust-api.com"));
        assert_eq!(req.uri().scheme_str(), Some("https"));
    }

    #[test]
    fn test_custom_virtual_host() {
        let translator = RequestTranslator::new(&TranslatorConfig {
            virtual_host: Some("http://localhost:3000/".into()),
            strip_base_path: None,
        });
        let req = translate(&translator, &get("users"));
        assert_eq!(req.uri().to_string(), "http://localhost:3000/users");
    }

    #[test]
    fn test_method_uppercased() {
        let mut event = get("/");
        event.http_method = "patch".into();
        let req = translate(&RequestTranslator::default(), &event);
        assert_eq!(*req.method(), Method::PATCH);

        event.http_method = String::new();
        let req = translate(&RequestTranslator::default(), &event);
        assert_eq!(*req.method(), Method::GET);
    }

    #[test]
    fn test_invalid_method() {
        let mut event = get("/");
        event.http_method = "GE T".into();
        let err = RequestTranslator::default()
            .translate::<Bytes>(&event, None)
            .unwrap_err();
        assert!(matches!(err, TranslateError::InvalidMethod(_)));
    }

    #[test]
    fn test_invalid_uri() {
        let event = get("/has space");
        let err = RequestTranslator::default()
            .translate::<Bytes>(&event, None)
            .unwrap_err();
        assert!(matches!(err, TranslateError::InvalidUri { .. }));
    }

    #[test]
    fn test_query_string_appended() {
        let mut event = get("/search");
        event
            .multi_value_query_string_parameters
            .insert("a".into(), vec!["1".into(), "2".into()]);
        event.query_string_parameters.insert("a".into(), "x".into());

        let req = translate(&RequestTranslator::default(), &event);
        assert_eq!(req.uri().query(), Some("a=1&a=2"));
    }

    #[test]
    fn test_base64_body_decoded() {
        let mut event = get("/");
        event.http_method = "POST".into();
        event.body = "aGVsbG8=".into();
        event.is_base64_encoded = true;

        let req = translate(&RequestTranslator::default(), &event);
        assert_eq!(req.body().as_ref(), b"hello");
    }

    #[test]
    fn test_base64_body_lenient_decoding() {
        let mut event = get("/");
        event.http_method = "POST".into();
        event.is_base64_encoded = true;

        event.body = "aGVs\r\nbG8=".into();
        let req = translate(&RequestTranslator::default(), &event);
        assert_eq!(req.body().as_ref(), b"hello");

        event.body = "QR==".into();
        let req = translate(&RequestTranslator::default(), &event);
        assert_eq!(req.body().as_ref(), b"A");
    }

    #[test]
    fn test_plain_body_kept() {
        let mut event = get("/");
        event.body = "aGVsbG8=".into();

        let req = translate(&RequestTranslator::default(), &event);
        assert_eq!(req.body().as_ref(), b"aGVsbG8=");
    }

    #[test]
    fn test_malformed_base64_fails() {
        let mut event = get("/");
        event.body = "not base64!".into();
        event.is_base64_encoded = true;

        let err = RequestTranslator::default()
            .translate::<Bytes>(&event, None)
            .unwrap_err();
        assert!(matches!(err, TranslateError::Decode(_)));
    }

    #[test]
    fn test_headers_copied() {
        let mut event = get("/");
        event.headers.insert("Accept".into(), "text/html".into());
        event.headers.insert("X-Forwarded-For".into(), "10.0.0.1".into());

        let req = translate(&RequestTranslator::default(), &event);
        assert_eq!(req.headers()["accept"], "text/html");
        assert_eq!(req.headers()["x-forwarded-for"], "10.0.0.1");
    }

    #[test]
    fn test_multi_value_headers_take_precedence() {
        let mut event = get("/");
        event.headers.insert("cookie".into(), "ignored=1".into());
        event
            .multi_value_headers
            .insert("cookie".into(), vec!["a=1".into(), "b=2".into()]);

        let req = translate(&RequestTranslator::default(), &event);
        let cookies: Vec<_> = req.headers().get_all("cookie").iter().collect();
        assert_eq!(cookies, ["a=1", "b=2"]);
    }

    #[test]
    fn test_invalid_header_dropped() {
        let mut event = get("/");
        event.headers.insert("bad header".into(), "x".into());
        event.headers.insert("good".into(), "y".into());

        let req = translate(&RequestTranslator::default(), &event);
        assert_eq!(req.headers().len(), 1);
        assert_eq!(req.headers()["good"], "y");
    }

    #[test]
    fn test_metadata_attached() {
        let mut event = get("/");
        event.request_context = AlbTargetGroupRequestContext {
            elb: ElbContext {
                target_group_arn: "arn:tg".into(),
            },
        };
        let invocation = InvocationContext::new("req-42", 1_700_000_000_000, "arn:fn");

        let req: Request<Bytes> = RequestTranslator::default()
            .translate(&event, Some(&invocation))
            .unwrap();
        assert_eq!(req.invocation_context(), Some(&invocation));
        assert_eq!(req.alb_context().unwrap().elb.target_group_arn, "arn:tg");

        let req = translate(&RequestTranslator::default(), &event);
        assert!(req.invocation_context().is_none());
        assert!(req.alb_context().is_some());
    }
}
