//! ALB target group event records.
//!
//! # Data Flow
//! ```text
//! ALB → Lambda target
//!     → AlbTargetGroupRequest (JSON, deserialized here)
//!     → http::request (translated into an HTTP request)
//!     ...
//!     → http::response (captured handler output)
//!     → AlbTargetGroupResponse (JSON, serialized here)
//!     → ALB
//! ```
//!
//! # Design Decisions
//! - Field names follow the ALB wire format (camelCase)
//! - `null` maps, strings and bodies deserialize to empty values
//! - Query maps are sorted so encoded query strings are deterministic

use std::collections::{BTreeMap, HashMap};

use axum::http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};

/// Inbound event delivered by an ALB to a Lambda target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbTargetGroupRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub http_method: String,

    #[serde(default, deserialize_with = "nullable")]
    pub path: String,

    /// Single-value headers (multi-value headers disabled on the target group).
    #[serde(default, deserialize_with = "nullable")]
    pub headers: HashMap<String, String>,

    /// Multi-value headers (multi-value headers enabled on the target group).
    #[serde(default, deserialize_with = "nullable")]
    pub multi_value_headers: HashMap<String, Vec<String>>,

    #[serde(default, deserialize_with = "nullable")]
    pub query_string_parameters: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "nullable")]
    pub multi_value_query_string_parameters: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub request_context: AlbTargetGroupRequestContext,

    #[serde(default)]
    pub is_base64_encoded: bool,

    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
}

/// Request context attached to every ALB event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbTargetGroupRequestContext {
    #[serde(default)]
    pub elb: ElbContext,
}

/// Identifies the target group that routed the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElbContext {
    #[serde(default, deserialize_with = "nullable")]
    pub target_group_arn: String,
}

/// Outbound record returned to the ALB.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbTargetGroupResponse {
    pub status_code: u16,
    pub status_description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl AlbTargetGroupResponse {
    /// Fixed record returned whenever the adapter itself fails.
    pub fn gateway_timeout() -> Self {
        let status = StatusCode::GATEWAY_TIMEOUT;
        Self {
            status_code: status.as_u16(),
            status_description: status_description(status),
            ..Self::default()
        }
    }
}

/// Status description as carried in ALB responses: the bare decimal code.
pub fn status_description(status: StatusCode) -> String {
    status.as_u16().to_string()
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
