//! Query string encoding for translated requests.
//!
//! # Design Decisions
//! - Multi-value parameters win whenever present; they are the superset form
//! - Single-value parameters are only consulted for backward compatibility
//! - `application/x-www-form-urlencoded` escaping, keys in sorted order

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::event::AlbTargetGroupRequest;

/// Encode the event's query parameters, or `None` when there is nothing to encode.
pub fn encode_query(event: &AlbTargetGroupRequest) -> Option<String> {
    let encoded = if !event.multi_value_query_string_parameters.is_empty() {
        encode_multi_value(&event.multi_value_query_string_parameters)
    } else {
        encode_single_value(&event.query_string_parameters)
    };

    (!encoded.is_empty()).then_some(encoded)
}

fn encode_multi_value(params: &BTreeMap<String, Vec<String>>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, values) in params {
        for value in values {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

fn encode_single_value(params: &BTreeMap<String, String>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}
