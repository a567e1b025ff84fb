//! One module per endpoint group, each a set of free functions over the
//! shared [`QuipClient`](crate::client::QuipClient).

pub mod blobs;
pub mod folders;
pub mod messages;
pub mod oauth;
pub mod threads;
pub mod users;

use serde_json::{json, Value};

/// Optional string parameter, absent when `None`.
pub(crate) fn opt_str(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| json!(v))
}

/// Optional numeric parameter, absent when `None`.
pub(crate) fn opt_u64(value: Option<u64>) -> Value {
    value.map_or(Value::Null, |v| json!(v))
}

/// Comma-joined id list, absent when empty.
pub(crate) fn join_ids(ids: &[&str]) -> Value {
    json!(ids.join(","))
}
