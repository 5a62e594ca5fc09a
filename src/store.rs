// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Key/value store with session partitions
//!
//! A stored value is either a plain JSON value or a session-partitioned
//! object: `{ "magic_session": true, "<session>": <value>, ... }`. The marker
//! field, once present, is preserved across writes and deletions of
//! individual sessions. Hosts whose persistence primitive only takes strings
//! get booleans and numbers stringified and objects serialized before
//! storage; reads JSON-decode textual values back, so both shapes round-trip.

use std::sync::Arc;

use serde_json::{Map, Number, Value};

use crate::env::Environment;
use crate::host::Host;
use crate::logger::Logger;

/// Marker field flagging a stored value as session-partitioned
pub const SESSION_MARKER: &str = "magic_session";

/// Equality predicate used by [`Store::update_full`]
pub type Comparator = dyn Fn(&Value, &Value) -> bool;

/// Comparator used when none is supplied: object-valued new values never
/// compare equal, scalars compare by value.
pub fn default_comparator(old: &Value, new: &Value) -> bool {
    if new.is_object() {
        false
    } else {
        old == new
    }
}

/// Coerce the raw value into something usable as an object: textual values
/// parse, anything that is not an object becomes empty.
pub fn convert_to_object(value: Value) -> Map<String, Value> {
    match value {
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Literal "true"/"false" strings coerce to booleans
fn coerce_type(value: Value) -> Value {
    match value {
        Value::String(s) if s == "true" => Value::Bool(true),
        Value::String(s) if s == "false" => Value::Bool(false),
        other => other,
    }
}

/// Key/value store bound to a host adapter
#[derive(Clone)]
pub struct Store {
    env: Environment,
    logger: Logger,
    host: Arc<dyn Host>,
}

impl Store {
    /// Create a store for the detected environment
    pub fn new(env: Environment, logger: Logger, host: Arc<dyn Host>) -> Self {
        Self { env, logger, host }
    }

    /// Read a key, `Value::Null` when absent
    pub fn read(&self, key: &str) -> Value {
        self.read_full(key, None, None, false)
    }

    /// Read a key, substituting `default` when absent
    pub fn read_or(&self, key: &str, default: Value) -> Value {
        self.read_full(key, Some(default), None, false)
    }

    /// Read one session's sub-value; `Value::Null` when the key is missing or
    /// not session-partitioned
    pub fn read_session(&self, key: &str, session: &str) -> Value {
        self.read_full(key, None, Some(session), false)
    }

    /// Read one session's sub-value with a default
    pub fn read_session_or(&self, key: &str, session: &str, default: Value) -> Value {
        self.read_full(key, Some(default), Some(session), false)
    }

    /// Full read: fetch the raw stored value, JSON-decode textual forms,
    /// extract the session sub-value when asked, substitute the default when
    /// the result is null, and coerce "true"/"false" strings to booleans.
    ///
    /// Unless `include_unpartitioned` is set, a session-partitioned value read
    /// without a session name comes back as `Value::Null`.
    pub fn read_full(
        &self,
        key: &str,
        default: Option<Value>,
        session: Option<&str>,
        include_unpartitioned: bool,
    ) -> Value {
        let raw = self.host.storage_read(key);
        let value = convert_value(raw, default, session, include_unpartitioned);
        self.logger.debug(format!(
            "READ DATA [{}]{} <{}>\n{}",
            key,
            session.map(|s| format!("[{}]", s)).unwrap_or_default(),
            type_name(&value),
            value
        ));
        value
    }

    /// Store a value under a key
    pub fn write(&self, key: &str, value: &Value) -> bool {
        self.write_full(key, value, None)
    }

    /// Store a value under one session of a key, marking the key as
    /// session-partitioned
    pub fn write_session(&self, key: &str, session: &str, value: &Value) -> bool {
        self.write_full(key, value, Some(session))
    }

    /// Store a numeric value; non-finite numbers are rejected without writing
    pub fn write_number(&self, key: &str, value: f64) -> bool {
        match Number::from_f64(value) {
            Some(number) => self.write(key, &Value::Number(number)),
            None => false,
        }
    }

    fn write_full(&self, key: &str, value: &Value, session: Option<&str>) -> bool {
        let mut value = value.clone();
        if !self.env.is_native && (value.is_boolean() || value.is_number()) {
            value = Value::String(value_text(&value));
        }

        let data = match session {
            Some(session) => {
                let raw = self.host.storage_read(key).unwrap_or(Value::Null);
                let mut object = convert_to_object(raw);
                object.insert(SESSION_MARKER.to_string(), Value::Bool(true));
                object.insert(session.to_string(), value.clone());
                Value::Object(object)
            }
            None => value.clone(),
        };

        self.logger.debug(format!(
            "WRITE DATA [{}]{} <{}>\n{}",
            key,
            session.map(|s| format!("[{}]", s)).unwrap_or_default(),
            type_name(&value),
            value
        ));

        self.host.storage_write(key, &self.serialize_for_host(data))
    }

    /// Remove a key entirely
    pub fn del(&self, key: &str) {
        self.host.storage_remove(key);
        self.logger.debug(format!("DELETE KEY [{}]", key));
    }

    /// Remove one session's sub-value, preserving the marker and the other
    /// sessions
    pub fn del_session(&self, key: &str, session: &str) {
        let raw = self.host.storage_read(key).unwrap_or(Value::Null);
        let mut object = convert_to_object(raw);
        object.remove(session);
        self.host
            .storage_write(key, &self.serialize_for_host(Value::Object(object)));
        self.logger
            .debug(format!("DELETE KEY [{}][{}]", key, session));
    }

    /// Write only when the new value differs from the stored one under the
    /// default comparator. Returns whether a verified write happened.
    pub fn update(&self, key: &str, value: &Value) -> bool {
        self.update_full(key, value, None, None)
    }

    /// Full update: compare, write, re-read, and verify.
    ///
    /// Returns false without writing when `comparator(old, new)` reports
    /// equality. Otherwise returns whether the post-write read round-trips
    /// equal under the comparator — except for object-valued writes under the
    /// default comparator, where the write's own success is reported as-is
    /// (re-decoded objects cannot be verified by the scalar comparator).
    pub fn update_full(
        &self,
        key: &str,
        value: &Value,
        session: Option<&str>,
        comparator: Option<&Comparator>,
    ) -> bool {
        let value = coerce_type(value.clone());
        let compare = comparator.unwrap_or(&default_comparator);

        let old = self.read_full(key, None, session, false);
        if compare(&old, &value) {
            return false;
        }

        let result = self.write_full(key, &value, session);
        let stored = self.read_full(key, None, session, false);
        if comparator.is_none() && stored.is_object() {
            return result;
        }
        compare(&value, &stored)
    }

    /// Session names stored under a key, in write order; empty when the key
    /// is not session-partitioned
    pub fn all_session_names(&self, key: &str) -> Vec<String> {
        let names: Vec<String> = match self.partitioned_object(key) {
            Some(object) => object
                .keys()
                .filter(|name| name.as_str() != SESSION_MARKER)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        self.logger.debug(format!(
            "READ ALL SESSIONS [{}]\n{}",
            key,
            serde_json::to_string(&names).unwrap_or_default()
        ));
        names
    }

    /// Mapping of session name to sub-value; empty when the key is not
    /// session-partitioned
    pub fn all_sessions(&self, key: &str) -> Map<String, Value> {
        let sessions = match self.partitioned_object(key) {
            Some(mut object) => {
                object.remove(SESSION_MARKER);
                object
            }
            None => Map::new(),
        };
        self.logger.debug(format!(
            "READ ALL SESSIONS [{}]\n{}",
            key,
            serde_json::to_string(&sessions).unwrap_or_default()
        ));
        sessions
    }

    fn partitioned_object(&self, key: &str) -> Option<Map<String, Value>> {
        let data = self.read_full(key, None, None, true);
        let object = convert_to_object(data);
        if object.get(SESSION_MARKER) == Some(&Value::Bool(true)) {
            Some(object)
        } else {
            None
        }
    }

    fn serialize_for_host(&self, data: Value) -> Value {
        if !self.env.is_native && data.is_object() {
            match serde_json::to_string_pretty(&data) {
                Ok(text) => Value::String(text),
                Err(_) => data,
            }
        } else {
            data
        }
    }
}

/// The raw-to-usable conversion applied on every read
fn convert_value(
    raw: Option<Value>,
    default: Option<Value>,
    session: Option<&str>,
    include_unpartitioned: bool,
) -> Value {
    let mut value = raw;

    if let Some(session) = session {
        value = value.and_then(|v| {
            let v = match v {
                Value::String(text) => serde_json::from_str::<Value>(&text).ok()?,
                other => other,
            };
            let object = v.as_object()?;
            if object.get(SESSION_MARKER) == Some(&Value::Bool(true)) {
                object.get(session).cloned()
            } else {
                None
            }
        });
    }

    // Textual values decode when they hold JSON; the literal "null" string
    // stays text
    if let Some(Value::String(text)) = &value {
        if text != "null" {
            if let Ok(parsed) = serde_json::from_str::<Value>(text) {
                value = Some(parsed);
            }
        }
    }

    if !include_unpartitioned {
        if let Some(v) = &value {
            if v.get(SESSION_MARKER) == Some(&Value::Bool(true)) {
                value = None;
            }
        }
    }

    let value = match value {
        None | Some(Value::Null) => default.unwrap_or(Value::Null),
        Some(v) => v,
    };
    coerce_type(value)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Globals, HostKind};
    use crate::host::{FileHost, MemoryHost};
    use crate::logger::Level;
    use serde_json::json;

    fn quanx_store() -> (Store, Arc<MemoryHost>) {
        let host = Arc::new(MemoryHost::new(HostKind::QuanX));
        let env = Environment::detect(&Globals::new().with_marker("$task"));
        let logger = Logger::new("test", Level::None);
        (Store::new(env, logger, host.clone()), host)
    }

    fn native_store() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(FileHost::open(dir.path().join("magic.json")).unwrap());
        let env = Environment::detect(&Globals::native());
        let logger = Logger::new("test", Level::None);
        (Store::new(env, logger, host), dir)
    }

    #[test]
    fn test_read_missing_returns_default() {
        let (store, _host) = quanx_store();
        assert_eq!(store.read("missing"), Value::Null);
        assert_eq!(store.read_or("missing", json!("fallback")), json!("fallback"));
    }

    #[test]
    fn test_scalar_round_trip_through_string_store() {
        let (store, host) = quanx_store();

        assert!(store.write("flag", &json!(true)));
        // Booleans persist stringified on string-primitive hosts
        assert_eq!(host.raw_value("flag"), Some("true".to_string()));
        assert_eq!(store.read("flag"), json!(true));

        assert!(store.write("count", &json!(42)));
        assert_eq!(host.raw_value("count"), Some("42".to_string()));
        assert_eq!(store.read("count"), json!(42));

        assert!(store.write("name", &json!("magic")));
        assert_eq!(store.read("name"), json!("magic"));
    }

    #[test]
    fn test_object_round_trip() {
        let (store, _host) = quanx_store();
        let value = json!({"nested": {"list": [1, 2, 3]}, "ok": true});
        assert!(store.write("obj", &value));
        assert_eq!(store.read("obj"), value);
    }

    #[test]
    fn test_write_number_rejects_nan() {
        let (store, host) = quanx_store();
        assert!(!store.write_number("bad", f64::NAN));
        assert!(!store.write_number("bad", f64::INFINITY));
        assert!(host.raw_value("bad").is_none());
        assert!(store.write_number("good", 1.5));
        assert_eq!(store.read("good"), json!(1.5));
    }

    #[test]
    fn test_session_round_trip_and_order() {
        let (store, _host) = quanx_store();

        assert!(store.write_session("accounts", "a", &json!("token-a")));
        assert!(store.write_session("accounts", "b", &json!("token-b")));

        assert_eq!(store.read_session("accounts", "a"), json!("token-a"));
        assert_eq!(store.read_session("accounts", "b"), json!("token-b"));
        assert_eq!(store.all_session_names("accounts"), vec!["a", "b"]);

        let sessions = store.all_sessions("accounts");
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions["a"], json!("token-a"));
        assert!(!sessions.contains_key(SESSION_MARKER));
    }

    #[test]
    fn test_partitioned_value_hidden_from_plain_read() {
        let (store, _host) = quanx_store();
        store.write_session("accounts", "a", &json!(1));
        assert_eq!(store.read("accounts"), Value::Null);
        assert_eq!(store.read_session("plain", "a"), Value::Null);

        store.write("plain", &json!({"x": 1}));
        // A plain object is not a session partition
        assert_eq!(store.read_session("plain", "a"), Value::Null);
        assert!(store.all_session_names("plain").is_empty());
    }

    #[test]
    fn test_del_session_preserves_marker_and_others() {
        let (store, _host) = quanx_store();
        store.write_session("accounts", "a", &json!(1));
        store.write_session("accounts", "b", &json!(2));

        store.del_session("accounts", "a");
        assert_eq!(store.read_session("accounts", "b"), json!(2));
        assert_eq!(store.all_session_names("accounts"), vec!["b"]);

        store.del("accounts");
        assert_eq!(store.read("accounts"), Value::Null);
    }

    #[test]
    fn test_update_skips_equal_scalars() {
        let (store, host) = quanx_store();
        store.write("count", &json!(1));
        let before = host.raw_value("count");

        assert!(!store.update("count", &json!(1)));
        assert_eq!(host.raw_value("count"), before);

        assert!(store.update("count", &json!(2)));
        assert_eq!(store.read("count"), json!(2));
    }

    #[test]
    fn test_update_object_reports_write_success() {
        let (store, _host) = quanx_store();
        assert!(store.update("obj", &json!({"a": 1})));
        assert_eq!(store.read("obj"), json!({"a": 1}));
        // Objects never compare equal under the default comparator, so a
        // second identical update still writes and still reports success
        assert!(store.update("obj", &json!({"a": 1})));
    }

    #[test]
    fn test_update_with_custom_comparator() {
        let (store, _host) = quanx_store();
        store.write("word", &json!("Rust"));

        let case_insensitive: &Comparator = &|old, new| {
            old.as_str().map(|s| s.to_lowercase()) == new.as_str().map(|s| s.to_lowercase())
        };
        assert!(!store.update_full("word", &json!("rust"), None, Some(case_insensitive)));
        assert!(store.update_full("word", &json!("shim"), None, Some(case_insensitive)));
        assert_eq!(store.read("word"), json!("shim"));
    }

    #[test]
    fn test_true_false_strings_coerce() {
        let (store, host) = quanx_store();
        host.seed("flag", "true");
        assert_eq!(store.read("flag"), json!(true));
        host.seed("flag", "false");
        assert_eq!(store.read("flag"), json!(false));
    }

    #[test]
    fn test_native_store_keeps_structured_values() {
        let (store, _dir) = native_store();

        assert!(store.write("flag", &json!(true)));
        assert_eq!(store.read("flag"), json!(true));

        store.write_session("accounts", "a", &json!({"token": "x"}));
        store.write_session("accounts", "b", &json!({"token": "y"}));
        assert_eq!(store.read_session("accounts", "a"), json!({"token": "x"}));
        assert_eq!(store.all_session_names("accounts"), vec!["a", "b"]);

        store.del_session("accounts", "a");
        assert_eq!(store.all_session_names("accounts"), vec!["b"]);
    }

    #[test]
    fn test_convert_to_object() {
        assert!(convert_to_object(json!(null)).is_empty());
        assert!(convert_to_object(json!([1, 2])).is_empty());
        assert!(convert_to_object(json!(true)).is_empty());
        assert!(convert_to_object(json!("not json")).is_empty());
        let map = convert_to_object(json!("{\"a\":1}"));
        assert_eq!(map["a"], json!(1));
    }
}
