// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request configuration
//!
//! The mutable request shape that flows through the interceptor pipeline. A
//! bare URL converts into a config with everything else defaulted; each
//! request interceptor receives the config and hands back a (possibly
//! modified) one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Configuration for one HTTP request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Request method, filled from the verb shorthand when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Request URL
    pub url: String,
    /// Request headers
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    /// Query parameters, serialized into the URL for hosts whose dispatch
    /// primitive does not accept them structured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    /// Request body: string bodies stay text, everything else is structured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Ask the host to skip its own rewrite/scripting layer for this request
    #[serde(default, skip_serializing_if = "is_false")]
    pub rewrite: bool,
    /// QuantumultX hints flag, set while adapting the rewrite request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<bool>,
}

fn is_false(b: &bool) -> bool {
    !b
}

impl RequestConfig {
    /// Create a config for a URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the method
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set a query parameter
    pub fn param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(name.into(), value);
        self
    }

    /// Set a structured body
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a plain-text body
    pub fn body_text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(Value::String(body.into()));
        self
    }

    /// Set the timeout in milliseconds
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout = Some(ms);
        self
    }

    /// Set the rewrite-skip flag
    pub fn rewrite(mut self, rewrite: bool) -> Self {
        self.rewrite = rewrite;
        self
    }

    /// The method, defaulting to GET when unset
    pub fn method_str(&self) -> &str {
        self.method.as_deref().unwrap_or("GET")
    }

    /// Case-insensitive header lookup
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl From<&str> for RequestConfig {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for RequestConfig {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}
