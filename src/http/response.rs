// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Normalized HTTP response
//!
//! Whatever shape the host's dispatch primitive produced, the pipeline hands
//! interceptors and callers this one: status code, JSON-parsed body when the
//! text allows it, headers, and the config that originated the request.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RequestConfig;
use crate::error::Result;
use crate::host::RawResponse;

/// Uniform response shape across hosts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Body, parsed from JSON when possible, otherwise the raw text
    pub body: Value,
    /// The config that produced this response
    pub config: RequestConfig,
}

impl Response {
    /// Build a normalized response from the host's raw shape
    pub fn from_raw(raw: RawResponse, config: RequestConfig) -> Self {
        let text = String::from_utf8_lossy(&raw.body).into_owned();
        let body = match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => parsed,
            Err(_) => Value::String(text),
        };
        Self {
            status: raw.status,
            headers: raw.headers,
            body,
            config,
        }
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text: string bodies verbatim, structured bodies serialized
    pub fn text(&self) -> String {
        match &self.body {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Deserialize the body into a concrete type
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
