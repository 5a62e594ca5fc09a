// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Host adapter boundary
//!
//! Each supported host exposes the same four raw capabilities: a string-keyed
//! persistence primitive, an HTTP dispatch primitive, a notification-post
//! primitive, and a completion signal. The [`Host`] trait is the single seam
//! between the shim and those primitives; one implementation exists per host,
//! selected once at startup. Data-shaping differences between hosts (query
//! strings, boolean stringification, notification option shapes) live in the
//! components, keyed off [`crate::Environment`], not here.

mod file;
mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::env::HostKind;
use crate::error::Result;
use crate::http::RequestConfig;

pub use file::FileHost;
pub use memory::{DispatchFn, MemoryHost, PostedNotification};

/// Default path of the file-backed host's JSON document
pub const DEFAULT_STORE_PATH: &str = "./magic.json";

/// Response as the host's dispatch primitive produced it, before
/// normalization into [`crate::http::Response`].
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

/// The raw capability set a host supplies.
///
/// Storage values cross this boundary as `serde_json::Value`: hosts whose
/// persistence primitive is a plain string store report `Value::String` and
/// receive whatever the store layer serialized for them; the file-backed host
/// reads and writes structured values directly.
#[async_trait]
pub trait Host: Send + Sync {
    /// Which host this adapter bridges
    fn kind(&self) -> HostKind;

    /// Read the raw stored value for a key
    fn storage_read(&self, key: &str) -> Option<Value>;

    /// Store a value under a key; false on failure
    fn storage_write(&self, key: &str, value: &Value) -> bool;

    /// Remove a key entirely; false when the key did not exist
    fn storage_remove(&self, key: &str) -> bool;

    /// Perform one HTTP request
    async fn dispatch(&self, config: RequestConfig) -> Result<RawResponse>;

    /// Post a notification through the host's native mechanism
    fn post_notification(&self, title: &str, sub_title: &str, body: &str, options: &Value);

    /// Signal script completion to the host runtime
    fn done(&self, value: Value);
}
