// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-memory host adapter
//!
//! Stands in for the proxy-app hosts: storage is a raw string-keyed string
//! store (values round-trip through text exactly like the native persistence
//! primitives), dispatch is a scripted closure, and posted notifications and
//! completion values are recorded for inspection. Constructed with any
//! [`HostKind`] so host-specific branching is exercisable without a device.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use super::{Host, RawResponse};
use crate::env::HostKind;
use crate::error::Result;
use crate::http::RequestConfig;

/// Scripted dispatch closure
pub type DispatchFn =
    Arc<dyn Fn(RequestConfig) -> BoxFuture<'static, Result<RawResponse>> + Send + Sync>;

/// A notification as it reached the host's native primitive
#[derive(Debug, Clone)]
pub struct PostedNotification {
    pub title: String,
    pub sub_title: String,
    pub body: String,
    pub options: Value,
}

/// Host adapter holding everything in memory
pub struct MemoryHost {
    kind: HostKind,
    values: DashMap<String, String>,
    dispatch: RwLock<Option<DispatchFn>>,
    notifications: Mutex<Vec<PostedNotification>>,
    done_values: Mutex<Vec<Value>>,
}

impl MemoryHost {
    /// Create an empty host impersonating the given kind
    pub fn new(kind: HostKind) -> Self {
        Self {
            kind,
            values: DashMap::new(),
            dispatch: RwLock::new(None),
            notifications: Mutex::new(Vec::new()),
            done_values: Mutex::new(Vec::new()),
        }
    }

    /// Script the dispatch primitive
    pub fn on_dispatch<F>(&self, f: F)
    where
        F: Fn(RequestConfig) -> BoxFuture<'static, Result<RawResponse>> + Send + Sync + 'static,
    {
        *self.dispatch.write() = Some(Arc::new(f));
    }

    /// Script dispatch to always answer with a canned status and body
    pub fn respond_with(&self, status: u16, body: impl Into<String>) {
        let body = body.into();
        self.on_dispatch(move |_config| {
            let body = Bytes::from(body.clone());
            Box::pin(async move {
                Ok(RawResponse {
                    status,
                    headers: Default::default(),
                    body,
                })
            })
        });
    }

    /// Seed a raw stored string, bypassing the store layer
    pub fn seed(&self, key: impl Into<String>, raw: impl Into<String>) {
        self.values.insert(key.into(), raw.into());
    }

    /// Raw stored text for a key
    pub fn raw_value(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.clone())
    }

    /// Notifications posted so far
    pub fn notifications(&self) -> Vec<PostedNotification> {
        self.notifications.lock().clone()
    }

    /// Completion values reported so far
    pub fn done_values(&self) -> Vec<Value> {
        self.done_values.lock().clone()
    }
}

#[async_trait]
impl Host for MemoryHost {
    fn kind(&self) -> HostKind {
        self.kind
    }

    fn storage_read(&self, key: &str) -> Option<Value> {
        self.values.get(key).map(|v| Value::String(v.clone()))
    }

    fn storage_write(&self, key: &str, value: &Value) -> bool {
        // String-primitive semantics: everything persists as text
        let raw = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.values.insert(key.to_string(), raw);
        true
    }

    fn storage_remove(&self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    async fn dispatch(&self, config: RequestConfig) -> Result<RawResponse> {
        let scripted = self.dispatch.read().clone();
        match scripted {
            Some(f) => f(config).await,
            None => Ok(RawResponse {
                status: 200,
                headers: Default::default(),
                body: Bytes::new(),
            }),
        }
    }

    fn post_notification(&self, title: &str, sub_title: &str, body: &str, options: &Value) {
        self.notifications.lock().push(PostedNotification {
            title: title.to_string(),
            sub_title: sub_title.to_string(),
            body: body.to_string(),
            options: options.clone(),
        });
    }

    fn done(&self, value: Value) {
        self.done_values.lock().push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_primitive_storage() {
        let host = MemoryHost::new(HostKind::QuanX);
        assert!(host.storage_write("k", &json!({"a": 1})));
        // Objects are persisted as their textual form
        assert_eq!(host.raw_value("k"), Some("{\"a\":1}".to_string()));
        assert_eq!(
            host.storage_read("k"),
            Some(Value::String("{\"a\":1}".to_string()))
        );
        assert!(host.storage_remove("k"));
        assert!(!host.storage_remove("k"));
    }

    #[test]
    fn test_default_dispatch_is_empty_ok() {
        let host = MemoryHost::new(HostKind::Surge);
        let raw = tokio_test::block_on(host.dispatch(RequestConfig::from("https://example.com")))
            .unwrap();
        assert_eq!(raw.status, 200);
        assert!(raw.body.is_empty());
    }

    #[test]
    fn test_notification_recording() {
        let host = MemoryHost::new(HostKind::Loon);
        host.post_notification("t", "s", "b", &json!({"openUrl": "https://x"}));
        let posted = host.notifications();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].title, "t");
        assert_eq!(posted[0].options["openUrl"], "https://x");
    }
}
