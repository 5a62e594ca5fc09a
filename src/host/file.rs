// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! File-backed host adapter
//!
//! Bridges the general-purpose scripting runtime: persistence is a single
//! JSON document on disk, HTTP dispatch goes through reqwest, and there is no
//! native notification surface (posts are logged only).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use url::Url;

use super::{Host, RawResponse};
use crate::env::HostKind;
use crate::error::{Error, Result};
use crate::http::RequestConfig;

/// Host adapter backed by a JSON document and a reqwest client
pub struct FileHost {
    path: PathBuf,
    doc: RwLock<Map<String, Value>>,
    client: reqwest::Client,
}

impl FileHost {
    /// Open the document at `path`, creating it with `{}` when absent.
    ///
    /// Malformed content is logged and replaced by an empty document rather
    /// than failing, so a corrupted store degrades instead of killing the
    /// script.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let doc = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    tracing::warn!(path = %path.display(), "store document malformed, starting empty");
                    Map::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                fs::write(&path, "{}")?;
                Map::new()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            doc: RwLock::new(doc),
            client: reqwest::Client::new(),
        })
    }

    /// Flush the in-memory document to disk
    fn flush(&self) -> bool {
        let doc = self.doc.read();
        match serde_json::to_string_pretty(&Value::Object(doc.clone())) {
            Ok(text) => match fs::write(&self.path, text) {
                Ok(()) => true,
                Err(err) => {
                    tracing::error!(path = %self.path.display(), %err, "store flush failed");
                    false
                }
            },
            Err(err) => {
                tracing::error!(%err, "store serialization failed");
                false
            }
        }
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Host for FileHost {
    fn kind(&self) -> HostKind {
        HostKind::Native
    }

    fn storage_read(&self, key: &str) -> Option<Value> {
        self.doc.read().get(key).cloned()
    }

    fn storage_write(&self, key: &str, value: &Value) -> bool {
        self.doc.write().insert(key.to_string(), value.clone());
        self.flush()
    }

    fn storage_remove(&self, key: &str) -> bool {
        let removed = self.doc.write().remove(key).is_some();
        self.flush() && removed
    }

    async fn dispatch(&self, config: RequestConfig) -> Result<RawResponse> {
        let method = reqwest::Method::from_bytes(config.method_str().as_bytes())
            .map_err(|_| Error::config(format!("invalid method: {}", config.method_str())))?;
        let url = Url::parse(&config.url)?;

        let mut request = self.client.request(method, url);
        for (name, value) in &config.headers {
            request = request.header(name, value);
        }
        if let Some(params) = &config.params {
            let pairs: Vec<(&str, String)> = params
                .iter()
                .map(|(k, v)| (k.as_str(), param_text(v)))
                .collect();
            request = request.query(&pairs);
        }
        if let Some(body) = &config.body {
            request = match body {
                Value::String(text) => request.body(text.clone()),
                other => request.json(other),
            };
        }
        if let Some(ms) = config.timeout {
            request = request.timeout(Duration::from_millis(ms));
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    fn post_notification(&self, title: &str, sub_title: &str, body: &str, _options: &Value) {
        // No native notification surface on this runtime
        tracing::info!(title, sub_title, body, "notification");
    }

    fn done(&self, value: Value) {
        tracing::debug!(value = %value, "script done");
    }
}

fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
