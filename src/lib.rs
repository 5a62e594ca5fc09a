// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Hostshim - Userscript Host Compatibility Layer
//!
//! One API over the scripting surfaces of the proxy-app script hosts (Surge,
//! Loon, Quantumult X, Stash, Storm, Scriptable) plus a file-backed native
//! runtime, so a script body is written once and runs anywhere.
//!
//! ## Features
//!
//! - Environment detection: host identity and metadata from a globals snapshot
//! - Leveled logging: eight thresholds with a persisted override
//! - Key/value store: session partitions over string-only host storage
//! - HTTP client: axios-style request/response interceptors, sync and async
//! - Notifications: host-native posting with an optional bark relay
//! - Host adapters: the whole surface behind one trait, in-memory test double
//!   included
//!
//! ## Example
//!
//! ```rust,no_run
//! use hostshim::{Level, Shim};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let shim = Shim::new("my-script", Level::Info)?;
//!
//!     let response = shim.http().get("https://example.com/api").await?;
//!     shim.store().write("last_body", &response.body);
//!
//!     shim.done(json!({}));
//!     Ok(())
//! }
//! ```

pub mod env;
pub mod error;
pub mod facade;
pub mod host;
pub mod http;
pub mod logger;
pub mod notify;
pub mod store;

// Re-exports for convenience

// Facade
pub use facade::{Shim, BARK_URL_KEY, LOGLEVEL_KEY};

// Environment
pub use env::{Environment, Globals, HostKind};

// Errors
pub use error::{Error, Result};

// Host adapters
pub use host::{FileHost, Host, MemoryHost, RawResponse, DEFAULT_STORE_PATH};

// HTTP
pub use http::{HttpClient, InterceptorOptions, RequestConfig, Response};

// Logging
pub use logger::{Level, Logger};

// Notifications
pub use notify::{BarkTarget, Notifier, NotifyOptions};

// Store
pub use store::{default_comparator, Store, SESSION_MARKER};

/// Hostshim version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
