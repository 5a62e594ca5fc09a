// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Script runtime facade
//!
//! One [`Shim`] per script run: detects the environment from the globals
//! snapshot, wires the logger, store, HTTP client, and notifier to the same
//! host adapter, and applies the persisted overrides (`magic_loglevel`,
//! `magic_bark_url`) before handing control to the script body.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::env::{Environment, Globals};
use crate::error::Result;
use crate::host::{FileHost, Host, DEFAULT_STORE_PATH};
use crate::http::HttpClient;
use crate::logger::{Level, Logger};
use crate::notify::Notifier;
use crate::store::Store;

/// Store key holding the persisted log-level override
pub const LOGLEVEL_KEY: &str = "magic_loglevel";
/// Store key holding the persisted bark relay URL
pub const BARK_URL_KEY: &str = "magic_bark_url";

/// The assembled script runtime
#[derive(Clone)]
pub struct Shim {
    env: Environment,
    globals: Globals,
    logger: Logger,
    store: Store,
    http: HttpClient,
    notifier: Notifier,
    host: Arc<dyn Host>,
    started: Instant,
}

impl Shim {
    /// Assemble a runtime backed by the file host at the default store path.
    /// `level` is the initial logger threshold; a persisted `magic_loglevel`
    /// still takes precedence.
    pub fn new(script_name: impl Into<String>, level: Level) -> Result<Self> {
        let host = Arc::new(FileHost::open(DEFAULT_STORE_PATH)?);
        Ok(Self::with_host(script_name, level, Globals::native(), host))
    }

    /// Assemble a runtime for an explicit globals snapshot and host adapter
    pub fn with_host(
        script_name: impl Into<String>,
        level: Level,
        globals: Globals,
        host: Arc<dyn Host>,
    ) -> Self {
        let env = Environment::detect(&globals);
        let logger = Logger::new(script_name, level);
        let store = Store::new(env.clone(), logger.clone(), host.clone());
        let http = HttpClient::new(env.clone(), logger.clone(), host.clone());
        let notifier = Notifier::new(env.clone(), logger.clone(), http.clone(), host.clone());

        let shim = Self {
            env,
            globals,
            logger,
            store,
            http,
            notifier,
            host,
            started: Instant::now(),
        };
        shim.apply_persisted_overrides();
        shim
    }

    fn apply_persisted_overrides(&self) {
        if let Value::String(level) = self.store.read(LOGLEVEL_KEY) {
            match level.parse::<Level>() {
                Ok(level) => self.logger.set_level(level),
                Err(_) => self
                    .logger
                    .warning(format!("Invalid persisted log level: {}", level)),
            }
        }
        if let Value::String(url) = self.store.read(BARK_URL_KEY) {
            self.notifier.set_bark(&url);
        }
    }

    /// Crate version
    pub fn version(&self) -> &'static str {
        crate::VERSION
    }

    /// Script name this runtime was assembled for
    pub fn script_name(&self) -> &str {
        self.logger.script_name()
    }

    /// The detected environment
    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Whether the logger threshold is at DEBUG or more verbose
    pub fn is_debug(&self) -> bool {
        self.logger.level() >= Level::Debug
    }

    /// Whether the host invoked the script at the request stage. A response
    /// stage invocation carries `$request` too, so `$response` absence is
    /// part of the test.
    pub fn is_request(&self) -> bool {
        self.globals.has("$request") && !self.globals.has("$response")
    }

    /// Whether the host invoked the script with an intercepted response
    pub fn is_response(&self) -> bool {
        self.globals.has("$response")
    }

    /// The intercepted request object, when present
    pub fn request(&self) -> Option<Value> {
        self.globals.get("$request").cloned()
    }

    /// The intercepted response object, when present, with `status` and
    /// `statusCode` mirrored so scripts written against either host family
    /// find the field they expect
    pub fn response(&self) -> Option<Value> {
        let mut response = self.globals.get("$response").cloned()?;
        if let Some(object) = response.as_object_mut() {
            match (object.get("status").cloned(), object.get("statusCode").cloned()) {
                (Some(status), None) => {
                    object.insert("statusCode".to_string(), status);
                }
                (None, Some(status_code)) => {
                    object.insert("status".to_string(), status_code);
                }
                _ => {}
            }
        }
        Some(response)
    }

    /// Signal completion to the host, logging the elapsed wall time
    pub fn done(&self, value: Value) {
        let span = self.started.elapsed().as_millis() as f64 / 1000.0;
        self.logger.info(format!("SCRIPT COMPLETED: {} S.", span));
        self.host.done(value);
    }
}
