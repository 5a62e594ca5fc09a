// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Host environment detection
//!
//! The embedding runtime hands the shim a [`Globals`] snapshot of the
//! host-specific globals it exposes (`$loon`, `$task`, `$httpClient`, ...).
//! [`Environment::detect`] inspects which markers are present and derives the
//! host identity plus whatever build/version/platform metadata the host
//! publishes. Detection is pure and has no failure mode: an empty snapshot
//! yields `HostKind::Unknown` with every metadata field unset.

use std::collections::HashMap;

use serde_json::Value;

/// Snapshot of the globals injected by the embedding host runtime.
///
/// Keys follow the names the hosts actually use (`$loon`, `$task`,
/// `$environment`, `$request`, ...), so an embedder bridging a real proxy app
/// can forward its global table verbatim.
#[derive(Debug, Clone, Default)]
pub struct Globals {
    values: HashMap<String, Value>,
}

impl Globals {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot for the file-backed scripting runtime
    pub fn native() -> Self {
        Self::new().with_marker("module")
    }

    /// Add a global with a value
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Add a bare marker global (present, value irrelevant)
    pub fn with_marker(self, name: impl Into<String>) -> Self {
        self.with(name, Value::Bool(true))
    }

    /// Insert a global in place
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Check whether a global is present
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Get a global's value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// Identity of the host running the script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Surge,
    Loon,
    QuanX,
    Storm,
    Stash,
    Scriptable,
    /// General-purpose scripting runtime with file access
    Native,
    Unknown,
}

impl HostKind {
    /// Host display name
    pub fn name(&self) -> &'static str {
        match self {
            HostKind::Surge => "Surge",
            HostKind::Loon => "Loon",
            HostKind::QuanX => "QuantumultX",
            HostKind::Storm => "Storm",
            HostKind::Stash => "Stash",
            HostKind::Scriptable => "Scriptable",
            HostKind::Native => "Native",
            HostKind::Unknown => "unknown",
        }
    }
}

/// Detected environment: capability flags plus host metadata.
///
/// Immutable after construction; call [`Environment::detect`] again to
/// recompute.
#[derive(Debug, Clone)]
pub struct Environment {
    pub is_loon: bool,
    pub is_quanx: bool,
    pub is_surge: bool,
    pub is_storm: bool,
    pub is_stash: bool,
    pub is_surge_like: bool,
    pub is_scriptable: bool,
    pub is_native: bool,
    kind: HostKind,
    build: Option<String>,
    version: Option<String>,
    language: Option<String>,
    system: Option<String>,
    system_version: Option<String>,
    device_name: Option<String>,
}

impl Environment {
    /// Detect the environment from a globals snapshot
    pub fn detect(globals: &Globals) -> Self {
        let is_loon = globals.has("$loon");
        let is_quanx = globals.has("$task");
        let is_native = globals.has("module");
        let is_surge = globals.has("$httpClient") && !is_loon;
        let is_storm = globals.has("$storm");
        let is_stash = globals
            .get("$environment")
            .map_or(false, |env| env.get("stash-build").is_some());
        let is_surge_like = is_surge || is_loon || is_storm || is_stash;
        let is_scriptable = globals.has("importModule");

        let kind = if is_loon {
            HostKind::Loon
        } else if is_quanx {
            HostKind::QuanX
        } else if is_native {
            HostKind::Native
        } else if is_storm {
            HostKind::Storm
        } else if is_stash {
            HostKind::Stash
        } else if is_surge {
            HostKind::Surge
        } else if is_scriptable {
            HostKind::Scriptable
        } else {
            HostKind::Unknown
        };

        let env_str = |global: &str, key: &str| -> Option<String> {
            globals
                .get(global)?
                .get(key)?
                .as_str()
                .map(|s| s.to_string())
        };

        let build = if is_stash {
            env_str("$environment", "stash-build")
        } else if is_surge {
            env_str("$environment", "surge-build")
        } else if is_storm {
            env_str("$storm", "buildVersion")
        } else {
            None
        };

        let version = if is_stash {
            env_str("$environment", "stash-version")
        } else if is_surge {
            env_str("$environment", "surge-version")
        } else if is_storm {
            env_str("$storm", "appVersion")
        } else {
            None
        };

        let language = if is_surge || is_stash {
            env_str("$environment", "language")
        } else {
            None
        };

        let system = if is_surge {
            env_str("$environment", "system")
        } else if is_native {
            Some(std::env::consts::OS.to_string())
        } else {
            None
        };

        let system_version = if is_storm {
            env_str("$storm", "systemVersion")
        } else {
            None
        };

        let device_name = if is_storm {
            env_str("$storm", "deviceName")
        } else {
            None
        };

        Self {
            is_loon,
            is_quanx,
            is_surge,
            is_storm,
            is_stash,
            is_surge_like,
            is_scriptable,
            is_native,
            kind,
            build,
            version,
            language,
            system,
            system_version,
            device_name,
        }
    }

    /// The detected host kind
    pub fn kind(&self) -> HostKind {
        self.kind
    }

    /// Host display name
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Host application build number, when published
    pub fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    /// Host application version, when published
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Host UI language, when published
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Operating system name, when published
    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    /// Operating system version, when published
    pub fn system_version(&self) -> Option<&str> {
        self.system_version.as_deref()
    }

    /// Device name, when published
    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }
}
