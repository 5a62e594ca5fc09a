// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Leveled script logger
//!
//! A message is emitted iff its level ranks at or below the current threshold,
//! ranked (most to least verbose) SNIFFER > DEBUG > INFO > NOTIFY > WARNING >
//! ERROR > CRITICAL > NONE. Emission goes through `tracing` so the embedding
//! application keeps full control over output, while the shim keeps its own
//! threshold so a persisted `magic_loglevel` override works regardless of the
//! subscriber's filter.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Error;

/// Log severity levels, declared from least to most verbose so that
/// `level <= threshold` is the emission test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    None,
    Critical,
    Error,
    Warning,
    Notify,
    Info,
    Debug,
    Sniffer,
}

impl Level {
    /// Glyph prefixed to the message body
    fn glyph(&self) -> &'static str {
        match self {
            Level::Warning => "\u{2757} ",
            Level::Error | Level::Critical => "\u{274c} ",
            _ => "",
        }
    }

    /// All level names, in threshold order
    pub fn name(&self) -> &'static str {
        match self {
            Level::None => "NONE",
            Level::Critical => "CRITICAL",
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Notify => "NOTIFY",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Sniffer => "SNIFFER",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(Level::None),
            "CRITICAL" => Ok(Level::Critical),
            "ERROR" => Ok(Level::Error),
            "WARNING" => Ok(Level::Warning),
            "NOTIFY" => Ok(Level::Notify),
            "INFO" => Ok(Level::Info),
            "DEBUG" => Ok(Level::Debug),
            "SNIFFER" => Ok(Level::Sniffer),
            other => Err(Error::config(format!("unknown log level: {}", other))),
        }
    }
}

/// Cheaply cloneable logger handle; clones share the threshold.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    script_name: String,
    level: RwLock<Level>,
}

impl Logger {
    /// Create a logger for the given script name and initial threshold
    pub fn new(script_name: impl Into<String>, level: Level) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                script_name: script_name.into(),
                level: RwLock::new(level),
            }),
        }
    }

    /// Script name used as the message prefix
    pub fn script_name(&self) -> &str {
        &self.inner.script_name
    }

    /// Current threshold
    pub fn level(&self) -> Level {
        *self.inner.level.read()
    }

    /// Change the threshold
    pub fn set_level(&self, level: Level) {
        *self.inner.level.write() = level;
    }

    /// Emit a message at the given level, subject to the threshold
    pub fn log(&self, msg: impl AsRef<str>, level: Level) {
        if level == Level::None || level > self.level() {
            return;
        }
        let text = format!(
            "[{}] [{}] {}{}",
            level,
            self.inner.script_name,
            level.glyph(),
            msg.as_ref()
        );
        match level {
            Level::Sniffer => tracing::trace!("{}", text),
            Level::Debug => tracing::debug!("{}", text),
            Level::Info | Level::Notify => tracing::info!("{}", text),
            Level::Warning => tracing::warn!("{}", text),
            Level::Error | Level::Critical => tracing::error!("{}", text),
            Level::None => {}
        }
    }

    pub fn sniffer(&self, msg: impl AsRef<str>) {
        self.log(msg, Level::Sniffer);
    }

    pub fn debug(&self, msg: impl AsRef<str>) {
        self.log(msg, Level::Debug);
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.log(msg, Level::Info);
    }

    pub fn notify(&self, msg: impl AsRef<str>) {
        self.log(msg, Level::Notify);
    }

    pub fn warning(&self, msg: impl AsRef<str>) {
        self.log(msg, Level::Warning);
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        self.log(msg, Level::Error);
    }

    pub fn critical(&self, msg: impl AsRef<str>) {
        self.log(msg, Level::Critical);
    }

    /// Retry messages have no level of their own; emit at INFO rank with no
    /// glyph.
    pub fn retry(&self, msg: impl AsRef<str>) {
        self.log(msg, Level::Info);
    }
}
