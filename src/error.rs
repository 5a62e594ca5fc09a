// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the hostshim library
//!
//! HTTP failures (transport errors and status codes >= 400) normalize into the
//! `Request` variant so rejection handlers always see the same shape: a name,
//! a message, the config that triggered the call, and the response if one was
//! received. Timeouts stay a distinct variant so callers can tell them apart
//! from real transport failures.

use thiserror::Error;

use crate::http::{RequestConfig, Response};

/// Result type alias for hostshim operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the shim
#[derive(Error, Debug)]
pub enum Error {
    /// Request failed, either at the transport level or with a status >= 400
    #[error("{message}")]
    Request {
        name: String,
        message: String,
        status: Option<u16>,
        config: Box<RequestConfig>,
        response: Option<Box<Response>>,
    },

    /// Request timed out while racing the configured timer
    #[error("timeout of {timeout_ms}ms exceeded.")]
    Timeout { timeout_ms: u64, url: String },

    /// HTTP dispatch failed inside the file-backed host
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error from the backing document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create the error raised when a response carries a status code >= 400
    pub fn request_failed(response: Response) -> Self {
        Error::Request {
            name: "RequestException".to_string(),
            message: format!("Request failed with status code {}", response.status),
            status: Some(response.status),
            config: Box::new(response.config.clone()),
            response: Some(Box::new(response)),
        }
    }

    /// Create a normalized transport-level request error
    pub fn transport(
        name: impl Into<String>,
        message: impl Into<String>,
        config: RequestConfig,
        response: Option<Response>,
    ) -> Self {
        Error::Request {
            name: name.into(),
            message: message.into(),
            status: None,
            config: Box::new(config),
            response: response.map(Box::new),
        }
    }

    /// Create a timeout error
    pub fn timeout(timeout_ms: u64, url: impl Into<String>) -> Self {
        Error::Timeout {
            timeout_ms,
            url: url.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Check if this is a normalized request error
    pub fn is_request(&self) -> bool {
        matches!(self, Error::Request { .. })
    }

    /// Get the HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Request { status, .. } => *status,
            _ => None,
        }
    }

    /// Get the normalized response if one was received
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Request { response, .. } => response.as_deref(),
            _ => None,
        }
    }

    /// Get the request config that triggered this error, if any
    pub fn request_config(&self) -> Option<&RequestConfig> {
        match self {
            Error::Request { config, .. } => Some(config),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
