// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client with an interceptor pipeline
//!
//! Every verb shorthand funnels into [`HttpClient::request`], which rebuilds
//! the active handler chains from the registries, adapts the config to the
//! detected host, and executes request handlers (reverse registration order),
//! the built-in config handler, dispatch, the built-in response handler, and
//! response handlers (registration order). The ordering law is identical in
//! both execution modes; the modes differ only in how errors travel:
//! synchronous mode aborts the request phase on the first handler error,
//! asynchronous mode folds everything, dispatch included, over one
//! result-carrying chain.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use url::form_urlencoded;

use super::interceptor::{
    RequestFulfilled, RequestInterceptors, RequestRejected, ResponseFulfilled,
    ResponseInterceptors, ResponseRejected,
};
use super::{headers, RequestConfig, Response};
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::host::Host;
use crate::logger::Logger;

/// The two interceptor registries, shared across client clones
pub struct Interceptors {
    pub request: RwLock<RequestInterceptors>,
    pub response: RwLock<ResponseInterceptors>,
}

type RequestPair = (Option<RequestFulfilled>, Option<RequestRejected>);
type ResponsePair = (Option<ResponseFulfilled>, Option<ResponseRejected>);

/// HTTP client bound to a host adapter
#[derive(Clone)]
pub struct HttpClient {
    env: Environment,
    logger: Logger,
    host: Arc<dyn Host>,
    interceptors: Arc<Interceptors>,
}

impl HttpClient {
    /// Create a client for the detected environment
    pub fn new(env: Environment, logger: Logger, host: Arc<dyn Host>) -> Self {
        Self {
            env,
            logger,
            host,
            interceptors: Arc::new(Interceptors {
                request: RwLock::new(RequestInterceptors::new()),
                response: RwLock::new(ResponseInterceptors::new()),
            }),
        }
    }

    /// The interceptor registries
    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    pub async fn get(&self, config: impl Into<RequestConfig>) -> Result<Response> {
        self.request("GET", config).await
    }

    pub async fn post(&self, config: impl Into<RequestConfig>) -> Result<Response> {
        self.request("POST", config).await
    }

    pub async fn put(&self, config: impl Into<RequestConfig>) -> Result<Response> {
        self.request("PUT", config).await
    }

    pub async fn patch(&self, config: impl Into<RequestConfig>) -> Result<Response> {
        self.request("PATCH", config).await
    }

    pub async fn delete(&self, config: impl Into<RequestConfig>) -> Result<Response> {
        self.request("DELETE", config).await
    }

    pub async fn head(&self, config: impl Into<RequestConfig>) -> Result<Response> {
        self.request("HEAD", config).await
    }

    pub async fn options(&self, config: impl Into<RequestConfig>) -> Result<Response> {
        self.request("OPTIONS", config).await
    }

    /// Execute one request through the interceptor pipeline
    pub async fn request(
        &self,
        method: &str,
        config: impl Into<RequestConfig>,
    ) -> Result<Response> {
        let method = method.to_uppercase();
        let config = self.merge_config(&method, config.into());

        // Rebuild the active chains from the registries
        let (request_chain, all_synchronous) = {
            let registry = self.interceptors.request.read();
            let mut chain: Vec<RequestPair> = Vec::new();
            let mut all_synchronous = true;
            for entry in registry.active() {
                if let Some(run_when) = &entry.run_when {
                    if !run_when(&config) {
                        continue;
                    }
                }
                all_synchronous = all_synchronous && entry.synchronous;
                // Last registered runs first, immediately before dispatch
                chain.insert(0, (entry.fulfilled.clone(), entry.rejected.clone()));
            }
            (chain, all_synchronous)
        };
        let response_chain: Vec<ResponsePair> = self
            .interceptors
            .response
            .read()
            .active()
            .map(|entry| (entry.fulfilled.clone(), entry.rejected.clone()))
            .collect();

        if all_synchronous {
            self.logger
                .debug("Interceptors are executed in synchronous mode");
            self.run_synchronous(config, request_chain, response_chain)
                .await
        } else {
            self.logger
                .debug("Interceptors are executed in asynchronous mode");
            self.run_asynchronous(config, request_chain, response_chain)
                .await
        }
    }

    /// Synchronous mode: request handlers as plain sequential calls; an error
    /// short-circuits into the matching rejection handler and aborts the
    /// request phase, after which dispatch proceeds with the last good config.
    async fn run_synchronous(
        &self,
        mut config: RequestConfig,
        request_chain: Vec<RequestPair>,
        response_chain: Vec<ResponsePair>,
    ) -> Result<Response> {
        for (fulfilled, rejected) in request_chain {
            let Some(fulfilled) = fulfilled else { continue };
            match fulfilled(config.clone()) {
                Ok(next) => config = next,
                Err(err) => {
                    self.logger
                        .debug("Request interceptor rejected, aborting request phase");
                    if let Some(rejected) = rejected {
                        if let Ok(recovered) = rejected(err) {
                            config = recovered;
                        }
                    }
                    break;
                }
            }
        }

        let mut state = self.dispatch_stage(config).await;
        for pair in response_chain {
            state = apply_response_pair(state, pair);
        }
        state
    }

    /// Asynchronous mode: one chain over a result state, request handlers
    /// first, then dispatch (skipped while in the error state), then response
    /// handlers.
    async fn run_asynchronous(
        &self,
        config: RequestConfig,
        request_chain: Vec<RequestPair>,
        response_chain: Vec<ResponsePair>,
    ) -> Result<Response> {
        let mut config_state: Result<RequestConfig> = Ok(config);
        for (fulfilled, rejected) in request_chain {
            config_state = match config_state {
                Ok(config) => match fulfilled {
                    Some(fulfilled) => fulfilled(config),
                    None => Ok(config),
                },
                Err(err) => match rejected {
                    Some(rejected) => rejected(err),
                    None => Err(err),
                },
            };
        }

        let mut state = match config_state {
            Ok(config) => self.dispatch_stage(config).await,
            Err(err) => Err(err),
        };
        for pair in response_chain {
            state = apply_response_pair(state, pair);
        }
        state
    }

    /// Built-in, non-removable stages around dispatch: config serialization
    /// and logging before, normalization and status checking after.
    async fn dispatch_stage(&self, config: RequestConfig) -> Result<Response> {
        let config = self.intercept_config(config);
        match self.dispatch_with_timeout(config.clone()).await {
            Ok(raw) => self.intercept_response(Response::from_raw(raw, config)),
            Err(err) => Err(self.normalize_error(err, &config)),
        }
    }

    /// Built-in request handler: query-string serialization plus a debug log
    /// of the outgoing config
    fn intercept_config(&self, config: RequestConfig) -> RequestConfig {
        let config = self.params_to_query_string(config);
        self.logger.debug(format!(
            "HTTP {}:\n{}",
            config.method_str(),
            serde_json::to_string(&config).unwrap_or_default()
        ));
        config
    }

    /// Built-in response handler: sniffer log plus request-failure synthesis
    /// for status codes >= 400
    fn intercept_response(&self, response: Response) -> Result<Response> {
        self.logger.sniffer(format!(
            "HTTP {}:\n{}\nSTATUS CODE:\n{}\nRESPONSE:\n{}",
            response.config.method_str(),
            serde_json::to_string(&response.config).unwrap_or_default(),
            response.status,
            response.text()
        ));
        if response.status >= 400 {
            self.logger.debug(format!(
                "Raise exception when status code is {}",
                response.status
            ));
            return Err(Error::request_failed(response));
        }
        Ok(response)
    }

    /// Dispatch, racing the configured timeout for hosts whose primitive has
    /// no timeout of its own. The losing dispatch is not aborted; its result
    /// is simply dropped.
    async fn dispatch_with_timeout(&self, config: RequestConfig) -> Result<crate::host::RawResponse> {
        match config.timeout {
            Some(ms) if !self.env.is_native => {
                let url = config.url.clone();
                tokio::select! {
                    result = self.host.dispatch(config) => result,
                    _ = tokio::time::sleep(std::time::Duration::from_millis(ms)) => {
                        Err(Error::timeout(ms, url))
                    }
                }
            }
            _ => self.host.dispatch(config).await,
        }
    }

    /// Fold dispatch-primitive failures into the common request-error shape.
    /// Timeouts and already-normalized errors pass through.
    fn normalize_error(&self, err: Error, config: &RequestConfig) -> Error {
        match err {
            err @ (Error::Request { .. } | Error::Timeout { .. }) => err,
            other => Error::transport("RequestError", other.to_string(), config.clone(), None),
        }
    }

    /// Fill in the method and adapt the config shape to the detected host
    fn merge_config(&self, method: &str, mut config: RequestConfig) -> RequestConfig {
        if config.method.is_none() {
            config.method = Some(method.to_string());
        }

        if config.rewrite {
            if self.env.is_surge {
                config
                    .headers
                    .insert(headers::SKIP_SCRIPTING.to_string(), "false".to_string());
                config.rewrite = false;
            } else if self.env.is_quanx {
                config.hints = Some(false);
                config.rewrite = false;
            }
        }

        if self.env.is_surge_like {
            // The dispatch primitive wants JSON array bodies as text
            let is_json = config
                .header_value(headers::CONTENT_TYPE)
                .map_or(false, |ct| ct.contains("application/json"));
            if config.method_str() != "GET" && is_json {
                if let Some(Value::Array(_)) = &config.body {
                    let text = config
                        .body
                        .as_ref()
                        .map(|b| b.to_string())
                        .unwrap_or_default();
                    self.logger
                        .debug(format!("Convert Array object to String: {}", text));
                    config.body = Some(Value::String(text));
                }
            }
        } else if self.env.is_quanx {
            if let Some(body) = &config.body {
                if !body.is_string() {
                    config.body = Some(Value::String(body.to_string()));
                }
            }
            config.method = Some(method.to_string());
        } else if self.env.is_native {
            // The structured primitive takes GET payloads as params
            if config.method_str() == "GET" && config.params.is_none() {
                match config.body.take() {
                    Some(Value::Object(map)) => config.params = Some(map),
                    other => config.body = other,
                }
            }
        }

        config
    }

    /// Serialize query params into the URL for hosts whose dispatch primitive
    /// does not accept them structured, scrubbing pre-existing occurrences of
    /// the same keys.
    fn params_to_query_string(&self, mut config: RequestConfig) -> RequestConfig {
        if self.env.is_native {
            return config;
        }
        let Some(params) = config.params.take() else {
            return config;
        };

        let mut url = config.url.clone();
        let mut pairs = Vec::with_capacity(params.len());
        for (key, value) in &params {
            let encoded_key = encode_component(key);
            for needle in [key.as_str(), encoded_key.as_str()] {
                if let Ok(re) = regex::Regex::new(&format!("(?i){}=[^&]*", regex::escape(needle))) {
                    url = re.replace_all(&url, "").into_owned();
                }
            }
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            pairs.push(format!("{}={}", encoded_key, encode_component(&text)));
        }

        if !url.contains('?') {
            url.push('?');
        }
        if !(url.ends_with('?') || url.ends_with('&')) {
            url.push('&');
        }
        url.push_str(&pairs.join("&"));

        self.logger
            .debug(format!("Params to QueryString: {}", url));
        config.url = url;
        config
    }
}

fn apply_response_pair(state: Result<Response>, pair: ResponsePair) -> Result<Response> {
    let (fulfilled, rejected) = pair;
    match state {
        Ok(response) => match fulfilled {
            Some(fulfilled) => fulfilled(response),
            None => Ok(response),
        },
        Err(err) => match rejected {
            Some(rejected) => rejected(err),
            None => Err(err),
        },
    }
}

fn encode_component(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
