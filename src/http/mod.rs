// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer
//!
//! A uniform request/response shape across hosts plus a request/response
//! interceptor pipeline in front of the host's dispatch primitive.

mod client;
mod config;
mod interceptor;
mod response;

pub use client::{HttpClient, Interceptors};
pub use config::RequestConfig;
pub use interceptor::{
    Interceptor, InterceptorManager, InterceptorOptions, RequestFulfilled, RequestInterceptors,
    RequestRejected, ResponseFulfilled, ResponseInterceptors, ResponseRejected, RunWhen,
};
pub use response::Response;

use std::collections::HashMap;

/// Common HTTP headers
pub mod headers {
    pub const CONTENT_TYPE: &str = "content-type";
    pub const SKIP_SCRIPTING: &str = "X-Surge-Skip-Scripting";
}

/// Lowercase every header name
pub fn convert_headers_to_lower_case(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| (name.to_lowercase(), value.clone()))
        .collect()
}

/// Camel-case every header name along `-` boundaries (`content-type` ->
/// `Content-Type`)
pub fn convert_headers_to_camel_case(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let camel = name
                .split('-')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join("-");
            (camel, value.clone())
        })
        .collect()
}
