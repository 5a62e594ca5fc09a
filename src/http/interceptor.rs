// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interceptor registries
//!
//! Registered handlers live in an append-only arena: registration returns a
//! stable id, ejection tombstones the slot without shifting or reusing ids.
//! The active chain is rebuilt from the registry on every request.

use std::sync::Arc;

use super::{RequestConfig, Response};
use crate::error::{Error, Result};

/// Predicate deciding whether an interceptor participates in a request
pub type RunWhen = Arc<dyn Fn(&RequestConfig) -> bool + Send + Sync>;

/// Request-side fulfillment handler: receives the config, hands back a
/// possibly modified one
pub type RequestFulfilled = Arc<dyn Fn(RequestConfig) -> Result<RequestConfig> + Send + Sync>;

/// Request-side rejection handler: may recover a config or re-raise
pub type RequestRejected = Arc<dyn Fn(Error) -> Result<RequestConfig> + Send + Sync>;

/// Response-side fulfillment handler
pub type ResponseFulfilled = Arc<dyn Fn(Response) -> Result<Response> + Send + Sync>;

/// Response-side rejection handler: may recover a response or re-raise
pub type ResponseRejected = Arc<dyn Fn(Error) -> Result<Response> + Send + Sync>;

/// Options attached to a registered interceptor
#[derive(Default)]
pub struct InterceptorOptions {
    /// Declares the fulfillment handler safe to run as a plain call before
    /// dispatch. The pipeline runs synchronously only when every
    /// participating request interceptor declares this.
    pub synchronous: bool,
    /// Participation predicate, evaluated against the merged config
    pub run_when: Option<RunWhen>,
}

impl InterceptorOptions {
    /// Options declaring a synchronous handler
    pub fn synchronous() -> Self {
        Self {
            synchronous: true,
            run_when: None,
        }
    }

    /// Attach a participation predicate
    pub fn run_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&RequestConfig) -> bool + Send + Sync + 'static,
    {
        self.run_when = Some(Arc::new(predicate));
        self
    }
}

/// One registered interceptor
pub struct Interceptor<F, R> {
    pub fulfilled: Option<F>,
    pub rejected: Option<R>,
    pub synchronous: bool,
    pub run_when: Option<RunWhen>,
}

impl<F: Clone, R: Clone> Clone for Interceptor<F, R> {
    fn clone(&self) -> Self {
        Self {
            fulfilled: self.fulfilled.clone(),
            rejected: self.rejected.clone(),
            synchronous: self.synchronous,
            run_when: self.run_when.clone(),
        }
    }
}

/// Append-only interceptor arena with tombstone removal
pub struct InterceptorManager<F, R> {
    handlers: Vec<Option<Interceptor<F, R>>>,
}

impl<F, R> Default for InterceptorManager<F, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F, R> InterceptorManager<F, R> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a fulfillment handler with default options; returns its id
    pub fn register(&mut self, fulfilled: F) -> usize {
        self.register_with(Some(fulfilled), None, InterceptorOptions::default())
    }

    /// Register a full handler triple; returns its id.
    ///
    /// Ids are stable: they index the arena and survive any later ejection.
    pub fn register_with(
        &mut self,
        fulfilled: Option<F>,
        rejected: Option<R>,
        options: InterceptorOptions,
    ) -> usize {
        self.handlers.push(Some(Interceptor {
            fulfilled,
            rejected,
            synchronous: options.synchronous,
            run_when: options.run_when,
        }));
        self.handlers.len() - 1
    }

    /// Remove an interceptor by id, leaving a tombstone. Unknown ids are
    /// ignored.
    pub fn eject(&mut self, id: usize) {
        if let Some(slot) = self.handlers.get_mut(id) {
            *slot = None;
        }
    }

    /// Iterate the live interceptors in registration order
    pub fn active(&self) -> impl Iterator<Item = &Interceptor<F, R>> {
        self.handlers.iter().filter_map(|slot| slot.as_ref())
    }

    /// Number of live interceptors
    pub fn active_count(&self) -> usize {
        self.active().count()
    }
}

/// Registry of request-side interceptors
pub type RequestInterceptors = InterceptorManager<RequestFulfilled, RequestRejected>;

/// Registry of response-side interceptors
pub type ResponseInterceptors = InterceptorManager<ResponseFulfilled, ResponseRejected>;

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> RequestFulfilled {
        Arc::new(Ok)
    }

    #[test]
    fn test_ids_are_stable_across_ejection() {
        let mut manager = RequestInterceptors::new();
        let a = manager.register(noop());
        let b = manager.register(noop());
        let c = manager.register(noop());
        assert_eq!((a, b, c), (0, 1, 2));

        manager.eject(b);
        assert_eq!(manager.active_count(), 2);

        // New registrations never reuse the tombstoned slot
        let d = manager.register(noop());
        assert_eq!(d, 3);
        assert_eq!(manager.active_count(), 3);
    }

    #[test]
    fn test_eject_unknown_id_is_ignored() {
        let mut manager = RequestInterceptors::new();
        manager.eject(42);
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_options() {
        let options = InterceptorOptions::synchronous().run_when(|config| config.url.contains("api"));
        assert!(options.synchronous);
        let predicate = options.run_when.unwrap();
        assert!(predicate(&RequestConfig::from("https://example.com/api")));
        assert!(!predicate(&RequestConfig::from("https://example.com/web")));
    }
}
