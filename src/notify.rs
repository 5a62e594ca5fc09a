// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Push notifications
//!
//! Posts through the host's native notification primitive, adapting the
//! open-url/media options to the shape each host expects, and optionally
//! relays every notification to a bark server. Relay failures are logged and
//! never propagate to the caller.

use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use regex::Regex;
use serde_json::{json, Value};

use crate::env::Environment;
use crate::host::Host;
use crate::http::{headers, HttpClient, RequestConfig};
use crate::logger::{Level, Logger};

lazy_static! {
    static ref BARK_ENDPOINT: Regex = Regex::new(r"^https?://[^/]+").unwrap();
    static ref BARK_DEVICE_KEY: Regex = Regex::new(r"^/([^/]+)/?$").unwrap();
}

/// A configured bark relay target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarkTarget {
    /// Full push endpoint, `<scheme>://<host>/push`
    pub push_url: String,
    /// Device key extracted from the configured URL's path
    pub device_key: String,
}

/// Click-through options attached to a notification
#[derive(Debug, Clone, Default)]
pub enum NotifyOptions {
    /// Plain notification
    #[default]
    None,
    /// Open a URL when tapped
    Url(String),
    /// Open a URL and show a media attachment
    Media { url: String, media_url: String },
}

impl NotifyOptions {
    /// Adapt to the option object the host's primitive expects.
    ///
    /// Loon takes `openUrl`/`mediaUrl`, QuantumultX takes `open-url`/
    /// `media-url`, the Surge family only supports `url`. Hosts without a
    /// native option shape get the object as-is in QuantumultX form.
    pub fn adapt(&self, env: &Environment) -> Value {
        let (url, media_url) = match self {
            NotifyOptions::None => return Value::Object(Default::default()),
            NotifyOptions::Url(url) => (url.as_str(), None),
            NotifyOptions::Media { url, media_url } => (url.as_str(), Some(media_url.as_str())),
        };
        if env.is_loon {
            let mut options = json!({ "openUrl": url });
            if let Some(media) = media_url {
                options["mediaUrl"] = json!(media);
            }
            options
        } else if env.is_surge_like {
            json!({ "url": url })
        } else {
            let mut options = json!({ "open-url": url });
            if let Some(media) = media_url {
                options["media-url"] = json!(media);
            }
            options
        }
    }
}

/// Notification poster with optional bark relay
#[derive(Clone)]
pub struct Notifier {
    env: Environment,
    logger: Logger,
    http: HttpClient,
    host: Arc<dyn Host>,
    bark: Arc<RwLock<Option<BarkTarget>>>,
}

impl Notifier {
    /// Create a notifier for the detected environment
    pub fn new(env: Environment, logger: Logger, http: HttpClient, host: Arc<dyn Host>) -> Self {
        Self {
            env,
            logger,
            http,
            host,
            bark: Arc::new(RwLock::new(None)),
        }
    }

    /// Configure the bark relay from a bark app URL such as
    /// `https://api.day.app/<device-key>`. A URL the parser cannot split into
    /// endpoint and device key logs an error and leaves the relay
    /// unconfigured.
    pub fn set_bark(&self, url: &str) {
        let url = url.trim().trim_end_matches('/');
        let target = BARK_ENDPOINT.find(url).and_then(|endpoint| {
            let key = BARK_DEVICE_KEY.captures(&url[endpoint.end()..])?;
            Some(BarkTarget {
                push_url: format!("{}/push", endpoint.as_str()),
                device_key: key[1].to_string(),
            })
        });
        if target.is_none() {
            self.logger.error(format!("Bark URL is invalid: {}", url));
        }
        *self.bark.write() = target;
    }

    /// The configured bark relay target, if any
    pub fn bark_target(&self) -> Option<BarkTarget> {
        self.bark.read().clone()
    }

    /// Post a notification through the host, then relay it to bark when
    /// configured
    pub async fn post(&self, title: &str, sub_title: &str, body: &str, options: NotifyOptions) {
        let content: Vec<&str> = [title, sub_title, body]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();
        self.logger.notify(content.join(" | "));

        let adapted = options.adapt(&self.env);
        self.host.post_notification(title, sub_title, body, &adapted);

        if self.bark_target().is_some() {
            self.bark(title, sub_title, body).await;
        }
    }

    /// Post a notification only when the logger threshold is at DEBUG or
    /// more verbose
    pub async fn debug(&self, title: &str, sub_title: &str, body: &str) {
        if self.logger.level() >= Level::Debug {
            self.post(title, sub_title, body, NotifyOptions::None).await;
        }
    }

    /// Push directly to the configured bark relay, bypassing the host's
    /// notification surface. Logs and returns when no relay is configured.
    pub async fn bark(&self, title: &str, sub_title: &str, body: &str) {
        let Some(target) = self.bark_target() else {
            self.logger.error("Bark relay is not configured");
            return;
        };
        let body_text = if sub_title.is_empty() {
            body.to_string()
        } else {
            format!("{}\n{}", sub_title, body)
        };
        let config = RequestConfig::new(&target.push_url)
            .header(headers::CONTENT_TYPE, "application/json; charset=utf-8")
            .body(json!({
                "title": title,
                "body": body_text,
                "device_key": target.device_key,
            }));
        if let Err(err) = self.http.post(config).await {
            self.logger
                .error(format!("Bark notification failed: {}", err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Globals, HostKind};
    use crate::host::MemoryHost;
    use parking_lot::Mutex;
    use serde_json::json;

    fn notifier(kind: HostKind, marker: &str, level: Level) -> (Notifier, Arc<MemoryHost>) {
        let host = Arc::new(MemoryHost::new(kind));
        let env = Environment::detect(&Globals::new().with_marker(marker));
        let logger = Logger::new("test", level);
        let http = HttpClient::new(env.clone(), logger.clone(), host.clone());
        (Notifier::new(env, logger, http, host.clone()), host)
    }

    #[test]
    fn test_options_adapt_per_host() {
        let loon = Environment::detect(&Globals::new().with_marker("$loon"));
        let quanx = Environment::detect(&Globals::new().with_marker("$task"));
        let surge = Environment::detect(&Globals::new().with_marker("$httpClient"));

        let media = NotifyOptions::Media {
            url: "https://x/open".to_string(),
            media_url: "https://x/pic.jpg".to_string(),
        };
        assert_eq!(
            media.adapt(&loon),
            json!({ "openUrl": "https://x/open", "mediaUrl": "https://x/pic.jpg" })
        );
        assert_eq!(
            media.adapt(&quanx),
            json!({ "open-url": "https://x/open", "media-url": "https://x/pic.jpg" })
        );
        assert_eq!(media.adapt(&surge), json!({ "url": "https://x/open" }));

        let url = NotifyOptions::Url("https://x/open".to_string());
        assert_eq!(url.adapt(&loon), json!({ "openUrl": "https://x/open" }));
        assert_eq!(NotifyOptions::None.adapt(&loon), json!({}));
    }

    #[test]
    fn test_bark_url_parses() {
        let (notifier, _host) = notifier(HostKind::QuanX, "$task", Level::None);
        notifier.set_bark("https://api.day.app/abcdef123/");
        assert_eq!(
            notifier.bark_target(),
            Some(BarkTarget {
                push_url: "https://api.day.app/push".to_string(),
                device_key: "abcdef123".to_string(),
            })
        );
    }

    #[test]
    fn test_bark_url_trailing_slashes_trimmed() {
        let (notifier, _host) = notifier(HostKind::QuanX, "$task", Level::None);
        notifier.set_bark("https://api.day.app/abcdef123///");
        assert_eq!(
            notifier.bark_target(),
            Some(BarkTarget {
                push_url: "https://api.day.app/push".to_string(),
                device_key: "abcdef123".to_string(),
            })
        );
        // A bare endpoint stays malformed no matter how many slashes
        notifier.set_bark("https://api.day.app///");
        assert!(notifier.bark_target().is_none());
    }

    #[test]
    fn test_malformed_bark_url_leaves_relay_unconfigured() {
        let (notifier, _host) = notifier(HostKind::QuanX, "$task", Level::None);
        notifier.set_bark("not a url");
        assert!(notifier.bark_target().is_none());
        notifier.set_bark("https://api.day.app");
        assert!(notifier.bark_target().is_none());
        notifier.set_bark("https://api.day.app/too/many/segments");
        assert!(notifier.bark_target().is_none());
    }

    #[tokio::test]
    async fn test_post_reaches_host_and_bark() {
        let (notifier, host) = notifier(HostKind::QuanX, "$task", Level::None);
        let seen: Arc<Mutex<Vec<RequestConfig>>> = Arc::new(Mutex::new(Vec::new()));
        let record = seen.clone();
        host.on_dispatch(move |config| {
            record.lock().push(config);
            Box::pin(async { Ok(Default::default()) })
        });
        notifier.set_bark("https://api.day.app/key123");

        notifier
            .post(
                "Title",
                "Sub",
                "Body",
                NotifyOptions::Url("https://x".to_string()),
            )
            .await;

        let posted = host.notifications();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].title, "Title");
        assert_eq!(posted[0].options["open-url"], "https://x");

        let relayed = seen.lock();
        assert_eq!(relayed.len(), 1);
        assert_eq!(relayed[0].url, "https://api.day.app/push");
        assert_eq!(relayed[0].method_str(), "POST");
        // QuantumultX dispatch receives the JSON body as text
        let body: Value =
            serde_json::from_str(relayed[0].body.as_ref().unwrap().as_str().unwrap()).unwrap();
        assert_eq!(body["title"], "Title");
        assert_eq!(body["body"], "Sub\nBody");
        assert_eq!(body["device_key"], "key123");
    }

    #[tokio::test]
    async fn test_direct_bark_push_skips_host_notification() {
        let (notifier, host) = notifier(HostKind::QuanX, "$task", Level::None);
        let seen: Arc<Mutex<Vec<RequestConfig>>> = Arc::new(Mutex::new(Vec::new()));
        let record = seen.clone();
        host.on_dispatch(move |config| {
            record.lock().push(config);
            Box::pin(async { Ok(Default::default()) })
        });
        notifier.set_bark("https://api.day.app/key123");

        notifier.bark("Title", "", "Body").await;

        assert!(host.notifications().is_empty());
        let relayed = seen.lock();
        assert_eq!(relayed.len(), 1);
        assert_eq!(relayed[0].url, "https://api.day.app/push");
    }

    #[tokio::test]
    async fn test_bark_without_relay_is_a_no_op() {
        let (notifier, host) = notifier(HostKind::QuanX, "$task", Level::None);
        let seen: Arc<Mutex<Vec<RequestConfig>>> = Arc::new(Mutex::new(Vec::new()));
        let record = seen.clone();
        host.on_dispatch(move |config| {
            record.lock().push(config);
            Box::pin(async { Ok(Default::default()) })
        });

        notifier.bark("Title", "", "Body").await;
        assert!(seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_bark_failure_does_not_propagate() {
        let (notifier, host) = notifier(HostKind::QuanX, "$task", Level::None);
        host.respond_with(500, "relay down");
        notifier.set_bark("https://api.day.app/key123");

        notifier.post("Title", "", "Body", NotifyOptions::None).await;
        // The host-side notification still went out
        assert_eq!(host.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_debug_notification_gated_on_threshold() {
        let (notifier, host) = notifier(HostKind::QuanX, "$task", Level::Info);
        notifier.debug("t", "s", "b").await;
        assert!(host.notifications().is_empty());

        let (notifier, host) = self::notifier(HostKind::QuanX, "$task", Level::Debug);
        notifier.debug("t", "s", "b").await;
        assert_eq!(host.notifications().len(), 1);
    }
}
