use std::env;
use std::sync::{Arc, PoisonError, RwLock};

use url::Url;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slack_bot_token: String,
    /// Gates interactive message actions. No actions are defined yet, so
    /// the flag currently has no visible effect.
    pub interactive_messages: bool,
    /// Public base URL of the alerting application, used to build deep
    /// links to alert and service pages.
    pub public_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            slack_bot_token: env::var("SLACK_BOT_TOKEN")
                .map_err(|e| format!("SLACK_BOT_TOKEN: {e}"))?,
            interactive_messages: env::var("SLACK_INTERACTIVE_MESSAGES")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            public_url: env::var("PUBLIC_URL").map_err(|e| format!("PUBLIC_URL: {e}"))?,
        })
    }

    /// Build an absolute deep link to an application page.
    #[must_use]
    pub fn callback_url(&self, path: &str) -> String {
        match Url::parse(&self.public_url).and_then(|base| base.join(path)) {
            Ok(joined) => joined.to_string(),
            Err(_) => format!("{}{}", self.public_url.trim_end_matches('/'), path),
        }
    }
}

/// Shared handle to the current configuration.
///
/// The bot token can be rotated at runtime; callers take a `snapshot()` per
/// operation so a replacement is picked up on the next call without
/// rebuilding any component.
#[derive(Clone)]
pub struct ConfigSource {
    inner: Arc<RwLock<AppConfig>>,
}

impl ConfigSource {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> AppConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new configuration, visible to all holders of this handle.
    pub fn replace(&self, config: AppConfig) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = config;
    }
}
