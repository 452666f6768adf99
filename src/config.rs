//! Store configuration.
//!
//! Hosts usually ship the configuration as JSON next to the app bundle:
//!
//! ```rust
//! use mindcare_store::config::StoreConfig;
//!
//! let config = StoreConfig::from_json_str(r#"{"pollIntervalMs": 2000}"#)?;
//! assert_eq!(config.poll_interval().as_millis(), 2000);
//! assert!(config.seed_sample_data);
//! # Ok::<(), mindcare_store::app_response::AppResponse>(())
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_CHAT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_CONVERSATION_POLL_INTERVAL_MS: u64 = 3_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// How often polling readers refresh their snapshot.
    pub poll_interval_ms: u64,
    /// Refresh period of an open chat room.
    pub chat_poll_interval_ms: u64,
    /// Refresh period of the doctor's conversation list.
    pub conversation_poll_interval_ms: u64,
    /// Insert the fixed sample records when the store is created.
    pub seed_sample_data: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            chat_poll_interval_ms: DEFAULT_CHAT_POLL_INTERVAL_MS,
            conversation_poll_interval_ms: DEFAULT_CONVERSATION_POLL_INTERVAL_MS,
            seed_sample_data: true,
        }
    }
}

impl StoreConfig {
    pub fn from_json_str(json: &str) -> Result<Self, AppResponse> {
        let config: StoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sub-millisecond intervals round up to 1 ms; only `Duration::ZERO` stays zero.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval_millis(interval);
        self
    }

    pub fn with_chat_poll_interval(mut self, interval: Duration) -> Self {
        self.chat_poll_interval_ms = interval_millis(interval);
        self
    }

    pub fn with_conversation_poll_interval(mut self, interval: Duration) -> Self {
        self.conversation_poll_interval_ms = interval_millis(interval);
        self
    }

    pub fn with_seed_sample_data(mut self, seed: bool) -> Self {
        self.seed_sample_data = seed;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn chat_poll_interval(&self) -> Duration {
        Duration::from_millis(self.chat_poll_interval_ms)
    }

    pub fn conversation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.conversation_poll_interval_ms)
    }

    pub fn validate(&self) -> Result<(), AppResponse> {
        let intervals = [
            ("pollIntervalMs", self.poll_interval_ms),
            ("chatPollIntervalMs", self.chat_poll_interval_ms),
            ("conversationPollIntervalMs", self.conversation_poll_interval_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(AppResponse::ValidationError(format!("{name} must be greater than zero")));
            }
        }
        Ok(())
    }
}

fn interval_millis(interval: Duration) -> u64 {
    if interval.is_zero() {
        return 0;
    }
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX).max(1)
}
