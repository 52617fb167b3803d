use serde_derive::{Deserialize, Serialize};
use url::Url;

/// Configuration for the Telegram Bot API client.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    /// Base URL of the Telegram Bot API.
    pub base_url: Url,
    /// Timeout applied to every Telegram request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://api.telegram.org")
                .expect("Cannot parse Telegram base URL parameter."),
            request_timeout_secs: 10,
        }
    }
}
