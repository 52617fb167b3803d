use crate::config::TelegramConfig;
use anyhow::bail;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

#[derive(Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

/// Thin client for the Telegram Bot API, only covering `sendMessage`.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: Url,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Sends a plain-text message to the given chat via the given bot.
    pub async fn send_message(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
    ) -> anyhow::Result<()> {
        // The leading `./` keeps the colon inside the token from being
        // interpreted as a URL scheme.
        let url = self
            .base_url
            .join(&format!("./bot{bot_token}/sendMessage"))?;

        let response = self
            .client
            .post(url)
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    anyhow::anyhow!("Telegram API request timed out.")
                } else {
                    anyhow::anyhow!(err)
                }
            })?;

        let status = response.status();
        let result = response.json::<SendMessageResponse>().await.ok();
        let ok = status.is_success() && result.as_ref().map(|r| r.ok).unwrap_or_default();
        if !ok {
            let description = result.and_then(|r| r.description);
            bail!(
                "{}",
                description.unwrap_or_else(|| "Telegram API request failed.".to_string())
            );
        }

        Ok(())
    }
}
