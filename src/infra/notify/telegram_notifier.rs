use std::time::Duration;

use crate::domain::ports::Notifier;
use crate::error::EngineError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

pub struct TelegramNotifier {
    client: Client,
    api_url: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_url: format!("https://api.telegram.org/bot{bot_token}/sendMessage"),
        }
    }
}

#[derive(Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, recipient_external_id: &str, text: &str) -> Result<(), EngineError> {
        let payload = SendMessagePayload { chat_id: recipient_external_id, text };

        let res = self.client.post(&self.api_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EngineError::Transient(format!("Telegram connection error: {e}")))?;

        let status = res.status();
        if status.is_success() {
            return Ok(());
        }

        let body = res.text().await.unwrap_or_default();
        let description = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("description").and_then(|d| d.as_str()).map(str::to_string))
            .unwrap_or(body);

        // 429 and 5xx are worth retrying; anything else is a hard reject.
        if status.as_u16() == 429 || status.is_server_error() {
            error!("Telegram API transient failure. Status: {}, {}", status, description);
            Err(EngineError::Transient(format!("Telegram API {status}: {description}")))
        } else {
            error!("Telegram API rejected message. Status: {}, {}", status, description);
            Err(EngineError::Notify(format!("Telegram API {status}: {description}")))
        }
    }
}
