//! Telegram delivery for prediction cards.
//!
//! Failure never escapes this boundary: missing credentials disable the
//! channel entirely and transport errors come back as `false`, logged by the
//! caller. The rest of the system keeps running without notifications.

use crate::domain::ports::NotificationService;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub channel_id: Option<String>,
}

impl TelegramConfig {
    fn credentials(&self) -> Option<(&str, &str)> {
        match (self.bot_token.as_deref(), self.channel_id.as_deref()) {
            (Some(token), Some(channel)) if !token.is_empty() && !channel.is_empty() => {
                Some((token, channel))
            }
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

pub struct TelegramNotificationService {
    client: Client,
    config: TelegramConfig,
}

impl TelegramNotificationService {
    pub fn new(config: TelegramConfig) -> Self {
        if config.credentials().is_none() {
            info!("Telegram credentials absent, notifications disabled");
        }
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl NotificationService for TelegramNotificationService {
    async fn send(&self, message: &str) -> Result<bool> {
        let Some((token, channel)) = self.config.credentials() else {
            debug!("Notification skipped (channel disabled)");
            return Ok(false);
        };

        let url = format!("https://api.telegram.org/bot{token}/sendMessage");
        let payload = SendMessagePayload {
            chat_id: channel,
            text: message,
            parse_mode: "HTML",
        };

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .timeout(SEND_TIMEOUT)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => Ok(true),
            Ok(response) => {
                warn!("Telegram rejected message: HTTP {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Telegram request failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credentials_disable_delivery() {
        let service = TelegramNotificationService::new(TelegramConfig::default());
        assert!(!service.send("hello").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_credentials_disable_delivery() {
        let service = TelegramNotificationService::new(TelegramConfig {
            bot_token: Some(String::new()),
            channel_id: Some("@channel".to_string()),
        });
        assert!(!service.send("hello").await.unwrap());
    }

    #[test]
    fn test_credentials_require_both_halves() {
        let config = TelegramConfig {
            bot_token: Some("123:abc".to_string()),
            channel_id: None,
        };
        assert!(config.credentials().is_none());

        let config = TelegramConfig {
            bot_token: Some("123:abc".to_string()),
            channel_id: Some("@channel".to_string()),
        };
        assert_eq!(config.credentials(), Some(("123:abc", "@channel")));
    }
}
