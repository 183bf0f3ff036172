use crate::config::TelegramConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

/// The one Bot API call this service makes: the synchronous pre-checkout
/// acknowledgment. The platform owns retry and timeout semantics, so this is
/// a single attempt.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Whether the bot token is present. The bot webhook answers with a
    /// configuration error when this is false instead of acknowledging.
    fn is_configured(&self) -> bool {
        true
    }

    async fn answer_pre_checkout_query(&self, query_id: &str, ok: bool) -> AppResult<()>;
}

#[derive(Clone)]
pub struct TelegramService {
    client: Client,
    config: TelegramConfig,
}

impl TelegramService {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_url, self.config.bot_token, method
        )
    }
}

#[async_trait]
impl BotApi for TelegramService {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn answer_pre_checkout_query(&self, query_id: &str, ok: bool) -> AppResult<()> {
        if !self.config.is_configured() {
            return Err(AppError::ConfigError("BOT_TOKEN is not set".to_string()));
        }

        let response = self
            .client
            .post(self.method_url("answerPreCheckoutQuery"))
            .json(&json!({
                "pre_checkout_query_id": query_id,
                "ok": ok,
            }))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() || body.get("ok").and_then(Value::as_bool) != Some(true) {
            let message = body
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("answerPreCheckoutQuery rejected")
                .to_string();
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
