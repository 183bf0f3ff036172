use crate::config::GeminiConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

/// Upstream LLM generation capability, one call per inbound relay request.
#[async_trait]
pub trait GenerateApi: Send + Sync {
    async fn generate(&self, prompt: &str) -> AppResult<Value>;
}

#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    config: GeminiConfig,
}

impl GeminiService {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        )
    }
}

#[async_trait]
impl GenerateApi for GeminiService {
    async fn generate(&self, prompt: &str) -> AppResult<Value> {
        if !self.config.is_configured() {
            return Err(AppError::ConfigError(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }

        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(self.generate_url())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP error: {}", status.as_u16()));
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}
