use crate::config::YookassaConfig;
use crate::error::{AppError, AppResult};
use crate::models::{IdempotencyKey, PaymentOrder};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

/// Payment-creation capability of the provider. One outbound call per inbound
/// request; the idempotency key is generated by the caller so the provider can
/// deduplicate client-side retries of the same attempt.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment(
        &self,
        order: &PaymentOrder,
        idempotence_key: &IdempotencyKey,
    ) -> AppResult<CreatedPayment>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedPayment {
    pub confirmation_url: String,
}

#[derive(Clone)]
pub struct YooKassaService {
    client: Client,
    config: YookassaConfig,
}

impl YooKassaService {
    pub fn new(config: YookassaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn payment_body(order: &PaymentOrder) -> Value {
        json!({
            "amount": {
                "value": format!("{:.2}", order.amount),
                "currency": "RUB"
            },
            "confirmation": {
                "type": "redirect",
                "return_url": order.return_url
            },
            "capture": true,
            "description": order.description,
            "metadata": {
                "userId": order.user_id
            }
        })
    }
}

#[async_trait]
impl PaymentGateway for YooKassaService {
    async fn create_payment(
        &self,
        order: &PaymentOrder,
        idempotence_key: &IdempotencyKey,
    ) -> AppResult<CreatedPayment> {
        if !self.config.is_configured() {
            return Err(AppError::ConfigError(
                "YOOKASSA_SHOP_ID / YOOKASSA_SECRET_KEY are not set".to_string(),
            ));
        }

        let response = self
            .client
            .post(&self.config.api_url)
            .basic_auth(&self.config.shop_id, Some(&self.config.secret_key))
            .header("Idempotence-Key", idempotence_key.as_str())
            .json(&Self::payment_body(order))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() {
            let message = body
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| "Failed to create payment".to_string());
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let confirmation_url = body
            .pointer("/confirmation/confirmation_url")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::InternalError(
                    "Payment provider response is missing confirmation_url".to_string(),
                )
            })?;

        Ok(CreatedPayment {
            confirmation_url: confirmation_url.to_string(),
        })
    }
}
