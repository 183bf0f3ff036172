use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound body of the payment-creation relay. Everything is optional at the
/// serde layer; `validate` turns the raw body into a `PaymentOrder` or a 400.
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub bot_username: Option<String>,
    #[serde(default)]
    pub app_name: Option<String>,
}

impl CreatePaymentRequest {
    pub fn validate(&self) -> AppResult<PaymentOrder> {
        let user_id = non_empty(self.user_id.as_deref());
        let description = non_empty(self.description.as_deref());
        let bot_username = non_empty(self.bot_username.as_deref());
        let app_name = non_empty(self.app_name.as_deref());
        let amount = self.amount.filter(|a| *a > 0.0);

        match (user_id, amount, description, bot_username, app_name) {
            (Some(user_id), Some(amount), Some(description), Some(bot_username), Some(app_name)) => {
                Ok(PaymentOrder {
                    user_id: user_id.to_string(),
                    amount,
                    description: description.to_string(),
                    return_url: format!("https://t.me/{bot_username}/{app_name}"),
                })
            }
            _ => Err(AppError::ValidationError(
                "Missing required fields".to_string(),
            )),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Validated payment-creation input handed to the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOrder {
    pub user_id: String,
    pub amount: f64,
    pub description: String,
    pub return_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub confirmation_url: String,
}

/// Single-use token attached to each outbound payment-creation request so the
/// provider can deduplicate a retried attempt. Never reused, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Asynchronous notification delivered by the payment provider. Deserialized
/// leniently: absent structure means "nothing to act on", never an error back
/// to the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentNotification {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub object: Option<PaymentObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: Option<PaymentMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMetadata {
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
}

impl PaymentNotification {
    /// The user to activate, present only for an actionable
    /// `payment.succeeded` notification whose object status is `succeeded`.
    pub fn succeeded_payment(&self) -> Option<&PaymentObject> {
        if self.event.as_deref() != Some("payment.succeeded") {
            return None;
        }
        self.object
            .as_ref()
            .filter(|o| o.status.as_deref() == Some("succeeded"))
    }
}
