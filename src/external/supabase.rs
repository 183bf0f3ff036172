use crate::config::SupabaseConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::json;

/// Keyed conditional update against the record store: one subscription record
/// per external user id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whether the store credentials are present. Routes that depend on the
    /// store answer with a configuration error when this is false, before any
    /// notification processing starts.
    fn is_configured(&self) -> bool {
        true
    }

    async fn activate_subscription(
        &self,
        user_id: &str,
        end_date: DateTime<Utc>,
    ) -> AppResult<()>;
}

#[derive(Clone)]
pub struct SupabaseService {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseService {
    pub fn new(config: SupabaseConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn update_url(&self, user_id: &str) -> String {
        format!(
            "{}/rest/v1/{}?id=eq.{}",
            self.config.url, self.config.profiles_table, user_id
        )
    }
}

#[async_trait]
impl RecordStore for SupabaseService {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn activate_subscription(
        &self,
        user_id: &str,
        end_date: DateTime<Utc>,
    ) -> AppResult<()> {
        if !self.config.is_configured() {
            return Err(AppError::ConfigError(
                "SUPABASE_URL / SUPABASE_SERVICE_KEY are not set".to_string(),
            ));
        }

        let response = self
            .client
            .patch(self.update_url(user_id))
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
            .header("Prefer", "return=minimal")
            .json(&json!({
                "subscription_is_active": true,
                "subscription_end_date": end_date.to_rfc3339(),
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: format!("Profile update rejected: {detail}"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_url_filters_on_user_id() {
        let service = SupabaseService::new(SupabaseConfig {
            url: "https://example.supabase.co".into(),
            service_key: "service".into(),
            profiles_table: "profiles".into(),
        });
        assert_eq!(
            service.update_url("u-17"),
            "https://example.supabase.co/rest/v1/profiles?id=eq.u-17"
        );
    }
}
