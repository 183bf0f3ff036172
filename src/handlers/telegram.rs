use crate::error::AppError;
use crate::external::BotApi;
use crate::models::Update;
use actix_web::{HttpResponse, ResponseError, Result, web};
use log::{error, info, warn};

/// Bot-platform webhook. Two update kinds matter: the pre-checkout query,
/// which must be affirmatively acknowledged before the platform timeout or
/// the charge is canceled, and the successful-payment message.
///
/// The successful-payment branch only logs. Subscription activation happens
/// exclusively through the payment-provider webhook; these are two parallel
/// payment entry points with inconsistent side effects.
/// TODO: route successful_payment through the Reconciler so both entry
/// points update the profile, or retire this branch once the provider
/// webhook is confirmed to cover all payment flows.
pub async fn telegram_webhook(
    body: web::Bytes,
    bot: web::Data<dyn BotApi>,
) -> Result<HttpResponse> {
    if !bot.is_configured() {
        return Ok(AppError::ConfigError("BOT_TOKEN is not set".to_string()).error_response());
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Unparseable bot update, acknowledging without action: {e}");
            return Ok(HttpResponse::Ok().body("OK"));
        }
    };

    if let Some(query) = &update.pre_checkout_query {
        // Single synchronous attempt; the platform owns retry semantics.
        if let Err(e) = bot.answer_pre_checkout_query(&query.id, true).await {
            error!(
                "Failed to answer pre-checkout query {} (update {}): {e}",
                query.id, update.update_id
            );
        }
    } else if let Some(message) = &update.message
        && let Some(payment) = &message.successful_payment
    {
        let user_id = message.from.as_ref().map(|u| u.id);
        info!(
            "Successful payment received (update {}, user {:?}, charge {:?}, amount {:?} {:?})",
            update.update_id,
            user_id,
            payment.telegram_payment_charge_id,
            payment.total_amount,
            payment.currency
        );
    }

    Ok(HttpResponse::Ok().body("OK"))
}

pub fn telegram_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/telegram-webhook", web::post().to(telegram_webhook));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppResult;
    use actix_web::{App, http::StatusCode, test};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingBot {
        answers: Mutex<Vec<(String, bool)>>,
        unconfigured: bool,
    }

    #[async_trait]
    impl BotApi for RecordingBot {
        fn is_configured(&self) -> bool {
            !self.unconfigured
        }

        async fn answer_pre_checkout_query(&self, query_id: &str, ok: bool) -> AppResult<()> {
            self.answers.lock().unwrap().push((query_id.to_string(), ok));
            Ok(())
        }
    }

    macro_rules! app_with {
        ($bot:expr) => {{
            let bot: Arc<dyn BotApi> = $bot.clone();
            test::init_service(
                App::new()
                    .app_data(web::Data::from(bot))
                    .configure(telegram_config),
            )
            .await
        }};
    }

    macro_rules! post_update {
        ($app:expr, $body:expr) => {{
            let req = test::TestRequest::post()
                .uri("/telegram-webhook")
                .insert_header(("content-type", "application/json"))
                .set_payload($body)
                .to_request();
            test::call_service(&$app, req).await.status()
        }};
    }

    #[actix_web::test]
    async fn pre_checkout_query_is_acknowledged_affirmatively() {
        let bot = Arc::new(RecordingBot::default());
        let app = app_with!(bot);

        let status = post_update!(
            app,
            r#"{"update_id": 1, "pre_checkout_query": {"id": "q-9", "from": {"id": 42}}}"#
        );

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            bot.answers.lock().unwrap().as_slice(),
            &[("q-9".to_string(), true)]
        );
    }

    #[actix_web::test]
    async fn successful_payment_is_logged_only() {
        let bot = Arc::new(RecordingBot::default());
        let app = app_with!(bot);

        let status = post_update!(
            app,
            r#"{"update_id": 2, "message": {"from": {"id": 42}, "successful_payment": {"currency": "RUB", "total_amount": 19900}}}"#
        );

        assert_eq!(status, StatusCode::OK);
        assert_eq!(bot.answers.lock().unwrap().len(), 0);
    }

    #[actix_web::test]
    async fn unparseable_update_is_acknowledged() {
        let bot = Arc::new(RecordingBot::default());
        let app = app_with!(bot);

        let status = post_update!(app, "not json");

        assert_eq!(status, StatusCode::OK);
        assert_eq!(bot.answers.lock().unwrap().len(), 0);
    }

    #[actix_web::test]
    async fn missing_bot_token_yields_500() {
        let bot = Arc::new(RecordingBot {
            unconfigured: true,
            ..RecordingBot::default()
        });
        let app = app_with!(bot);

        let status = post_update!(
            app,
            r#"{"update_id": 4, "pre_checkout_query": {"id": "q-9", "from": {"id": 42}}}"#
        );

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(bot.answers.lock().unwrap().len(), 0);
    }

    #[actix_web::test]
    async fn unrelated_update_kinds_are_ignored() {
        let bot = Arc::new(RecordingBot::default());
        let app = app_with!(bot);

        let status = post_update!(
            app,
            r#"{"update_id": 3, "message": {"from": {"id": 42}, "text": "hello"}}"#
        );

        assert_eq!(status, StatusCode::OK);
        assert_eq!(bot.answers.lock().unwrap().len(), 0);
    }
}
