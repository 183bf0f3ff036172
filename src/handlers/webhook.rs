use crate::error::AppError;
use crate::models::PaymentNotification;
use crate::services::Reconciler;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use log::warn;

/// Payment-provider webhook. Once processing starts it always acknowledges
/// with 200: the provider treats any non-2xx as "retry", and neither a
/// malformed payload nor a downstream store failure can be fixed by
/// redelivery. The exceptions are missing store credentials, answered with a
/// configuration error up front, and a handler crash before any response
/// write (500).
pub async fn yookassa_webhook(
    req: HttpRequest,
    body: web::Bytes,
    reconciler: web::Data<Reconciler>,
) -> Result<HttpResponse> {
    if !reconciler.is_configured() {
        return Ok(AppError::ConfigError(
            "SUPABASE_URL / SUPABASE_SERVICE_KEY are not set".to_string(),
        )
        .error_response());
    }

    let signature = req
        .headers()
        .get("X-Payment-Signature")
        .and_then(|v| v.to_str().ok());

    if !reconciler.verify(&body, signature) {
        warn!("Webhook notification failed verification, acknowledging without action");
        return Ok(HttpResponse::Ok().body("OK"));
    }

    let notification: PaymentNotification = match serde_json::from_slice(&body) {
        Ok(notification) => notification,
        Err(e) => {
            // Non-actionable, not failed: a 5xx here would make the provider
            // redeliver the same unparseable payload forever.
            warn!("Unparseable webhook payload, acknowledging without action: {e}");
            return Ok(HttpResponse::Ok().body("OK"));
        }
    };

    // Outcome (applied, ignored, store failure) is logged by the reconciler;
    // the response does not depend on it.
    reconciler.process(&notification).await;

    Ok(HttpResponse::Ok().body("OK"))
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/yookassa-webhook", web::post().to(yookassa_webhook));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::reconciler::tests::InMemoryRecordStore;
    use crate::services::{AllowAllVerifier, WebhookVerifier};
    use actix_web::{App, http::StatusCode, test};
    use std::sync::Arc;

    macro_rules! app_with {
        ($store:expr, $verifier:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(Reconciler::new(
                        $store.clone(),
                        Arc::new($verifier),
                    )))
                    .configure(webhook_config),
            )
            .await
        };
    }

    macro_rules! post_raw {
        ($app:expr, $body:expr) => {{
            let req = test::TestRequest::post()
                .uri("/yookassa-webhook")
                .insert_header(("content-type", "application/json"))
                .set_payload($body)
                .to_request();
            test::call_service(&$app, req).await.status()
        }};
    }

    #[actix_web::test]
    async fn malformed_payload_is_acknowledged() {
        let store: Arc<InMemoryRecordStore> = Arc::new(InMemoryRecordStore::default());
        let app = app_with!(store, AllowAllVerifier);

        let status = post_raw!(app, "this is not json");

        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.update_count(), 0);
    }

    #[actix_web::test]
    async fn irrelevant_event_is_acknowledged_without_store_call() {
        let store: Arc<InMemoryRecordStore> = Arc::new(InMemoryRecordStore::default());
        let app = app_with!(store, AllowAllVerifier);

        let status = post_raw!(app, r#"{"event":"payment.canceled","object":{"status":"canceled"}}"#);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.update_count(), 0);
    }

    #[actix_web::test]
    async fn successful_notification_updates_the_store() {
        let store: Arc<InMemoryRecordStore> = Arc::new(InMemoryRecordStore::default());
        let app = app_with!(store, AllowAllVerifier);

        let status = post_raw!(app, r#"{"event":"payment.succeeded","object":{"id":"p1","status":"succeeded","metadata":{"userId":"u-7"}}}"#);

        assert_eq!(status, StatusCode::OK);
        let updates = store.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "u-7");
    }

    #[actix_web::test]
    async fn store_failure_still_acknowledges() {
        let store: Arc<InMemoryRecordStore> = Arc::new(InMemoryRecordStore::failing());
        let app = app_with!(store, AllowAllVerifier);

        let status = post_raw!(app, r#"{"event":"payment.succeeded","object":{"status":"succeeded","metadata":{"userId":"u-7"}}}"#);

        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn missing_store_credentials_yield_500_before_processing() {
        let store: Arc<InMemoryRecordStore> = Arc::new(InMemoryRecordStore::unconfigured());
        let app = app_with!(store, AllowAllVerifier);

        let req = test::TestRequest::post()
            .uri("/yookassa-webhook")
            .insert_header(("content-type", "application/json"))
            .set_payload(
                r#"{"event":"payment.succeeded","object":{"status":"succeeded","metadata":{"userId":"u-7"}}}"#,
            )
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Server configuration error.");
        assert_eq!(store.update_count(), 0);
    }

    struct RejectAll;

    impl WebhookVerifier for RejectAll {
        fn verify(&self, _raw_body: &[u8], _signature: Option<&str>) -> bool {
            false
        }
    }

    #[actix_web::test]
    async fn rejected_verification_acknowledges_without_action() {
        let store: Arc<InMemoryRecordStore> = Arc::new(InMemoryRecordStore::default());
        let app = app_with!(store, RejectAll);

        let body = serde_json::to_string(&serde_json::json!({
            "event": "payment.succeeded",
            "object": { "status": "succeeded", "metadata": { "userId": "u-7" } }
        }))
        .unwrap();
        let req = test::TestRequest::post()
            .uri("/yookassa-webhook")
            .insert_header(("content-type", "application/json"))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(store.update_count(), 0);
    }
}
