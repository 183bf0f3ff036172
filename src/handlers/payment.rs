use crate::external::PaymentGateway;
use crate::models::{CreatePaymentRequest, CreatePaymentResponse, IdempotencyKey};
use actix_web::{HttpResponse, ResponseError, Result, web};

/// Payment-creation relay: validates the order, attaches a fresh idempotency
/// key, and forwards it to the provider. Single attempt, fail closed.
pub async fn create_payment(
    gateway: web::Data<dyn PaymentGateway>,
    request: web::Json<CreatePaymentRequest>,
) -> Result<HttpResponse> {
    let order = match request.validate() {
        Ok(order) => order,
        Err(e) => return Ok(e.error_response()),
    };

    let idempotence_key = IdempotencyKey::new();
    match gateway.create_payment(&order, &idempotence_key).await {
        Ok(created) => Ok(HttpResponse::Ok().json(CreatePaymentResponse {
            confirmation_url: created.confirmation_url,
        })),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/create-payment", web::post().to(create_payment));
}
