use crate::error::AppError;
use crate::external::GenerateApi;
use crate::middlewares::create_cors;
use crate::models::GenerateRequest;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// LLM relay: injects the server-held API key and forwards the prompt to the
/// generation endpoint, returning the upstream JSON verbatim.
pub async fn generate(
    api: web::Data<dyn GenerateApi>,
    request: web::Json<GenerateRequest>,
) -> Result<HttpResponse> {
    let Some(prompt) = request.prompt() else {
        return Ok(
            AppError::ValidationError("A prompt is required".to_string()).error_response(),
        );
    };

    match api.generate(prompt).await {
        Ok(body) => Ok(HttpResponse::Ok().json(body)),
        Err(e) => Ok(e.error_response()),
    }
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(json!({ "error": "Method Not Allowed" }))
}

pub fn gemini_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/gemini-proxy")
            .route(web::post().to(generate))
            .default_service(web::to(method_not_allowed))
            .wrap(create_cors()),
    );
}
