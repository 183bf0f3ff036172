use actix_cors::Cors;

/// Permissive CORS for the LLM relay only; the mini-app frontend calls it
/// straight from the browser. The payment and webhook routes are
/// server-to-server and are not wrapped.
pub fn create_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["POST", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}
