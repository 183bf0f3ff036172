use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use miniapp_gateway::{
    config::Config,
    external::{
        BotApi, GeminiService, GenerateApi, PaymentGateway, SupabaseService, TelegramService,
        YooKassaService,
    },
    handlers,
    services::{AllowAllVerifier, Reconciler},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    // One client per third-party API, constructed once and shared read-only.
    let gemini: Arc<dyn GenerateApi> = Arc::new(GeminiService::new(config.gemini.clone()));
    let gateway: Arc<dyn PaymentGateway> = Arc::new(YooKassaService::new(config.yookassa.clone()));
    let bot: Arc<dyn BotApi> = Arc::new(TelegramService::new(config.telegram.clone()));
    let reconciler = web::Data::new(Reconciler::new(
        Arc::new(SupabaseService::new(config.supabase.clone())),
        Arc::new(AllowAllVerifier),
    ));

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::from(gemini.clone()))
            .app_data(web::Data::from(gateway.clone()))
            .app_data(web::Data::from(bot.clone()))
            .app_data(reconciler.clone())
            .service(
                web::scope("/api")
                    .configure(handlers::gemini_config)
                    .configure(handlers::payment_config)
                    .configure(handlers::webhook_config)
                    .configure(handlers::telegram_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
