use std::sync::Arc;

use actix_web::{web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use gemini_chat::config::AppConfig;
use gemini_chat::model::GeminiModel;
use gemini_chat::web::routes;
use gemini_chat::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Gemini chat relay");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Provider handle shared read-only by every request
    let model = match GeminiModel::new(&config) {
        Ok(model) => {
            info!("Gemini client initialized for model {}", config.model);
            model
        }
        Err(e) => {
            error!("Failed to initialize Gemini client: {:#}", e);
            std::process::exit(1);
        }
    };

    let app_state = Data::new(AppState::new(Arc::new(model)));

    info!("Listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
