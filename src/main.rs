// src/main.rs
use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use coursemely_runner::api::{configure_routes, AppState};
use coursemely_runner::banner;
use coursemely_runner::config::AppConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  Could not load .env file: {}", e);
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    let bind = (app_config.server.host.clone(), app_config.server.port);
    let allowed_origin = app_config.server.cors_allowed_origin.clone();

    if app_config.progress.api_url.is_none() {
        log::warn!("PROGRESS_API_URL is not set; /api/save-video-progress will answer 503");
    }

    let state = AppState::new(app_config);
    log::info!("Using judge '{}'", state.judge.name());
    println!("🚀 Listening on http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = match &allowed_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header(),
            None => Cors::permissive(),
        };

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
