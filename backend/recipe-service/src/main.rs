use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use recipe_service::handlers::{self, AppState};
use recipe_service::services::{store, RecommendationEnsemble};
use recipe_service::Config;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Load config
    let config = Config::from_env()?;

    info!(
        "Starting {} on HTTP:{}",
        config.service.service_name, config.service.http_port
    );

    // Load trained chef models and assemble the ensemble. The ensemble is
    // built once here and injected; it never mutates while serving.
    let chefs = store::load_all(Path::new(&config.ensemble.models_dir))?;
    let mut ensemble = RecommendationEnsemble::new(
        config.ensemble.workers,
        Duration::from_millis(config.ensemble.model_timeout_ms),
    );
    for chef in chefs {
        ensemble.register(Arc::new(chef));
    }
    info!(chefs = ensemble.len(), "ensemble ready");

    let ensemble = Arc::new(ensemble);
    let defaults = config.ensemble.clone();
    let service_name = config.service.service_name.clone();
    let allowed_origins = config.cors.allowed_origins.clone();

    HttpServer::new(move || {
        let cors = if allowed_origins == "*" {
            Cors::permissive()
        } else {
            let mut cors = Cors::default()
                .allow_any_method()
                .allow_any_header()
                .max_age(600);
            for origin in allowed_origins.split(',') {
                cors = cors.allowed_origin(origin.trim());
            }
            cors
        };

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(web::Data::new(AppState {
                ensemble: Arc::clone(&ensemble),
                defaults: defaults.clone(),
                service_name: service_name.clone(),
            }))
            .configure(handlers::configure)
    })
    .bind(("0.0.0.0", config.service.http_port))?
    .run()
    .await?;

    Ok(())
}
