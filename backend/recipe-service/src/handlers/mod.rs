pub mod recipes;

use crate::config::EnsembleConfig;
use crate::error::AppError;
use crate::services::RecommendationEnsemble;
use actix_web::web;
use std::sync::Arc;

/// Shared per-process state injected into handlers: the ensemble built at
/// startup plus request defaults.
pub struct AppState {
    pub ensemble: Arc<RecommendationEnsemble>,
    pub defaults: EnsembleConfig,
    pub service_name: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    // Undeserializable bodies get the same structured error shape as
    // validation failures.
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }));
    cfg.service(
        web::scope("/api").service(
            web::scope("/recipes")
                .route("/health", web::get().to(recipes::health_check))
                .route("", web::post().to(recipes::get_recipes)),
        ),
    );
}
