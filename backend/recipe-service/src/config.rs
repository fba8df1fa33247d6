use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub ensemble: EnsembleConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub http_port: u16,
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnsembleConfig {
    /// Directory scanned for trained model blobs at startup.
    pub models_dir: String,
    /// Worker pool size for per-request fan-out; 0 means available
    /// hardware parallelism.
    pub workers: usize,
    /// Per-model scoring deadline in milliseconds; a model past the
    /// deadline contributes zero results.
    pub model_timeout_ms: u64,
    pub default_top_n: usize,
    pub default_cosine_weight: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        Ok(Config {
            service: ServiceConfig {
                http_port: parse_var("HTTP_PORT", "8000")?,
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "recipe-service".to_string()),
            },
            ensemble: EnsembleConfig {
                models_dir: env::var("MODELS_DIR").unwrap_or_else(|_| "models".to_string()),
                workers: parse_var("ENSEMBLE_WORKERS", "0")?,
                model_timeout_ms: parse_var("MODEL_TIMEOUT_MS", "2000")?,
                default_top_n: parse_var("DEFAULT_TOP_N", "5")?,
                default_cosine_weight: parse_var("DEFAULT_COSINE_WEIGHT", "0.7")?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string()),
            },
        })
    }
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e: T::Err| anyhow::anyhow!("{name} is invalid: {e}"))
}
