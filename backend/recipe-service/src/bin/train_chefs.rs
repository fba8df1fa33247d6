//! Offline training pipeline.
//!
//! Loads the recipe CSV, slices it into contiguous per-chef subsets,
//! trains one model per chef and writes each as an opaque blob to the
//! models directory. Run once before the serving process starts:
//!
//! ```text
//! CORPUS_FILE=data/recipes_data.csv MODELS_DIR=models cargo run --bin train-chefs
//! ```

use anyhow::{bail, Context, Result};
use chrono::Utc;
use recipe_service::services::{corpus, store, ChefModel};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const CHEF_ROSTER: [&str; 5] = ["Marco", "Sofia", "Raj", "Elena", "Hiroshi"];

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
    dotenvy::dotenv().ok();

    let corpus_file =
        env::var("CORPUS_FILE").unwrap_or_else(|_| "data/recipes_data.csv".to_string());
    let models_dir = env::var("MODELS_DIR").unwrap_or_else(|_| "models".to_string());
    let num_chefs: usize = env::var("NUM_CHEFS")
        .unwrap_or_else(|_| "5".to_string())
        .parse()
        .context("NUM_CHEFS must be a valid usize")?;
    let recipes_per_chef: usize = env::var("RECIPES_PER_CHEF")
        .unwrap_or_else(|_| "1000".to_string())
        .parse()
        .context("RECIPES_PER_CHEF must be a valid usize")?;

    let recipes = corpus::load_csv(
        Path::new(&corpus_file),
        num_chefs * recipes_per_chef,
    )?;
    if recipes.is_empty() {
        bail!("corpus {corpus_file} yielded no usable recipes");
    }

    std::fs::create_dir_all(&models_dir)
        .with_context(|| format!("failed to create models directory {models_dir}"))?;

    let mut trained = 0usize;
    for (i, slice) in recipes.chunks(recipes_per_chef).take(num_chefs).enumerate() {
        let name = format!("Chef {} ({})", i + 1, CHEF_ROSTER[i % CHEF_ROSTER.len()]);
        let mut chef = ChefModel::new(&name, None);

        info!(chef = %name, recipes = slice.len(), "training");
        if let Err(e) = chef.train(slice.to_vec()) {
            // Fatal for this chef's training step, not for the others.
            error!(chef = %name, error = %e, "training failed");
            continue;
        }

        let path = model_path(&models_dir, &name, slice.len());
        store::save_model(&chef, &path)?;
        info!(chef = %name, file = %path.display(), "saved");
        trained += 1;
    }

    if trained == 0 {
        bail!("no chef finished training");
    }
    info!(trained, "training completed");
    Ok(())
}

fn model_path(models_dir: &str, chef_name: &str, recipes: usize) -> PathBuf {
    let slug: String = chef_name
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let stamp = Utc::now().format("%d%m%Y");
    Path::new(models_dir).join(format!("{slug}_{recipes}_recipes_{stamp}.bin"))
}
