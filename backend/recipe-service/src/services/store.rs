//! Trained-model persistence.
//!
//! Chefs are produced once by the offline training pipeline and stored as
//! opaque bincode blobs; serving loads them at startup and treats them as
//! read-only. A file that fails to load is skipped with an error log,
//! never aborting startup.

use crate::services::chef::ChefModel;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{error, info, warn};

const MODEL_EXTENSION: &str = "bin";

pub fn save_model(chef: &ChefModel, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create model file {}", path.display()))?;
    bincode::serialize_into(BufWriter::new(file), chef)
        .with_context(|| format!("failed to serialize model {}", chef.name()))?;
    Ok(())
}

pub fn load_model(path: &Path) -> Result<ChefModel> {
    let file = File::open(path)
        .with_context(|| format!("failed to open model file {}", path.display()))?;
    let chef: ChefModel = bincode::deserialize_from(BufReader::new(file))
        .with_context(|| format!("failed to deserialize model {}", path.display()))?;
    Ok(chef)
}

/// Load every `.bin` model under `dir`, in filename order.
pub fn load_all(dir: &Path) -> Result<Vec<ChefModel>> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "models directory not found, serving with no chefs");
        return Ok(Vec::new());
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read models directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(MODEL_EXTENSION))
        .collect();
    paths.sort();

    let mut chefs = Vec::new();
    for path in paths {
        match load_model(&path) {
            Ok(chef) => {
                info!(
                    chef = chef.name(),
                    recipes = chef.corpus_len(),
                    file = %path.display(),
                    "loaded chef model"
                );
                chefs.push(chef);
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "skipping unreadable model file");
            }
        }
    }

    if chefs.is_empty() {
        warn!(dir = %dir.display(), "no chef models loaded");
    }
    Ok(chefs)
}
