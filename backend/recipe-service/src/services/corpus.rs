//! Recipe corpus loading from CSV for the offline training pipeline.

use crate::models::Recipe;
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{debug, info};

const REQUIRED_COLUMNS: [&str; 4] = ["title", "ingredients", "directions", "ner"];

/// Load up to `sample_size` recipes from a CSV export. Headers are matched
/// case-insensitively against `title`, `ingredients`, `directions` and
/// `NER`; malformed rows and rows with empty required fields are skipped.
pub fn load_csv(path: &Path, sample_size: usize) -> Result<Vec<Recipe>> {
    info!(file = %path.display(), sample_size, "loading recipe corpus");

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open corpus file {}", path.display()))?;

    let headers = reader.headers().context("corpus file has no header row")?;
    let mut columns = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, required) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
        match headers
            .iter()
            .position(|h| h.trim_matches(|c: char| c == '"' || c == '\'').eq_ignore_ascii_case(required))
        {
            Some(idx) => *slot = idx,
            None => bail!("corpus file is missing required column '{required}'"),
        }
    }
    let [title_col, ingredients_col, directions_col, ner_col] = columns;

    let mut recipes = Vec::new();
    let mut skipped = 0usize;
    for (row, record) in reader.records().enumerate() {
        if recipes.len() >= sample_size {
            break;
        }
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                debug!(row, error = %e, "skipping malformed corpus row");
                skipped += 1;
                continue;
            }
        };

        let field = |col: usize| record.get(col).unwrap_or("").trim();
        let title = field(title_col);
        let ingredients = field(ingredients_col);
        let directions = field(directions_col);
        let ner = field(ner_col);
        if title.is_empty() || ingredients.is_empty() || directions.is_empty() || ner.is_empty() {
            skipped += 1;
            continue;
        }

        recipes.push(Recipe {
            id: row as i64,
            title: title.to_string(),
            ingredients: ingredients.to_lowercase(),
            ner_ingredients: ner.to_string(),
            instructions: directions.to_string(),
            cuisine: None,
        });
    }

    info!(loaded = recipes.len(), skipped, "corpus loaded");
    Ok(recipes)
}
