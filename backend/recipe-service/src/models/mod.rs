use serde::{Deserialize, Serialize};

/// A recipe as loaded from the corpus. Immutable once a chef has been
/// trained on it; the owning chef is the only holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    /// Raw ingredient field, free-form serialization (comma list, JSON
    /// array/object, or a quasi-Python literal).
    pub ingredients: String,
    /// Cleaned/extracted ingredient field used for lexical overlap. May be
    /// encoded differently from `ingredients`.
    pub ner_ingredients: String,
    pub instructions: String,
    pub cuisine: Option<String>,
}

/// Breakdown of how a final score was assembled, returned alongside it so
/// callers can audit or re-render the blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub cosine_score: f32,
    pub overlap_score: f32,
    pub cosine_weight: f32,
    pub overlap_weight: f32,
}

/// Per-request scoring result. Ephemeral: built for one query, discarded
/// after the response is rendered. Similarity is a property of the query,
/// never stored on the recipe itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecipe {
    pub recipe: Recipe,
    pub final_score: f32,
    pub components: ScoreComponents,
    pub chef_name: String,
    pub cuisine: Option<String>,
}

/// Per-request ensemble accounting, logged after each fan-out.
#[derive(Debug, Clone, Default)]
pub struct EnsembleStats {
    pub models_queried: usize,
    pub models_failed: usize,
    pub total_results: usize,
}
