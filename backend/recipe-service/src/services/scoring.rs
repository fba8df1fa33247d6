//! Hybrid lexical/vector scoring.
//!
//! Blends a recall-style ingredient overlap score with TF-IDF cosine
//! similarity into one bounded score per recipe, then selects the top N.
//! Cosine scores are used raw, never min-max rescaled per batch, so scores
//! stay comparable across requests.

use crate::models::ScoreComponents;
use std::collections::HashSet;

/// Fraction of the recipe's own normalized ingredient set covered by the
/// query: how much of the recipe the user can actually make. An empty
/// recipe set scores 0.0, never a division by zero.
pub fn overlap_score(query: &HashSet<String>, recipe_set: &HashSet<String>) -> f32 {
    if recipe_set.is_empty() {
        return 0.0;
    }
    let shared = recipe_set.intersection(query).count();
    shared as f32 / recipe_set.len() as f32
}

/// `w * cosine + (1 - w) * overlap`. Both components are bounded in [0, 1],
/// so the blend is as well for any weight in [0, 1].
pub fn blend(cosine: f32, overlap: f32, cosine_weight: f32) -> f32 {
    let w = cosine_weight.clamp(0.0, 1.0);
    w * cosine + (1.0 - w) * overlap
}

/// Rank every recipe in the corpus by blended score and select the best
/// `top_n`, returned as `(corpus_index, final_score, components)`.
///
/// Recipes scoring exactly 0.0 are excluded outright, even when that
/// leaves fewer than `top_n` results: a zero score demonstrates no
/// relevance at all. Non-zero ties keep corpus order (stable sort).
pub fn select_top_n(
    query: &HashSet<String>,
    ner_sets: &[HashSet<String>],
    cosine_scores: &[f32],
    cosine_weight: f32,
    top_n: usize,
) -> Vec<(usize, f32, ScoreComponents)> {
    if query.is_empty() {
        return Vec::new();
    }

    let w = cosine_weight.clamp(0.0, 1.0);
    let mut ranked: Vec<(usize, f32, ScoreComponents)> = ner_sets
        .iter()
        .enumerate()
        .map(|(idx, recipe_set)| {
            let cosine = cosine_scores.get(idx).copied().unwrap_or(0.0);
            let overlap = overlap_score(query, recipe_set);
            let components = ScoreComponents {
                cosine_score: cosine,
                overlap_score: overlap,
                cosine_weight: w,
                overlap_weight: 1.0 - w,
            };
            (idx, blend(cosine, overlap, w), components)
        })
        .filter(|(_, score, _)| *score > 0.0)
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(top_n);
    ranked
}
