//! A chef: one trained text-similarity model over one fixed recipe corpus.

use crate::models::{Recipe, ScoredRecipe};
use crate::services::ingredients::{normalize_field, normalize_query};
use crate::services::scoring::select_top_n;
use crate::services::similarity::cosine_against_matrix;
use crate::services::vectorize::{SparseVector, TfidfVectorizer, VectorizeError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A specialized recommendation model trained on a subset of recipes,
/// optionally tagged with a cuisine.
///
/// Constructed untrained, trained exactly once via [`ChefModel::train`],
/// then read-only for the rest of its life: serving is query-only and
/// needs no locking. Serializable as an opaque blob for the offline
/// training pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChefModel {
    name: String,
    cuisine: Option<String>,
    recipes: Vec<Recipe>,
    vectorizer: TfidfVectorizer,
    corpus_matrix: Vec<SparseVector>,
    /// Normalized lexical-overlap sets, one per recipe, computed once at
    /// training time instead of per request.
    ner_sets: Vec<HashSet<String>>,
}

impl ChefModel {
    pub fn new(name: impl Into<String>, cuisine: Option<String>) -> Self {
        Self {
            name: name.into(),
            cuisine,
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cuisine(&self) -> Option<&str> {
        self.cuisine.as_deref()
    }

    pub fn corpus_len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_trained(&self) -> bool {
        self.vectorizer.is_fitted()
    }

    /// Fit the vector model over each recipe's primary ingredient field and
    /// freeze the corpus. Empty-vocabulary failure is fatal for this
    /// training step and propagates to the offline pipeline.
    pub fn train(&mut self, recipes: Vec<Recipe>) -> Result<(), VectorizeError> {
        let documents: Vec<String> = recipes
            .iter()
            .map(|r| ingredient_document(&r.ingredients))
            .collect();

        self.corpus_matrix = self.vectorizer.fit(&documents)?;
        self.ner_sets = recipes
            .iter()
            .map(|r| normalize_field(&r.ner_ingredients))
            .collect();
        self.recipes = recipes;
        debug_assert_eq!(self.corpus_matrix.len(), self.recipes.len());
        Ok(())
    }

    /// Rank this chef's corpus against the user's ingredients.
    ///
    /// An empty query, an untrained model, or an empty corpus all yield an
    /// empty result rather than an error.
    pub fn recommend(
        &self,
        ingredients: &[String],
        top_n: usize,
        cosine_weight: f32,
    ) -> Vec<ScoredRecipe> {
        let query = normalize_query(ingredients);
        if query.is_empty() || self.recipes.is_empty() {
            return Vec::new();
        }

        // Sorted join keeps cross-token bigrams identical between calls;
        // set iteration order is not stable.
        let mut query_tokens: Vec<&str> = query.iter().map(String::as_str).collect();
        query_tokens.sort_unstable();
        let query_text = query_tokens.join(" ");
        let cosine_scores = match self.vectorizer.transform(&query_text) {
            Ok(query_vector) => cosine_against_matrix(&query_vector, &self.corpus_matrix),
            // Unfitted model serves as "zero recommendations".
            Err(VectorizeError::NotFitted) => return Vec::new(),
            Err(_) => vec![0.0; self.recipes.len()],
        };

        select_top_n(&query, &self.ner_sets, &cosine_scores, cosine_weight, top_n)
            .into_iter()
            .map(|(idx, final_score, components)| ScoredRecipe {
                recipe: self.recipes[idx].clone(),
                final_score,
                components,
                chef_name: self.name.clone(),
                cuisine: self.cuisine.clone(),
            })
            .collect()
    }
}

/// Flatten a raw ingredient field into plain token text for vectorization,
/// decoding bracketed encodings first.
fn ingredient_document(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        let mut tokens: Vec<String> = normalize_field(trimmed).into_iter().collect();
        tokens.sort();
        tokens.join(" ")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(id: i64, ingredients: &str, ner: &str) -> Recipe {
        Recipe {
            id,
            title: format!("recipe {id}"),
            ingredients: ingredients.to_string(),
            ner_ingredients: ner.to_string(),
            instructions: "Mix. Cook. Serve.".to_string(),
            cuisine: None,
        }
    }

    fn carbonara_corpus() -> Vec<Recipe> {
        vec![
            recipe(1, "pasta, eggs, pancetta", r#"["pasta", "eggs", "pancetta"]"#),
            recipe(2, "chicken, curry, onion", r#"["chicken", "curry", "onion"]"#),
        ]
    }

    #[test]
    fn test_untrained_chef_returns_empty() {
        let chef = ChefModel::new("Marco", None);
        assert!(chef
            .recommend(&["pasta".to_string()], 5, 0.5)
            .is_empty());
    }

    #[test]
    fn test_empty_query_returns_empty() {
        let mut chef = ChefModel::new("Marco", None);
        chef.train(carbonara_corpus()).unwrap();
        assert!(chef.recommend(&[], 5, 0.5).is_empty());
        assert!(chef
            .recommend(&["   ".to_string()], 5, 0.5)
            .is_empty());
    }

    #[test]
    fn test_pure_overlap_scenario() {
        // Pure overlap: recipe 1 covers 2 of its 3 ingredients, recipe 2
        // covers none and is excluded.
        let mut chef = ChefModel::new("Marco", None);
        chef.train(carbonara_corpus()).unwrap();

        let results = chef.recommend(&["pasta".to_string(), "eggs".to_string()], 5, 0.0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].recipe.id, 1);
        assert!((results[0].final_score - 2.0 / 3.0).abs() < 1e-5);
        assert_eq!(results[0].components.overlap_score, results[0].final_score);
    }

    #[test]
    fn test_results_stamped_with_chef_identity() {
        let mut chef = ChefModel::new("Sofia", Some("italian".to_string()));
        chef.train(carbonara_corpus()).unwrap();

        let results = chef.recommend(&["pasta".to_string()], 5, 0.5);
        assert!(!results.is_empty());
        assert_eq!(results[0].chef_name, "Sofia");
        assert_eq!(results[0].cuisine.as_deref(), Some("italian"));
    }

    #[test]
    fn test_cuisine_omitted_when_undeclared() {
        let mut chef = ChefModel::new("Marco", None);
        chef.train(carbonara_corpus()).unwrap();
        let results = chef.recommend(&["pasta".to_string()], 5, 0.5);
        assert!(results[0].cuisine.is_none());
    }

    #[test]
    fn test_training_on_empty_corpus_fails() {
        let mut chef = ChefModel::new("Marco", None);
        assert!(chef.train(Vec::new()).is_err());
    }

    #[test]
    fn test_scores_bounded_for_mixed_weight() {
        let mut chef = ChefModel::new("Marco", None);
        chef.train(carbonara_corpus()).unwrap();
        for w in [0.0, 0.3, 0.7, 1.0] {
            for scored in chef.recommend(&["pasta".to_string(), "eggs".to_string()], 5, w) {
                assert!((0.0..=1.0).contains(&scored.final_score));
                assert!(scored.final_score > 0.0);
            }
        }
    }

    #[test]
    fn test_repeated_queries_score_identically() {
        let mut chef = ChefModel::new("Marco", None);
        chef.train(carbonara_corpus()).unwrap();

        let query = vec!["pasta".to_string(), "eggs".to_string()];
        let first = chef.recommend(&query, 5, 1.0);
        assert!(!first.is_empty());

        for _ in 0..64 {
            let again = chef.recommend(&query, 5, 1.0);
            assert_eq!(again.len(), first.len());
            for (a, b) in first.iter().zip(&again) {
                assert_eq!(a.recipe.id, b.recipe.id);
                assert_eq!(a.final_score.to_bits(), b.final_score.to_bits());
                assert_eq!(
                    a.components.cosine_score.to_bits(),
                    b.components.cosine_score.to_bits()
                );
            }
        }
    }

    #[test]
    fn test_bracketed_ingredient_fields_vectorize() {
        let corpus = vec![
            recipe(1, r#"["pasta", "eggs"]"#, r#"["pasta", "eggs"]"#),
            recipe(2, r#"["chicken", "onion"]"#, r#"["chicken", "onion"]"#),
        ];
        let mut chef = ChefModel::new("Marco", None);
        chef.train(corpus).unwrap();

        let results = chef.recommend(&["pasta".to_string()], 5, 1.0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].recipe.id, 1);
        assert!(results[0].components.cosine_score > 0.0);
    }
}
