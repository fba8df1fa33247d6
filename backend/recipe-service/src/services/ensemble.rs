//! Ensemble fan-out across independently trained chef models.
//!
//! Every registered model scores the request; a model that fails, panics
//! or times out contributes zero results and never aborts the request.
//! The merged order depends only on scores, not on completion order.

use crate::models::{EnsembleStats, ScoredRecipe};
use crate::services::chef::ChefModel;
use anyhow::Result;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// One source of scored recipes. Implemented by [`ChefModel`]; tests plug
/// in failing sources to exercise isolation.
pub trait Recommender: Send + Sync {
    fn name(&self) -> &str;

    fn recommend(
        &self,
        ingredients: &[String],
        top_n: usize,
        cosine_weight: f32,
    ) -> Result<Vec<ScoredRecipe>>;
}

impl Recommender for ChefModel {
    fn name(&self) -> &str {
        ChefModel::name(self)
    }

    fn recommend(
        &self,
        ingredients: &[String],
        top_n: usize,
        cosine_weight: f32,
    ) -> Result<Vec<ScoredRecipe>> {
        Ok(ChefModel::recommend(self, ingredients, top_n, cosine_weight))
    }
}

/// Registry of chef models, append-only at startup and read-only while
/// serving. Owned by the process entry point and injected where needed,
/// not a hidden global.
pub struct RecommendationEnsemble {
    models: Vec<Arc<dyn Recommender>>,
    workers: usize,
    model_timeout: Duration,
}

impl RecommendationEnsemble {
    /// `workers == 0` sizes the pool to available hardware parallelism.
    pub fn new(workers: usize, model_timeout: Duration) -> Self {
        let workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            workers
        };
        Self {
            models: Vec::new(),
            workers,
            model_timeout,
        }
    }

    pub fn register(&mut self, model: Arc<dyn Recommender>) {
        self.models.push(model);
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn chef_names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.name().to_string()).collect()
    }

    /// Fan one request out across every registered model with bounded
    /// concurrency, merge the partial lists and globally re-sort by final
    /// score descending. `top_n_per_model` bounds each model's
    /// contribution; the merged total is never truncated here.
    pub async fn recommend(
        &self,
        ingredients: &[String],
        top_n_per_model: usize,
        cosine_weight: f32,
    ) -> (Vec<ScoredRecipe>, EnsembleStats) {
        let ingredients: Arc<Vec<String>> = Arc::new(ingredients.to_vec());
        let timeout = self.model_timeout;

        let mut partials: Vec<(usize, Option<Vec<ScoredRecipe>>)> =
            stream::iter(self.models.iter().cloned().enumerate())
                .map(|(idx, model)| {
                    let ingredients = Arc::clone(&ingredients);
                    async move {
                        let name = model.name().to_string();
                        // Scoring is CPU-bound; keep it off the runtime
                        // workers.
                        let task = tokio::task::spawn_blocking(move || {
                            model.recommend(&ingredients, top_n_per_model, cosine_weight)
                        });
                        let outcome = match tokio::time::timeout(timeout, task).await {
                            Ok(Ok(Ok(results))) => Some(results),
                            Ok(Ok(Err(e))) => {
                                warn!(model = %name, error = %e, "model scoring failed");
                                None
                            }
                            Ok(Err(e)) => {
                                warn!(model = %name, error = %e, "model task aborted");
                                None
                            }
                            Err(_) => {
                                warn!(model = %name, timeout_ms = timeout.as_millis() as u64, "model timed out");
                                None
                            }
                        };
                        (idx, outcome)
                    }
                })
                .buffer_unordered(self.workers)
                .collect()
                .await;

        // Re-establish registration order before concatenating so the
        // stable sort below is deterministic regardless of which worker
        // finished first.
        partials.sort_by_key(|(idx, _)| *idx);

        let mut stats = EnsembleStats {
            models_queried: self.models.len(),
            ..EnsembleStats::default()
        };
        let mut merged: Vec<ScoredRecipe> = Vec::new();
        for (_, outcome) in partials {
            match outcome {
                Some(results) => merged.extend(results),
                None => stats.models_failed += 1,
            }
        }

        merged.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        stats.total_results = merged.len();

        info!(
            models = stats.models_queried,
            failed = stats.models_failed,
            results = stats.total_results,
            "ensemble recommendation completed"
        );

        (merged, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Recipe;
    use anyhow::bail;

    struct FailingRecommender;

    impl Recommender for FailingRecommender {
        fn name(&self) -> &str {
            "broken"
        }

        fn recommend(&self, _: &[String], _: usize, _: f32) -> Result<Vec<ScoredRecipe>> {
            bail!("scoring blew up")
        }
    }

    fn recipe(id: i64, ingredients: &str) -> Recipe {
        Recipe {
            id,
            title: format!("recipe {id}"),
            ingredients: ingredients.to_string(),
            ner_ingredients: ingredients.to_string(),
            instructions: "Cook. Serve.".to_string(),
            cuisine: None,
        }
    }

    fn trained_chef(name: &str, recipes: Vec<Recipe>) -> Arc<ChefModel> {
        let mut chef = ChefModel::new(name, None);
        chef.train(recipes).unwrap();
        Arc::new(chef)
    }

    fn test_ensemble() -> RecommendationEnsemble {
        RecommendationEnsemble::new(2, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_merged_results_sorted_descending() {
        let mut ensemble = test_ensemble();
        ensemble.register(trained_chef(
            "Marco",
            vec![recipe(1, "pasta, eggs, pancetta"), recipe(2, "pasta, salt")],
        ));
        ensemble.register(trained_chef(
            "Sofia",
            vec![recipe(3, "pasta, eggs"), recipe(4, "chicken, curry")],
        ));

        let (results, stats) = ensemble
            .recommend(&["pasta".to_string(), "eggs".to_string()], 5, 0.0)
            .await;

        assert_eq!(stats.models_failed, 0);
        assert!(!results.is_empty());
        for pair in results.windows(2) {
            assert!(pair[0].final_score >= pair[1].final_score);
        }
    }

    #[tokio::test]
    async fn test_failing_model_is_isolated() {
        let mut ensemble = test_ensemble();
        ensemble.register(Arc::new(FailingRecommender));
        ensemble.register(trained_chef(
            "Marco",
            vec![recipe(1, "pasta, eggs"), recipe(2, "chicken, curry")],
        ));

        let (results, stats) = ensemble
            .recommend(&["pasta".to_string()], 5, 0.0)
            .await;

        assert_eq!(stats.models_queried, 2);
        assert_eq!(stats.models_failed, 1);
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.chef_name == "Marco"));
    }

    #[tokio::test]
    async fn test_per_model_bound_not_global() {
        let mut ensemble = test_ensemble();
        ensemble.register(trained_chef(
            "Marco",
            vec![recipe(1, "pasta, eggs"), recipe(2, "pasta, salt")],
        ));
        ensemble.register(trained_chef(
            "Sofia",
            vec![recipe(3, "pasta, butter"), recipe(4, "pasta, cream")],
        ));

        let (results, _) = ensemble.recommend(&["pasta".to_string()], 2, 0.0).await;
        // Both models may contribute up to two results each.
        assert!(results.len() > 2);
    }

    #[tokio::test]
    async fn test_empty_ensemble_returns_empty() {
        let ensemble = test_ensemble();
        let (results, stats) = ensemble.recommend(&["pasta".to_string()], 5, 0.5).await;
        assert!(results.is_empty());
        assert_eq!(stats.models_queried, 0);
    }

    #[tokio::test]
    async fn test_untrained_chef_contributes_nothing() {
        let mut ensemble = test_ensemble();
        ensemble.register(Arc::new(ChefModel::new("Raj", None)));
        let (results, stats) = ensemble.recommend(&["pasta".to_string()], 5, 0.5).await;
        assert!(results.is_empty());
        // An untrained model answers empty, it does not fail.
        assert_eq!(stats.models_failed, 0);
    }
}
