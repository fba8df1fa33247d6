//! Recipe recommendation endpoints.

use crate::error::Result;
use crate::handlers::AppState;
use crate::models::{ScoreComponents, ScoredRecipe};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RecipeRequest {
    #[validate(length(min = 1, message = "at least one ingredient is required"))]
    pub ingredients: Vec<String>,
    #[validate(range(min = 1, max = 20))]
    pub max_results: Option<usize>,
    /// Cosine weight: 1.0 leans on vector similarity, 0.0 on ingredient
    /// overlap.
    #[validate(range(min = 0.0, max = 1.0))]
    pub variety: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub similarity_score: f32,
    pub score_components: ScoreComponents,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub chef: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecipesEnvelope {
    pub recipes: Vec<RecipeResponse>,
}

/// Recommend recipes for a list of available ingredients.
pub async fn get_recipes(
    state: web::Data<AppState>,
    req: web::Json<RecipeRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let top_n = req.max_results.unwrap_or(state.defaults.default_top_n);
    let cosine_weight = req
        .variety
        .unwrap_or(state.defaults.default_cosine_weight);

    info!(
        ingredients = req.ingredients.len(),
        top_n, cosine_weight, "recommendation request"
    );

    let (results, _stats) = state
        .ensemble
        .recommend(&req.ingredients, top_n, cosine_weight)
        .await;

    let recipes: Vec<RecipeResponse> = results.into_iter().map(to_response).collect();
    Ok(HttpResponse::Ok().json(RecipesEnvelope { recipes }))
}

/// Health and introspection: reports how many chef models are loaded.
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "chefs_loaded": state.ensemble.len(),
        "chef_names": state.ensemble.chef_names(),
        "service": state.service_name,
    })))
}

fn to_response(scored: ScoredRecipe) -> RecipeResponse {
    RecipeResponse {
        id: Some(scored.recipe.id),
        title: scored.recipe.title,
        similarity_score: scored.final_score,
        score_components: scored.components,
        ingredients: split_delimited(&scored.recipe.ingredients, ','),
        instructions: split_delimited(&scored.recipe.instructions, '.'),
        chef: scored.chef_name,
        cuisine: scored.cuisine,
    }
}

/// Presentation-only splitting of a stored delimited string into a
/// sequence, shedding stray brackets and quotes.
fn split_delimited(raw: &str, delimiter: char) -> Vec<String> {
    raw.split(delimiter)
        .map(|item| {
            item.trim_matches(|c: char| {
                c.is_whitespace() || matches!(c, '[' | ']' | '{' | '}' | '"' | '\'')
            })
            .to_string()
        })
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_comma_delimited_ingredients() {
        assert_eq!(
            split_delimited("pasta, eggs, pancetta", ','),
            vec!["pasta", "eggs", "pancetta"]
        );
    }

    #[test]
    fn test_split_sheds_brackets_and_quotes() {
        assert_eq!(
            split_delimited(r#"["pasta", "eggs"]"#, ','),
            vec!["pasta", "eggs"]
        );
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_delimited("Boil the pasta. Mix the eggs. Serve.", '.'),
            vec!["Boil the pasta", "Mix the eggs", "Serve"]
        );
    }

    #[test]
    fn test_request_validation_bounds() {
        let valid = RecipeRequest {
            ingredients: vec!["pasta".to_string()],
            max_results: Some(5),
            variety: Some(0.5),
        };
        assert!(valid.validate().is_ok());

        let empty = RecipeRequest {
            ingredients: vec![],
            max_results: None,
            variety: None,
        };
        assert!(empty.validate().is_err());

        let out_of_range = RecipeRequest {
            ingredients: vec!["pasta".to_string()],
            max_results: Some(100),
            variety: Some(1.5),
        };
        assert!(out_of_range.validate().is_err());
    }
}
