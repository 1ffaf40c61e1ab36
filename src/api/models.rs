use serde::{Deserialize, Serialize};

use crate::config::PantryConfig;
use crate::db::models::{Category, DietaryTag, Recipe, RecipeIngredient, RecipeInstruction};
use crate::pantry::RankedMatch;
use crate::{Error, Result};

/// Pantry search request body
#[derive(Debug, Clone, Deserialize)]
pub struct PantrySearchRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Kept loose so `5`, `5.0` and `"5"` are all accepted
    #[serde(default)]
    pub limit: Option<serde_json::Value>,
}

pub const INVALID_LIMIT_MESSAGE: &str = "Số lượng kết quả phải là số nguyên dương";

impl PantrySearchRequest {
    /// Requested result count, defaulted and capped by configuration.
    ///
    /// Fractional values are truncated; anything that does not come out as
    /// a positive whole number is rejected.
    pub fn resolve_limit(&self, config: &PantryConfig) -> Result<usize> {
        use serde_json::Value;

        let requested = match &self.limit {
            None | Some(Value::Null) => return Ok(config.default_limit),
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64),
            Some(_) => None,
        };

        match requested {
            Some(limit) if limit > 0 => Ok((limit as usize).min(config.max_limit)),
            _ => Err(Error::Validation(INVALID_LIMIT_MESSAGE.to_string())),
        }
    }
}

/// One ranked recipe in a pantry search response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub difficulty: Option<String>,
    pub total_time: Option<i64>,
    pub servings: Option<i64>,
    pub match_percentage: u8,
    pub matched_ingredients: Vec<String>,
    pub missing_ingredients: Vec<String>,
    pub explanation: String,
}

impl From<RankedMatch<Recipe>> for MatchResult {
    fn from(ranked: RankedMatch<Recipe>) -> Self {
        let thumbnail = ranked.recipe.thumbnail();
        let recipe = ranked.recipe;

        MatchResult {
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            thumbnail,
            difficulty: recipe.difficulty,
            total_time: recipe.total_time,
            servings: recipe.servings,
            match_percentage: ranked.match_percentage,
            matched_ingredients: ranked.matched_ingredients,
            missing_ingredients: ranked.missing_ingredients,
            explanation: ranked.explanation,
        }
    }
}

/// Pantry search response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PantrySearchResponse {
    pub success: bool,
    pub matches: Vec<MatchResult>,
    pub total_recipes_checked: usize,
}

/// Recipe search parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeSearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub max_time: Option<i64>,
    /// Dietary tag name or slug, e.g. "gluten-free"
    #[serde(default)]
    pub dietary: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

/// Recipe card for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCard {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub total_time: Option<i64>,
    pub servings: Option<i64>,
    pub difficulty: Option<String>,
    pub views: i64,
    pub created_at: String,
}

impl From<Recipe> for RecipeCard {
    fn from(recipe: Recipe) -> Self {
        let thumbnail = recipe.thumbnail();
        RecipeCard {
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            thumbnail,
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            total_time: recipe.total_time,
            servings: recipe.servings,
            difficulty: recipe.difficulty,
            views: recipe.views,
            created_at: recipe.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeListResponse {
    pub recipes: Vec<RecipeCard>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentResponse {
    pub success: bool,
    pub recipes: Vec<RecipeCard>,
}

/// Trending card with performance badges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingRecipe {
    #[serde(flatten)]
    pub card: RecipeCard,
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingResponse {
    pub success: bool,
    pub recipes: Vec<TrendingRecipe>,
}

/// Full recipe details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub card: RecipeCard,
    pub status: String,
    /// e.g. "1 hr 30 min"; empty when the total time is unknown
    pub total_time_label: String,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: Vec<RecipeInstruction>,
    pub categories: Vec<Category>,
    pub dietary_tags: Vec<DietaryTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScaleParams {
    pub servings: i64,
    /// Convert scaled quantities into this unit where the kinds match
    #[serde(default)]
    pub to_unit: Option<String>,
}

/// Ingredient list rescaled to a serving count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaledIngredientsResponse {
    pub recipe_id: i64,
    pub base_servings: i64,
    pub servings: i64,
    pub multiplier: f64,
    pub ingredients: Vec<RecipeIngredient>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietaryTagsResponse {
    pub tags: Vec<DietaryTag>,
}

/// System statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub total_recipes: i64,
    pub total_ingredients: i64,
    pub total_categories: i64,
    pub recipes_today: i64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: String,
}
