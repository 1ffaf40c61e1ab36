use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::{Timelike, Utc};
use tracing::debug;

use crate::{
    api::models::*,
    db::{self, models::RecipeFilter},
    pantry::{PantryMatcher, PantrySearch, EMPTY_PANTRY_MESSAGE},
    utils::{conversion, validation},
    Error, Result,
};

/// Number of recipes on the trending shelf
const TRENDING_LIMIT: i64 = 12;

/// Recent recipes returned when no positive limit is given
const RECENT_DEFAULT_LIMIT: usize = 12;

/// Views above which a recipe is badged as trending
const TRENDING_VIEWS_THRESHOLD: i64 = 100;

/// Serving counts accepted by the scaler
const MIN_SERVINGS: i64 = 1;
const MAX_SERVINGS: i64 = 20;

/// Base servings assumed when a recipe does not state one
const DEFAULT_BASE_SERVINGS: i64 = 4;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub settings: crate::config::Settings,
}

/// POST /api/ai/pantry-search-simple - Rank recipes by pantry coverage
pub async fn pantry_search(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PantrySearchRequest>, JsonRejection>,
) -> Result<Json<PantrySearchResponse>> {
    let Json(request) = payload.map_err(|e| {
        debug!("Rejected pantry search body: {}", e);
        Error::Validation(EMPTY_PANTRY_MESSAGE.to_string())
    })?;

    debug!("Pantry search request: {:?}", request);

    let matcher = PantryMatcher::new(&request.ingredients)?;
    let limit = request.resolve_limit(&state.settings.pantry)?;

    let outcome = PantrySearch::new(&state.pool, &state.settings.pantry)
        .run(&matcher, limit)
        .await?;

    Ok(Json(PantrySearchResponse {
        success: true,
        matches: outcome.matches.into_iter().map(MatchResult::from).collect(),
        total_recipes_checked: outcome.recipes_checked,
    }))
}

/// GET /api/recipes - Search published recipes
pub async fn search_recipes(
    State(state): State<AppState>,
    params: std::result::Result<Query<RecipeSearchParams>, QueryRejection>,
) -> Result<Json<RecipeListResponse>> {
    let Query(params) = params.map_err(|e| Error::Validation(e.body_text()))?;
    debug!("Recipe search request: {:?}", params);

    let difficulty = params.difficulty.filter(|d| !d.is_empty());
    if let Some(difficulty) = &difficulty {
        validation::validate_difficulty(difficulty)?;
    }

    let filter = RecipeFilter {
        q: params.q,
        category: params.category.filter(|c| !c.is_empty()),
        difficulty,
        max_time: params.max_time,
        dietary: params
            .dietary
            .filter(|d| !d.trim().is_empty())
            .map(|d| db::dietary_tags::canonical_tag_name(&d)),
    };

    let limit = params
        .limit
        .unwrap_or(state.settings.pagination.default_page_size)
        .min(state.settings.pagination.api_max_limit);

    let recipes =
        db::recipes::search_recipes(&state.pool, &filter, limit as i64, params.offset as i64)
            .await?;

    Ok(Json(RecipeListResponse {
        recipes: recipes.into_iter().map(RecipeCard::from).collect(),
    }))
}

/// GET /api/recipes/trending - Most viewed recipes with badges
pub async fn trending_recipes(State(state): State<AppState>) -> Result<Json<TrendingResponse>> {
    debug!("Trending recipes request");

    let recipes = db::recipes::list_trending(&state.pool, TRENDING_LIMIT).await?;

    let recipes = recipes
        .into_iter()
        .map(|recipe| {
            let mut badges = Vec::new();
            if recipe.views > TRENDING_VIEWS_THRESHOLD {
                badges.push("trending".to_string());
            }
            TrendingRecipe {
                card: RecipeCard::from(recipe),
                badges,
            }
        })
        .collect();

    Ok(Json(TrendingResponse {
        success: true,
        recipes,
    }))
}

/// GET /api/recipes/recent - Newest published recipes
pub async fn recent_recipes(
    State(state): State<AppState>,
    params: std::result::Result<Query<RecentParams>, QueryRejection>,
) -> Result<Json<RecentResponse>> {
    let Query(params) = params.map_err(|e| Error::Validation(e.body_text()))?;
    debug!("Recent recipes request: {:?}", params);

    let limit = params
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(RECENT_DEFAULT_LIMIT)
        .min(state.settings.pagination.api_max_limit);

    let recipes = db::recipes::list_recent(&state.pool, limit as i64).await?;

    Ok(Json(RecentResponse {
        success: true,
        recipes: recipes.into_iter().map(RecipeCard::from).collect(),
    }))
}

/// GET /api/recipes/:id - Get recipe details and count the view
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecipeDetail>> {
    debug!("Get recipe request: {}", id);

    db::recipes::increment_views(&state.pool, id).await?;
    let details = db::recipes::get_recipe_with_details(&state.pool, id).await?;

    let status = details.recipe.status.clone();
    let total_time_label = details
        .recipe
        .total_time
        .map(conversion::format_duration)
        .unwrap_or_default();

    Ok(Json(RecipeDetail {
        card: RecipeCard::from(details.recipe),
        status,
        total_time_label,
        ingredients: details.ingredients,
        instructions: details.instructions,
        categories: details.categories,
        dietary_tags: details.dietary_tags,
    }))
}

/// GET /api/recipes/:id/scaled - Ingredient quantities for another serving count
pub async fn scale_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    params: std::result::Result<Query<ScaleParams>, QueryRejection>,
) -> Result<Json<ScaledIngredientsResponse>> {
    let Query(params) = params.map_err(|e| Error::Validation(e.body_text()))?;
    debug!("Scale recipe request: {} to {} servings", id, params.servings);

    if !(MIN_SERVINGS..=MAX_SERVINGS).contains(&params.servings) {
        return Err(Error::Validation(format!(
            "Servings must be between {MIN_SERVINGS} and {MAX_SERVINGS}"
        )));
    }

    let recipe = db::recipes::get_recipe(&state.pool, id).await?;
    let base_servings = recipe
        .servings
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_BASE_SERVINGS);

    let ingredients = db::ingredients::get_recipe_ingredients(&state.pool, id).await?;
    let mut scaled = conversion::scale_ingredients(&ingredients, base_servings, params.servings);
    if let Some(to_unit) = params.to_unit.as_deref().filter(|u| !u.trim().is_empty()) {
        scaled = conversion::convert_ingredients(&scaled, to_unit.trim())?;
    }

    Ok(Json(ScaledIngredientsResponse {
        recipe_id: id,
        base_servings,
        servings: params.servings,
        multiplier: conversion::scale_quantity(1.0, base_servings, params.servings),
        ingredients: scaled,
    }))
}

/// GET /api/categories - List categories
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<CategoriesResponse>> {
    debug!("List categories request");

    let categories = db::categories::list_categories(&state.pool).await?;
    Ok(Json(CategoriesResponse { categories }))
}

/// GET /api/dietary-tags - List dietary tags
pub async fn list_dietary_tags(State(state): State<AppState>) -> Result<Json<DietaryTagsResponse>> {
    debug!("List dietary tags request");

    let tags = db::dietary_tags::list_dietary_tags(&state.pool).await?;
    Ok(Json(DietaryTagsResponse { tags }))
}

/// GET /api/stats - Get system statistics
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>> {
    debug!("Get stats request");

    let now = Utc::now();
    let today_start = now
        .with_hour(0)
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    let total_recipes = db::recipes::count_published_recipes(&state.pool).await?;
    let total_ingredients = db::ingredients::count_ingredients(&state.pool).await?;
    let total_categories = db::categories::count_categories(&state.pool).await?;
    let recipes_today = db::recipes::count_recipes_created_since(&state.pool, today_start).await?;

    Ok(Json(Stats {
        total_recipes,
        total_ingredients,
        total_categories,
        recipes_today,
    }))
}

/// GET /health - Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

/// GET /ready - Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<ReadinessResponse>> {
    let db_healthy = sqlx::query("SELECT 1").fetch_one(&state.pool).await.is_ok();

    Ok(Json(ReadinessResponse {
        ready: db_healthy,
        database: if db_healthy { "ok" } else { "error" }.to_string(),
    }))
}
