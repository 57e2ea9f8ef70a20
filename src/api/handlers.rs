use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{
    CatalogQuery, ColdStartProfile, Item, PerformanceStats, Recommendation, SortBy, UserProfile,
};

use super::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<SortBy>,
    #[serde(default = "default_list_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    #[serde(default = "default_recommend_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    #[serde(default = "default_similar_limit")]
    pub limit: usize,
}

fn default_list_limit() -> usize {
    50
}

fn default_recommend_limit() -> usize {
    10
}

fn default_similar_limit() -> usize {
    6
}

fn validate_limit(limit: usize, max: usize) -> AppResult<usize> {
    if limit == 0 || limit > max {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {max}"
        )));
    }
    Ok(limit)
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Hybrid recommendation engine API",
        "models_loaded": state.engine.is_fully_loaded(),
    }))
}

/// List catalog items with optional filtering and sorting
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ListItemsQuery>,
) -> AppResult<Json<Vec<Item>>> {
    let limit = validate_limit(params.limit, 200)?;
    let query = CatalogQuery {
        category: params.category,
        genre: params.genre,
        search: params.search,
        sort_by: params.sort_by,
        limit,
    };
    Ok(Json(state.engine.list_items(&query)))
}

/// Get a single catalog item by ID
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<Json<Item>> {
    Ok(Json(state.engine.get_item(&item_id)?))
}

/// Personalized recommendations for a user
pub async fn recommend_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<RecommendQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let limit = validate_limit(params.limit, 50)?;
    Ok(Json(state.engine.recommend_for_user(&user_id, limit)))
}

/// Items similar to a catalog item
pub async fn recommend_similar(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Query(params): Query<SimilarQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let limit = validate_limit(params.limit, 20)?;
    Ok(Json(state.engine.recommend_similar(&item_id, limit)?))
}

/// Recommendations for a new user without interaction history
pub async fn recommend_cold_start(
    State(state): State<AppState>,
    Query(params): Query<RecommendQuery>,
    Json(profile): Json<ColdStartProfile>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let limit = validate_limit(params.limit, 50)?;
    Ok(Json(state.engine.recommend_cold_start(&profile, limit)))
}

/// Rebuild the artifact bundle from disk and swap it in atomically
pub async fn reload_models(State(state): State<AppState>) -> Json<Value> {
    state.engine.reload();
    Json(json!({
        "status": "reloaded",
        "models_loaded": state.engine.is_fully_loaded(),
    }))
}

/// Offline evaluation metrics for the deployed models
pub async fn performance_stats() -> Json<PerformanceStats> {
    Json(PerformanceStats::reported())
}

/// Sample users for the demo frontend
pub async fn list_users() -> Json<Vec<UserProfile>> {
    Json(UserProfile::samples())
}
