use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, put},
};
use std::sync::Arc;

use crate::db::services;
use crate::web::models::{AuthenticatedUser, IngredientResponse, RenameRequest};
use crate::web::{AppError, AppState};

async fn list_ingredients_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<IngredientResponse>>, AppError> {
    let ingredients =
        services::list_ingredients(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

async fn update_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(ingredient_id): Path<i32>,
    Json(payload): Json<RenameRequest>,
) -> Result<Json<IngredientResponse>, AppError> {
    let ingredient = services::update_ingredient(
        &app_state.db_pool,
        ingredient_id,
        authenticated_user.id,
        &payload.name,
    )
    .await?;
    Ok(Json(IngredientResponse::from(ingredient)))
}

async fn delete_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(ingredient_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    services::delete_ingredient(&app_state.db_pool, ingredient_id, authenticated_user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_ingredients_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_ingredients_handler))
        .route(
            "/{ingredient_id}",
            put(update_ingredient_handler).delete(delete_ingredient_handler),
        )
}
