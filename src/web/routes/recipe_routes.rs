use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;

use crate::db::services::{self, NewRecipe, RecipePatch};
use crate::web::models::{
    AuthenticatedUser, CreateRecipeRequest, NamedRef, RecipeDetailResponse, RecipeSummary,
    UpdateRecipeRequest,
};
use crate::web::{AppError, AppState};

fn names(refs: Option<Vec<NamedRef>>) -> Option<Vec<String>> {
    refs.map(|list| list.into_iter().map(|r| r.name).collect())
}

async fn list_recipes_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<RecipeSummary>>, AppError> {
    let recipes = services::list_recipes(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(recipes.into_iter().map(RecipeSummary::from).collect()))
}

async fn create_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeDetailResponse>), AppError> {
    let input = NewRecipe {
        title: payload.title,
        description: payload.description,
        time_minutes: payload.time_minutes,
        price: payload.price,
        link: payload.link,
        tags: names(payload.tags),
        ingredients: names(payload.ingredients),
    };
    let detail =
        services::create_recipe(&app_state.db_pool, authenticated_user.id, input).await?;
    Ok((StatusCode::CREATED, Json(RecipeDetailResponse::from(detail))))
}

async fn get_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    let detail =
        services::get_recipe(&app_state.db_pool, recipe_id, authenticated_user.id).await?;
    Ok(Json(RecipeDetailResponse::from(detail)))
}

async fn update_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
    Json(payload): Json<UpdateRecipeRequest>,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    let patch = RecipePatch {
        title: payload.title,
        description: payload.description,
        time_minutes: payload.time_minutes,
        price: payload.price,
        link: payload.link,
        tags: names(payload.tags),
        ingredients: names(payload.ingredients),
    };
    let detail =
        services::update_recipe(&app_state.db_pool, recipe_id, authenticated_user.id, patch)
            .await?;
    Ok(Json(RecipeDetailResponse::from(detail)))
}

async fn delete_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    services::delete_recipe(&app_state.db_pool, recipe_id, authenticated_user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_recipes_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_recipes_handler).post(create_recipe_handler))
        .route(
            "/{recipe_id}",
            get(get_recipe_handler)
                .patch(update_recipe_handler)
                .delete(delete_recipe_handler),
        )
}
