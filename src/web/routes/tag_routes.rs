use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, put},
};
use std::sync::Arc;

use crate::db::services;
use crate::web::models::{AuthenticatedUser, RenameRequest, TagResponse};
use crate::web::{AppError, AppState};

async fn list_tags_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let tags = services::list_tags(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

async fn update_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
    Json(payload): Json<RenameRequest>,
) -> Result<Json<TagResponse>, AppError> {
    let tag = services::update_tag(
        &app_state.db_pool,
        tag_id,
        authenticated_user.id,
        &payload.name,
    )
    .await?;
    Ok(Json(TagResponse::from(tag)))
}

async fn delete_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    services::delete_tag(&app_state.db_pool, tag_id, authenticated_user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tags_handler))
        .route("/{tag_id}", put(update_tag_handler).delete(delete_tag_handler))
}
