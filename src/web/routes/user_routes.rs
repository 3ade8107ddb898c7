use axum::{
    Json, Router,
    extract::{Extension, State},
    routing::put,
};
use std::sync::Arc;

use crate::db::services::user_service;
use crate::web::models::{AuthenticatedUser, UpdateProfileRequest, UserResponse};
use crate::web::{AppError, AppState};

async fn update_profile_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let updated = user_service::update_user(
        &app_state.db_pool,
        authenticated_user.id,
        payload.name,
        payload.email,
        payload.password,
    )
    .await?;
    Ok(Json(UserResponse::from(updated)))
}

pub fn create_user_router() -> Router<Arc<AppState>> {
    Router::new().route("/me", put(update_profile_handler))
}
