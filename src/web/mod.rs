use axum::{
    Json, Router,
    extract::{Extension, State},
    http::Method,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::db::services::user_service;
use crate::server::config::ServerConfig;
use crate::services::auth_service;
use crate::web::{
    middleware::auth,
    models::{AuthenticatedUser, LoginRequest, RegisterRequest, UserResponse},
    routes::*,
};

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabaseConnection,
    pub config: Arc<ServerConfig>,
}

async fn register_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(axum::http::StatusCode, Json<UserResponse>), AppError> {
    let user_response = auth_service::register_user(&app_state.db_pool, payload).await?;
    Ok((axum::http::StatusCode::CREATED, Json(user_response)))
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let login_response =
        auth_service::login_user(&app_state.db_pool, payload, &app_state.config.jwt_secret)
            .await?;

    let auth_cookie = Cookie::build(("token", login_response.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true)
        .build();

    let mut response = Json(login_response).into_response();
    response.headers_mut().insert(
        axum::http::header::SET_COOKIE,
        auth_cookie
            .to_string()
            .parse()
            .map_err(|_| AppError::InternalServerError("Invalid cookie value".to_string()))?,
    );

    Ok(response)
}

async fn me_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service::get_user_by_id(&app_state.db_pool, authenticated_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse::from(user)))
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(db_pool: DatabaseConnection, config: Arc<ServerConfig>) -> Router {
    let app_state = Arc::new(AppState { db_pool, config });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route(
            "/api/auth/me",
            get(me_handler).route_layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth::auth,
            )),
        )
        .nest(
            "/api/recipes",
            recipe_routes::create_recipes_router().route_layer(
                axum_middleware::from_fn_with_state(app_state.clone(), auth::auth),
            ),
        )
        .nest(
            "/api/tags",
            tag_routes::create_tags_router().route_layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth::auth,
            )),
        )
        .nest(
            "/api/ingredients",
            ingredient_routes::create_ingredients_router().route_layer(
                axum_middleware::from_fn_with_state(app_state.clone(), auth::auth),
            ),
        )
        .nest(
            "/api/user",
            user_routes::create_user_router().route_layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth::auth,
            )),
        )
        .with_state(app_state)
        .layer(cors)
}
