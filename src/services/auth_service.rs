use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::DatabaseConnection;

use crate::db::entities::user;
use crate::db::services::user_service;
use crate::web::error::AppError;
use crate::web::models::{Claims, LoginRequest, LoginResponse, RegisterRequest, UserResponse};

pub async fn register_user(
    db: &DatabaseConnection,
    req: RegisterRequest,
) -> Result<UserResponse, AppError> {
    let user = user_service::create_user(db, &req.email, &req.password, &req.name).await?;
    Ok(UserResponse::from(user))
}

pub async fn login_user(
    db: &DatabaseConnection,
    req: LoginRequest,
    jwt_secret: &str,
) -> Result<LoginResponse, AppError> {
    let user = user_service::authenticate(db, &req.email, &req.password).await?;
    create_jwt_for_user(&user, jwt_secret)
}

pub fn create_jwt_for_user(
    user: &user::Model,
    jwt_secret: &str,
) -> Result<LoginResponse, AppError> {
    let now = Utc::now();
    // Token valid for 24 hours
    let expiration = (now + Duration::hours(24)).timestamp() as usize;

    let claims = Claims {
        sub: user.email.clone(),
        user_id: user.id,
        exp: expiration,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::TokenCreationError(e.to_string()))?;

    Ok(LoginResponse {
        token,
        user_id: user.id,
        email: user.email.clone(),
    })
}
