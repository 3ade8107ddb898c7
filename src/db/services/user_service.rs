use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::db::entities::user;
use crate::web::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 5;

// A throwaway bcrypt hash verified against when the email is unknown, so a
// failed lookup costs roughly the same as a password mismatch.
const DUMMY_HASH: &str = "$2b$12$Dwt1BZj6pcyw3t3UerSsTuSgs2EeUV0o6DFWrYmhHucKdmRm1gvyq";

/// Lower-cases the domain portion of an email address, leaving the local
/// part untouched. Rejects empty and malformed addresses.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(
            "Email address is required.".to_string(),
        ));
    }
    let (local, domain) = trimmed.rsplit_once('@').ok_or_else(|| {
        AppError::InvalidInput("Invalid email address.".to_string())
    })?;
    if local.is_empty() || domain.is_empty() {
        return Err(AppError::InvalidInput("Invalid email address.".to_string()));
    }
    Ok(format!("{local}@{}", domain.to_lowercase()))
}

/// Creates a new user with a hashed password. Plaintext is never persisted.
pub async fn create_user(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    name: &str,
) -> Result<user::Model, AppError> {
    let email = normalize_email(email)?;

    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long."
        )));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(AppError::UserAlreadyExists(email));
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::PasswordHashingError(e.to_string()))?;

    let now = Utc::now();
    let new_user = user::ActiveModel {
        email: Set(email),
        name: Set(name.to_owned()),
        password_hash: Set(password_hash),
        is_active: Set(true),
        is_staff: Set(false),
        is_superuser: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(new_user.insert(db).await?)
}

/// Creates a user with staff and superuser flags set.
pub async fn create_superuser(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model, AppError> {
    let created = create_user(db, email, password, "").await?;

    let mut superuser: user::ActiveModel = created.into();
    superuser.is_staff = Set(true);
    superuser.is_superuser = Set(true);
    superuser.updated_at = Set(Utc::now());
    Ok(superuser.update(db).await?)
}

/// Verifies credentials and returns the matching user.
///
/// Unknown email, wrong password, and deactivated account all fail with the
/// same `InvalidCredentials` so the response does not leak which emails are
/// registered.
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model, AppError> {
    let found = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;

    let Some(user) = found else {
        let _ = bcrypt::verify(password, DUMMY_HASH);
        return Err(AppError::InvalidCredentials);
    };

    let valid_password = bcrypt::verify(password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;

    if !valid_password || !user.is_active {
        return Err(AppError::InvalidCredentials);
    }

    Ok(user)
}

/// Partial profile update. Fields left as `None` are untouched; a new
/// password is re-hashed, a new email re-normalized.
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i32,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<user::Model, AppError> {
    let user_model = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut user_active: user::ActiveModel = user_model.into();

    if let Some(name) = name {
        user_active.name = Set(name);
    }
    if let Some(email) = email {
        user_active.email = Set(normalize_email(&email)?);
    }
    if let Some(password) = password {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidInput(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long."
            )));
        }
        let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::PasswordHashingError(e.to_string()))?;
        user_active.password_hash = Set(password_hash);
    }

    user_active.updated_at = Set(Utc::now());
    Ok(user_active.update(db).await?)
}

/// Retrieves a user by id.
pub async fn get_user_by_id(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Option<user::Model>, sea_orm::DbErr> {
    user::Entity::find_by_id(user_id).one(db).await
}
