use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::entities::{ingredient, recipe, tag, user};

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub is_staff: bool,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        UserResponse {
            id: model.id,
            email: model.email,
            name: model.name,
            is_staff: model.is_staff,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i32,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // email
    pub user_id: i32,
    pub exp: usize, // expiration timestamp
}

/// Authenticated user details, passed along as a request extension by the
/// auth middleware.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub email: String,
}

/// A nested tag/ingredient reference in a recipe payload: `{"name": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub tags: Option<Vec<NamedRef>>,
    pub ingredients: Option<Vec<NamedRef>>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tags: Option<Vec<NamedRef>>,
    pub ingredients: Option<Vec<NamedRef>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
}

impl From<tag::Model> for TagResponse {
    fn from(model: tag::Model) -> Self {
        TagResponse {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(model: ingredient::Model) -> Self {
        IngredientResponse {
            id: model.id,
            name: model.name,
        }
    }
}

/// List representation: no description, no nested sets.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
}

impl From<recipe::Model> for RecipeSummary {
    fn from(model: recipe::Model) -> Self {
        RecipeSummary {
            id: model.id,
            title: model.title,
            time_minutes: model.time_minutes,
            price: model.price,
            link: model.link,
        }
    }
}

/// Detail representation: full scalars plus attached tags and ingredients.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeDetailResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub tags: Vec<TagResponse>,
    pub ingredients: Vec<IngredientResponse>,
}

impl From<crate::db::services::RecipeDetail> for RecipeDetailResponse {
    fn from(detail: crate::db::services::RecipeDetail) -> Self {
        RecipeDetailResponse {
            id: detail.recipe.id,
            title: detail.recipe.title,
            description: detail.recipe.description,
            time_minutes: detail.recipe.time_minutes,
            price: detail.recipe.price,
            link: detail.recipe.link,
            tags: detail.tags.into_iter().map(TagResponse::from).collect(),
            ingredients: detail
                .ingredients
                .into_iter()
                .map(IngredientResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}
