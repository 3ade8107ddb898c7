//! Recipe CRUD and the nested tag/ingredient write pipeline.
//!
//! Recipe writes resolve nested name lists with get-or-create semantics:
//! an existing `(user_id, name)` row is reused, a missing one is inserted,
//! and the resulting id is attached through a join row. On update, a nested
//! list that is present in the payload (even empty) fully replaces the
//! recipe's current attachments for that relation.

use std::collections::HashSet;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionError, TransactionTrait,
};

use crate::db::entities::{ingredient, recipe, recipe_ingredient, recipe_tag, tag};
use crate::web::error::AppError;

/// Input for a recipe create. Nested lists are optional; `None` attaches
/// nothing.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

/// Input for a partial recipe update. Scalar fields left as `None` are
/// untouched. `tags`/`ingredients` as `Some(vec![])` detaches everything
/// for that relation.
#[derive(Debug, Clone, Default)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

/// A recipe together with its attached tags and ingredients.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe: recipe::Model,
    pub tags: Vec<tag::Model>,
    pub ingredients: Vec<ingredient::Model>,
}

fn validate_scalars(time_minutes: Option<i32>, price: Option<&Decimal>) -> Result<(), AppError> {
    if let Some(minutes) = time_minutes {
        if minutes <= 0 {
            return Err(AppError::InvalidInput(
                "time_minutes must be a positive integer.".to_string(),
            ));
        }
    }
    if let Some(price) = price {
        if price < &Decimal::ZERO {
            return Err(AppError::InvalidInput(
                "price must not be negative.".to_string(),
            ));
        }
    }
    Ok(())
}

fn flatten_tx_err(err: TransactionError<DbErr>) -> AppError {
    match err {
        TransactionError::Connection(e) => e.into(),
        TransactionError::Transaction(e) => e.into(),
    }
}

/// Resolves tag names for a user with get-or-create semantics, returning
/// the resolved ids. Duplicate names collapse to one id, first occurrence
/// wins the ordering.
async fn resolve_tags<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    names: &[String],
) -> Result<Vec<i32>, DbErr> {
    let mut ids = Vec::with_capacity(names.len());
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            continue;
        }
        let existing = tag::Entity::find()
            .filter(tag::Column::UserId.eq(user_id))
            .filter(tag::Column::Name.eq(name))
            .one(db)
            .await?;
        let id = match existing {
            Some(found) => found.id,
            None => {
                let new_tag = tag::ActiveModel {
                    user_id: Set(user_id),
                    name: Set(name.clone()),
                    ..Default::default()
                };
                new_tag.insert(db).await?.id
            }
        };
        ids.push(id);
    }
    Ok(ids)
}

/// Same as [`resolve_tags`], against the ingredient registry.
async fn resolve_ingredients<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    names: &[String],
) -> Result<Vec<i32>, DbErr> {
    let mut ids = Vec::with_capacity(names.len());
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            continue;
        }
        let existing = ingredient::Entity::find()
            .filter(ingredient::Column::UserId.eq(user_id))
            .filter(ingredient::Column::Name.eq(name))
            .one(db)
            .await?;
        let id = match existing {
            Some(found) => found.id,
            None => {
                let new_ingredient = ingredient::ActiveModel {
                    user_id: Set(user_id),
                    name: Set(name.clone()),
                    ..Default::default()
                };
                new_ingredient.insert(db).await?.id
            }
        };
        ids.push(id);
    }
    Ok(ids)
}

/// Replaces a recipe's tag attachments with the named set.
async fn set_recipe_tags<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    recipe_id: i32,
    names: &[String],
) -> Result<(), DbErr> {
    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    for tag_id in resolve_tags(db, user_id, names).await? {
        let link = recipe_tag::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(tag_id),
        };
        recipe_tag::Entity::insert(link)
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

/// Replaces a recipe's ingredient attachments with the named set.
async fn set_recipe_ingredients<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    recipe_id: i32,
    names: &[String],
) -> Result<(), DbErr> {
    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    for ingredient_id in resolve_ingredients(db, user_id, names).await? {
        let link = recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(ingredient_id),
        };
        recipe_ingredient::Entity::insert(link)
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

/// Creates a recipe and attaches any supplied tag/ingredient names, all in
/// one transaction.
pub async fn create_recipe(
    db: &DatabaseConnection,
    user_id: i32,
    input: NewRecipe,
) -> Result<RecipeDetail, AppError> {
    validate_scalars(Some(input.time_minutes), Some(&input.price))?;

    let created = db
        .transaction::<_, recipe::Model, DbErr>(|txn| {
            Box::pin(async move {
                let now = Utc::now();
                let new_recipe = recipe::ActiveModel {
                    user_id: Set(user_id),
                    title: Set(input.title),
                    description: Set(input.description),
                    time_minutes: Set(input.time_minutes),
                    price: Set(input.price),
                    link: Set(input.link),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                let created = new_recipe.insert(txn).await?;

                if let Some(names) = input.tags {
                    set_recipe_tags(txn, user_id, created.id, &names).await?;
                }
                if let Some(names) = input.ingredients {
                    set_recipe_ingredients(txn, user_id, created.id, &names).await?;
                }
                Ok(created)
            })
        })
        .await
        .map_err(flatten_tx_err)?;

    get_recipe(db, created.id, user_id).await
}

/// Applies a partial update to an owned recipe. Nested lists present in the
/// patch fully replace the recipe's current attachments; scalar fields not
/// present are untouched. Runs in one transaction.
pub async fn update_recipe(
    db: &DatabaseConnection,
    recipe_id: i32,
    user_id: i32,
    patch: RecipePatch,
) -> Result<RecipeDetail, AppError> {
    validate_scalars(patch.time_minutes, patch.price.as_ref())?;

    let existing = recipe::Entity::find_by_id(recipe_id)
        .filter(recipe::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".to_string()))?;

    db.transaction::<_, (), DbErr>(|txn| {
        Box::pin(async move {
            let mut recipe_active: recipe::ActiveModel = existing.into();
            if let Some(title) = patch.title {
                recipe_active.title = Set(title);
            }
            if let Some(description) = patch.description {
                recipe_active.description = Set(description);
            }
            if let Some(time_minutes) = patch.time_minutes {
                recipe_active.time_minutes = Set(time_minutes);
            }
            if let Some(price) = patch.price {
                recipe_active.price = Set(price);
            }
            if let Some(link) = patch.link {
                recipe_active.link = Set(Some(link));
            }
            recipe_active.updated_at = Set(Utc::now());
            let updated = recipe_active.update(txn).await?;

            if let Some(names) = patch.tags {
                set_recipe_tags(txn, user_id, updated.id, &names).await?;
            }
            if let Some(names) = patch.ingredients {
                set_recipe_ingredients(txn, user_id, updated.id, &names).await?;
            }
            Ok(())
        })
    })
    .await
    .map_err(flatten_tx_err)?;

    get_recipe(db, recipe_id, user_id).await
}

/// Retrieves an owned recipe with its tags and ingredients attached.
pub async fn get_recipe(
    db: &DatabaseConnection,
    recipe_id: i32,
    user_id: i32,
) -> Result<RecipeDetail, AppError> {
    let recipe = recipe::Entity::find_by_id(recipe_id)
        .filter(recipe::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".to_string()))?;

    let tags = recipe
        .find_related(tag::Entity)
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await?;
    let ingredients = recipe
        .find_related(ingredient::Entity)
        .order_by_asc(ingredient::Column::Name)
        .all(db)
        .await?;

    Ok(RecipeDetail {
        recipe,
        tags,
        ingredients,
    })
}

/// Lists a user's recipes, most recently created first.
pub async fn list_recipes(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<recipe::Model>, DbErr> {
    recipe::Entity::find()
        .filter(recipe::Column::UserId.eq(user_id))
        .order_by_desc(recipe::Column::Id)
        .all(db)
        .await
}

/// Deletes an owned recipe. Join rows cascade.
pub async fn delete_recipe(
    db: &DatabaseConnection,
    recipe_id: i32,
    user_id: i32,
) -> Result<(), AppError> {
    let result = recipe::Entity::delete_many()
        .filter(recipe::Column::Id.eq(recipe_id))
        .filter(recipe::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Recipe not found".to_string()));
    }
    Ok(())
}
