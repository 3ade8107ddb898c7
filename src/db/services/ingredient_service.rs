use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use crate::db::entities::ingredient;
use crate::web::error::AppError;

/// Lists a user's ingredients, ordered by name.
pub async fn list_ingredients(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<ingredient::Model>, DbErr> {
    ingredient::Entity::find()
        .filter(ingredient::Column::UserId.eq(user_id))
        .order_by_asc(ingredient::Column::Name)
        .all(db)
        .await
}

/// Renames an owned ingredient.
pub async fn update_ingredient(
    db: &DatabaseConnection,
    ingredient_id: i32,
    user_id: i32,
    name: &str,
) -> Result<ingredient::Model, AppError> {
    let ingredient_model = ingredient::Entity::find_by_id(ingredient_id)
        .filter(ingredient::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient not found".to_string()))?;

    let mut ingredient_active: ingredient::ActiveModel = ingredient_model.into();
    ingredient_active.name = Set(name.to_owned());
    ingredient_active.update(db).await.map_err(|err| {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            AppError::Conflict("An ingredient with this name already exists.".to_string())
        } else {
            err.into()
        }
    })
}

/// Deletes an owned ingredient. Recipe join rows cascade.
pub async fn delete_ingredient(
    db: &DatabaseConnection,
    ingredient_id: i32,
    user_id: i32,
) -> Result<(), AppError> {
    let result = ingredient::Entity::delete_many()
        .filter(ingredient::Column::Id.eq(ingredient_id))
        .filter(ingredient::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Ingredient not found".to_string()));
    }
    Ok(())
}
