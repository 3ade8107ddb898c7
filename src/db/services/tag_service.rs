use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use crate::db::entities::tag;
use crate::web::error::AppError;

/// Lists a user's tags, ordered by name.
pub async fn list_tags(db: &DatabaseConnection, user_id: i32) -> Result<Vec<tag::Model>, DbErr> {
    tag::Entity::find()
        .filter(tag::Column::UserId.eq(user_id))
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await
}

/// Renames an owned tag.
pub async fn update_tag(
    db: &DatabaseConnection,
    tag_id: i32,
    user_id: i32,
    name: &str,
) -> Result<tag::Model, AppError> {
    let tag_model = tag::Entity::find_by_id(tag_id)
        .filter(tag::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".to_string()))?;

    let mut tag_active: tag::ActiveModel = tag_model.into();
    tag_active.name = Set(name.to_owned());
    tag_active.update(db).await.map_err(|err| {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            AppError::Conflict("A tag with this name already exists.".to_string())
        } else {
            err.into()
        }
    })
}

/// Deletes an owned tag. Recipe join rows cascade.
pub async fn delete_tag(
    db: &DatabaseConnection,
    tag_id: i32,
    user_id: i32,
) -> Result<(), AppError> {
    let result = tag::Entity::delete_many()
        .filter(tag::Column::Id.eq(tag_id))
        .filter(tag::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Tag not found".to_string()));
    }
    Ok(())
}
