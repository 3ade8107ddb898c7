//! Integration tests for the database service layer, run against a real
//! SQLite in-memory database with migrations applied.

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use sea_orm_migration::MigratorTrait;
use std::str::FromStr;

use recipe_api::db::entities::prelude::{Tag, TagColumn};
use recipe_api::db::entities::user;
use recipe_api::db::migrator::Migrator;
use recipe_api::db::services::{
    NewRecipe, RecipePatch, create_recipe, create_superuser, create_user, delete_recipe,
    delete_tag, get_recipe, list_ingredients, list_recipes, list_tags, update_recipe, update_tag,
};
use recipe_api::db::services::user_service::{authenticate, normalize_email};
use recipe_api::web::error::AppError;

async fn setup_test_db() -> DatabaseConnection {
    let db = sea_orm::Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None).await.expect("Failed to run migrations");

    db
}

async fn create_test_user(db: &DatabaseConnection, email: &str) -> user::Model {
    create_user(db, email, "password123", "Test User")
        .await
        .expect("Failed to create test user")
}

fn sample_recipe() -> NewRecipe {
    NewRecipe {
        title: "Sample recipe".to_string(),
        description: "A sample description.".to_string(),
        time_minutes: 10,
        price: Decimal::from_str("5.00").unwrap(),
        link: None,
        tags: None,
        ingredients: None,
    }
}

#[tokio::test]
async fn test_create_user_then_authenticate() {
    let db = setup_test_db().await;

    let created = create_test_user(&db, "user@example.com").await;
    assert_eq!(created.email, "user@example.com");
    assert!(created.is_active);
    assert!(!created.is_staff);

    let authenticated = authenticate(&db, "user@example.com", "password123")
        .await
        .expect("Authentication should succeed");
    assert_eq!(authenticated.id, created.id);
    assert_eq!(authenticated.email, "user@example.com");
}

#[tokio::test]
async fn test_password_is_stored_hashed() {
    let db = setup_test_db().await;

    let created = create_test_user(&db, "user@example.com").await;
    assert_ne!(created.password_hash, "password123");
    assert!(bcrypt::verify("password123", &created.password_hash).unwrap());
}

#[tokio::test]
async fn test_authenticate_failures_are_indistinguishable() {
    let db = setup_test_db().await;
    create_test_user(&db, "user@example.com").await;

    let wrong_password = authenticate(&db, "user@example.com", "not-the-password")
        .await
        .unwrap_err();
    let unknown_email = authenticate(&db, "nobody@example.com", "password123")
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AppError::InvalidCredentials));
    assert!(matches!(unknown_email, AppError::InvalidCredentials));
    // Same variant, same message: nothing reveals whether the email exists.
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_email_domain_is_normalized() {
    let db = setup_test_db().await;

    let samples = [
        ("test1@EXAMPLE.com", "test1@example.com"),
        ("Test2@Example.com", "Test2@example.com"),
        ("TEST3@EXAMPLE.COM", "TEST3@example.com"),
        ("test4@example.COM", "test4@example.com"),
    ];
    for (raw, expected) in samples {
        let user = create_user(&db, raw, "password123", "").await.unwrap();
        assert_eq!(user.email, expected);
    }
}

#[tokio::test]
async fn test_invalid_emails_rejected() {
    let db = setup_test_db().await;

    for raw in ["", "   ", "no-at-sign", "@example.com", "user@"] {
        let err = create_user(&db, raw, "password123", "").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)), "email {raw:?}");
    }

    assert!(normalize_email("user@EXAMPLE.org").is_ok());
}

#[tokio::test]
async fn test_short_password_rejected() {
    let db = setup_test_db().await;

    let err = create_user(&db, "user@example.com", "pw", "").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let db = setup_test_db().await;
    create_test_user(&db, "user@example.com").await;

    let err = create_user(&db, "user@example.com", "password123", "")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UserAlreadyExists(_)));
}

#[tokio::test]
async fn test_create_superuser_sets_flags() {
    let db = setup_test_db().await;

    let admin = create_superuser(&db, "admin@example.com", "password123")
        .await
        .unwrap();
    assert!(admin.is_staff);
    assert!(admin.is_superuser);

    let authenticated = authenticate(&db, "admin@example.com", "password123")
        .await
        .unwrap();
    assert_eq!(authenticated.id, admin.id);
}

#[tokio::test]
async fn test_create_recipe_with_new_ingredients() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "user@example.com").await;

    let detail = create_recipe(
        &db,
        user.id,
        NewRecipe {
            title: "Cauliflower curry".to_string(),
            time_minutes: 60,
            price: Decimal::from_str("4.30").unwrap(),
            ingredients: Some(vec!["Cauliflower".to_string(), "Cilantro".to_string()]),
            ..sample_recipe()
        },
    )
    .await
    .unwrap();

    assert_eq!(detail.recipe.title, "Cauliflower curry");
    assert_eq!(detail.recipe.time_minutes, 60);
    assert_eq!(detail.recipe.price, Decimal::from_str("4.30").unwrap());
    assert_eq!(detail.ingredients.len(), 2);
    let mut names: Vec<&str> = detail.ingredients.iter().map(|i| i.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["Cauliflower", "Cilantro"]);
}

#[tokio::test]
async fn test_get_or_create_reuses_existing_tags() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "user@example.com").await;

    for _ in 0..2 {
        create_recipe(
            &db,
            user.id,
            NewRecipe {
                tags: Some(vec!["Vegan".to_string(), "Dinner".to_string()]),
                ..sample_recipe()
            },
        )
        .await
        .unwrap();
    }

    // Two recipes, but still exactly 2 tag rows: the second write reused them.
    let tag_count = Tag::find()
        .filter(TagColumn::UserId.eq(user.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(tag_count, 2);
}

#[tokio::test]
async fn test_duplicate_names_in_one_list_collapse() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "user@example.com").await;

    let detail = create_recipe(
        &db,
        user.id,
        NewRecipe {
            tags: Some(vec!["Vegan".to_string(), "Vegan".to_string()]),
            ingredients: Some(vec![
                "Salt".to_string(),
                "Pepper".to_string(),
                "Salt".to_string(),
            ]),
            ..sample_recipe()
        },
    )
    .await
    .unwrap();

    assert_eq!(detail.tags.len(), 1);
    assert_eq!(detail.ingredients.len(), 2);
}

#[tokio::test]
async fn test_create_recipe_validation() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "user@example.com").await;

    let err = create_recipe(
        &db,
        user.id,
        NewRecipe {
            time_minutes: -5,
            ..sample_recipe()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = create_recipe(
        &db,
        user.id,
        NewRecipe {
            time_minutes: 0,
            ..sample_recipe()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = create_recipe(
        &db,
        user.id,
        NewRecipe {
            price: Decimal::from_str("-0.01").unwrap(),
            ..sample_recipe()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_update_with_empty_ingredient_list_detaches_all() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "user@example.com").await;

    let created = create_recipe(
        &db,
        user.id,
        NewRecipe {
            title: "Soup".to_string(),
            price: Decimal::from_str("3.50").unwrap(),
            ingredients: Some(vec!["Onion".to_string(), "Carrot".to_string()]),
            ..sample_recipe()
        },
    )
    .await
    .unwrap();
    assert_eq!(created.ingredients.len(), 2);

    let updated = update_recipe(
        &db,
        created.recipe.id,
        user.id,
        RecipePatch {
            ingredients: Some(vec![]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(updated.ingredients.is_empty());
    // Scalars untouched by the detach.
    assert_eq!(updated.recipe.title, "Soup");
    assert_eq!(updated.recipe.price, Decimal::from_str("3.50").unwrap());
    // The ingredient rows themselves still exist in the user's registry.
    assert_eq!(list_ingredients(&db, user.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_replaces_tag_set() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "user@example.com").await;

    let created = create_recipe(
        &db,
        user.id,
        NewRecipe {
            tags: Some(vec!["Breakfast".to_string()]),
            ..sample_recipe()
        },
    )
    .await
    .unwrap();

    let updated = update_recipe(
        &db,
        created.recipe.id,
        user.id,
        RecipePatch {
            tags: Some(vec!["Lunch".to_string()]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // Full replacement, not a merge.
    assert_eq!(updated.tags.len(), 1);
    assert_eq!(updated.tags[0].name, "Lunch");
}

#[tokio::test]
async fn test_partial_update_leaves_absent_fields() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "user@example.com").await;

    let created = create_recipe(
        &db,
        user.id,
        NewRecipe {
            title: "Old title".to_string(),
            time_minutes: 25,
            price: Decimal::from_str("9.99").unwrap(),
            link: Some("https://example.com/recipe".to_string()),
            ..sample_recipe()
        },
    )
    .await
    .unwrap();

    let updated = update_recipe(
        &db,
        created.recipe.id,
        user.id,
        RecipePatch {
            title: Some("New title".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.recipe.title, "New title");
    assert_eq!(updated.recipe.time_minutes, 25);
    assert_eq!(updated.recipe.price, Decimal::from_str("9.99").unwrap());
    assert_eq!(
        updated.recipe.link.as_deref(),
        Some("https://example.com/recipe")
    );
}

#[tokio::test]
async fn test_update_validation() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "user@example.com").await;
    let created = create_recipe(&db, user.id, sample_recipe()).await.unwrap();

    let err = update_recipe(
        &db,
        created.recipe.id,
        user.id,
        RecipePatch {
            time_minutes: Some(-1),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_cross_user_isolation() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "owner@example.com").await;
    let other = create_test_user(&db, "other@example.com").await;

    let created = create_recipe(
        &db,
        owner.id,
        NewRecipe {
            tags: Some(vec!["Vegan".to_string()]),
            ingredients: Some(vec!["Kale".to_string()]),
            ..sample_recipe()
        },
    )
    .await
    .unwrap();

    // Nothing of the owner's shows up in the other user's lists.
    assert!(list_recipes(&db, other.id).await.unwrap().is_empty());
    assert!(list_tags(&db, other.id).await.unwrap().is_empty());
    assert!(list_ingredients(&db, other.id).await.unwrap().is_empty());

    // Acting on the owner's recipe behaves exactly like it not existing.
    let err = get_recipe(&db, created.recipe.id, other.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = update_recipe(
        &db,
        created.recipe.id,
        other.id,
        RecipePatch {
            title: Some("hijacked".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = delete_recipe(&db, created.recipe.id, other.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // And it is still there for its owner.
    let detail = get_recipe(&db, created.recipe.id, owner.id).await.unwrap();
    assert_eq!(detail.recipe.title, "Sample recipe");
}

#[tokio::test]
async fn test_same_name_tags_not_shared_across_users() {
    let db = setup_test_db().await;
    let first = create_test_user(&db, "first@example.com").await;
    let second = create_test_user(&db, "second@example.com").await;

    for user_id in [first.id, second.id] {
        create_recipe(
            &db,
            user_id,
            NewRecipe {
                tags: Some(vec!["Vegan".to_string()]),
                ..sample_recipe()
            },
        )
        .await
        .unwrap();
    }

    // One "Vegan" row per user: no deduplication across accounts.
    let total = Tag::find()
        .filter(TagColumn::Name.eq("Vegan"))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_recipes_listed_by_descending_id() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "user@example.com").await;
    let other = create_test_user(&db, "other@example.com").await;

    // Interleave inserts from an unrelated user.
    let mut expected_ids = Vec::new();
    for i in 0..3 {
        let mine = create_recipe(
            &db,
            user.id,
            NewRecipe {
                title: format!("Recipe {i}"),
                ..sample_recipe()
            },
        )
        .await
        .unwrap();
        expected_ids.push(mine.recipe.id);
        create_recipe(&db, other.id, sample_recipe()).await.unwrap();
    }
    expected_ids.reverse();

    let listed: Vec<i32> = list_recipes(&db, user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(listed, expected_ids);
}

#[tokio::test]
async fn test_tags_and_ingredients_listed_by_name() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "user@example.com").await;

    create_recipe(
        &db,
        user.id,
        NewRecipe {
            tags: Some(vec!["Dessert".to_string(), "Breakfast".to_string()]),
            ingredients: Some(vec!["Zucchini".to_string(), "Apple".to_string()]),
            ..sample_recipe()
        },
    )
    .await
    .unwrap();

    let tag_names: Vec<String> = list_tags(&db, user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(tag_names, ["Breakfast", "Dessert"]);

    let ingredient_names: Vec<String> = list_ingredients(&db, user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(ingredient_names, ["Apple", "Zucchini"]);
}

#[tokio::test]
async fn test_delete_recipe() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "user@example.com").await;
    let created = create_recipe(&db, user.id, sample_recipe()).await.unwrap();

    delete_recipe(&db, created.recipe.id, user.id).await.unwrap();

    let err = get_recipe(&db, created.recipe.id, user.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Deleting again reports not-found.
    let err = delete_recipe(&db, created.recipe.id, user.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_rename_tag_and_conflict() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "user@example.com").await;

    create_recipe(
        &db,
        user.id,
        NewRecipe {
            tags: Some(vec!["Dinner".to_string(), "Vegan".to_string()]),
            ..sample_recipe()
        },
    )
    .await
    .unwrap();

    let tags = list_tags(&db, user.id).await.unwrap();
    let dinner = tags.iter().find(|t| t.name == "Dinner").unwrap();

    let renamed = update_tag(&db, dinner.id, user.id, "Supper").await.unwrap();
    assert_eq!(renamed.name, "Supper");

    // Renaming onto an existing name for the same user hits the unique index.
    let err = update_tag(&db, renamed.id, user.id, "Vegan").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_delete_tag_detaches_from_recipes() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "user@example.com").await;

    let created = create_recipe(
        &db,
        user.id,
        NewRecipe {
            tags: Some(vec!["Dinner".to_string()]),
            ..sample_recipe()
        },
    )
    .await
    .unwrap();

    delete_tag(&db, created.tags[0].id, user.id).await.unwrap();

    let detail = get_recipe(&db, created.recipe.id, user.id).await.unwrap();
    assert!(detail.tags.is_empty());

    // Another user's id cannot delete what it does not own.
    let other = create_test_user(&db, "other@example.com").await;
    let recreated = create_recipe(
        &db,
        user.id,
        NewRecipe {
            tags: Some(vec!["Lunch".to_string()]),
            ..sample_recipe()
        },
    )
    .await
    .unwrap();
    let err = delete_tag(&db, recreated.tags[0].id, other.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
