// ABOUTME: Integration tests for inventory management
// ABOUTME: Covers case-insensitive deduplication, CRUD, and snapshot replacement
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chef_fridge::errors::ErrorCode;
use chef_fridge::models::{Ingredient, IngredientCategory};
use uuid::Uuid;

#[tokio::test]
async fn test_add_and_list_ingredients() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    let inventory = database.inventory();
    inventory
        .add(user.id, &Ingredient::new("Milk", IngredientCategory::Dairy))
        .await
        .unwrap();
    inventory
        .add(
            user.id,
            &Ingredient::new("apples", IngredientCategory::Produce),
        )
        .await
        .unwrap();

    let items = inventory.list(user.id).await.unwrap();
    assert_eq!(items.len(), 2);
    // Ordered by name, case-insensitively
    assert_eq!(items[0].name, "apples");
    assert_eq!(items[1].name, "Milk");
}

#[tokio::test]
async fn test_duplicate_name_merges_case_insensitively() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    let inventory = database.inventory();
    let original = inventory
        .add(user.id, &Ingredient::new("Milk", IngredientCategory::Dairy))
        .await
        .unwrap();

    let merged = inventory
        .add(user.id, &Ingredient::new("milk", IngredientCategory::Dairy))
        .await
        .unwrap();
    assert_eq!(merged.id, original.id);
    assert_eq!(merged.name, "Milk");

    let merged = inventory
        .add(user.id, &Ingredient::new("MILK", IngredientCategory::Other))
        .await
        .unwrap();
    assert_eq!(merged.id, original.id);

    assert_eq!(inventory.count(user.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_same_name_allowed_across_users() {
    let database = common::create_test_database().await.unwrap();
    let alice = common::create_test_user(&database).await.unwrap();
    let bob = common::create_test_user(&database).await.unwrap();

    let inventory = database.inventory();
    inventory
        .add(alice.id, &Ingredient::new("Milk", IngredientCategory::Dairy))
        .await
        .unwrap();
    inventory
        .add(bob.id, &Ingredient::new("milk", IngredientCategory::Dairy))
        .await
        .unwrap();

    assert_eq!(inventory.count(alice.id).await.unwrap(), 1);
    assert_eq!(inventory.count(bob.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_add_missing_skips_existing() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    let inventory = database.inventory();
    inventory
        .add(user.id, &Ingredient::new("Eggs", IngredientCategory::Dairy))
        .await
        .unwrap();

    let recognized = vec![
        Ingredient::new("eggs", IngredientCategory::Dairy),
        Ingredient::new("spinach", IngredientCategory::Produce),
        Ingredient::new("butter", IngredientCategory::Dairy),
    ];
    let added = inventory.add_missing(user.id, &recognized).await.unwrap();

    let added_names: Vec<&str> = added.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(added_names, vec!["spinach", "butter"]);
    assert_eq!(inventory.count(user.id).await.unwrap(), 3);
}

#[tokio::test]
async fn test_update_and_remove() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    let inventory = database.inventory();
    let ingredient = Ingredient::new("tomatoes", IngredientCategory::Produce);
    inventory.add(user.id, &ingredient).await.unwrap();

    inventory
        .update(
            user.id,
            ingredient.id,
            "cherry tomatoes",
            IngredientCategory::Produce,
        )
        .await
        .unwrap();

    let items = inventory.list(user.id).await.unwrap();
    assert_eq!(items[0].name, "cherry tomatoes");

    inventory.remove(user.id, ingredient.id).await.unwrap();
    assert_eq!(inventory.count(user.id).await.unwrap(), 0);

    // Removing again reports not found
    let err = inventory.remove(user.id, ingredient.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_update_unknown_ingredient_not_found() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    let err = database
        .inventory()
        .update(user.id, Uuid::new_v4(), "ghost", IngredientCategory::Other)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_replace_all_swaps_inventory() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    let inventory = database.inventory();
    inventory
        .add(user.id, &Ingredient::new("old", IngredientCategory::Pantry))
        .await
        .unwrap();

    let snapshot = vec![
        Ingredient::new("rice", IngredientCategory::Pantry),
        Ingredient::new("beans", IngredientCategory::Pantry),
        // Duplicate within the snapshot is dropped, not an error
        Ingredient::new("Rice", IngredientCategory::Pantry),
    ];
    inventory.replace_all(user.id, &snapshot).await.unwrap();

    let items = inventory.list(user.id).await.unwrap();
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["beans", "rice"]);
}
