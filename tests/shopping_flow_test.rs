// ABOUTME: Integration tests for shopping list derivation and persistence
// ABOUTME: Covers plan-to-list derivation, selection semantics, and bought state
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chef_fridge::models::{ChefPlan, ShoppingItem};
use chef_fridge::planner::{derive_shopping_list, ShoppingSelection};

fn item(name: &str, quantity: &str, reason: &str) -> ShoppingItem {
    ShoppingItem {
        name: name.into(),
        quantity: quantity.into(),
        reason: reason.into(),
    }
}

fn sample_plan() -> ChefPlan {
    ChefPlan {
        summary: "Two dinners from what you have".into(),
        recipes: vec![
            common::sample_recipe("Omelette"),
            common::sample_recipe("Stir Fry"),
        ],
        shopping_list: vec![
            item("chives", "1 bunch", "Omelette"),
            item("soy sauce", "1 bottle", "Stir Fry"),
            item("bell pepper", "2", "Stir Fry"),
        ],
    }
}

#[test]
fn test_empty_selection_keeps_everything() {
    let plan = sample_plan();
    let derived = derive_shopping_list(&plan, &ShoppingSelection::all());
    assert_eq!(derived.len(), 3);
}

#[test]
fn test_selection_filters_by_recipe() {
    let plan = sample_plan();
    let selection = ShoppingSelection {
        selected_recipes: vec!["Stir Fry".into()],
        excluded_items: vec![],
    };

    let derived = derive_shopping_list(&plan, &selection);
    let names: Vec<&str> = derived.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["soy sauce", "bell pepper"]);
}

#[test]
fn test_exclusions_drop_items_case_insensitively() {
    let plan = sample_plan();
    let selection = ShoppingSelection {
        selected_recipes: vec![],
        excluded_items: vec!["Soy Sauce".into()],
    };

    let derived = derive_shopping_list(&plan, &selection);
    let names: Vec<&str> = derived.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["chives", "bell pepper"]);
}

#[test]
fn test_exclusion_survives_selection_changes() {
    let plan = sample_plan();
    let mut selection = ShoppingSelection {
        selected_recipes: vec!["Stir Fry".into()],
        excluded_items: vec![],
    };
    selection.toggle_exclusion("soy sauce");

    let derived = derive_shopping_list(&plan, &selection);
    let names: Vec<&str> = derived.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["bell pepper"]);

    // Deselecting and reselecting the recipe must not resurrect the exclusion
    selection.selected_recipes.clear();
    selection.selected_recipes.push("Stir Fry".into());

    let derived = derive_shopping_list(&plan, &selection);
    let names: Vec<&str> = derived.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["bell pepper"]);
}

#[test]
fn test_selection_and_exclusions_combine() {
    let plan = sample_plan();
    let selection = ShoppingSelection {
        selected_recipes: vec!["Omelette".into(), "Stir Fry".into()],
        excluded_items: vec!["Bell Pepper".into()],
    };

    let derived = derive_shopping_list(&plan, &selection);
    let names: Vec<&str> = derived.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["chives", "soy sauce"]);
}

#[tokio::test]
async fn test_persisted_list_lifecycle() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    let shopping = database.shopping();
    let items = vec![
        item("chives", "1 bunch", "Omelette"),
        item("soy sauce", "1 bottle", "Stir Fry"),
    ];
    let entries = shopping.add_items(user.id, &items).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].recipe_name, "Omelette");
    assert!(!entries[0].bought);

    shopping
        .set_bought(user.id, entries[0].id, true)
        .await
        .unwrap();

    let listed = shopping.list(user.id).await.unwrap();
    let bought_count = listed.iter().filter(|e| e.bought).count();
    assert_eq!(bought_count, 1);

    let removed = shopping.clear_bought(user.id).await.unwrap();
    assert_eq!(removed, 1);

    let remaining = shopping.list(user.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "soy sauce");
}

#[tokio::test]
async fn test_clear_empties_the_list() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    let shopping = database.shopping();
    shopping
        .add_items(user.id, &[item("flour", "1 kg", "Pancakes")])
        .await
        .unwrap();
    shopping.clear(user.id).await.unwrap();

    assert!(shopping.list(user.id).await.unwrap().is_empty());
}
