// ABOUTME: Shopping list derivation from a generated plan with recipe selection and exclusions
// ABOUTME: Pure functions so the same semantics apply on every client surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Shopping List Derivation
//!
//! A plan's flat shopping list is filtered two ways before it reaches the
//! user: by which recipes they selected to cook, and by individual items they
//! excluded because the pantry already holds them. Exclusions belong to the
//! current plan; generating a new plan starts from a fresh selection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{ChefPlan, ShoppingItem};

/// The user's current selection over a generated plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShoppingSelection {
    /// Recipe names to shop for; empty means every recipe in the plan
    #[serde(default)]
    pub selected_recipes: Vec<String>,
    /// Item names the user excluded (case-insensitive)
    #[serde(default)]
    pub excluded_items: Vec<String>,
}

impl ShoppingSelection {
    /// Selection covering the whole plan with no exclusions, the state every
    /// newly generated plan starts from
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Toggle an item exclusion, returning whether it is now excluded
    pub fn toggle_exclusion(&mut self, item_name: &str) -> bool {
        let lowered = item_name.to_lowercase();
        if let Some(pos) = self
            .excluded_items
            .iter()
            .position(|e| e.to_lowercase() == lowered)
        {
            self.excluded_items.remove(pos);
            false
        } else {
            self.excluded_items.push(item_name.to_owned());
            true
        }
    }
}

/// Derive the effective shopping list for a plan under a selection
///
/// Items are kept when their recipe is selected (or no recipes are selected,
/// meaning all) and their name is not excluded. Matching is case-insensitive
/// for exclusions and exact for recipe names, mirroring how the plan schema
/// defines `reason`.
#[must_use]
pub fn derive_shopping_list(plan: &ChefPlan, selection: &ShoppingSelection) -> Vec<ShoppingItem> {
    let selected: HashSet<&str> = selection
        .selected_recipes
        .iter()
        .map(String::as_str)
        .collect();
    let excluded: HashSet<String> = selection
        .excluded_items
        .iter()
        .map(|e| e.to_lowercase())
        .collect();

    plan.shopping_list
        .iter()
        .filter(|item| selected.is_empty() || selected.contains(item.reason.as_str()))
        .filter(|item| !excluded.contains(&item.name.to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, reason: &str) -> ShoppingItem {
        ShoppingItem {
            name: name.into(),
            quantity: "1".into(),
            reason: reason.into(),
        }
    }

    fn plan() -> ChefPlan {
        ChefPlan {
            summary: "test".into(),
            recipes: vec![],
            shopping_list: vec![
                item("soy sauce", "Fried Rice"),
                item("basil", "Pasta"),
                item("parmesan", "Pasta"),
            ],
        }
    }

    #[test]
    fn test_empty_selection_keeps_everything() {
        let list = derive_shopping_list(&plan(), &ShoppingSelection::all());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_recipe_selection_filters_items() {
        let selection = ShoppingSelection {
            selected_recipes: vec!["Pasta".into()],
            excluded_items: vec![],
        };
        let list = derive_shopping_list(&plan(), &selection);
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|i| i.reason == "Pasta"));
    }

    #[test]
    fn test_exclusions_are_case_insensitive() {
        let selection = ShoppingSelection {
            selected_recipes: vec![],
            excluded_items: vec!["Basil".into()],
        };
        let list = derive_shopping_list(&plan(), &selection);
        assert_eq!(list.len(), 2);
        assert!(!list.iter().any(|i| i.name == "basil"));
    }

    #[test]
    fn test_exclusion_applies_across_reselection() {
        let mut selection = ShoppingSelection {
            selected_recipes: vec!["Pasta".into()],
            excluded_items: vec!["basil".into()],
        };
        let list = derive_shopping_list(&plan(), &selection);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "parmesan");

        // Dropping and re-adding the recipe leaves the exclusion in force
        selection.selected_recipes.clear();
        selection.selected_recipes.push("Pasta".into());
        let list = derive_shopping_list(&plan(), &selection);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "parmesan");
    }

    #[test]
    fn test_toggle_exclusion_roundtrip() {
        let mut selection = ShoppingSelection::all();
        assert!(selection.toggle_exclusion("Basil"));
        assert!(!selection.toggle_exclusion("basil"));
        assert!(selection.excluded_items.is_empty());
    }
}
