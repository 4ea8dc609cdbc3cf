// ABOUTME: Integration tests for family member profiles
// ABOUTME: Covers CRUD, preference persistence, and energy-needs calculation
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chef_fridge::errors::ErrorCode;
use chef_fridge::intelligence::EnergyNeeds;
use chef_fridge::models::{ActivityLevel, FamilyMember, Gender, NutritionGoal};
use chrono::NaiveDate;
use uuid::Uuid;

#[tokio::test]
async fn test_create_and_get_member() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    let mut member = common::reference_member();
    member.preferences = vec!["no shellfish".into(), "loves pasta".into()];
    member.deadline = NaiveDate::from_ymd_opt(2026, 12, 1);

    let family = database.family();
    family.create(user.id, &member).await.unwrap();

    let loaded = family.get(user.id, member.id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "Alex");
    assert_eq!(loaded.age, 30);
    assert_eq!(loaded.gender, Gender::Male);
    assert_eq!(loaded.preferences, member.preferences);
    assert_eq!(loaded.deadline, member.deadline);
}

#[tokio::test]
async fn test_members_are_scoped_per_user() {
    let database = common::create_test_database().await.unwrap();
    let alice = common::create_test_user(&database).await.unwrap();
    let bob = common::create_test_user(&database).await.unwrap();

    let member = common::reference_member();
    database.family().create(alice.id, &member).await.unwrap();

    assert!(database
        .family()
        .get(bob.id, member.id)
        .await
        .unwrap()
        .is_none());
    assert!(database.family().list(bob.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_member() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    let mut member = common::reference_member();
    database.family().create(user.id, &member).await.unwrap();

    member.weight_kg = 78.5;
    member.goal = NutritionGoal::LoseWeight;
    database.family().update(user.id, &member).await.unwrap();

    let loaded = database
        .family()
        .get(user.id, member.id)
        .await
        .unwrap()
        .unwrap();
    assert!((loaded.weight_kg - 78.5).abs() < f64::EPSILON);
    assert_eq!(loaded.goal, NutritionGoal::LoseWeight);
}

#[tokio::test]
async fn test_delete_member() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    let member = common::reference_member();
    database.family().create(user.id, &member).await.unwrap();
    database.family().delete(user.id, member.id).await.unwrap();

    assert!(database
        .family()
        .get(user.id, member.id)
        .await
        .unwrap()
        .is_none());

    let err = database
        .family()
        .delete(user.id, member.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_energy_needs_for_stored_member() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    let member = common::reference_member();
    database.family().create(user.id, &member).await.unwrap();

    let loaded = database
        .family()
        .get(user.id, member.id)
        .await
        .unwrap()
        .unwrap();
    let needs = EnergyNeeds::for_member(&loaded).unwrap();

    // Mifflin-St Jeor for male 80kg/180cm/30y, moderately active
    assert!((needs.bmr - 1780.0).abs() < 0.5);
    assert!((needs.tdee - 2759.0).abs() < 0.5);
}

#[tokio::test]
async fn test_invalid_stats_rejected() {
    let member = FamilyMember {
        id: Uuid::new_v4(),
        name: "Nobody".into(),
        age: 30,
        gender: Gender::Female,
        height_cm: 170.0,
        weight_kg: 0.0,
        activity_level: ActivityLevel::Sedentary,
        goal: NutritionGoal::Maintain,
        preferences: vec![],
        deadline: None,
    };

    let err = EnergyNeeds::for_member(&member).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}
