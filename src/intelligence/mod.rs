// ABOUTME: Nutrition intelligence used to personalize generated meal plans
// ABOUTME: Currently hosts the energy-needs calculator built on published equations
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Nutrition Intelligence
//!
//! Evidence-based calculations that turn family member profiles into daily
//! calorie targets for the plan prompt.

pub mod nutrition;

pub use nutrition::{
    calculate_mifflin_st_jeor, calculate_tdee, daily_calorie_target, EnergyNeeds,
};
