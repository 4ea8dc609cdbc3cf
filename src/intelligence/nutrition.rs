// ABOUTME: Energy-needs calculations using the Mifflin-St Jeor equation
// ABOUTME: BMR, activity-adjusted TDEE and goal-adjusted daily calorie targets
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Energy-needs calculator.
//!
//! # Scientific References
//!
//! - Mifflin, M.D., et al. (1990). A new predictive equation for resting energy expenditure.
//!   *American Journal of Clinical Nutrition*, 51(2), 241-247.
//!   <https://doi.org/10.1093/ajcn/51.2.241>
//! - `McArdle` et al. (2010) - Exercise Physiology (activity factors)

use crate::errors::{AppError, AppResult};
use crate::models::{ActivityLevel, FamilyMember, Gender, NutritionGoal};
use serde::{Deserialize, Serialize};

/// Mifflin-St Jeor weight coefficient (kcal per kg)
const MSJ_WEIGHT_COEF: f64 = 10.0;
/// Mifflin-St Jeor height coefficient (kcal per cm)
const MSJ_HEIGHT_COEF: f64 = 6.25;
/// Mifflin-St Jeor age coefficient (kcal per year, subtracted)
const MSJ_AGE_COEF: f64 = 5.0;
/// Gender constant for men
const MSJ_MALE_CONSTANT: f64 = 5.0;
/// Gender constant for women
const MSJ_FEMALE_CONSTANT: f64 = -161.0;
/// Minimum safe daily intake (kcal)
const MIN_DAILY_KCAL: f64 = 1000.0;

/// Daily calorie deficit for weight loss (kcal)
const WEIGHT_LOSS_DEFICIT: f64 = 500.0;
/// Daily calorie surplus for muscle gain (kcal)
const MUSCLE_GAIN_SURPLUS: f64 = 300.0;

/// Computed energy needs for one family member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyNeeds {
    /// Basal Metabolic Rate in kcal/day
    pub bmr: f64,
    /// Total Daily Energy Expenditure in kcal/day
    pub tdee: f64,
    /// Goal-adjusted daily calorie target in kcal/day
    pub target_kcal: f64,
}

impl EnergyNeeds {
    /// Compute energy needs for a family member profile
    ///
    /// # Errors
    ///
    /// Returns an error if the member's stats are out of valid ranges
    pub fn for_member(member: &FamilyMember) -> AppResult<Self> {
        let bmr =
            calculate_mifflin_st_jeor(member.weight_kg, member.height_cm, member.age, member.gender)?;
        let tdee = calculate_tdee(bmr, member.activity_level)?;
        let target_kcal = daily_calorie_target(tdee, member.goal);
        Ok(Self {
            bmr,
            tdee,
            target_kcal,
        })
    }
}

/// Calculate Basal Metabolic Rate using the Mifflin-St Jeor equation (1990)
///
/// Formula: BMR = (10 x `weight_kg`) + (6.25 x `height_cm`) - (5 x age) + `gender_offset`
/// - Men: +5
/// - Women: -161
///
/// # Errors
///
/// Returns an error if input values are out of valid ranges
pub fn calculate_mifflin_st_jeor(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    gender: Gender,
) -> AppResult<f64> {
    if weight_kg <= 0.0 || weight_kg > 300.0 {
        return Err(AppError::invalid_input(
            "Weight must be between 0 and 300 kg",
        ));
    }
    if height_cm <= 0.0 || height_cm > 300.0 {
        return Err(AppError::invalid_input(
            "Height must be between 0 and 300 cm",
        ));
    }
    if !(1..=120).contains(&age) {
        return Err(AppError::invalid_input("Age must be between 1 and 120 years"));
    }

    let gender_constant = match gender {
        Gender::Male => MSJ_MALE_CONSTANT,
        Gender::Female => MSJ_FEMALE_CONSTANT,
    };

    let bmr = MSJ_WEIGHT_COEF * weight_kg + MSJ_HEIGHT_COEF * height_cm
        - MSJ_AGE_COEF * f64::from(age)
        + gender_constant;

    // Minimum 1000 kcal/day safety check
    Ok(bmr.max(MIN_DAILY_KCAL))
}

/// Calculate Total Daily Energy Expenditure
///
/// Formula: TDEE = BMR x Activity Factor
///
/// Activity factors based on `McArdle` et al. (2010):
/// - Sedentary: 1.2
/// - Lightly active: 1.375
/// - Moderately active: 1.55
/// - Very active: 1.725
/// - Extra active: 1.9
///
/// # Errors
///
/// Returns an error if BMR is not positive
pub fn calculate_tdee(bmr: f64, activity_level: ActivityLevel) -> AppResult<f64> {
    if bmr <= 0.0 {
        return Err(AppError::invalid_input("BMR must be positive"));
    }

    let activity_factor = match activity_level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::LightlyActive => 1.375,
        ActivityLevel::ModeratelyActive => 1.55,
        ActivityLevel::VeryActive => 1.725,
        ActivityLevel::ExtraActive => 1.9,
    };

    Ok(bmr * activity_factor)
}

/// Adjust TDEE for the member's nutritional goal, never below the safety floor
#[must_use]
pub fn daily_calorie_target(tdee: f64, goal: NutritionGoal) -> f64 {
    let target = match goal {
        NutritionGoal::LoseWeight => tdee - WEIGHT_LOSS_DEFICIT,
        NutritionGoal::Maintain => tdee,
        NutritionGoal::GainMuscle => tdee + MUSCLE_GAIN_SURPLUS,
    };
    target.max(MIN_DAILY_KCAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmr_reference_male() {
        // 80 kg, 180 cm, 30 years, male: 800 + 1125 - 150 + 5 = 1780
        let bmr = calculate_mifflin_st_jeor(80.0, 180.0, 30, Gender::Male).unwrap();
        assert!((bmr - 1780.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tdee_moderate_activity() {
        let bmr = calculate_mifflin_st_jeor(80.0, 180.0, 30, Gender::Male).unwrap();
        let tdee = calculate_tdee(bmr, ActivityLevel::ModeratelyActive).unwrap();
        assert!((tdee - 2759.0).abs() < 1.0);
    }

    #[test]
    fn test_bmr_female_constant() {
        let male = calculate_mifflin_st_jeor(65.0, 165.0, 40, Gender::Male).unwrap();
        let female = calculate_mifflin_st_jeor(65.0, 165.0, 40, Gender::Female).unwrap();
        assert!((male - female - 166.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bmr_floor() {
        // Tiny adult stats still clamp to the safety floor
        let bmr = calculate_mifflin_st_jeor(30.0, 120.0, 90, Gender::Female).unwrap();
        assert!((bmr - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_weight_rejected() {
        assert!(calculate_mifflin_st_jeor(0.0, 180.0, 30, Gender::Male).is_err());
        assert!(calculate_mifflin_st_jeor(400.0, 180.0, 30, Gender::Male).is_err());
    }

    #[test]
    fn test_goal_adjustment() {
        assert!((daily_calorie_target(2759.0, NutritionGoal::LoseWeight) - 2259.0).abs() < 0.01);
        assert!((daily_calorie_target(2759.0, NutritionGoal::Maintain) - 2759.0).abs() < 0.01);
        assert!((daily_calorie_target(2759.0, NutritionGoal::GainMuscle) - 3059.0).abs() < 0.01);
        // Deficit never drops below the safety floor
        assert!((daily_calorie_target(1200.0, NutritionGoal::LoseWeight) - 1000.0).abs() < 0.01);
    }
}
