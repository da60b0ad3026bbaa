//! Core domain types for the Trenta tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and the 30-day program
//! - User biometrics and weight history
//! - Nutrition goals, food products and logged entries
//!
//! All persisted structs serialize with camelCase field names so the JSON
//! blobs keep the documented shapes (`dayNumber`, `totalCalories`, ...).
//! Optional fields carry serde defaults so records written by older versions
//! (e.g. days without an `unlocked` flag) still deserialize.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Exercise Types
// ============================================================================

/// Muscle-group category of an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseCategory {
    Chest,
    Back,
    Legs,
    Shoulders,
    Arms,
    Core,
    Cardio,
}

impl ExerciseCategory {
    /// All categories, in display order
    pub const ALL: [ExerciseCategory; 7] = [
        ExerciseCategory::Chest,
        ExerciseCategory::Back,
        ExerciseCategory::Legs,
        ExerciseCategory::Shoulders,
        ExerciseCategory::Arms,
        ExerciseCategory::Core,
        ExerciseCategory::Cardio,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ExerciseCategory::Chest => "Chest",
            ExerciseCategory::Back => "Back",
            ExerciseCategory::Legs => "Legs",
            ExerciseCategory::Shoulders => "Shoulders",
            ExerciseCategory::Arms => "Arms",
            ExerciseCategory::Core => "Core",
            ExerciseCategory::Cardio => "Cardio",
        }
    }

    /// Parse a category from its lowercase name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "chest" => Some(ExerciseCategory::Chest),
            "back" => Some(ExerciseCategory::Back),
            "legs" => Some(ExerciseCategory::Legs),
            "shoulders" => Some(ExerciseCategory::Shoulders),
            "arms" => Some(ExerciseCategory::Arms),
            "core" => Some(ExerciseCategory::Core),
            "cardio" => Some(ExerciseCategory::Cardio),
            _ => None,
        }
    }
}

/// An exercise definition, owned by the catalog and referenced by id from
/// workout days (never embedded)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub category: ExerciseCategory,
    pub sets: u32,
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_time_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<String>,
}

// ============================================================================
// Workout Program Types
// ============================================================================

/// One slot of the 30-day program, referencing exercises by id
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDay {
    pub id: String,
    pub day_number: u32,
    pub name: String,
    /// Ordered, unique ids; may reference exercises no longer in the catalog
    /// (stale ids are filtered at read time, not repaired)
    pub exercise_ids: Vec<String>,
    pub completed: bool,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
}

// ============================================================================
// User Profile Types
// ============================================================================

/// Activity level used as the TDEE multiplier
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Lifestyle {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

/// Weight goal direction
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Lose,
    Gain,
    Maintain,
}

/// One logged body-weight measurement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntry {
    pub date: NaiveDate,
    pub weight: f64,
}

/// Persistent user profile, mutated via partial-merge updates
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<Lifestyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_time_minutes_per_week: Option<u32>,
    /// Append-only, sorted descending by date, no dedup
    #[serde(default)]
    pub weight_history: Vec<WeightEntry>,
    #[serde(default)]
    pub has_completed_onboarding: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ============================================================================
// Nutrition Types
// ============================================================================

/// Daily calorie/macro targets derived from biometrics
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NutritionGoal {
    pub daily_calories: i32,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
}

/// Meal slot an entry is logged under
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn label(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// Food product category
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FoodCategory {
    Fruit,
    Vegetable,
    Meat,
    Dairy,
    Grain,
    Snack,
    Drink,
    Other,
}

impl FoodCategory {
    pub fn label(&self) -> &'static str {
        match self {
            FoodCategory::Fruit => "fruit",
            FoodCategory::Vegetable => "vegetable",
            FoodCategory::Meat => "meat",
            FoodCategory::Dairy => "dairy",
            FoodCategory::Grain => "grain",
            FoodCategory::Snack => "snack",
            FoodCategory::Drink => "drink",
            FoodCategory::Other => "other",
        }
    }
}

/// Unit a product's default amount is expressed in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FoodUnit {
    G,
    Ml,
    Piece,
    Cup,
    Tbsp,
    Tsp,
}

/// A food product with macros per `default_amount` of its unit
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodProduct {
    pub id: String,
    pub name: String,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    pub category: FoodCategory,
    pub unit: FoodUnit,
    pub default_amount: f64,
}

/// One logged consumption event. Macros are a frozen snapshot taken at
/// logging time; later edits to the source product do not change it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntry {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub amount: f64,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meal_type: MealType,
    pub date: NaiveDate,
    pub timestamp_ms: i64,
}

/// Aggregated nutrition for one calendar day. The four totals always equal
/// the fold of `entries`; `burned_calories` is set independently.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyNutrition {
    pub date: NaiveDate,
    pub entries: Vec<FoodEntry>,
    pub total_calories: i32,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    #[serde(default)]
    pub burned_calories: i32,
}

impl DailyNutrition {
    /// Zeroed record for a day with no logged data
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            entries: Vec::new(),
            total_calories: 0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fat: 0.0,
            burned_calories: 0,
        }
    }

    /// Remaining calories as shown on the calories screen: goal minus
    /// consumed plus burned. The recommendation rules use a calories-only
    /// remaining (see `nutrition::recommendations`); the two figures differ
    /// on purpose and are kept apart.
    pub fn display_remaining(&self, goal: &NutritionGoal) -> i32 {
        goal.daily_calories - self.total_calories + self.burned_calories
    }
}

/// Qualitative advice derived from totals vs goal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Warning,
    Info,
    Suggestion,
    Success,
}

/// One recommendation produced by the nutrition rules
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub message: String,
}
