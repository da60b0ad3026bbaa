//! Nutrition engine: goal computation, food logging, daily aggregation and
//! recommendations.
//!
//! Daily totals are never authoritative on their own: every mutation of a
//! day's entries re-derives all four totals from the entry fold in the same
//! operation. Entry macros are frozen snapshots taken at logging time.

use crate::clock::Clock;
use crate::store::{
    load_json, save_json, BlobStore, NUTRITION_DATA_KEY, NUTRITION_GOAL_KEY,
};
use crate::validation::validate_amount;
use crate::{
    DailyNutrition, Error, FoodEntry, FoodProduct, GoalKind, Lifestyle, MealType, NutritionGoal,
    Recommendation, RecommendationKind, Result, UserData,
};
use chrono::NaiveDate;
use uuid::Uuid;

/// Fixed fallback goal used when biometrics are incomplete
pub const DEFAULT_GOAL: NutritionGoal = NutritionGoal {
    daily_calories: 2000,
    protein_g: 150,
    carbs_g: 250,
    fat_g: 67,
};

/// Age assumed by the BMR formula; the profile does not collect age
const ASSUMED_AGE_YEARS: f64 = 30.0;

/// Compute the daily goal from biometrics (Mifflin-St Jeor BMR, fixed
/// age 30). Falls back to [`DEFAULT_GOAL`] when weight or height is missing.
pub fn calculate_daily_goal(user: &UserData) -> NutritionGoal {
    let (Some(weight), Some(height)) = (user.weight_kg, user.height_cm) else {
        return DEFAULT_GOAL;
    };

    let bmr = 10.0 * weight + 6.25 * height - 5.0 * ASSUMED_AGE_YEARS + 5.0;

    let multiplier = match user.lifestyle.unwrap_or(Lifestyle::Moderate) {
        Lifestyle::Sedentary => 1.2,
        Lifestyle::Light => 1.375,
        Lifestyle::Moderate => 1.55,
        Lifestyle::Active => 1.725,
        Lifestyle::VeryActive => 1.9,
    };
    let mut tdee = bmr * multiplier;

    tdee += match user.goal {
        Some(GoalKind::Lose) => -500.0,
        Some(GoalKind::Gain) => 500.0,
        _ => 0.0,
    };

    let protein_g = (weight * 2.0).round() as i32;
    let fat_g = (tdee * 0.3 / 9.0).round() as i32;
    let carbs_g = ((tdee - (protein_g * 4) as f64 - (fat_g * 9) as f64) / 4.0).round() as i32;

    NutritionGoal {
        daily_calories: tdee.round() as i32,
        protein_g,
        carbs_g,
        fat_g,
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Scale a product's per-default-amount macros to the requested amount.
/// Calories round to an integer, gram macros to one decimal.
fn scale(product: &FoodProduct, amount: f64) -> (i32, f64, f64, f64) {
    let ratio = amount / product.default_amount;
    (
        (product.calories as f64 * ratio).round() as i32,
        round1(product.protein * ratio),
        round1(product.carbs * ratio),
        round1(product.fat * ratio),
    )
}

/// Re-derive the four totals from the entry fold
fn recompute_totals(day: &mut DailyNutrition) {
    day.total_calories = day.entries.iter().map(|e| e.calories).sum();
    day.total_protein = day.entries.iter().map(|e| e.protein).sum();
    day.total_carbs = day.entries.iter().map(|e| e.carbs).sum();
    day.total_fat = day.entries.iter().map(|e| e.fat).sum();
}

/// Owns the per-day nutrition history and the active goal
pub struct NutritionLog {
    history: Vec<DailyNutrition>,
    goal: NutritionGoal,
}

impl NutritionLog {
    /// Load history and goal from the store; a missing goal derives from the
    /// user's biometrics (or the fixed default)
    pub fn load(store: &dyn BlobStore, user: &UserData) -> Result<Self> {
        let history = load_json::<Vec<DailyNutrition>>(store, NUTRITION_DATA_KEY)?
            .unwrap_or_default();
        let goal = match load_json::<NutritionGoal>(store, NUTRITION_GOAL_KEY)? {
            Some(goal) => goal,
            None => {
                let goal = calculate_daily_goal(user);
                save_json(store, NUTRITION_GOAL_KEY, &goal);
                goal
            }
        };
        Ok(Self { history, goal })
    }

    pub fn goal(&self) -> &NutritionGoal {
        &self.goal
    }

    pub fn history(&self) -> &[DailyNutrition] {
        &self.history
    }

    /// Recompute the goal from current biometrics and persist it. Called
    /// whenever weight, height, goal or lifestyle change.
    pub fn refresh_goal(&mut self, store: &dyn BlobStore, user: &UserData) -> NutritionGoal {
        self.goal = calculate_daily_goal(user);
        save_json(store, NUTRITION_GOAL_KEY, &self.goal);
        tracing::info!(
            "Nutrition goal refreshed: {} kcal",
            self.goal.daily_calories
        );
        self.goal
    }

    /// The stored record for a date, or a zeroed one
    pub fn day(&self, date: NaiveDate) -> DailyNutrition {
        self.history
            .iter()
            .find(|d| d.date == date)
            .cloned()
            .unwrap_or_else(|| DailyNutrition::empty(date))
    }

    /// Log a food entry for today, scaling the product's macros to `amount`.
    ///
    /// The snapshot is frozen at creation; later product edits never change
    /// it. Returns the new entry's id.
    pub fn add_entry(
        &mut self,
        store: &dyn BlobStore,
        clock: &dyn Clock,
        product: &FoodProduct,
        amount: f64,
        meal_type: MealType,
    ) -> Result<String> {
        if !validate_amount(amount) {
            return Err(Error::Validation("amount must be a positive number".into()));
        }

        let (calories, protein, carbs, fat) = scale(product, amount);
        let entry = FoodEntry {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            amount,
            calories,
            protein,
            carbs,
            fat,
            meal_type,
            date: clock.today(),
            timestamp_ms: clock.now().timestamp_millis(),
        };
        let id = entry.id.clone();

        let date = entry.date;
        match self.history.iter_mut().find(|d| d.date == date) {
            Some(day) => {
                day.entries.push(entry);
                recompute_totals(day);
            }
            None => {
                let mut day = DailyNutrition::empty(date);
                day.entries.push(entry);
                recompute_totals(&mut day);
                self.history.push(day);
            }
        }
        self.persist(store);
        tracing::info!("Logged {} x{} for {}", product.name, amount, date);
        Ok(id)
    }

    /// Remove an entry by id from whichever day holds it; no-op if unknown
    pub fn remove_entry(&mut self, store: &dyn BlobStore, entry_id: &str) -> bool {
        let mut removed = false;
        for day in &mut self.history {
            let before = day.entries.len();
            day.entries.retain(|e| e.id != entry_id);
            if day.entries.len() != before {
                recompute_totals(day);
                removed = true;
            }
        }
        if removed {
            self.persist(store);
        }
        removed
    }

    /// Change an entry's amount, re-deriving its snapshot from the product
    /// lookup at update time (the product may have changed since logging;
    /// the re-derived values use whatever it says now). No-op when the entry
    /// or its product is unknown.
    pub fn update_entry(
        &mut self,
        store: &dyn BlobStore,
        entry_id: &str,
        amount: f64,
        products: &[FoodProduct],
    ) -> Result<bool> {
        if !validate_amount(amount) {
            return Err(Error::Validation("amount must be a positive number".into()));
        }

        for day in &mut self.history {
            let Some(entry) = day.entries.iter_mut().find(|e| e.id == entry_id) else {
                continue;
            };
            let Some(product) = products.iter().find(|p| p.id == entry.product_id) else {
                tracing::debug!("update_entry ignored, unknown product {}", entry.product_id);
                return Ok(false);
            };
            let (calories, protein, carbs, fat) = scale(product, amount);
            entry.amount = amount;
            entry.calories = calories;
            entry.protein = protein;
            entry.carbs = carbs;
            entry.fat = fat;
            recompute_totals(day);
            self.persist(store);
            return Ok(true);
        }
        Ok(false)
    }

    /// Set today's burned calories. Independent of the entry fold; creates
    /// the day record if absent.
    pub fn set_burned_calories(&mut self, store: &dyn BlobStore, clock: &dyn Clock, calories: i32) {
        let today = clock.today();
        match self.history.iter_mut().find(|d| d.date == today) {
            Some(day) => day.burned_calories = calories,
            None => {
                let mut day = DailyNutrition::empty(today);
                day.burned_calories = calories;
                self.history.push(day);
            }
        }
        self.persist(store);
    }

    fn persist(&self, store: &dyn BlobStore) {
        save_json(store, NUTRITION_DATA_KEY, &self.history);
    }
}

/// Derive recommendations from a day's totals vs the goal.
///
/// At most one calorie rule fires (checked in order); every applicable
/// macro rule is appended afterwards. This function computes its own
/// calories-only remaining; the screen-level remaining additionally adds
/// burned calories ([`DailyNutrition::display_remaining`]) and the two are
/// intentionally distinct.
pub fn recommendations(day: &DailyNutrition, goal: &NutritionGoal) -> Vec<Recommendation> {
    let consumed = day.total_calories;
    let remaining = goal.daily_calories - consumed;
    let mut out = Vec::new();

    let push = |out: &mut Vec<Recommendation>, kind, message: String| {
        out.push(Recommendation { kind, message });
    };

    if remaining < -200 {
        push(
            &mut out,
            RecommendationKind::Warning,
            "You have exceeded your daily calorie goal. Consider some extra physical activity."
                .into(),
        );
    } else if remaining < 0 {
        push(
            &mut out,
            RecommendationKind::Warning,
            "You have nearly reached your daily calorie limit. Go easy on the next meals.".into(),
        );
    } else if remaining < 300 {
        push(
            &mut out,
            RecommendationKind::Info,
            "Few calories left for today. Pick light, wholesome foods.".into(),
        );
    } else if (consumed as f64) < goal.daily_calories as f64 * 0.5 {
        push(
            &mut out,
            RecommendationKind::Suggestion,
            "You have eaten less than half of your daily goal. Don't skip meals!".into(),
        );
    }

    let protein_goal = goal.protein_g as f64;
    let carbs_goal = goal.carbs_g as f64;
    let fat_goal = goal.fat_g as f64;

    if day.total_protein < protein_goal * 0.7 {
        push(
            &mut out,
            RecommendationKind::Suggestion,
            format!(
                "Add more protein, {}g to go. Try chicken breast, eggs or cottage cheese.",
                (protein_goal - day.total_protein).round() as i64
            ),
        );
    }
    if day.total_carbs < carbs_goal * 0.5 {
        push(
            &mut out,
            RecommendationKind::Info,
            format!(
                "You need more carbs for energy, {}g to go.",
                (carbs_goal - day.total_carbs).round() as i64
            ),
        );
    }
    if day.total_fat < fat_goal * 0.5 {
        push(
            &mut out,
            RecommendationKind::Info,
            format!(
                "Add healthy fats, {}g to go. Try avocado or nuts.",
                (fat_goal - day.total_fat).round() as i64
            ),
        );
    }
    if day.total_protein >= protein_goal
        && day.total_carbs >= carbs_goal * 0.8
        && day.total_fat >= fat_goal * 0.8
        && remaining > 0
    {
        push(
            &mut out,
            RecommendationKind::Success,
            "Great! Your nutrition is well balanced today.".into(),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::products::default_products;
    use crate::store::MemStore;
    use chrono::{TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    fn test_product() -> FoodProduct {
        FoodProduct {
            id: "tp".into(),
            name: "Test Food".into(),
            calories: 100,
            protein: 10.0,
            carbs: 20.0,
            fat: 2.0,
            fiber: None,
            sugar: None,
            category: crate::FoodCategory::Other,
            unit: crate::FoodUnit::G,
            default_amount: 100.0,
        }
    }

    fn goal() -> NutritionGoal {
        DEFAULT_GOAL
    }

    #[test]
    fn test_goal_fallback_without_biometrics() {
        let user = UserData::default();
        assert_eq!(calculate_daily_goal(&user), DEFAULT_GOAL);

        let user = UserData {
            weight_kg: Some(70.0),
            ..Default::default()
        };
        assert_eq!(calculate_daily_goal(&user), DEFAULT_GOAL);
    }

    #[test]
    fn test_goal_computation_moderate_maintain() {
        let user = UserData {
            weight_kg: Some(70.0),
            height_cm: Some(175.0),
            lifestyle: Some(Lifestyle::Moderate),
            goal: Some(GoalKind::Maintain),
            ..Default::default()
        };
        let goal = calculate_daily_goal(&user);

        // bmr = 700 + 1093.75 - 150 + 5 = 1648.75; tdee = 2555.5625
        assert_eq!(goal.daily_calories, 2556);
        assert_eq!(goal.protein_g, 140);
        assert_eq!(goal.fat_g, 85); // round(2555.5625 * 0.3 / 9)
        assert_eq!(goal.carbs_g, 308); // round((2555.5625 - 560 - 765) / 4)
    }

    #[test]
    fn test_goal_lose_subtracts_500() {
        let base = UserData {
            weight_kg: Some(70.0),
            height_cm: Some(175.0),
            lifestyle: Some(Lifestyle::Moderate),
            goal: Some(GoalKind::Maintain),
            ..Default::default()
        };
        let mut losing = base.clone();
        losing.goal = Some(GoalKind::Lose);

        let maintain = calculate_daily_goal(&base);
        let lose = calculate_daily_goal(&losing);
        assert_eq!(lose.daily_calories, maintain.daily_calories - 500);
    }

    #[test]
    fn test_unset_lifestyle_defaults_to_moderate() {
        let with = UserData {
            weight_kg: Some(70.0),
            height_cm: Some(175.0),
            lifestyle: Some(Lifestyle::Moderate),
            ..Default::default()
        };
        let without = UserData {
            lifestyle: None,
            ..with.clone()
        };
        assert_eq!(calculate_daily_goal(&with), calculate_daily_goal(&without));
    }

    #[test]
    fn test_entry_scaling() {
        // Documented example: 150 of a 100-default product
        let (calories, protein, carbs, fat) = scale(&test_product(), 150.0);
        assert_eq!(calories, 150);
        assert_eq!(protein, 15.0);
        assert_eq!(carbs, 30.0);
        assert_eq!(fat, 3.0);
    }

    #[test]
    fn test_add_entry_aggregates_totals() {
        let store = MemStore::new();
        let mut log = NutritionLog::load(&store, &UserData::default()).unwrap();

        log.add_entry(&store, &clock(), &test_product(), 150.0, MealType::Lunch)
            .unwrap();
        log.add_entry(&store, &clock(), &test_product(), 50.0, MealType::Snack)
            .unwrap();

        let day = log.day(clock().today());
        assert_eq!(day.entries.len(), 2);
        assert_eq!(day.total_calories, 200);
        assert_eq!(day.total_protein, 20.0);
        assert_eq!(day.total_carbs, 40.0);
        assert_eq!(day.total_fat, 4.0);
    }

    #[test]
    fn test_add_then_remove_restores_totals_exactly() {
        let store = MemStore::new();
        let mut log = NutritionLog::load(&store, &UserData::default()).unwrap();

        log.add_entry(&store, &clock(), &test_product(), 120.0, MealType::Breakfast)
            .unwrap();
        let before = log.day(clock().today());

        let id = log
            .add_entry(&store, &clock(), &test_product(), 77.0, MealType::Lunch)
            .unwrap();
        assert!(log.remove_entry(&store, &id));

        let after = log.day(clock().today());
        assert_eq!(after.total_calories, before.total_calories);
        assert_eq!(after.total_protein, before.total_protein);
        assert_eq!(after.total_carbs, before.total_carbs);
        assert_eq!(after.total_fat, before.total_fat);
        assert_eq!(after.entries.len(), before.entries.len());
    }

    #[test]
    fn test_entry_snapshot_frozen_against_product_edits() {
        let store = MemStore::new();
        let mut log = NutritionLog::load(&store, &UserData::default()).unwrap();

        let mut product = test_product();
        log.add_entry(&store, &clock(), &product, 100.0, MealType::Dinner)
            .unwrap();
        product.calories = 999;

        let day = log.day(clock().today());
        assert_eq!(day.entries[0].calories, 100);
    }

    #[test]
    fn test_update_entry_rederives_from_product() {
        let store = MemStore::new();
        let mut log = NutritionLog::load(&store, &UserData::default()).unwrap();

        let product = test_product();
        let id = log
            .add_entry(&store, &clock(), &product, 100.0, MealType::Lunch)
            .unwrap();

        let updated = log.update_entry(&store, &id, 200.0, &[product]).unwrap();
        assert!(updated);

        let day = log.day(clock().today());
        assert_eq!(day.entries[0].amount, 200.0);
        assert_eq!(day.entries[0].calories, 200);
        assert_eq!(day.total_calories, 200);
    }

    #[test]
    fn test_update_entry_unknown_product_is_noop() {
        let store = MemStore::new();
        let mut log = NutritionLog::load(&store, &UserData::default()).unwrap();
        let id = log
            .add_entry(&store, &clock(), &test_product(), 100.0, MealType::Lunch)
            .unwrap();

        // Product catalog no longer contains the entry's product
        let updated = log.update_entry(&store, &id, 250.0, default_products()).unwrap();
        assert!(!updated);
        assert_eq!(log.day(clock().today()).entries[0].amount, 100.0);
    }

    #[test]
    fn test_invalid_amount_rejected() {
        let store = MemStore::new();
        let mut log = NutritionLog::load(&store, &UserData::default()).unwrap();
        assert!(log
            .add_entry(&store, &clock(), &test_product(), 0.0, MealType::Lunch)
            .is_err());
        assert!(log.day(clock().today()).entries.is_empty());
    }

    #[test]
    fn test_burned_calories_independent_of_entries() {
        let store = MemStore::new();
        let mut log = NutritionLog::load(&store, &UserData::default()).unwrap();

        log.set_burned_calories(&store, &clock(), 350);
        let day = log.day(clock().today());
        assert_eq!(day.burned_calories, 350);
        assert_eq!(day.total_calories, 0);

        // Entries do not disturb it
        log.add_entry(&store, &clock(), &test_product(), 100.0, MealType::Lunch)
            .unwrap();
        assert_eq!(log.day(clock().today()).burned_calories, 350);
    }

    #[test]
    fn test_history_persists_across_reload() {
        let store = MemStore::new();
        {
            let mut log = NutritionLog::load(&store, &UserData::default()).unwrap();
            log.add_entry(&store, &clock(), &test_product(), 100.0, MealType::Lunch)
                .unwrap();
        }
        let reloaded = NutritionLog::load(&store, &UserData::default()).unwrap();
        assert_eq!(reloaded.day(clock().today()).total_calories, 100);
    }

    fn day_with(calories: i32, protein: f64, carbs: f64, fat: f64) -> DailyNutrition {
        let mut day = DailyNutrition::empty(clock().today());
        day.total_calories = calories;
        day.total_protein = protein;
        day.total_carbs = carbs;
        day.total_fat = fat;
        day
    }

    #[test]
    fn test_recommendations_exceeded_goal() {
        let recs = recommendations(&day_with(2300, 160.0, 250.0, 70.0), &goal());
        assert_eq!(recs[0].kind, RecommendationKind::Warning);
        assert!(recs[0].message.contains("exceeded"));
        // Only one calorie rule fires
        assert_eq!(
            recs.iter()
                .filter(|r| r.kind == RecommendationKind::Warning)
                .count(),
            1
        );
    }

    #[test]
    fn test_recommendations_near_limit_vs_exceeded() {
        let recs = recommendations(&day_with(2100, 160.0, 250.0, 70.0), &goal());
        assert!(recs[0].message.contains("nearly reached"));
    }

    #[test]
    fn test_recommendations_under_half() {
        let recs = recommendations(&day_with(800, 150.0, 250.0, 67.0), &goal());
        assert!(recs
            .iter()
            .any(|r| r.kind == RecommendationKind::Suggestion && r.message.contains("half")));
    }

    #[test]
    fn test_macro_rules_append_independently() {
        // Calorie rule 4 fires, plus all three macro shortfalls
        let recs = recommendations(&day_with(500, 10.0, 50.0, 5.0), &goal());
        assert!(recs.len() >= 4);
        assert!(recs.iter().any(|r| r.message.contains("protein")));
        assert!(recs.iter().any(|r| r.message.contains("carbs")));
        assert!(recs.iter().any(|r| r.message.contains("fats")));
    }

    #[test]
    fn test_protein_shortfall_reports_remaining_grams() {
        let recs = recommendations(&day_with(1000, 100.0, 250.0, 67.0), &goal());
        let protein = recs
            .iter()
            .find(|r| r.message.contains("protein"))
            .expect("protein rule should fire at 100/150");
        assert!(protein.message.contains("50g"));
    }

    #[test]
    fn test_balanced_day_success() {
        let recs = recommendations(&day_with(1900, 150.0, 210.0, 60.0), &goal());
        assert!(recs
            .iter()
            .any(|r| r.kind == RecommendationKind::Success));
    }
}
