//! Exercise catalog management.
//!
//! The catalog owns every exercise definition; workout days reference them
//! by id only. Deleting an exercise silently orphans those references (the
//! program filters stale ids at read time), so no referential integrity is
//! enforced here.

use crate::store::{load_json, save_json, BlobStore, EXERCISES_KEY};
use crate::validation::validate_exercise_name;
use crate::{Error, Exercise, ExerciseCategory, Result};
use once_cell::sync::Lazy;
use uuid::Uuid;

/// Cached built-in exercises - built once and reused across all operations
static DEFAULT_EXERCISES: Lazy<Vec<Exercise>> = Lazy::new(build_default_exercises);

/// Get a reference to the cached built-in exercise table
pub fn default_exercises() -> &'static [Exercise] {
    &DEFAULT_EXERCISES
}

fn builtin(
    id: &str,
    name: &str,
    category: ExerciseCategory,
    sets: u32,
    reps: u32,
    weight: Option<f64>,
    rest_time_seconds: u32,
) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        category,
        sets,
        reps,
        weight,
        rest_time_seconds: Some(rest_time_seconds),
        notes: None,
        difficulty: None,
        location: None,
        equipment: Vec::new(),
    }
}

/// Builds the built-in exercise table.
///
/// Ids "1".."33" are load-bearing: the 30-day program template references
/// them directly.
fn build_default_exercises() -> Vec<Exercise> {
    use ExerciseCategory::*;
    vec![
        // Chest
        builtin("1", "Bench Press", Chest, 4, 10, Some(60.0), 90),
        builtin("2", "Incline Dumbbell Press", Chest, 3, 12, Some(24.0), 60),
        builtin("3", "Dumbbell Fly", Chest, 3, 12, Some(14.0), 60),
        builtin("4", "Push-up", Chest, 3, 15, None, 45),
        builtin("5", "Cable Crossover", Chest, 3, 12, Some(20.0), 60),
        // Back
        builtin("6", "Deadlift", Back, 3, 8, Some(80.0), 120),
        builtin("7", "Pull-up", Back, 3, 10, None, 90),
        builtin("8", "Barbell Row", Back, 4, 10, Some(50.0), 90),
        builtin("9", "Lat Pulldown", Back, 3, 12, Some(45.0), 60),
        builtin("10", "Seated Cable Row", Back, 3, 12, Some(40.0), 60),
        // Legs
        builtin("11", "Squat", Legs, 4, 10, Some(70.0), 120),
        builtin("12", "Leg Press", Legs, 3, 12, Some(120.0), 90),
        builtin("13", "Lunge", Legs, 3, 12, Some(20.0), 60),
        builtin("14", "Romanian Deadlift", Legs, 3, 10, Some(60.0), 90),
        builtin("15", "Leg Curl", Legs, 3, 12, Some(35.0), 60),
        builtin("16", "Calf Raise", Legs, 4, 15, Some(40.0), 45),
        // Shoulders
        builtin("17", "Overhead Press", Shoulders, 4, 10, Some(30.0), 90),
        builtin("18", "Lateral Raise", Shoulders, 3, 15, Some(8.0), 45),
        builtin("19", "Front Raise", Shoulders, 3, 12, Some(8.0), 45),
        builtin("20", "Rear Delt Fly", Shoulders, 3, 15, Some(8.0), 45),
        // Arms
        builtin("21", "Barbell Curl", Arms, 3, 12, Some(25.0), 60),
        builtin("22", "Hammer Curl", Arms, 3, 12, Some(12.0), 60),
        builtin("23", "Triceps Pushdown", Arms, 3, 12, Some(25.0), 60),
        builtin("24", "Triceps Dips", Arms, 3, 12, None, 60),
        builtin("25", "Concentration Curl", Arms, 3, 12, Some(10.0), 45),
        // Core
        builtin("26", "Plank", Core, 3, 60, None, 30),
        builtin("27", "Crunch", Core, 3, 20, None, 30),
        builtin("28", "Russian Twist", Core, 3, 20, None, 30),
        builtin("29", "Leg Raise", Core, 3, 15, None, 30),
        builtin("30", "Mountain Climber", Core, 3, 20, None, 30),
        // Cardio
        builtin("31", "Treadmill Run", Cardio, 1, 20, None, 0),
        builtin("32", "Jump Rope", Cardio, 3, 60, None, 30),
        builtin("33", "Burpee", Cardio, 3, 15, None, 45),
    ]
}

/// The user's exercise catalog, persisted as a whole under `exercises_data`
pub struct ExerciseCatalog {
    exercises: Vec<Exercise>,
}

impl ExerciseCatalog {
    /// Load the catalog from the store, falling back to the built-in table
    pub fn load(store: &dyn BlobStore) -> Result<Self> {
        let exercises = match load_json::<Vec<Exercise>>(store, EXERCISES_KEY)? {
            Some(list) if !list.is_empty() => list,
            _ => {
                tracing::info!("No stored exercises, using built-in catalog");
                default_exercises().to_vec()
            }
        };
        Ok(Self { exercises })
    }

    /// Catalog built from an explicit list (tests, previews)
    pub fn from_exercises(exercises: Vec<Exercise>) -> Self {
        Self { exercises }
    }

    pub fn all(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn by_category(&self, category: ExerciseCategory) -> Vec<&Exercise> {
        self.exercises
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    /// Add a new exercise with a generated id
    ///
    /// Validates name, sets and reps; a validation failure aborts with no
    /// state change. Returns the new exercise's id.
    pub fn add(&mut self, store: &dyn BlobStore, mut exercise: Exercise) -> Result<String> {
        if !validate_exercise_name(&exercise.name) {
            return Err(Error::Validation("exercise name must be 1-100 characters".into()));
        }
        if exercise.sets == 0 || exercise.reps == 0 {
            return Err(Error::Validation("sets and reps must be positive".into()));
        }

        exercise.id = Uuid::new_v4().to_string();
        let id = exercise.id.clone();
        self.exercises.push(exercise);
        self.persist(store);
        tracing::info!("Added exercise {}", id);
        Ok(id)
    }

    /// Apply a partial update to an exercise; no-op if the id is unknown
    pub fn update<F>(&mut self, store: &dyn BlobStore, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Exercise),
    {
        let Some(exercise) = self.exercises.iter_mut().find(|e| e.id == id) else {
            tracing::debug!("update ignored, unknown exercise {}", id);
            return false;
        };
        f(exercise);
        self.persist(store);
        true
    }

    /// Remove an exercise; no-op if the id is unknown. Day references to the
    /// removed id are left in place and filtered at read time.
    pub fn remove(&mut self, store: &dyn BlobStore, id: &str) -> bool {
        let before = self.exercises.len();
        self.exercises.retain(|e| e.id != id);
        if self.exercises.len() == before {
            return false;
        }
        self.persist(store);
        tracing::info!("Removed exercise {}", id);
        true
    }

    fn persist(&self, store: &dyn BlobStore) {
        save_json(store, EXERCISES_KEY, &self.exercises);
    }
}
