//! The 30-day workout program and its day-progression rules.
//!
//! Days unlock sequentially: day 1 is always open, and day n opens once day
//! n-1 is completed. Unlocking is monotonic - undoing a completion never
//! re-locks the successor. The whole day list is persisted on every
//! mutation; partial writes are never issued.

use crate::catalog::ExerciseCatalog;
use crate::clock::Clock;
use crate::store::{load_json, save_json, BlobStore, WORKOUT_DAYS_KEY};
use crate::{Exercise, Result, WorkoutDay};
use once_cell::sync::Lazy;

/// One slot of the canonical program: display name + built-in exercise ids
struct TemplateDay {
    name: &'static str,
    exercise_ids: &'static [&'static str],
}

const fn tday(name: &'static str, exercise_ids: &'static [&'static str]) -> TemplateDay {
    TemplateDay { name, exercise_ids }
}

/// The canonical 30-day program. Rest days 6/13/20/27 carry no exercises.
static PROGRAM_TEMPLATE: Lazy<[TemplateDay; 30]> = Lazy::new(|| {
    [
        // Week 1 - base workouts
        tday("Day 1: Chest + Triceps", &["1", "2", "3", "23", "24"]),
        tday("Day 2: Back + Biceps", &["6", "7", "8", "21", "25"]),
        tday("Day 3: Legs + Core", &["11", "12", "13", "26", "27"]),
        tday("Day 4: Shoulders + Arms", &["17", "18", "19", "22", "24"]),
        tday("Day 5: Cardio + Core", &["31", "32", "28", "29"]),
        tday("Day 6: Rest", &[]),
        tday("Day 7: Full Body", &["1", "6", "11", "17", "26", "31"]),
        // Week 2 - increased intensity
        tday("Day 8: Chest + Triceps", &["1", "2", "4", "23", "24"]),
        tday("Day 9: Back + Biceps", &["6", "8", "9", "21", "25"]),
        tday("Day 10: Legs + Core", &["11", "12", "14", "26", "28"]),
        tday("Day 11: Shoulders + Arms", &["17", "18", "20", "22", "24"]),
        tday("Day 12: Cardio + Core", &["31", "32", "33", "27", "29"]),
        tday("Day 13: Rest", &[]),
        tday("Day 14: Full Body", &["2", "7", "12", "18", "26", "32"]),
        // Week 3 - variety
        tday("Day 15: Chest + Triceps", &["1", "3", "5", "23", "24"]),
        tday("Day 16: Back + Biceps", &["6", "7", "10", "21", "25"]),
        tday("Day 17: Legs + Core", &["11", "13", "15", "26", "30"]),
        tday("Day 18: Shoulders + Arms", &["17", "19", "20", "22", "24"]),
        tday("Day 19: Cardio + Core", &["31", "33", "27", "28", "29"]),
        tday("Day 20: Rest", &[]),
        tday("Day 21: Full Body", &["1", "6", "11", "17", "26", "31"]),
        // Week 4 - raised difficulty
        tday("Day 22: Chest + Triceps", &["1", "2", "4", "5", "23", "24"]),
        tday("Day 23: Back + Biceps", &["6", "8", "9", "10", "21", "25"]),
        tday("Day 24: Legs + Core", &["11", "12", "13", "14", "26", "27"]),
        tday("Day 25: Shoulders + Arms", &["17", "18", "19", "20", "22", "24"]),
        tday("Day 26: Cardio + Core", &["31", "32", "33", "28", "29", "30"]),
        tday("Day 27: Rest", &[]),
        tday("Day 28: Full Body", &["1", "6", "11", "17", "26", "31", "32"]),
        // Week 5 - final sprint
        tday("Day 29: Chest + Triceps", &["1", "2", "3", "4", "23", "24"]),
        tday("Day 30: Final Workout", &["1", "6", "11", "17", "21", "26", "31"]),
    ]
});

/// Build a fresh program from the template. Only day 1 starts unlocked.
fn build_template_program() -> Vec<WorkoutDay> {
    PROGRAM_TEMPLATE
        .iter()
        .enumerate()
        .map(|(i, t)| WorkoutDay {
            id: (i + 1).to_string(),
            day_number: (i + 1) as u32,
            name: t.name.to_string(),
            exercise_ids: t.exercise_ids.iter().map(|s| s.to_string()).collect(),
            completed: false,
            unlocked: i == 0,
            completed_date: None,
        })
        .collect()
}

/// Owns the ordered day list and enforces the progression rules
pub struct ProgramEngine {
    days: Vec<WorkoutDay>,
}

impl ProgramEngine {
    /// Load the persisted program, regenerating from the template when the
    /// stored data is missing, shorter than 30 days, or has no exercises
    /// anywhere. Regeneration preserves each existing day's completion
    /// state, unlock flag, and any non-empty exercise list. Afterwards the
    /// unlock rule is re-run left to right so `unlocked` is consistent with
    /// the predecessor's `completed`.
    pub fn load_or_init(store: &dyn BlobStore) -> Result<Self> {
        let loaded = load_json::<Vec<WorkoutDay>>(store, WORKOUT_DAYS_KEY)?.unwrap_or_default();

        let needs_template = loaded.len() < 30 || loaded.iter().all(|d| d.exercise_ids.is_empty());

        let mut days = if needs_template {
            if loaded.is_empty() {
                tracing::info!("No stored program, generating the 30-day template");
                build_template_program()
            } else {
                tracing::info!(
                    "Stored program incomplete ({} days), regenerating over it",
                    loaded.len()
                );
                let mut program = build_template_program();
                for day in &mut program {
                    if let Some(existing) = loaded.iter().find(|d| d.day_number == day.day_number) {
                        day.completed = existing.completed;
                        day.completed_date = existing.completed_date;
                        day.unlocked = existing.unlocked || day.unlocked;
                        if !existing.exercise_ids.is_empty() {
                            day.exercise_ids = existing.exercise_ids.clone();
                        }
                    }
                }
                program
            }
        } else {
            loaded
        };

        days.sort_by_key(|d| d.day_number);
        recompute_unlocks(&mut days);

        let engine = Self { days };
        engine.persist(store);
        Ok(engine)
    }

    pub fn days(&self) -> &[WorkoutDay] {
        &self.days
    }

    pub fn day(&self, day_id: &str) -> Option<&WorkoutDay> {
        self.days.iter().find(|d| d.id == day_id)
    }

    pub fn day_by_number(&self, day_number: u32) -> Option<&WorkoutDay> {
        self.days.iter().find(|d| d.day_number == day_number)
    }

    /// Number of days marked completed
    pub fn completed_count(&self) -> usize {
        self.days.iter().filter(|d| d.completed).count()
    }

    /// Mark a day completed, stamp today's date, and unlock the successor.
    /// Unknown ids are silent no-ops.
    pub fn mark_completed(&mut self, store: &dyn BlobStore, clock: &dyn Clock, day_id: &str) {
        let today = clock.today();
        let Some(day) = self.days.iter_mut().find(|d| d.id == day_id) else {
            tracing::debug!("mark_completed ignored, unknown day {}", day_id);
            return;
        };
        day.completed = true;
        day.completed_date = Some(today);
        let next_number = day.day_number + 1;
        tracing::info!("Day {} completed", day.day_number);

        if let Some(next) = self.days.iter_mut().find(|d| d.day_number == next_number) {
            if !next.unlocked {
                next.unlocked = true;
                tracing::info!("Day {} unlocked", next.day_number);
            }
        }
        self.persist(store);
    }

    /// Clear a day's completion. The successor stays unlocked: progress is
    /// never revoked by undo.
    pub fn unmark_completed(&mut self, store: &dyn BlobStore, day_id: &str) {
        let Some(day) = self.days.iter_mut().find(|d| d.id == day_id) else {
            tracing::debug!("unmark_completed ignored, unknown day {}", day_id);
            return;
        };
        day.completed = false;
        day.completed_date = None;
        tracing::info!("Day {} un-completed", day.day_number);
        self.persist(store);
    }

    /// Append an exercise id to a day; no-op if already present or the day
    /// is unknown
    pub fn add_exercise(&mut self, store: &dyn BlobStore, day_id: &str, exercise_id: &str) {
        let Some(day) = self.days.iter_mut().find(|d| d.id == day_id) else {
            return;
        };
        if day.exercise_ids.iter().any(|id| id == exercise_id) {
            return;
        }
        day.exercise_ids.push(exercise_id.to_string());
        self.persist(store);
    }

    /// Remove an exercise id from a day if present
    pub fn remove_exercise(&mut self, store: &dyn BlobStore, day_id: &str, exercise_id: &str) {
        let Some(day) = self.days.iter_mut().find(|d| d.id == day_id) else {
            return;
        };
        let before = day.exercise_ids.len();
        day.exercise_ids.retain(|id| id != exercise_id);
        if day.exercise_ids.len() != before {
            self.persist(store);
        }
    }

    /// Swap one exercise id for another as a single persisted write
    pub fn replace_exercise(
        &mut self,
        store: &dyn BlobStore,
        day_id: &str,
        old_id: &str,
        new_id: &str,
    ) {
        let Some(day) = self.days.iter_mut().find(|d| d.id == day_id) else {
            return;
        };
        day.exercise_ids.retain(|id| id != old_id);
        if !day.exercise_ids.iter().any(|id| id == new_id) {
            day.exercise_ids.push(new_id.to_string());
        }
        self.persist(store);
    }

    /// Resolve a day's exercises through the catalog, in the day's stored
    /// order, silently dropping ids the catalog no longer knows
    pub fn day_exercises(&self, day_id: &str, catalog: &ExerciseCatalog) -> Vec<Exercise> {
        let Some(day) = self.day(day_id) else {
            return Vec::new();
        };
        day.exercise_ids
            .iter()
            .filter_map(|id| catalog.get(id).cloned())
            .collect()
    }

    /// Sum of `sets` across a day's resolvable exercises
    pub fn total_sets(&self, day_id: &str, catalog: &ExerciseCatalog) -> u32 {
        self.day_exercises(day_id, catalog)
            .iter()
            .map(|e| e.sets)
            .sum()
    }

    fn persist(&self, store: &dyn BlobStore) {
        save_json(store, WORKOUT_DAYS_KEY, &self.days);
    }
}

/// Re-run the unlock rule over the ordered list: day 1 is always unlocked,
/// and each later day unlocks when its predecessor is completed. Already
/// unlocked days stay unlocked.
fn recompute_unlocks(days: &mut [WorkoutDay]) {
    for i in 0..days.len() {
        if i == 0 {
            days[0].unlocked = true;
        } else if days[i - 1].completed {
            days[i].unlocked = true;
        }
    }
}
