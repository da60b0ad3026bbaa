//! Live workout session state machine.
//!
//! Flow: NotStarted -> Countdown -> (InExercise <-> Resting) ->
//! AwaitingConfirmation -> Finished. Countdown and Resting are driven by a
//! one-second tick. Session state is ephemeral: it is never persisted and
//! is thrown away on cancel or finish.
//!
//! Ticks are delivered with a [`TickHandle`] carrying a generation number.
//! Every timed phase start invalidates previous handles, so a stale timer
//! callback can never decrement a new countdown or advance the exercise
//! index twice.

use crate::config::SessionConfig;
use crate::Exercise;
use std::collections::HashMap;

/// Phases of an active workout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session running
    NotStarted,
    /// Terminal: the day had no exercises to train
    NoExercises,
    /// Pre-start countdown is running
    Countdown,
    /// An exercise is active and sets can be completed
    InExercise,
    /// Rest timer between sets/exercises is running
    Resting,
    /// Final set of the final exercise done; waiting for the user to
    /// explicitly finish
    AwaitingConfirmation,
    /// Workout confirmed finished
    Finished,
}

/// Capability to deliver ticks to the currently-running timer. Stale
/// handles (from a timer that was since cancelled or replaced) are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickHandle {
    generation: u64,
}

/// Result of delivering one tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The handle was stale or no timer is running
    Ignored,
    /// Countdown still running, with seconds left
    CountingDown(u32),
    /// Countdown hit zero; the first exercise is now active
    Started,
    /// Rest still running, with seconds left
    Resting(u32),
    /// Rest finished; exercise state advanced as needed
    RestOver,
}

/// Result of a set-completion action
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetOutcome {
    /// Not in a state where sets can be completed, or unknown exercise
    Ignored,
    /// A set was recorded (or the exercise wrapped up) and rest started
    RestStarted,
    /// Final set of the final exercise: completion now needs confirmation
    CompletionPending,
}

/// Owned state of one active workout
pub struct SessionEngine {
    exercises: Vec<Exercise>,
    phase: SessionPhase,
    current_index: usize,
    completed_sets: HashMap<String, u32>,
    start_countdown: Option<u32>,
    rest_countdown: Option<u32>,
    /// Whether the rest in progress ends with an exercise advance
    advance_after_rest: bool,
    started: bool,
    generation: u64,
    countdown_seconds: u32,
    default_rest_seconds: u32,
}

impl SessionEngine {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            exercises: Vec::new(),
            phase: SessionPhase::NotStarted,
            current_index: 0,
            completed_sets: HashMap::new(),
            start_countdown: None,
            rest_countdown: None,
            advance_after_rest: false,
            started: false,
            generation: 0,
            countdown_seconds: config.countdown_seconds,
            default_rest_seconds: config.default_rest_seconds,
        }
    }

    /// Begin a session over a day's resolved exercise list.
    ///
    /// A non-empty list enters Countdown and returns a handle for the
    /// countdown timer; an empty list lands in the NoExercises terminal
    /// state and returns None.
    pub fn begin(&mut self, exercises: Vec<Exercise>) -> Option<TickHandle> {
        self.reset();
        if exercises.is_empty() {
            self.phase = SessionPhase::NoExercises;
            tracing::info!("Session refused: no exercises for this day");
            return None;
        }
        self.exercises = exercises;
        self.phase = SessionPhase::Countdown;
        self.start_countdown = Some(self.countdown_seconds);
        Some(self.new_timer())
    }

    /// Deliver one one-second tick for the timer identified by `handle`
    pub fn tick(&mut self, handle: TickHandle) -> TickOutcome {
        if handle.generation != self.generation {
            tracing::debug!("Ignoring stale tick (gen {})", handle.generation);
            return TickOutcome::Ignored;
        }

        match self.phase {
            SessionPhase::Countdown => {
                let left = self.start_countdown.unwrap_or(0).saturating_sub(1);
                if left == 0 {
                    self.start_countdown = None;
                    self.started = true;
                    self.phase = SessionPhase::InExercise;
                    self.generation += 1;
                    TickOutcome::Started
                } else {
                    self.start_countdown = Some(left);
                    TickOutcome::CountingDown(left)
                }
            }
            SessionPhase::Resting => {
                let left = self.rest_countdown.unwrap_or(0).saturating_sub(1);
                if left == 0 {
                    self.end_rest();
                    TickOutcome::RestOver
                } else {
                    self.rest_countdown = Some(left);
                    TickOutcome::Resting(left)
                }
            }
            _ => TickOutcome::Ignored,
        }
    }

    /// Complete one set of the given exercise.
    ///
    /// Only valid while an exercise is active and no rest is running. When
    /// the set count of the last exercise is reached, the workout does not
    /// finish silently - it waits for explicit confirmation.
    pub fn complete_set(&mut self, exercise_id: &str) -> SetOutcome {
        if self.phase != SessionPhase::InExercise {
            return SetOutcome::Ignored;
        }
        let Some(exercise) = self.exercises.iter().find(|e| e.id == exercise_id) else {
            tracing::debug!("complete_set ignored, unknown exercise {}", exercise_id);
            return SetOutcome::Ignored;
        };
        let required = exercise.sets;
        // A zero rest time counts as unset, like the default
        let rest = exercise
            .rest_time_seconds
            .filter(|s| *s > 0)
            .unwrap_or(self.default_rest_seconds);
        let done = self.completed_sets.get(exercise_id).copied().unwrap_or(0);

        // Counter already full: treat as "finish exercise"
        if done >= required {
            if self.on_last_exercise() {
                self.phase = SessionPhase::AwaitingConfirmation;
                return SetOutcome::CompletionPending;
            }
            self.start_rest(rest, true);
            return SetOutcome::RestStarted;
        }

        let done = done + 1;
        self.completed_sets.insert(exercise_id.to_string(), done);
        tracing::debug!("Set {}/{} of {} done", done, required, exercise_id);

        if done >= required {
            if self.on_last_exercise() {
                self.phase = SessionPhase::AwaitingConfirmation;
                return SetOutcome::CompletionPending;
            }
            self.start_rest(rest, true);
        } else {
            // Rest runs between every set, not only between exercises
            self.start_rest(rest, false);
        }
        SetOutcome::RestStarted
    }

    /// User-triggered early end of the rest period. Produces exactly the
    /// state the natural tick-down to zero would have produced.
    pub fn skip_rest(&mut self) -> bool {
        if self.phase != SessionPhase::Resting {
            return false;
        }
        self.end_rest();
        true
    }

    /// Explicitly finish the workout after the completion prompt
    pub fn finish(&mut self) -> bool {
        if self.phase != SessionPhase::AwaitingConfirmation {
            return false;
        }
        self.phase = SessionPhase::Finished;
        tracing::info!("Workout finished");
        true
    }

    /// Decline the completion prompt; the session stays in its
    /// completed-but-unconfirmed state until `finish` is called
    pub fn decline_finish(&self) -> bool {
        self.phase == SessionPhase::AwaitingConfirmation
    }

    /// Abandon the session, discarding all in-session progress
    pub fn cancel(&mut self) {
        tracing::info!("Workout cancelled");
        self.reset();
    }

    // ------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Handle for the timer currently running, if any
    pub fn handle(&self) -> Option<TickHandle> {
        match self.phase {
            SessionPhase::Countdown | SessionPhase::Resting => Some(TickHandle {
                generation: self.generation,
            }),
            _ => None,
        }
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        match self.phase {
            SessionPhase::InExercise | SessionPhase::Resting => {
                self.exercises.get(self.current_index)
            }
            _ => None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn exercise_count(&self) -> usize {
        self.exercises.len()
    }

    pub fn completed_sets(&self, exercise_id: &str) -> u32 {
        self.completed_sets.get(exercise_id).copied().unwrap_or(0)
    }

    pub fn start_countdown(&self) -> Option<u32> {
        self.start_countdown
    }

    pub fn rest_countdown(&self) -> Option<u32> {
        self.rest_countdown
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// Set indicator dots for an exercise: (filled, total). Pure projection
    /// of the set counter, not separate state.
    pub fn set_dots(&self, exercise: &Exercise) -> (u32, u32) {
        (
            self.completed_sets(&exercise.id).min(exercise.sets),
            exercise.sets,
        )
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn on_last_exercise(&self) -> bool {
        self.current_index + 1 >= self.exercises.len()
    }

    /// Start a rest period, cancelling whatever timer was running before
    fn start_rest(&mut self, seconds: u32, advance_after: bool) {
        self.phase = SessionPhase::Resting;
        self.rest_countdown = Some(seconds);
        self.advance_after_rest = advance_after;
        self.new_timer();
    }

    /// Shared tail of rest expiry and skip_rest
    fn end_rest(&mut self) {
        self.rest_countdown = None;
        self.phase = SessionPhase::InExercise;
        self.generation += 1; // cancel the rest timer

        if self.advance_after_rest {
            self.advance_after_rest = false;
            // Zero the finished exercise's counter for cleanliness; it is
            // no longer active either way
            if let Some(prev) = self.exercises.get(self.current_index) {
                self.completed_sets.insert(prev.id.clone(), 0);
            }
            self.current_index += 1;
            if let Some(next) = self.exercises.get(self.current_index) {
                self.completed_sets.insert(next.id.clone(), 0);
                tracing::debug!("Advanced to exercise {}", next.id);
            }
        }
    }

    fn new_timer(&mut self) -> TickHandle {
        self.generation += 1;
        TickHandle {
            generation: self.generation,
        }
    }

    fn reset(&mut self) {
        self.exercises.clear();
        self.phase = SessionPhase::NotStarted;
        self.current_index = 0;
        self.completed_sets.clear();
        self.start_countdown = None;
        self.rest_countdown = None;
        self.advance_after_rest = false;
        self.started = false;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExerciseCategory;

    fn exercise(id: &str, sets: u32, rest: Option<u32>) -> Exercise {
        Exercise {
            id: id.into(),
            name: format!("Exercise {}", id),
            category: ExerciseCategory::Chest,
            sets,
            reps: 10,
            weight: None,
            rest_time_seconds: rest,
            notes: None,
            difficulty: None,
            location: None,
            equipment: Vec::new(),
        }
    }

    fn engine() -> SessionEngine {
        SessionEngine::new(&SessionConfig::default())
    }

    /// Drive the countdown to completion
    fn run_countdown(session: &mut SessionEngine, handle: TickHandle) {
        loop {
            match session.tick(handle) {
                TickOutcome::Started => break,
                TickOutcome::CountingDown(_) => {}
                other => panic!("unexpected countdown outcome: {:?}", other),
            }
        }
    }

    /// Drive the current rest to natural expiry
    fn run_rest(session: &mut SessionEngine) {
        let handle = session.handle().expect("rest timer should be running");
        loop {
            match session.tick(handle) {
                TickOutcome::RestOver => break,
                TickOutcome::Resting(_) => {}
                other => panic!("unexpected rest outcome: {:?}", other),
            }
        }
    }

    #[test]
    fn test_empty_day_is_terminal() {
        let mut session = engine();
        assert!(session.begin(Vec::new()).is_none());
        assert_eq!(session.phase(), SessionPhase::NoExercises);
        assert_eq!(session.complete_set("1"), SetOutcome::Ignored);
    }

    #[test]
    fn test_countdown_runs_three_seconds() {
        let mut session = engine();
        let handle = session.begin(vec![exercise("a", 3, Some(10))]).unwrap();
        assert_eq!(session.start_countdown(), Some(3));

        assert_eq!(session.tick(handle), TickOutcome::CountingDown(2));
        assert_eq!(session.tick(handle), TickOutcome::CountingDown(1));
        assert_eq!(session.tick(handle), TickOutcome::Started);
        assert_eq!(session.phase(), SessionPhase::InExercise);
        assert!(session.started());
        assert_eq!(session.start_countdown(), None);
    }

    #[test]
    fn test_stale_countdown_handle_ignored_after_start() {
        let mut session = engine();
        let handle = session.begin(vec![exercise("a", 3, Some(10))]).unwrap();
        run_countdown(&mut session, handle);

        // A leftover interval firing again must not touch the session
        assert_eq!(session.tick(handle), TickOutcome::Ignored);
        assert_eq!(session.phase(), SessionPhase::InExercise);
    }

    #[test]
    fn test_set_progression_with_rest_between_sets() {
        // Property: E with sets=3 as last exercise; three completions advance
        // 0->1->2->3 with exactly one rest after each of the first two and a
        // completion prompt after the third
        let mut session = engine();
        let handle = session.begin(vec![exercise("e", 3, Some(30))]).unwrap();
        run_countdown(&mut session, handle);

        assert_eq!(session.completed_sets("e"), 0);

        assert_eq!(session.complete_set("e"), SetOutcome::RestStarted);
        assert_eq!(session.completed_sets("e"), 1);
        assert_eq!(session.rest_countdown(), Some(30));
        run_rest(&mut session);
        // Not advanced: same exercise, counter intact
        assert_eq!(session.completed_sets("e"), 1);

        assert_eq!(session.complete_set("e"), SetOutcome::RestStarted);
        assert_eq!(session.completed_sets("e"), 2);
        run_rest(&mut session);

        assert_eq!(session.complete_set("e"), SetOutcome::CompletionPending);
        assert_eq!(session.completed_sets("e"), 3);
        assert_eq!(session.phase(), SessionPhase::AwaitingConfirmation);
        assert_eq!(session.rest_countdown(), None);
    }

    #[test]
    fn test_exercise_advance_after_rest() {
        let mut session = engine();
        let handle = session
            .begin(vec![exercise("a", 1, Some(20)), exercise("b", 2, None)])
            .unwrap();
        run_countdown(&mut session, handle);

        // Final set of a non-last exercise starts rest, not confirmation
        assert_eq!(session.complete_set("a"), SetOutcome::RestStarted);
        assert_eq!(session.current_index(), 0);
        run_rest(&mut session);

        // Rest expiry advanced the index and zeroed both counters
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.current_exercise().unwrap().id, "b");
        assert_eq!(session.completed_sets("a"), 0);
        assert_eq!(session.completed_sets("b"), 0);
    }

    #[test]
    fn test_default_rest_when_exercise_has_none() {
        let mut session = engine();
        let handle = session.begin(vec![exercise("a", 2, None)]).unwrap();
        run_countdown(&mut session, handle);

        session.complete_set("a");
        assert_eq!(session.rest_countdown(), Some(60));
    }

    #[test]
    fn test_skip_rest_equivalent_to_expiry() {
        // Property: skipping at rest=30 yields the same next-state as the
        // natural tick-down
        let make = |skip: bool| {
            let mut session = engine();
            let handle = session
                .begin(vec![exercise("a", 1, Some(30)), exercise("b", 2, Some(30))])
                .unwrap();
            run_countdown(&mut session, handle);
            session.complete_set("a");
            if skip {
                assert!(session.skip_rest());
            } else {
                run_rest(&mut session);
            }
            session
        };

        let skipped = make(true);
        let expired = make(false);
        assert_eq!(skipped.phase(), expired.phase());
        assert_eq!(skipped.current_index(), expired.current_index());
        assert_eq!(skipped.completed_sets("a"), expired.completed_sets("a"));
        assert_eq!(skipped.completed_sets("b"), expired.completed_sets("b"));
        assert_eq!(skipped.rest_countdown(), expired.rest_countdown());
    }

    #[test]
    fn test_stale_rest_tick_cannot_double_advance() {
        let mut session = engine();
        let handle = session
            .begin(vec![
                exercise("a", 1, Some(5)),
                exercise("b", 1, Some(5)),
                exercise("c", 1, Some(5)),
            ])
            .unwrap();
        run_countdown(&mut session, handle);

        session.complete_set("a");
        let rest_handle = session.handle().unwrap();
        session.skip_rest();
        assert_eq!(session.current_index(), 1);

        // The old rest interval fires once more after being skipped
        assert_eq!(session.tick(rest_handle), TickOutcome::Ignored);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_complete_set_during_rest_ignored() {
        let mut session = engine();
        let handle = session.begin(vec![exercise("a", 3, Some(30))]).unwrap();
        run_countdown(&mut session, handle);

        session.complete_set("a");
        assert_eq!(session.phase(), SessionPhase::Resting);
        assert_eq!(session.complete_set("a"), SetOutcome::Ignored);
        assert_eq!(session.completed_sets("a"), 1);
    }

    #[test]
    fn test_overfull_counter_finishes_exercise() {
        let mut session = engine();
        let handle = session
            .begin(vec![exercise("a", 1, Some(5)), exercise("b", 1, Some(5))])
            .unwrap();
        run_countdown(&mut session, handle);

        session.complete_set("a");
        session.skip_rest();
        assert_eq!(session.current_index(), 1);

        // Counter full and last exercise: defensive branch goes straight to
        // the completion prompt
        session.complete_set("b");
        assert_eq!(session.phase(), SessionPhase::AwaitingConfirmation);
    }

    #[test]
    fn test_finish_requires_confirmation() {
        let mut session = engine();
        let handle = session.begin(vec![exercise("a", 1, Some(5))]).unwrap();
        run_countdown(&mut session, handle);

        assert!(!session.finish()); // nothing to confirm yet
        session.complete_set("a");
        assert_eq!(session.phase(), SessionPhase::AwaitingConfirmation);

        // Declining leaves the session waiting
        assert!(session.decline_finish());
        assert_eq!(session.phase(), SessionPhase::AwaitingConfirmation);

        assert!(session.finish());
        assert_eq!(session.phase(), SessionPhase::Finished);
    }

    #[test]
    fn test_cancel_discards_progress() {
        let mut session = engine();
        let handle = session.begin(vec![exercise("a", 3, Some(5))]).unwrap();
        run_countdown(&mut session, handle);
        session.complete_set("a");

        session.cancel();
        assert_eq!(session.phase(), SessionPhase::NotStarted);
        assert_eq!(session.completed_sets("a"), 0);
        assert_eq!(session.rest_countdown(), None);
        assert!(!session.started());
    }

    #[test]
    fn test_set_dots_projection() {
        let mut session = engine();
        let ex = exercise("a", 4, Some(5));
        let handle = session.begin(vec![ex.clone()]).unwrap();
        run_countdown(&mut session, handle);

        assert_eq!(session.set_dots(&ex), (0, 4));
        session.complete_set("a");
        assert_eq!(session.set_dots(&ex), (1, 4));
    }
}
