#![forbid(unsafe_code)]

//! Core domain model and business logic for the Trenta tracker.
//!
//! This crate provides:
//! - Domain types (exercises, workout days, nutrition, user profile)
//! - Exercise catalog and the 30-day program engine
//! - In-session workout state machine
//! - Nutrition goal computation, food logging and recommendations
//! - Persistence (keyed JSON blob store)

pub mod types;
pub mod error;
pub mod store;
pub mod clock;
pub mod config;
pub mod logging;
pub mod validation;
pub mod format;
pub mod catalog;
pub mod program;
pub mod session;
pub mod products;
pub mod nutrition;
pub mod profile;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{default_exercises, ExerciseCatalog};
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use nutrition::{calculate_daily_goal, recommendations, NutritionLog, DEFAULT_GOAL};
pub use products::{default_products, search_products};
pub use profile::{BmiClass, ProfileStore};
pub use program::ProgramEngine;
pub use session::{SessionEngine, SessionPhase, SetOutcome, TickOutcome};
pub use store::{BlobStore, FileStore, MemStore};
