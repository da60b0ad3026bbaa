//! User profile: biometrics, weight history and BMI.

use crate::clock::Clock;
use crate::store::{load_json, save_json, BlobStore, USER_DATA_KEY};
use crate::validation::{validate_height, validate_weight};
use crate::{Error, Result, UserData, WeightEntry};

/// BMI band per the WHO cutoffs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BmiClass {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiClass {
    pub fn label(&self) -> &'static str {
        match self {
            BmiClass::Underweight => "Underweight",
            BmiClass::Normal => "Normal",
            BmiClass::Overweight => "Overweight",
            BmiClass::Obese => "Obese",
        }
    }

    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiClass::Underweight
        } else if bmi < 25.0 {
            BmiClass::Normal
        } else if bmi < 30.0 {
            BmiClass::Overweight
        } else {
            BmiClass::Obese
        }
    }
}

/// Owns the persisted [`UserData`] record
pub struct ProfileStore {
    data: UserData,
}

impl ProfileStore {
    /// Load the profile, defaulting every field for a fresh install
    pub fn load(store: &dyn BlobStore) -> Result<Self> {
        let data = load_json::<UserData>(store, USER_DATA_KEY)?.unwrap_or_default();
        Ok(Self { data })
    }

    pub fn data(&self) -> &UserData {
        &self.data
    }

    /// Partial-merge update: the closure mutates only the fields it cares
    /// about, everything else is preserved. Height is validated here since
    /// it has no dedicated entry point.
    ///
    /// The closure runs against a copy; a validation failure aborts with
    /// the stored data untouched.
    pub fn update<F>(&mut self, store: &dyn BlobStore, f: F) -> Result<()>
    where
        F: FnOnce(&mut UserData),
    {
        let mut next = self.data.clone();
        f(&mut next);
        if let Some(h) = next.height_cm {
            if !validate_height(h) {
                return Err(Error::Validation(
                    "height must be between 0 and 300 cm".into(),
                ));
            }
        }
        if let Some(w) = next.weight_kg {
            if !validate_weight(w) {
                return Err(Error::Validation(
                    "weight must be between 0 and 500 kg".into(),
                ));
            }
        }
        self.data = next;
        save_json(store, USER_DATA_KEY, &self.data);
        Ok(())
    }

    /// Record a weight measurement stamped today. Also updates the current
    /// weight. History stays sorted newest-first; same-day entries are kept,
    /// not merged.
    pub fn add_weight_entry(
        &mut self,
        store: &dyn BlobStore,
        clock: &dyn Clock,
        weight: f64,
    ) -> Result<()> {
        if !validate_weight(weight) {
            return Err(Error::Validation(
                "weight must be between 0 and 500 kg".into(),
            ));
        }
        self.data.weight_kg = Some(weight);
        self.data.weight_history.push(WeightEntry {
            date: clock.today(),
            weight,
        });
        self.data
            .weight_history
            .sort_by(|a, b| b.date.cmp(&a.date));
        save_json(store, USER_DATA_KEY, &self.data);
        tracing::info!("Weight entry recorded: {:.1} kg", weight);
        Ok(())
    }

    pub fn complete_onboarding(&mut self, store: &dyn BlobStore) {
        self.data.has_completed_onboarding = true;
        save_json(store, USER_DATA_KEY, &self.data);
    }

    /// BMI rounded to one decimal, when both biometrics are present
    pub fn bmi(&self) -> Option<f64> {
        let (weight, height) = (self.data.weight_kg?, self.data.height_cm?);
        if height <= 0.0 {
            return None;
        }
        let meters = height / 100.0;
        Some((weight / (meters * meters) * 10.0).round() / 10.0)
    }

    pub fn bmi_class(&self) -> Option<BmiClass> {
        self.bmi().map(BmiClass::from_bmi)
    }
}
