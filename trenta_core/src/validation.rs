//! User-input validation helpers.
//!
//! Validation failures block the operation with no state change; lookup
//! misses elsewhere stay silent no-ops.

/// Weight must be a positive value under 500 kg
pub fn validate_weight(weight: f64) -> bool {
    weight > 0.0 && weight < 500.0
}

/// Height must be a positive value under 300 cm
pub fn validate_height(height: f64) -> bool {
    height > 0.0 && height < 300.0
}

/// Exercise names are 1-100 characters after trimming
pub fn validate_exercise_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && trimmed.len() <= 100
}

/// Food amounts must be strictly positive
pub fn validate_amount(amount: f64) -> bool {
    amount > 0.0 && amount.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_bounds() {
        assert!(validate_weight(70.0));
        assert!(!validate_weight(0.0));
        assert!(!validate_weight(-5.0));
        assert!(!validate_weight(500.0));
    }

    #[test]
    fn test_height_bounds() {
        assert!(validate_height(175.0));
        assert!(!validate_height(0.0));
        assert!(!validate_height(300.0));
    }

    #[test]
    fn test_exercise_name() {
        assert!(validate_exercise_name("Squat"));
        assert!(!validate_exercise_name(""));
        assert!(!validate_exercise_name("   "));
        assert!(!validate_exercise_name(&"x".repeat(101)));
    }

    #[test]
    fn test_amount() {
        assert!(validate_amount(150.0));
        assert!(!validate_amount(0.0));
        assert!(!validate_amount(-10.0));
        assert!(!validate_amount(f64::NAN));
    }
}
