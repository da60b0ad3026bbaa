//! Display formatting helpers shared by the CLI and tests.

/// Format a number of seconds as `m:ss` with zero-padded seconds
pub fn format_mmss(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Format a weight in kilograms with one decimal
pub fn format_weight(kg: f64) -> String {
    format!("{:.1} kg", kg)
}
