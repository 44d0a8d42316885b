//! Shared Serde helpers
//!
//! Default value functions for `#[serde(default = "...")]` attributes and
//! custom deserializers for spreadsheet/CSV fields.

use serde::{Deserialize, Deserializer};

// ============================================================================
// Default Value Functions (for serde #[serde(default = "...")] attributes)
// ============================================================================

/// Default value: true
pub fn bool_true() -> bool {
    true
}

/// Default value: false
pub fn bool_false() -> bool {
    false
}

// ============================================================================
// Custom Deserializers (for CSV parsing)
// ============================================================================

/// Deserialize a string field with surrounding whitespace trimmed
///
/// Spreadsheet exports routinely carry stray spaces around cell values.
pub fn deserialize_trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}
