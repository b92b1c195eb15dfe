//! Encoding of a plan's ordered steps into the single `plans.tasks` column.
//!
//! Rows are written as a JSON array of strings. Rows written by the earlier
//! comma-joined format are still readable: any stored value that is not a
//! JSON string array is split on [`LEGACY_DELIMITER`]. A legacy step that
//! itself contained a comma comes back as several steps.

/// Separator used by the comma-joined format.
pub const LEGACY_DELIMITER: char = ',';

/// Encode steps for storage.
pub fn encode(tasks: &[String]) -> String {
    serde_json::Value::from(tasks.to_vec()).to_string()
}

/// Decode a stored `tasks` value. Blank input yields no steps.
pub fn decode(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    if raw.trim_start().starts_with('[') {
        if let Ok(tasks) = serde_json::from_str::<Vec<String>>(raw) {
            return tasks;
        }
    }
    raw.split(LEGACY_DELIMITER).map(str::to_owned).collect()
}
