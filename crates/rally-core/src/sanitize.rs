//! Blank-field stripping for partial updates.

use serde_json::{Map, Value};

/// Drop every entry whose value is the empty string.
///
/// Lets a client submit a whole form with untouched fields left blank
/// without erasing stored values. Only top-level entries are inspected, and
/// falsy non-strings (`0`, `false`, `null`) are kept.
pub fn remove_blanks(fields: Map<String, Value>) -> Map<String, Value> {
  fields
    .into_iter()
    .filter(|(_, value)| !matches!(value, Value::String(s) if s.is_empty()))
    .collect()
}
