//! Extracted user intent for plan generation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Weekday tokens in plan order.
pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Session durations the planner understands, in minutes.
pub const DURATIONS: [i64; 3] = [30, 45, 60];

/// Placeholder for an unknown workout time.
pub const UNKNOWN_TIME: &str = "unknown";

/// Fallback workout time when neither the user nor the model provided one.
pub const DEFAULT_TIME: &str = "19:00";

/// Structured constraints extracted from a free-text request. Every field
/// is always present after `sanitize`; unknown values use placeholders
/// (`0`, `"unknown"`, empty string/map), never absent keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    pub days: Vec<String>,
    pub days_per_week: u8,
    pub duration_minutes: i64,
    pub weeks: u8,
    pub time: String,
    pub program_split: String,
    pub per_day_focus: BTreeMap<String, String>,
    pub equipment: String,
    pub language: String,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            days: Vec::new(),
            days_per_week: 0,
            duration_minutes: 30,
            weeks: 1,
            time: UNKNOWN_TIME.to_string(),
            program_split: "custom".to_string(),
            per_day_focus: BTreeMap::new(),
            equipment: String::new(),
            language: String::new(),
        }
    }
}

impl Constraints {
    /// Build sanitized constraints from whatever JSON the model returned.
    /// Total: any shape of input produces a valid value. Idempotent over
    /// its own serialized output.
    pub fn sanitize(raw: &Value) -> Self {
        let duration_minutes = raw
            .get("duration_minutes")
            .and_then(Value::as_i64)
            .filter(|d| DURATIONS.contains(d))
            .unwrap_or(30);

        let days_per_week = raw
            .get("days_per_week")
            .and_then(Value::as_i64)
            .map(|n| n.clamp(0, 7) as u8)
            .unwrap_or(0);

        let days = raw
            .get("days")
            .and_then(Value::as_array)
            .map(|items| canonical_days(items.iter().filter_map(Value::as_str)))
            .unwrap_or_default();

        let weeks = raw
            .get("weeks")
            .and_then(Value::as_i64)
            .filter(|&w| w >= 1)
            .map(|w| w.min(12) as u8)
            .unwrap_or(1);

        let time = raw
            .get("time")
            .and_then(Value::as_str)
            .filter(|t| is_valid_time(t))
            .unwrap_or(UNKNOWN_TIME)
            .to_string();

        let program_split = raw
            .get("program_split")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("custom")
            .to_string();

        let per_day_focus = raw
            .get("per_day_focus")
            .and_then(Value::as_object)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let equipment = raw
            .get("equipment")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let language = raw
            .get("language")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Self {
            days,
            days_per_week,
            duration_minutes,
            weeks,
            time,
            program_split,
            per_day_focus,
            equipment,
            language,
        }
    }

    /// The weekdays this plan should cover: explicit days when given,
    /// otherwise a preset keyed by the requested number of sessions.
    pub fn requested_days(&self) -> Vec<String> {
        if self.days.is_empty() {
            preset_days(self.days_per_week)
        } else {
            self.days.clone()
        }
    }
}

/// Map arbitrary day strings to canonical tokens, dropping unknown values
/// and duplicates while preserving order.
fn canonical_days<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if let Some(token) = canonical_weekday(item) {
            if !out.iter().any(|d| d == token) {
                out.push(token.to_string());
            }
        }
    }
    out
}

/// Canonical token for a weekday string, case-insensitive.
pub fn canonical_weekday(s: &str) -> Option<&'static str> {
    let s = s.trim();
    WEEKDAYS.iter().find(|w| w.eq_ignore_ascii_case(s)).copied()
}

/// Position of a weekday token in Mon..Sun order.
pub fn weekday_index(token: &str) -> Option<usize> {
    WEEKDAYS.iter().position(|w| *w == token)
}

/// Exactly five characters matching the `HH:MM` digit pattern.
pub fn is_valid_time(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 5
        && (b'0'..=b'2').contains(&b[0])
        && b[1].is_ascii_digit()
        && b[2] == b':'
        && (b'0'..=b'5').contains(&b[3])
        && b[4].is_ascii_digit()
}

/// Exercise count range for a session duration (minutes). The upper bound
/// is also the trim limit applied by the validator.
pub fn exercise_range(duration_minutes: i64) -> (usize, usize) {
    match duration_minutes {
        30 => (4, 5),
        45 => (5, 6),
        _ => (6, 8),
    }
}

/// Default training days for a given number of sessions per week. An
/// unknown count (0) gets the three-day preset.
pub fn preset_days(days_per_week: u8) -> Vec<String> {
    let picks: &[usize] = match days_per_week {
        1 => &[0],
        2 => &[0, 3],
        0 | 3 => &[0, 2, 4],
        4 => &[0, 1, 3, 4],
        5 => &[0, 1, 2, 3, 4],
        6 => &[0, 1, 2, 3, 4, 5],
        _ => &[0, 1, 2, 3, 4, 5, 6],
    };
    picks.iter().map(|&i| WEEKDAYS[i].to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_defaults_on_empty_object() {
        let c = Constraints::sanitize(&json!({}));
        assert_eq!(c, Constraints::default());
    }

    #[test]
    fn test_sanitize_clamps_duration() {
        let c = Constraints::sanitize(&json!({"duration_minutes": 50}));
        assert_eq!(c.duration_minutes, 30);
        let c = Constraints::sanitize(&json!({"duration_minutes": 45}));
        assert_eq!(c.duration_minutes, 45);
        let c = Constraints::sanitize(&json!({"duration_minutes": "45"}));
        assert_eq!(c.duration_minutes, 30);
    }

    #[test]
    fn test_sanitize_clamps_days_per_week() {
        assert_eq!(Constraints::sanitize(&json!({"days_per_week": 9})).days_per_week, 7);
        assert_eq!(Constraints::sanitize(&json!({"days_per_week": -2})).days_per_week, 0);
        assert_eq!(Constraints::sanitize(&json!({"days_per_week": 2.5})).days_per_week, 0);
        assert_eq!(Constraints::sanitize(&json!({"days_per_week": 4})).days_per_week, 4);
    }

    #[test]
    fn test_sanitize_filters_and_dedupes_days() {
        let c = Constraints::sanitize(&json!({"days": ["Mon", "Funday", "mon", "WED"]}));
        assert_eq!(c.days, vec!["Mon", "Wed"]);
    }

    #[test]
    fn test_sanitize_clamps_weeks() {
        assert_eq!(Constraints::sanitize(&json!({"weeks": 0})).weeks, 1);
        assert_eq!(Constraints::sanitize(&json!({"weeks": 44})).weeks, 12);
        assert_eq!(Constraints::sanitize(&json!({"weeks": 8})).weeks, 8);
    }

    #[test]
    fn test_sanitize_time() {
        assert_eq!(Constraints::sanitize(&json!({"time": "19:00"})).time, "19:00");
        assert_eq!(Constraints::sanitize(&json!({"time": "9:00"})).time, UNKNOWN_TIME);
        assert_eq!(Constraints::sanitize(&json!({"time": "19:65"})).time, UNKNOWN_TIME);
        assert_eq!(Constraints::sanitize(&json!({"time": "later"})).time, UNKNOWN_TIME);
    }

    #[test]
    fn test_sanitize_program_split_default() {
        assert_eq!(Constraints::sanitize(&json!({"program_split": "  "})).program_split, "custom");
        assert_eq!(
            Constraints::sanitize(&json!({"program_split": "upper/lower"})).program_split,
            "upper/lower"
        );
    }

    #[test]
    fn test_sanitize_per_day_focus_coercion() {
        let c = Constraints::sanitize(&json!({"per_day_focus": "push"}));
        assert!(c.per_day_focus.is_empty());
        let c = Constraints::sanitize(&json!({"per_day_focus": {"Mon": "push", "Wed": 3}}));
        assert_eq!(c.per_day_focus.len(), 1);
        assert_eq!(c.per_day_focus["Mon"], "push");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let raw = json!({
            "days": ["Sat", "sat", "Mon", "Noday"],
            "days_per_week": 15,
            "duration_minutes": 90,
            "weeks": 0,
            "time": "7pm",
            "program_split": "",
            "per_day_focus": ["not", "a", "map"],
            "equipment": "dumbbells"
        });
        let once = Constraints::sanitize(&raw);
        let twice = Constraints::sanitize(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_requested_days_preset_for_three() {
        let c = Constraints { days_per_week: 3, ..Constraints::default() };
        assert_eq!(c.requested_days(), vec!["Mon", "Wed", "Fri"]);
    }

    #[test]
    fn test_requested_days_explicit_win() {
        let c = Constraints {
            days: vec!["Tue".into(), "Sat".into()],
            days_per_week: 3,
            ..Constraints::default()
        };
        assert_eq!(c.requested_days(), vec!["Tue", "Sat"]);
    }

    #[test]
    fn test_preset_days_unknown_count() {
        assert_eq!(preset_days(0), vec!["Mon", "Wed", "Fri"]);
        assert_eq!(preset_days(7).len(), 7);
    }

    #[test]
    fn test_exercise_range_by_duration() {
        assert_eq!(exercise_range(30), (4, 5));
        assert_eq!(exercise_range(45), (5, 6));
        assert_eq!(exercise_range(60), (6, 8));
    }
}
