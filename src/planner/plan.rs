//! Workout plan data model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validation confidence tags carried in-band on every exercise.
pub mod confidence {
    /// Catalog id came from the model. Never survives reconciliation.
    pub const OPENAI_PROVIDED: &str = "openai_provided";
    /// Id was resolved from the exercise name against the local catalog.
    pub const MAPPED_FROM_NAME: &str = "mapped_from_name";
    /// Name could not be resolved; free text kept, no id.
    pub const UNMAPPED_EXERCISE: &str = "unmapped_exercise";
    /// Prefix for exercises substituted during per-day deduplication; the
    /// suffix names the resolution method of the substitute.
    pub const DUPLICATE_REPLACED_PREFIX: &str = "duplicate_replaced_";
}

/// One exercise slot in a plan day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanExercise {
    pub name: String,
    pub sets: i64,
    pub reps: String,
    #[serde(default)]
    pub exercise_db_id: Option<String>,
    #[serde(default)]
    pub is_validated: bool,
    #[serde(default)]
    pub validation_confidence: String,
}

impl PlanExercise {
    fn from_raw(raw: &Value) -> Self {
        let name = raw.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
        let sets = raw.get("sets").and_then(Value::as_i64).unwrap_or(3);
        let reps = match raw.get("reps") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => "8-12".to_string(),
        };
        let exercise_db_id = raw
            .get("exercise_db_id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let validation_confidence = if exercise_db_id.is_some() {
            confidence::OPENAI_PROVIDED.to_string()
        } else {
            String::new()
        };
        Self {
            name,
            sets,
            reps,
            exercise_db_id,
            is_validated: false,
            validation_confidence,
        }
    }
}

/// A single training day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
    pub weekday: String,
    pub time: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub exercises: Vec<PlanExercise>,
}

impl PlanDay {
    fn from_raw(raw: &Value) -> Self {
        Self {
            weekday: raw.get("weekday").and_then(Value::as_str).unwrap_or_default().to_string(),
            time: raw.get("time").and_then(Value::as_str).unwrap_or_default().to_string(),
            focus: raw.get("focus").and_then(Value::as_str).unwrap_or_default().to_string(),
            exercises: raw
                .get("exercises")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(PlanExercise::from_raw).collect())
                .unwrap_or_default(),
        }
    }

    /// An empty shell for a requested weekday that survived no generated
    /// content.
    pub fn empty_shell(weekday: &str, time: &str) -> Self {
        Self {
            weekday: weekday.to_string(),
            time: time.to_string(),
            focus: String::new(),
            exercises: Vec::new(),
        }
    }
}

/// A user's weekly workout plan. One per user; overwritten on each
/// regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub program_name: String,
    pub timezone: String,
    pub weeks: u8,
    pub days_per_week: u8,
    pub days: Vec<PlanDay>,
}

impl WorkoutPlan {
    /// Build a plan from whatever JSON the model returned. Total: missing
    /// or mistyped fields get placeholders and are repaired downstream.
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            program_name: raw
                .get("program_name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            timezone: raw.get("timezone").and_then(Value::as_str).unwrap_or_default().to_string(),
            weeks: raw
                .get("weeks")
                .and_then(Value::as_i64)
                .filter(|&w| w >= 1)
                .map(|w| w.min(12) as u8)
                .unwrap_or(1),
            days_per_week: raw
                .get("days_per_week")
                .and_then(Value::as_i64)
                .map(|n| n.clamp(0, 7) as u8)
                .unwrap_or(0),
            days: raw
                .get("days")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(PlanDay::from_raw).collect())
                .unwrap_or_default(),
        }
    }

    /// The plan day for a weekday token, if any.
    pub fn day_for(&self, weekday: &str) -> Option<&PlanDay> {
        self.days.iter().find(|d| d.weekday == weekday)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_raw_full_plan() {
        let raw = json!({
            "program_name": "Push Pull Legs",
            "timezone": "Europe/Berlin",
            "weeks": 4,
            "days_per_week": 3,
            "days": [{
                "weekday": "Mon",
                "time": "18:30",
                "focus": "push",
                "exercises": [
                    {"name": "barbell bench press", "sets": 4, "reps": "6-8"},
                    {"name": "dumbbell fly", "sets": 3, "reps": 12}
                ]
            }]
        });
        let plan = WorkoutPlan::from_raw(&raw);
        assert_eq!(plan.program_name, "Push Pull Legs");
        assert_eq!(plan.weeks, 4);
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].exercises[0].sets, 4);
        assert_eq!(plan.days[0].exercises[1].reps, "12");
    }

    #[test]
    fn test_from_raw_tolerates_junk() {
        let plan = WorkoutPlan::from_raw(&json!({
            "weeks": "four",
            "days_per_week": 99,
            "days": [{"weekday": 5, "exercises": "none"}, "not a day"]
        }));
        assert_eq!(plan.weeks, 1);
        assert_eq!(plan.days_per_week, 7);
        assert_eq!(plan.days.len(), 2);
        assert_eq!(plan.days[0].weekday, "");
        assert!(plan.days[0].exercises.is_empty());
    }

    #[test]
    fn test_untrusted_id_is_tagged() {
        let plan = WorkoutPlan::from_raw(&json!({
            "days": [{"weekday": "Mon", "exercises": [
                {"name": "push-up", "sets": 3, "reps": "10", "exercise_db_id": "abc1234"}
            ]}]
        }));
        let ex = &plan.days[0].exercises[0];
        assert_eq!(ex.exercise_db_id.as_deref(), Some("abc1234"));
        assert_eq!(ex.validation_confidence, confidence::OPENAI_PROVIDED);
        assert!(!ex.is_validated);
    }

    #[test]
    fn test_serde_round_trip() {
        let plan = WorkoutPlan::from_raw(&json!({
            "program_name": "Test",
            "timezone": "UTC",
            "days": [{"weekday": "Tue", "time": "07:00", "exercises": [
                {"name": "plank", "sets": 3, "reps": "60s"}
            ]}]
        }));
        let text = serde_json::to_string(&plan).unwrap();
        let back: WorkoutPlan = serde_json::from_str(&text).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn test_day_for() {
        let plan = WorkoutPlan::from_raw(&json!({
            "days": [{"weekday": "Mon", "exercises": []}, {"weekday": "Fri", "exercises": []}]
        }));
        assert!(plan.day_for("Fri").is_some());
        assert!(plan.day_for("Sun").is_none());
    }
}
