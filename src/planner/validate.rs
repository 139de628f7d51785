//! Structural validation and repair of generated plans

use std::collections::HashSet;

use super::constraints::{
    Constraints, DEFAULT_TIME, exercise_range, is_valid_time, weekday_index,
};
use super::plan::{PlanDay, WorkoutPlan};
use super::resolver::normalize_name;

/// Repair a generated plan in place. Total: any input plan comes out
/// structurally valid against the constraints and requested days.
pub fn fix(plan: &mut WorkoutPlan, constraints: &Constraints, requested_days: &[String]) {
    let default_time = if is_valid_time(&constraints.time) {
        constraints.time.clone()
    } else {
        DEFAULT_TIME.to_string()
    };

    // Days are never fabricated beyond the requested set. When the model
    // strayed, keep only requested weekdays.
    if !requested_days.is_empty() {
        let requested: HashSet<&str> = requested_days.iter().map(String::as_str).collect();
        let actual: HashSet<&str> = plan.days.iter().map(|d| d.weekday.as_str()).collect();
        if actual != requested {
            plan.days.retain(|d| requested.contains(d.weekday.as_str()));
        }
        if plan.days.is_empty() {
            plan.days = requested_days
                .iter()
                .map(|weekday| PlanDay::empty_shell(weekday, &default_time))
                .collect();
        }
    }

    for day in &mut plan.days {
        if weekday_index(&day.weekday).is_none() {
            day.weekday =
                requested_days.first().cloned().unwrap_or_else(|| "Mon".to_string());
        }
        if !is_valid_time(&day.time) {
            day.time = default_time.clone();
        }
        dedupe_exercises(day);
        clamp_sets(day, constraints.duration_minutes);

        // Trim only; a short selection is respected as-is.
        let (_, max_exercises) = exercise_range(constraints.duration_minutes);
        day.exercises.truncate(max_exercises);
    }

    plan.days.sort_by_key(|d| weekday_index(&d.weekday).unwrap_or(usize::MAX));
    plan.days_per_week = plan.days.len() as u8;
}

/// Drop repeated exercises within a day, keeping the first occurrence.
/// Names are compared in normalized form so `Push-up` and `push up`
/// count as the same exercise.
fn dedupe_exercises(day: &mut PlanDay) {
    let mut seen = HashSet::new();
    day.exercises.retain(|ex| {
        let mut key = normalize_name(&ex.name);
        if key.is_empty() {
            key = ex.name.trim().to_lowercase();
        }
        seen.insert(key)
    });
}

/// Short sessions get fixed 3-set prescriptions; longer ones stay in 3-4.
fn clamp_sets(day: &mut PlanDay, duration_minutes: i64) {
    for ex in &mut day.exercises {
        ex.sets = if duration_minutes == 30 { 3 } else { ex.sets.clamp(3, 4) };
    }
}
