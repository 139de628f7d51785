//! Rendering of plans and stats into chat messages

use chrono::{DateTime, Local, Utc};

use crate::db::SetLog;
use crate::planner::plan::{PlanDay, WorkoutPlan};

/// Confirmation message after a plan was created or regenerated.
pub fn plan_message(plan: &WorkoutPlan) -> String {
    let mut text = String::from("Plan created ✅ I'll remind you before workouts.\n\n");
    text.push_str(&format!(
        "📋 {} ({} week{}, {} day{}/week)\n\n",
        plan.program_name,
        plan.weeks,
        plural(plan.weeks as usize),
        plan.days_per_week,
        plural(plan.days_per_week as usize),
    ));
    for day in &plan.days {
        text.push_str(&day_block(day));
        text.push('\n');
    }
    text.push_str("/today - today's session\n/log - record a set");
    text
}

/// One day as a header plus exercise bullets.
pub fn day_block(day: &PlanDay) -> String {
    let mut header = format!("{} {}", day.weekday, day.time);
    if !day.focus.is_empty() {
        header.push_str(&format!(" ({})", day.focus));
    }
    let mut text = format!("{header}\n");
    if day.exercises.is_empty() {
        text.push_str("• rest / free training\n");
    }
    for ex in &day.exercises {
        text.push_str(&format!("• {}: {}x{}", ex.name, ex.sets, ex.reps));
        if !ex.is_validated {
            text.push_str(" *");
        }
        text.push('\n');
    }
    text
}

/// /today reply for the current weekday.
pub fn today_message(plan: Option<&WorkoutPlan>, weekday: &str) -> String {
    let Some(plan) = plan else {
        return "No plan yet. Create one with /plan, e.g. /plan 3 days strength at home".to_string();
    };
    match plan.day_for(weekday) {
        Some(day) => format!("📅 Today:\n\n{}", day_block(day)),
        None => format!("😌 {weekday} is a rest day. Next sessions:\n\n{}", schedule_summary(plan)),
    }
}

fn schedule_summary(plan: &WorkoutPlan) -> String {
    plan.days
        .iter()
        .map(|d| {
            if d.focus.is_empty() {
                format!("• {} {}", d.weekday, d.time)
            } else {
                format!("• {} {} ({})", d.weekday, d.time, d.focus)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// /stats reply over the user's logged sets (newest first).
pub fn stats_message(sets: &[SetLog], now: DateTime<Utc>) -> String {
    if sets.is_empty() {
        return "No sets logged yet. Try: /log Bench 3x5 @ 60kg".to_string();
    }

    let today = now.with_timezone(&Local).date_naive();
    let week_cutoff = now - chrono::Duration::days(7);

    let today_sets: Vec<&SetLog> = sets
        .iter()
        .filter(|s| s.logged_at.with_timezone(&Local).date_naive() == today)
        .collect();
    let week_sets: Vec<&SetLog> = sets.iter().filter(|s| s.logged_at >= week_cutoff).collect();
    let week_volume: f64 = week_sets
        .iter()
        .map(|s| f64::from(s.sets) * f64::from(s.reps) * s.weight_kg)
        .sum();

    let mut text = format!(
        "📈 Stats\n\nTotal entries: {}\nLast 7 days: {} entries, {:.0} kg lifted\nToday: {}\n",
        sets.len(),
        week_sets.len(),
        week_volume,
        today_sets.len(),
    );

    if !today_sets.is_empty() {
        text.push_str("\nToday's work:\n");
        for s in today_sets.iter().rev() {
            let rpe = s.rpe.map(|r| format!(" RPE{}", fmt_num(r))).unwrap_or_default();
            text.push_str(&format!(
                "• {} {}x{} @ {}kg{}\n",
                s.exercise,
                s.sets,
                s.reps,
                fmt_num(s.weight_kg),
                rpe
            ));
        }
    }
    text
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Format a weight or RPE value without a trailing ".0".
pub fn fmt_num(x: f64) -> String {
    if x.fract().abs() < f64::EPSILON {
        format!("{x:.0}")
    } else {
        format!("{x:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_plan() -> WorkoutPlan {
        WorkoutPlan::from_raw(&json!({
            "program_name": "Strength Base",
            "timezone": "UTC",
            "weeks": 4,
            "days_per_week": 2,
            "days": [
                {"weekday": "Mon", "time": "19:00", "focus": "push", "exercises": [
                    {"name": "barbell bench press", "sets": 4, "reps": "6-8"}
                ]},
                {"weekday": "Thu", "time": "19:00", "focus": "pull", "exercises": []}
            ]
        }))
    }

    #[test]
    fn test_plan_message_lists_days() {
        let text = plan_message(&sample_plan());
        assert!(text.contains("Strength Base"));
        assert!(text.contains("Mon 19:00 (push)"));
        assert!(text.contains("• barbell bench press: 4x6-8"));
        assert!(text.contains("4 weeks"));
    }

    #[test]
    fn test_unvalidated_exercise_is_marked() {
        let mut plan = sample_plan();
        plan.days[0].exercises[0].is_validated = false;
        let text = day_block(&plan.days[0]);
        assert!(text.contains("*"));
    }

    #[test]
    fn test_today_without_plan() {
        let text = today_message(None, "Mon");
        assert!(text.contains("/plan"));
    }

    #[test]
    fn test_today_on_training_day() {
        let plan = sample_plan();
        let text = today_message(Some(&plan), "Mon");
        assert!(text.contains("barbell bench press"));
    }

    #[test]
    fn test_today_on_rest_day() {
        let plan = sample_plan();
        let text = today_message(Some(&plan), "Sun");
        assert!(text.contains("rest day"));
        assert!(text.contains("• Mon 19:00 (push)"));
    }

    #[test]
    fn test_stats_empty() {
        let text = stats_message(&[], Utc::now());
        assert!(text.contains("/log"));
    }

    #[test]
    fn test_stats_counts_and_volume() {
        let now = Utc::now();
        let sets = vec![
            SetLog {
                id: Some(1),
                tg_user_id: 1,
                exercise: "Bench".to_string(),
                sets: 3,
                reps: 5,
                weight_kg: 60.0,
                rpe: Some(8.0),
                is_warmup: false,
                logged_at: now,
            },
            SetLog {
                id: Some(2),
                tg_user_id: 1,
                exercise: "Squat".to_string(),
                sets: 3,
                reps: 5,
                weight_kg: 80.0,
                rpe: None,
                is_warmup: false,
                logged_at: now - chrono::Duration::days(30),
            },
        ];
        let text = stats_message(&sets, now);
        assert!(text.contains("Total entries: 2"));
        assert!(text.contains("Last 7 days: 1 entries, 900 kg"));
        assert!(text.contains("Bench 3x5 @ 60kg RPE8"));
    }
}
