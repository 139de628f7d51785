//! Exercise-ID reconciliation against the local catalog

use std::collections::HashSet;

use tracing::debug;

use super::plan::{WorkoutPlan, confidence};
use super::resolver::{NameResolver, alias_targets};

/// Re-resolve every exercise id from its name. Model-supplied ids are
/// discarded first; only the catalog is trusted. Total: the plan always
/// comes out with per-day unique ids.
pub fn reconcile(plan: &mut WorkoutPlan, resolver: &NameResolver) {
    for day in &mut plan.days {
        for ex in &mut day.exercises {
            ex.exercise_db_id = None;
            ex.is_validated = false;

            let res = resolver.resolve(&ex.name);
            match res.exercise_id {
                Some(id) => {
                    ex.exercise_db_id = Some(id);
                    ex.is_validated = true;
                    ex.validation_confidence = confidence::MAPPED_FROM_NAME.to_string();
                }
                None => {
                    debug!(name = %ex.name, "exercise not found in catalog");
                    ex.validation_confidence = confidence::UNMAPPED_EXERCISE.to_string();
                }
            }
        }

        // Same id twice in one day: swap the repeat for an alternative, or
        // drop it when nothing collision-free resolves.
        let mut used: HashSet<String> = HashSet::new();
        day.exercises.retain_mut(|ex| {
            let Some(id) = &ex.exercise_db_id else {
                return true;
            };
            if used.insert(id.clone()) {
                return true;
            }
            match find_substitute(resolver, &used) {
                Some((name, sub_id, method)) => {
                    debug!(duplicate = %ex.name, substitute = %name, "replacing duplicate exercise");
                    ex.name = name;
                    ex.exercise_db_id = Some(sub_id.clone());
                    ex.is_validated = true;
                    ex.validation_confidence =
                        format!("{}{method}", confidence::DUPLICATE_REPLACED_PREFIX);
                    used.insert(sub_id);
                    true
                }
                None => {
                    debug!(duplicate = %ex.name, "no substitute available, dropping");
                    false
                }
            }
        });
    }
}

/// First alias-seeded exercise whose id is not yet used in the day, with
/// `push-up` as the generic last resort.
fn find_substitute(
    resolver: &NameResolver,
    used: &HashSet<String>,
) -> Option<(String, String, &'static str)> {
    for candidate in alias_targets().chain(std::iter::once("push-up")) {
        let res = resolver.resolve(candidate);
        if let Some(id) = res.exercise_id {
            if !used.contains(&id) {
                return Some((res.matched_name, id, res.method.as_str()));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, ExerciseRecord};
    use crate::planner::plan::{PlanDay, PlanExercise};
    use std::sync::Arc;

    fn resolver() -> NameResolver {
        NameResolver::new(Arc::new(Catalog::load_bundled().unwrap()))
    }

    fn exercise(name: &str) -> PlanExercise {
        PlanExercise {
            name: name.to_string(),
            sets: 3,
            reps: "8-12".to_string(),
            exercise_db_id: None,
            is_validated: false,
            validation_confidence: String::new(),
        }
    }

    fn one_day_plan(exercises: Vec<PlanExercise>) -> WorkoutPlan {
        WorkoutPlan {
            program_name: "Test".to_string(),
            timezone: "UTC".to_string(),
            weeks: 1,
            days_per_week: 1,
            days: vec![PlanDay {
                weekday: "Mon".to_string(),
                time: "18:00".to_string(),
                focus: String::new(),
                exercises,
            }],
        }
    }

    #[test]
    fn test_resolved_exercise_gets_id_and_tag() {
        let mut plan = one_day_plan(vec![exercise("barbell back squat")]);
        reconcile(&mut plan, &resolver());
        let ex = &plan.days[0].exercises[0];
        assert!(ex.exercise_db_id.is_some());
        assert!(ex.is_validated);
        assert_eq!(ex.validation_confidence, confidence::MAPPED_FROM_NAME);
    }

    #[test]
    fn test_unresolved_exercise_keeps_name_without_id() {
        let mut plan = one_day_plan(vec![exercise("underwater basket weaving")]);
        reconcile(&mut plan, &resolver());
        let ex = &plan.days[0].exercises[0];
        assert_eq!(ex.name, "underwater basket weaving");
        assert!(ex.exercise_db_id.is_none());
        assert!(!ex.is_validated);
        assert_eq!(ex.validation_confidence, confidence::UNMAPPED_EXERCISE);
    }

    #[test]
    fn test_model_supplied_id_is_discarded() {
        let mut ex = exercise("no such movement");
        ex.exercise_db_id = Some("bogus01".to_string());
        ex.validation_confidence = confidence::OPENAI_PROVIDED.to_string();
        let mut plan = one_day_plan(vec![ex]);
        reconcile(&mut plan, &resolver());
        let ex = &plan.days[0].exercises[0];
        assert!(ex.exercise_db_id.is_none());
        assert_eq!(ex.validation_confidence, confidence::UNMAPPED_EXERCISE);
    }

    #[test]
    fn test_duplicate_ids_are_substituted() {
        // Both names resolve to the same catalog entry via the alias table.
        let mut plan = one_day_plan(vec![
            exercise("dumbbell bench press"),
            exercise("bench press"),
        ]);
        reconcile(&mut plan, &resolver());
        let exercises = &plan.days[0].exercises;
        assert_eq!(exercises.len(), 2);
        assert_ne!(exercises[0].exercise_db_id, exercises[1].exercise_db_id);
        assert!(
            exercises[1]
                .validation_confidence
                .starts_with(confidence::DUPLICATE_REPLACED_PREFIX)
        );
    }

    #[test]
    fn test_ids_unique_within_day() {
        let mut plan = one_day_plan(vec![
            exercise("push up"),
            exercise("Push-up"),
            exercise("pushups"),
            exercise("plank"),
        ]);
        reconcile(&mut plan, &resolver());
        let ids: Vec<&String> = plan.days[0]
            .exercises
            .iter()
            .filter_map(|e| e.exercise_db_id.as_ref())
            .collect();
        let unique: HashSet<&String> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn test_duplicate_dropped_when_no_substitute_fits() {
        // A one-record catalog leaves no alternative to swap in.
        let catalog = Catalog::from_records(vec![ExerciseRecord {
            exercise_id: "only001".to_string(),
            name: "push-up".to_string(),
            body_parts: vec!["chest".to_string()],
            equipments: vec!["body weight".to_string()],
            instructions: vec!["Push.".to_string()],
        }]);
        let resolver = NameResolver::new(Arc::new(catalog));
        let mut plan = one_day_plan(vec![exercise("push-up"), exercise("push up")]);
        reconcile(&mut plan, &resolver);
        assert_eq!(plan.days[0].exercises.len(), 1);
        assert_eq!(plan.days[0].exercises[0].name, "push-up");
    }
}
