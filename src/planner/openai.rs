//! OpenAI chat-completions client for the plan generation pipeline

use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::PlanError;
use super::constraints::{Constraints, UNKNOWN_TIME, exercise_range};
use super::plan::WorkoutPlan;
use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const EXTRACT_SYSTEM_PROMPT: &str = "\
You extract workout scheduling constraints from a user request. \
Respond with ONLY a JSON object containing ALL of these keys: \
\"days\" (array of weekday tokens Mon,Tue,Wed,Thu,Fri,Sat,Sun the user asked for, [] if unspecified), \
\"days_per_week\" (integer 0-7, 0 if unspecified), \
\"duration_minutes\" (30, 45 or 60), \
\"weeks\" (integer 1-12, 1 if unspecified), \
\"time\" (\"HH:MM\" 24h or \"unknown\"), \
\"program_split\" (e.g. \"push/pull/legs\", \"full body\", \"custom\" if unspecified), \
\"per_day_focus\" (object mapping weekday token to focus, {} if unspecified), \
\"equipment\" (\"\" if unspecified), \
\"language\" (two-letter code of the request language, \"\" if unsure). \
Never omit a key. Use the placeholder values for anything the user did not say.";

const PLAN_SYSTEM_PROMPT: &str = "\
You are a certified strength coach building weekly workout schedules. \
Produce ONLY JSON matching the response schema. Use common, standard \
exercise names (e.g. \"barbell bench press\", \"dumbbell walking lunge\"). \
Do NOT invent or include any exercise database ids.";

/// Thin client over the chat-completions endpoint. One instance per
/// process; cheap to clone.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// One chat-completions round trip, returning the message content.
    async fn chat(
        &self,
        system: &str,
        user: &str,
        response_format: Option<Value>,
    ) -> Result<String, PlanError> {
        let Some(api_key) = &self.api_key else {
            return Err(PlanError::MissingApiKey);
        };

        let mut payload = json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });
        if let Some(format) = response_format {
            payload["response_format"] = format;
        }

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        let content = body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or(PlanError::MalformedResponse)?;
        debug!(chars = content.len(), "received model response");
        Ok(content.to_string())
    }

    /// Extract sanitized constraints from a free-text request.
    pub async fn extract_constraints(&self, text: &str) -> Result<Constraints, PlanError> {
        let content = self
            .chat(EXTRACT_SYSTEM_PROMPT, text, Some(json!({"type": "json_object"})))
            .await?;
        let raw = parse_json_lenient(&content).ok_or_else(|| {
            warn!("constraint extraction returned unrecoverable JSON");
            PlanError::MalformedResponse
        })?;
        Ok(Constraints::sanitize(&raw))
    }

    /// Generate a raw plan for the sanitized constraints. The output still
    /// needs structural repair and id reconciliation.
    pub async fn generate_plan(
        &self,
        text: &str,
        constraints: &Constraints,
        timezone: &str,
        requested_days: &[String],
        existing: Option<&WorkoutPlan>,
    ) -> Result<WorkoutPlan, PlanError> {
        let prompt = build_plan_prompt(text, constraints, timezone, requested_days, existing);
        let content = self.chat(PLAN_SYSTEM_PROMPT, &prompt, Some(plan_response_format())).await?;
        let raw = parse_json_lenient(&content).ok_or_else(|| {
            warn!("plan generation returned unrecoverable JSON");
            PlanError::MalformedResponse
        })?;
        Ok(WorkoutPlan::from_raw(&raw))
    }

    /// Free-form short answer, used by /ask.
    pub async fn completion(&self, prompt: &str) -> Result<String, PlanError> {
        let system = "You are a concise fitness coach. Answer in a few sentences.";
        let content = self.chat(system, prompt, None).await?;
        Ok(content.trim().to_string())
    }
}

fn build_plan_prompt(
    text: &str,
    constraints: &Constraints,
    timezone: &str,
    requested_days: &[String],
    existing: Option<&WorkoutPlan>,
) -> String {
    let (min_ex, max_ex) = exercise_range(constraints.duration_minutes);
    let sets_rule = if constraints.duration_minutes == 30 {
        "3 sets per exercise".to_string()
    } else {
        "3-4 sets per exercise".to_string()
    };
    let days = requested_days.join(", ");

    let mut prompt = format!(
        "Build a weekly workout schedule.\n\
         Request: {text}\n\
         Timezone: {timezone}\n\
         Training days (exactly these {count} weekdays): {days}\n\
         Session duration: {duration} minutes, so {min_ex}-{max_ex} exercises per day and {sets_rule}.\n\
         Weeks: {weeks}. Program split: {split}.",
        count = requested_days.len(),
        duration = constraints.duration_minutes,
        weeks = constraints.weeks,
        split = constraints.program_split,
    );
    if constraints.time != UNKNOWN_TIME {
        prompt.push_str(&format!("\nPreferred start time: {}.", constraints.time));
    }
    if !constraints.equipment.is_empty() {
        prompt.push_str(&format!("\nAvailable equipment: {}.", constraints.equipment));
    }
    if !constraints.per_day_focus.is_empty() {
        let focus: Vec<String> =
            constraints.per_day_focus.iter().map(|(d, f)| format!("{d}: {f}")).collect();
        prompt.push_str(&format!("\nRequested focus: {}.", focus.join("; ")));
    }
    if let Some(plan) = existing {
        if let Ok(current) = serde_json::to_string(plan) {
            prompt.push_str(&format!(
                "\nThe user already has this plan; treat the request as a modification of it:\n{current}"
            ));
        }
    }
    prompt
}

/// Strict JSON-schema response format for plan generation. The schema has
/// no id field on purpose; ids are assigned by the reconciler only.
fn plan_response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "workout_plan",
            "strict": true,
            "schema": {
                "type": "object",
                "additionalProperties": false,
                "required": ["program_name", "timezone", "weeks", "days_per_week", "days"],
                "properties": {
                    "program_name": {"type": "string"},
                    "timezone": {"type": "string"},
                    "weeks": {"type": "integer", "minimum": 1, "maximum": 12},
                    "days_per_week": {"type": "integer", "minimum": 1, "maximum": 7},
                    "days": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "additionalProperties": false,
                            "required": ["weekday", "time", "focus", "exercises"],
                            "properties": {
                                "weekday": {
                                    "type": "string",
                                    "enum": ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
                                },
                                "time": {"type": "string"},
                                "focus": {"type": "string"},
                                "exercises": {
                                    "type": "array",
                                    "items": {
                                        "type": "object",
                                        "additionalProperties": false,
                                        "required": ["name", "sets", "reps"],
                                        "properties": {
                                            "name": {"type": "string"},
                                            "sets": {"type": "integer"},
                                            "reps": {"type": "string"}
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Parse model output as JSON, falling back to recovering the last
/// syntactically complete object from surrounding prose or fences.
pub fn parse_json_lenient(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
        if value.is_object() {
            return Some(value);
        }
    }
    recover_json_object(text)
}

/// Brace-counting scan for the last complete top-level JSON object.
fn recover_json_object(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut start = None;
    let mut span = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        span = start.map(|s| (s, i));
                    }
                }
            }
            b'"' if depth > 0 => in_string = true,
            _ => {}
        }
    }

    let (s, e) = span?;
    serde_json::from_str(&text[s..=e]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_object() {
        let v = parse_json_lenient(r#"{"weeks": 2}"#).unwrap();
        assert_eq!(v["weeks"], 2);
    }

    #[test]
    fn test_recover_from_fences() {
        let text = "Here is the plan:\n```json\n{\"weeks\": 3}\n```\nEnjoy!";
        let v = parse_json_lenient(text).unwrap();
        assert_eq!(v["weeks"], 3);
    }

    #[test]
    fn test_recover_last_complete_object() {
        let text = r#"{"weeks": 1} trailing {"weeks": 2} {"broken": "#;
        let v = parse_json_lenient(text).unwrap();
        assert_eq!(v["weeks"], 2);
    }

    #[test]
    fn test_braces_inside_strings() {
        let text = r#"note {"focus": "legs {heavy}", "weeks": 4} done"#;
        let v = parse_json_lenient(text).unwrap();
        assert_eq!(v["weeks"], 4);
        assert_eq!(v["focus"], "legs {heavy}");
    }

    #[test]
    fn test_unrecoverable_returns_none() {
        assert!(parse_json_lenient("no json here").is_none());
        assert!(parse_json_lenient(r#"{"never": "closed""#).is_none());
    }

    #[test]
    fn test_plan_prompt_mentions_days_and_counts() {
        let constraints = Constraints { duration_minutes: 45, ..Constraints::default() };
        let days = vec!["Mon".to_string(), "Thu".to_string()];
        let prompt = build_plan_prompt("get stronger", &constraints, "UTC", &days, None);
        assert!(prompt.contains("exactly these 2 weekdays"));
        assert!(prompt.contains("Mon, Thu"));
        assert!(prompt.contains("5-6 exercises"));
        assert!(prompt.contains("3-4 sets"));
    }
}
