//! AI workout plan generation pipeline
//!
//! Stages:
//! - constraint extraction from the free-text request (LLM)
//! - plan generation for the sanitized constraints (LLM)
//! - structural validation and repair
//! - exercise-id reconciliation against the bundled catalog

pub mod constraints;
pub mod openai;
pub mod plan;
pub mod reconcile;
pub mod resolver;
pub mod validate;

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::catalog::Catalog;
use crate::config::Config;
use openai::OpenAiClient;
use plan::WorkoutPlan;
use resolver::NameResolver;

/// Why plan generation failed. Repairable problems (missing fields,
/// unknown exercises, oversized days) never surface here; they are fixed
/// or flagged in-band by the validator and reconciler.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("OpenAI API key is not configured")]
    MissingApiKey,
    #[error("OpenAI request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model response could not be parsed as JSON")]
    MalformedResponse,
}

impl PlanError {
    /// Message shown to the user when generation fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            PlanError::MissingApiKey => {
                "AI plan generation is not configured on this bot. \
                 You can still log workouts manually with /log."
            }
            _ => {
                "Failed to generate a workout plan. \
                 Try again in a moment, or build one manually with /log."
            }
        }
    }
}

/// Plan generation service. Holds the LLM client and the catalog-backed
/// name resolver; constructed once and shared by handlers.
pub struct Planner {
    client: OpenAiClient,
    resolver: NameResolver,
}

impl Planner {
    pub fn new(config: &Config, catalog: Arc<Catalog>) -> Self {
        Self {
            client: OpenAiClient::new(config),
            resolver: NameResolver::new(catalog),
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_configured()
    }

    pub fn client(&self) -> &OpenAiClient {
        &self.client
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    /// Run the full pipeline for one request. The returned plan is
    /// structurally valid, reconciled and stamped; persisting it is the
    /// caller's job.
    pub async fn generate_schedule(
        &self,
        text: &str,
        timezone: &str,
        existing: Option<&WorkoutPlan>,
    ) -> Result<WorkoutPlan, PlanError> {
        if !self.client.is_configured() {
            return Err(PlanError::MissingApiKey);
        }

        let constraints = self.client.extract_constraints(text).await?;
        let requested_days = constraints.requested_days();
        info!(
            days = ?requested_days,
            duration = constraints.duration_minutes,
            weeks = constraints.weeks,
            "extracted constraints"
        );

        let mut plan = self
            .client
            .generate_plan(text, &constraints, timezone, &requested_days, existing)
            .await?;
        validate::fix(&mut plan, &constraints, &requested_days);
        reconcile::reconcile(&mut plan, &self.resolver);
        stamp(&mut plan, text, timezone);
        info!(days = plan.days.len(), program = %plan.program_name, "generated plan");
        Ok(plan)
    }
}

/// Final metadata pass after repair and reconciliation.
fn stamp(plan: &mut WorkoutPlan, text: &str, timezone: &str) {
    if plan.program_name.trim().is_empty() {
        plan.program_name = truncate_request(text);
    }
    plan.timezone = if timezone.trim().is_empty() { "UTC".to_string() } else { timezone.to_string() };
    plan.days_per_week = plan.days.len() as u8;
    if plan.weeks == 0 {
        plan.weeks = 1;
    }
}

/// Default program name: the request text, cut to a title-sized prefix.
fn truncate_request(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "My Program".to_string();
    }
    trimmed.chars().take(60).collect()
}
