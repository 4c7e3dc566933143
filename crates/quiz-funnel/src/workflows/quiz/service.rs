use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{LeadId, LeadRecord, LeadSubmission, QuestionKind, QuizMode, QuizResult};
use super::intake::{IntakeGuard, IntakeViolation};
use super::repository::{
    EventLogger, FollowUpMailer, FollowUpRequest, FunnelEvent, LeadRepository, RepositoryError,
};
use super::scoring::{MatchError, ScoringConfig, ScoringEngine};
use crate::workflows::catalog::{CatalogError, CatalogLoader};

/// Service composing intake validation, catalog loading, scoring and lead persistence.
pub struct QuizFunnelService<C, L, E, M> {
    guard: IntakeGuard,
    catalog: Arc<C>,
    leads: Arc<L>,
    events: Arc<E>,
    mailer: Arc<M>,
    engine: ScoringEngine,
}

static LEAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_lead_id() -> LeadId {
    let id = LEAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LeadId(format!("lead-{id:06}"))
}

impl<C, L, E, M> QuizFunnelService<C, L, E, M>
where
    C: CatalogLoader + 'static,
    L: LeadRepository + 'static,
    E: EventLogger + 'static,
    M: FollowUpMailer + 'static,
{
    pub fn new(
        catalog: Arc<C>,
        leads: Arc<L>,
        events: Arc<E>,
        mailer: Arc<M>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            guard: IntakeGuard::new(),
            catalog,
            leads,
            events,
            mailer,
            engine: ScoringEngine::new(config),
        }
    }

    /// Public quiz definition for rendering; tags and weights stay server side.
    pub fn quiz(&self, slug: &str) -> Result<QuizView, FunnelServiceError> {
        let catalog = self.catalog.load(slug)?;

        let mut questions: Vec<QuestionView> = catalog
            .questions
            .iter()
            .map(|question| QuestionView {
                id: question.id.clone(),
                text: question.text.clone(),
                kind: question.kind,
                order: question.order,
                options: question
                    .options
                    .iter()
                    .map(|option| OptionView {
                        id: option.id.clone(),
                        text: option.text.clone(),
                    })
                    .collect(),
            })
            .collect();
        questions.sort_by_key(|question| question.order);

        Ok(QuizView {
            slug: catalog.quiz.slug,
            title: catalog.quiz.title,
            mode: catalog.quiz.mode,
            questions,
        })
    }

    /// Score a submission, persist the lead and notify downstream hooks.
    pub fn submit(
        &self,
        quiz_slug: &str,
        submission: LeadSubmission,
    ) -> Result<LeadRecord, FunnelServiceError> {
        let profile = self.guard.lead_from_submission(submission)?;
        let catalog = self.catalog.load(quiz_slug)?;

        let outcome = self.engine.evaluate(&catalog, &profile.answers)?;

        let record = LeadRecord {
            lead_id: next_lead_id(),
            quiz_slug: catalog.quiz.slug.clone(),
            profile,
            scores: outcome.scores,
            result: outcome.result,
            submitted_at: Utc::now(),
        };

        let stored = self.leads.insert(record)?;
        info!(
            lead_id = %stored.lead_id.0,
            quiz = %stored.quiz_slug,
            tags = stored.scores.len(),
            result = %stored.result.summary(),
            "quiz submission scored"
        );

        self.log_completion(&stored);
        self.request_follow_up(&stored);

        Ok(stored)
    }

    /// Fetch a stored lead for API responses.
    pub fn get(&self, lead_id: &LeadId) -> Result<LeadRecord, FunnelServiceError> {
        let record = self.leads.fetch(lead_id)?.ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    fn log_completion(&self, record: &LeadRecord) {
        let mut properties = BTreeMap::new();
        properties.insert(
            "answered_questions".to_string(),
            record.profile.answers.len().to_string(),
        );
        if let Some(source) = &record.profile.source {
            properties.insert("source".to_string(), source.clone());
        }
        match &record.result {
            QuizResult::Matches(options) => {
                let ids: Vec<&str> = options.iter().map(|option| option.id.as_str()).collect();
                properties.insert("matches".to_string(), ids.join(","));
            }
            QuizResult::Personality(result) => {
                let kind = result.as_ref().map(|r| r.kind.as_str()).unwrap_or("none");
                properties.insert("personality".to_string(), kind.to_string());
            }
        }

        let event = FunnelEvent {
            name: "quiz_completed".to_string(),
            lead_id: record.lead_id.clone(),
            quiz_slug: record.quiz_slug.clone(),
            properties,
        };

        if let Err(err) = self.events.log(event) {
            warn!(lead_id = %record.lead_id.0, error = %err, "failed to log funnel event");
        }
    }

    fn request_follow_up(&self, record: &LeadRecord) {
        let mut details = BTreeMap::new();
        details.insert("quiz".to_string(), record.quiz_slug.clone());
        details.insert("summary".to_string(), record.result.summary());
        if let Some(first_name) = &record.profile.first_name {
            details.insert("first_name".to_string(), first_name.clone());
        }

        let template = match &record.result {
            QuizResult::Matches(options) => {
                for (rank, option) in options.iter().enumerate() {
                    details.insert(format!("offer_{}", rank + 1), option.link.clone());
                }
                "investment_matches"
            }
            QuizResult::Personality(_) => "personality_result",
        };

        let request = FollowUpRequest {
            template: template.to_string(),
            lead_id: record.lead_id.clone(),
            email: record.profile.email.clone(),
            details,
        };

        if let Err(err) = self.mailer.send(request) {
            warn!(lead_id = %record.lead_id.0, error = %err, "failed to request follow-up email");
        }
    }
}

/// Question as shown to the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub order: i32,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizView {
    pub slug: String,
    pub title: String,
    pub mode: QuizMode,
    pub questions: Vec<QuestionView>,
}

/// Error raised by the funnel service.
#[derive(Debug, thiserror::Error)]
pub enum FunnelServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
