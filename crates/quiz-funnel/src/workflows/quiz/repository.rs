use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{InvestmentOption, LeadId, LeadRecord, PersonalityResult, QuizResult, TagScores};

impl LeadRecord {
    pub fn view(&self) -> LeadView {
        let (matches, personality) = match &self.result {
            QuizResult::Matches(options) => {
                (Some(options.iter().map(OfferView::from).collect()), None)
            }
            QuizResult::Personality(result) => (None, result.clone()),
        };

        LeadView {
            lead_id: self.lead_id.clone(),
            quiz_slug: self.quiz_slug.clone(),
            scores: self.scores.clone(),
            summary: self.result.summary(),
            matches,
            personality,
            submitted_at: self.submitted_at,
        }
    }
}

/// Persistence sink for captured leads.
pub trait LeadRepository: Send + Sync {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, RepositoryError>;
    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError>;
    fn recent(&self, limit: usize) -> Result<Vec<LeadRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Analytics hook invoked after a quiz completes. Failures never block the lead.
pub trait EventLogger: Send + Sync {
    fn log(&self, event: FunnelEvent) -> Result<(), EventError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelEvent {
    pub name: String,
    pub lead_id: LeadId,
    pub quiz_slug: String,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("event sink unavailable: {0}")]
    Transport(String),
}

/// Outbound follow-up e-mail hook (template rendering and delivery live elsewhere).
pub trait FollowUpMailer: Send + Sync {
    fn send(&self, request: FollowUpRequest) -> Result<(), MailerError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpRequest {
    pub template: String,
    pub lead_id: LeadId,
    pub email: String,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

/// Public representation of a matched offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub link: String,
}

impl From<&InvestmentOption> for OfferView {
    fn from(option: &InvestmentOption) -> Self {
        Self {
            id: option.id.clone(),
            title: option.title.clone(),
            description: option.description.clone(),
            link: option.link.clone(),
        }
    }
}

/// Sanitized lead payload returned by the API. The e-mail address is never echoed.
#[derive(Debug, Clone, Serialize)]
pub struct LeadView {
    pub lead_id: LeadId,
    pub quiz_slug: String,
    pub scores: TagScores,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<OfferView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<PersonalityResult>,
    pub submitted_at: DateTime<Utc>,
}
