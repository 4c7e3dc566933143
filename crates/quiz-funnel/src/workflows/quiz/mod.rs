//! Quiz funnel: answer scoring, investment matching, personality results and lead capture.

pub mod domain;
pub(crate) mod intake;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AnswerMap, AnswerSelection, InvestmentOption, LeadId, LeadProfile, LeadRecord,
    LeadSubmission, PersonalityResult, Question, QuestionKind, QuestionOption, QuizCatalog,
    QuizDefinition, QuizMode, QuizResult, TagScores,
};
pub use intake::IntakeViolation;
pub use repository::{
    EventError, EventLogger, FollowUpMailer, FollowUpRequest, FunnelEvent, LeadRepository,
    LeadView, MailerError, OfferView, RepositoryError,
};
pub use router::quiz_router;
pub use scoring::{
    calculate_score, find_matches, find_matches_with_order, resolve_personality, MatchError,
    PriorityOrder, ScoringConfig, ScoringEngine, ScoringOutcome, DEFAULT_MAX_RESULTS,
};
pub use service::{FunnelServiceError, QuizFunnelService, QuizView};
