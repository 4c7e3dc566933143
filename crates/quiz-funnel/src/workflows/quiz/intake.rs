use super::domain::{AnswerMap, LeadProfile, LeadSubmission};

/// Validation errors raised while accepting a lead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("email address '{0}' is not valid")]
    InvalidEmail(String),
    #[error("submission carried no answers")]
    NoAnswers,
}

/// Guard producing `LeadProfile` instances from raw submissions.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn lead_from_submission(
        &self,
        submission: LeadSubmission,
    ) -> Result<LeadProfile, IntakeViolation> {
        let LeadSubmission {
            email,
            first_name,
            answers,
            source,
        } = submission;

        let email = normalize_email(&email)?;
        let answers = strip_blank_answers(answers);
        if answers.is_empty() {
            return Err(IntakeViolation::NoAnswers);
        }

        Ok(LeadProfile {
            email,
            first_name: non_blank(first_name),
            answers,
            source: non_blank(source),
        })
    }
}

fn normalize_email(raw: &str) -> Result<String, IntakeViolation> {
    let email = raw.trim().to_lowercase();
    let invalid = || IntakeViolation::InvalidEmail(raw.trim().to_string());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(email)
}

fn strip_blank_answers(answers: AnswerMap) -> AnswerMap {
    answers
        .into_iter()
        .filter(|(question_id, selection)| !question_id.trim().is_empty() && !selection.is_empty())
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
