mod calculator;
mod config;
mod matcher;
mod personality;

pub use calculator::calculate_score;
pub use config::{PriorityOrder, ScoringConfig, DEFAULT_MAX_RESULTS};
pub use matcher::{find_matches, find_matches_with_order, MatchError};
pub use personality::resolve_personality;

use super::domain::{AnswerMap, QuizCatalog, QuizMode, QuizResult, TagScores};

/// Stateless engine that applies the scoring configuration to a quiz catalog.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score the answers and reduce them to the result the quiz mode asks for.
    pub fn evaluate(
        &self,
        catalog: &QuizCatalog,
        answers: &AnswerMap,
    ) -> Result<ScoringOutcome, MatchError> {
        let scores = calculate_score(&catalog.questions, answers);

        let result = match catalog.quiz.mode {
            QuizMode::Investment { max_results } => {
                let limit = max_results.unwrap_or(self.config.max_results);
                let matches = find_matches_with_order(
                    &scores,
                    &catalog.investment_options,
                    limit,
                    Some(catalog.quiz.slug.as_str()),
                    self.config.priority_order,
                )?;
                QuizResult::Matches(matches)
            }
            QuizMode::Personality => QuizResult::Personality(resolve_personality(
                &scores,
                &catalog.personality_results,
            )),
        };

        Ok(ScoringOutcome { scores, result })
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

/// Score vector plus the mode-specific result for one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringOutcome {
    pub scores: TagScores,
    pub result: QuizResult,
}
