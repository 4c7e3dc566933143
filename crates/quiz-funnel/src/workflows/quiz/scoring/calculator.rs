use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::super::domain::{AnswerMap, Question, QuestionKind, QuestionOption, TagScores};

/// Convert answers into a tag distribution that sums to 100.
///
/// Unknown question or option ids are skipped. A multiple-choice question sums
/// every selected option; a single-choice question scores only the first
/// selected id that names one of its options. When nothing contributes, or the
/// weights overflow, the result is empty.
pub fn calculate_score(questions: &[Question], answers: &AnswerMap) -> TagScores {
    let by_id: HashMap<&str, &Question> = questions
        .iter()
        .map(|question| (question.id.as_str(), question))
        .collect();

    let mut raw: BTreeMap<String, f64> = BTreeMap::new();

    for (question_id, selection) in answers {
        let Some(question) = by_id.get(question_id.as_str()) else {
            debug!(question_id = %question_id, "skipping answer for unknown question");
            continue;
        };

        let option_ids = selection.option_ids();
        let mut known = option_ids
            .iter()
            .filter_map(|option_id| known_option(question, option_id));
        let selected: Vec<&QuestionOption> = match question.kind {
            QuestionKind::Multiple => known.collect(),
            QuestionKind::Single => {
                if option_ids.len() > 1 {
                    debug!(
                        question_id = %question_id,
                        selected = option_ids.len(),
                        "single-choice question answered with several options; scoring the first"
                    );
                }
                known.next().into_iter().collect()
            }
        };

        for option in selected {
            if !(option.weight.is_finite() && option.weight > 0.0) {
                continue;
            }

            for tag in &option.tags {
                *raw.entry(tag.clone()).or_insert(0.0) += option.weight;
            }
        }
    }

    let total: f64 = raw.values().sum();
    if !total.is_finite() {
        debug!("tag weights overflowed; returning an empty score vector");
        return TagScores::new();
    }
    if total <= 0.0 {
        return TagScores::new();
    }

    raw.into_iter()
        .map(|(tag, value)| (tag, value / total * 100.0))
        .collect()
}

fn known_option<'q>(question: &'q Question, option_id: &str) -> Option<&'q QuestionOption> {
    let option = question.option(option_id);
    if option.is_none() {
        debug!(
            question_id = %question.id,
            option_id = %option_id,
            "skipping unknown option"
        );
    }
    option
}
