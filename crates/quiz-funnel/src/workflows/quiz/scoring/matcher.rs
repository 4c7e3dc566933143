use std::cmp::Ordering;

use super::super::domain::{InvestmentOption, TagScores};
use super::config::PriorityOrder;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("max_results must be at least 1")]
    InvalidMaxResults,
}

/// Option paired with its transient match score while ranking.
#[derive(Debug)]
struct ScoredOption<'a> {
    option: &'a InvestmentOption,
    match_score: f64,
}

fn match_score(scores: &TagScores, option: &InvestmentOption, quiz_slug: Option<&str>) -> f64 {
    let tags = option.effective_tags(quiz_slug);
    if tags.is_empty() {
        return 0.0;
    }

    let raw: f64 = tags.iter().map(|tag| scores.get(tag)).sum();
    raw / tags.len() as f64
}

fn rank<'a>(
    scores: &TagScores,
    options: &'a [InvestmentOption],
    quiz_slug: Option<&str>,
    order: PriorityOrder,
) -> Vec<ScoredOption<'a>> {
    let mut ranked: Vec<ScoredOption<'a>> = options
        .iter()
        .map(|option| ScoredOption {
            option,
            match_score: match_score(scores, option, quiz_slug),
        })
        .collect();

    // Stable sort: options tied on score and priority keep catalog order.
    ranked.sort_by(|a, b| {
        b.match_score
            .total_cmp(&a.match_score)
            .then_with(|| compare_priority(a.option.priority, b.option.priority, order))
    });

    ranked
}

fn compare_priority(a: i32, b: i32, order: PriorityOrder) -> Ordering {
    match order {
        PriorityOrder::Descending => b.cmp(&a),
        PriorityOrder::Ascending => a.cmp(&b),
    }
}

/// Rank `options` against `scores` and return the best `max_results`, best first.
///
/// Ties on match score go to the higher priority number. The result always
/// holds `min(max_results, options.len())` entries, zero-score options included.
pub fn find_matches(
    scores: &TagScores,
    options: &[InvestmentOption],
    max_results: usize,
    quiz_slug: Option<&str>,
) -> Result<Vec<InvestmentOption>, MatchError> {
    find_matches_with_order(
        scores,
        options,
        max_results,
        quiz_slug,
        PriorityOrder::Descending,
    )
}

/// Same as [`find_matches`] with an explicit tie-break direction.
pub fn find_matches_with_order(
    scores: &TagScores,
    options: &[InvestmentOption],
    max_results: usize,
    quiz_slug: Option<&str>,
    order: PriorityOrder,
) -> Result<Vec<InvestmentOption>, MatchError> {
    if max_results == 0 {
        return Err(MatchError::InvalidMaxResults);
    }

    let ranked = rank(scores, options, quiz_slug, order);
    tracing::debug!(
        candidates = ranked.len(),
        top_score = ranked.first().map(|entry| entry.match_score),
        "ranked investment options"
    );

    Ok(ranked
        .into_iter()
        .take(max_results)
        .map(|entry| entry.option.clone())
        .collect())
}
