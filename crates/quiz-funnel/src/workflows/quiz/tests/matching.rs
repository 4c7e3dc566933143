use super::common::*;
use crate::workflows::quiz::domain::TagScores;
use crate::workflows::quiz::scoring::{
    find_matches, find_matches_with_order, MatchError, PriorityOrder,
};

fn ids(options: &[crate::workflows::quiz::InvestmentOption]) -> Vec<&str> {
    options.iter().map(|option| option.id.as_str()).collect()
}

#[test]
fn best_match_ranks_first() {
    let scores: TagScores = [("growth", 100.0)].into_iter().collect();
    let catalog = vec![offer("a", &["growth"], 1), offer("b", &["income"], 2)];

    let matches = find_matches(&scores, &catalog, 3, None).expect("valid limit");

    assert_eq!(ids(&matches), vec!["a", "b"]);
}

#[test]
fn empty_catalog_returns_nothing() {
    let scores: TagScores = [("growth", 100.0)].into_iter().collect();

    let matches = find_matches(&scores, &[], 3, None).expect("valid limit");

    assert!(matches.is_empty());
}

#[test]
fn returns_min_of_limit_and_catalog_size() {
    let scores: TagScores = [("growth", 50.0), ("income", 50.0)].into_iter().collect();
    let catalog = investor_offers();

    for limit in 1..=6 {
        let matches = find_matches(&scores, &catalog, limit, None).expect("valid limit");
        assert_eq!(matches.len(), limit.min(catalog.len()));
    }
}

#[test]
fn zero_limit_is_rejected() {
    let scores = TagScores::new();

    let err = find_matches(&scores, &investor_offers(), 0, None).expect_err("zero limit");

    assert_eq!(err, MatchError::InvalidMaxResults);
}

#[test]
fn zero_scores_still_fill_by_priority() {
    let scores: TagScores = [("real-estate", 100.0)].into_iter().collect();

    let matches = find_matches(&scores, &investor_offers(), 3, None).expect("valid limit");

    assert_eq!(ids(&matches), vec!["money-market", "index-fund", "dividend-etf"]);
}

#[test]
fn focused_options_beat_broad_ones() {
    let scores: TagScores = [("growth", 80.0), ("crypto", 20.0)].into_iter().collect();

    let matches = find_matches(&scores, &investor_offers(), 2, None).expect("valid limit");

    // index-fund averages 80, crypto-basket averages 50.
    assert_eq!(ids(&matches), vec!["index-fund", "crypto-basket"]);
}

#[test]
fn ties_prefer_higher_priority_by_default() {
    let scores: TagScores = [("growth", 100.0)].into_iter().collect();
    let catalog = vec![
        offer("low", &["growth"], 1),
        offer("high", &["growth"], 9),
        offer("mid", &["growth"], 5),
    ];

    let matches = find_matches(&scores, &catalog, 3, None).expect("valid limit");

    assert_eq!(ids(&matches), vec!["high", "mid", "low"]);
}

#[test]
fn ascending_order_prefers_lower_priority() {
    // The legacy results page ranked ties the other way; keep both behaviors pinned.
    let scores: TagScores = [("growth", 100.0)].into_iter().collect();
    let catalog = vec![
        offer("low", &["growth"], 1),
        offer("high", &["growth"], 9),
        offer("mid", &["growth"], 5),
    ];

    let matches = find_matches_with_order(&scores, &catalog, 3, None, PriorityOrder::Ascending)
        .expect("valid limit");

    assert_eq!(ids(&matches), vec!["low", "mid", "high"]);
}

#[test]
fn full_ties_keep_catalog_order() {
    let scores = TagScores::new();
    let catalog = vec![
        offer("first", &["growth"], 2),
        offer("second", &["income"], 2),
        offer("third", &[], 2),
    ];

    let matches = find_matches(&scores, &catalog, 3, None).expect("valid limit");

    assert_eq!(ids(&matches), vec!["first", "second", "third"]);
}

#[test]
fn output_is_sorted_by_score_then_priority() {
    let scores: TagScores = [("growth", 40.0), ("income", 35.0), ("liquidity", 25.0)]
        .into_iter()
        .collect();
    let catalog = investor_offers();

    let matches = find_matches(&scores, &catalog, catalog.len(), None).expect("valid limit");

    let average = |option: &crate::workflows::quiz::InvestmentOption| {
        let total: f64 = option.tags.iter().map(|tag| scores.get(tag)).sum();
        total / option.tags.len() as f64
    };
    for pair in matches.windows(2) {
        let (a, b) = (average(&pair[0]), average(&pair[1]));
        assert!(a > b || (a == b && pair[0].priority >= pair[1].priority));
    }
}

#[test]
fn quiz_tags_override_only_for_that_quiz() {
    let scores: TagScores = [("income", 100.0)].into_iter().collect();
    let mut reit = offer("reit", &["growth"], 1);
    reit.quiz_tags
        .insert("retirement".to_string(), tags(&["income"]));
    let bonds = offer("bonds", &["income"], 0);
    let catalog = vec![bonds, reit];

    let for_retirement =
        find_matches(&scores, &catalog, 2, Some("retirement")).expect("valid limit");
    let for_other = find_matches(&scores, &catalog, 2, Some("investor-fit")).expect("valid limit");

    // Both score 100 for retirement; reit wins the tie on priority.
    assert_eq!(ids(&for_retirement), vec!["reit", "bonds"]);
    // Without an override reit falls back to its base tags and scores zero.
    assert_eq!(ids(&for_other), vec!["bonds", "reit"]);
}
