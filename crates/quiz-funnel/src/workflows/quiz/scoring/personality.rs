use std::collections::HashMap;

use super::super::domain::{PersonalityResult, TagScores};

/// Pick the personality whose type is the strictly highest-scoring tag.
///
/// Types match tags case-insensitively and tags that name no personality are
/// ignored. On an exact tie the personality listed first wins. Returns `None`
/// when no personality tag scores above zero.
pub fn resolve_personality(
    scores: &TagScores,
    personality_results: &[PersonalityResult],
) -> Option<PersonalityResult> {
    let mut lowered: HashMap<String, f64> = HashMap::with_capacity(scores.len());
    for (tag, score) in scores.iter() {
        let slot = lowered.entry(tag.to_lowercase()).or_insert(score);
        if score > *slot {
            *slot = score;
        }
    }

    let mut best: Option<(&PersonalityResult, f64)> = None;
    for result in personality_results {
        let Some(score) = lowered.get(&result.kind.to_lowercase()).copied() else {
            continue;
        };

        let floor = best.map(|(_, value)| value).unwrap_or(0.0);
        if score > floor {
            best = Some((result, score));
        }
    }

    best.map(|(result, _)| result.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn personality(kind: &str) -> PersonalityResult {
        PersonalityResult {
            kind: kind.to_string(),
            title: format!("The {kind} Investor"),
            description: String::new(),
            characteristics: Vec::new(),
            image_url: None,
        }
    }

    #[test]
    fn zero_scores_never_win() {
        let scores: TagScores = [("growth", 0.0)].into_iter().collect();

        assert!(resolve_personality(&scores, &[personality("Growth")]).is_none());
    }

    #[test]
    fn mixed_case_tags_collapse_to_highest() {
        let scores: TagScores = [("Saver", 10.0), ("saver", 45.0), ("growth", 30.0)]
            .into_iter()
            .collect();
        let results = [personality("growth"), personality("SAVER")];

        let resolved = resolve_personality(&scores, &results).expect("saver wins");
        assert_eq!(resolved.kind, "SAVER");
    }
}
