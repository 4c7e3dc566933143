use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Which priority wins when two options tie on match score.
///
/// `Descending` lets the higher priority number win. `Ascending` treats the
/// lower number as better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityOrder {
    Ascending,
    #[default]
    Descending,
}

impl PriorityOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }
}

/// Ranking knobs applied to every quiz unless the quiz overrides them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub max_results: usize,
    pub priority_order: PriorityOrder,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            priority_order: PriorityOrder::default(),
        }
    }
}
