use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for captured leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeadId(pub String);

/// Whether a question accepts one or several options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[default]
    Single,
    Multiple,
}

/// Catalog question as authored in the CMS. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(default, rename = "type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub order: i32,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn option(&self, option_id: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|option| option.id == option_id)
    }
}

fn default_weight() -> f64 {
    1.0
}

/// Selectable answer carrying the tags it votes for and how strongly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// Option ids picked for one question.
///
/// Serialized as either a bare string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerSelection {
    Single(String),
    Multiple(Vec<String>),
}

impl AnswerSelection {
    /// Selected option ids with duplicates removed, in first-seen order.
    pub fn option_ids(&self) -> Vec<&str> {
        match self {
            AnswerSelection::Single(id) => vec![id.as_str()],
            AnswerSelection::Multiple(ids) => {
                let mut seen = BTreeSet::new();
                ids.iter()
                    .map(String::as_str)
                    .filter(|id| seen.insert(*id))
                    .collect()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AnswerSelection::Single(id) => id.trim().is_empty(),
            AnswerSelection::Multiple(ids) => ids.iter().all(|id| id.trim().is_empty()),
        }
    }
}

impl From<&str> for AnswerSelection {
    fn from(value: &str) -> Self {
        AnswerSelection::Single(value.to_string())
    }
}

/// Answers keyed by question id.
pub type AnswerMap = BTreeMap<String, AnswerSelection>;

/// Normalized tag distribution produced per submission. Values sum to 100 or the map is empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagScores(BTreeMap<String, f64>);

impl TagScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score for `tag`, zero when the tag never appeared.
    pub fn get(&self, tag: &str) -> f64 {
        self.0.get(tag).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(tag, score)| (tag.as_str(), *score))
    }
}

impl From<BTreeMap<String, f64>> for TagScores {
    fn from(value: BTreeMap<String, f64>) -> Self {
        Self(value)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for TagScores {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(tag, score)| (tag.into(), score)).collect())
    }
}

/// Investment product offered at the end of the funnel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentOption {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub priority: i32,
    /// Per-quiz tag overrides keyed by quiz slug.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub quiz_tags: BTreeMap<String, BTreeSet<String>>,
}

impl InvestmentOption {
    /// Tags used for matching: the quiz override when present, else the base tags.
    pub fn effective_tags(&self, quiz_slug: Option<&str>) -> &BTreeSet<String> {
        quiz_slug
            .and_then(|slug| self.quiz_tags.get(slug))
            .unwrap_or(&self.tags)
    }
}

/// Descriptive outcome for personality-style quizzes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityResult {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub characteristics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// How a quiz turns its score vector into a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuizMode {
    Investment {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_results: Option<usize>,
    },
    Personality,
}

impl Default for QuizMode {
    fn default() -> Self {
        QuizMode::Investment { max_results: None }
    }
}

/// Quiz metadata shared by the catalog and lead records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDefinition {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub mode: QuizMode,
}

/// Everything needed to score one quiz, fully materialized in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizCatalog {
    pub quiz: QuizDefinition,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub investment_options: Vec<InvestmentOption>,
    #[serde(default)]
    pub personality_results: Vec<PersonalityResult>,
}

/// Raw lead submitted by the quiz page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    pub answers: AnswerMap,
    #[serde(default)]
    pub source: Option<String>,
}

/// Submission after intake validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadProfile {
    pub email: String,
    pub first_name: Option<String>,
    pub answers: AnswerMap,
    pub source: Option<String>,
}

/// What the funnel produced for a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QuizResult {
    Matches(Vec<InvestmentOption>),
    Personality(Option<PersonalityResult>),
}

impl QuizResult {
    pub fn summary(&self) -> String {
        match self {
            QuizResult::Matches(options) if options.is_empty() => {
                "no investment options available".to_string()
            }
            QuizResult::Matches(options) => {
                let titles: Vec<&str> = options.iter().map(|o| o.title.as_str()).collect();
                format!("matched {}", titles.join(", "))
            }
            QuizResult::Personality(Some(result)) => format!("personality {}", result.kind),
            QuizResult::Personality(None) => "no dominant personality".to_string(),
        }
    }
}

/// Stored lead with its computed score vector and result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub lead_id: LeadId,
    pub quiz_slug: String,
    pub profile: LeadProfile,
    pub scores: TagScores,
    pub result: QuizResult,
    pub submitted_at: DateTime<Utc>,
}
