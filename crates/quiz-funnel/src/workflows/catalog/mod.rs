//! Quiz catalog loading: JSON catalog documents and CSV investment-option imports.

mod normalizer;
mod parser;

use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::workflows::quiz::domain::{InvestmentOption, QuizCatalog, QuizDefinition, QuizMode};

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    UnknownQuiz(String),
    Invalid { quiz: String, reason: String },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(err) => write!(f, "failed to read catalog: {}", err),
            CatalogError::Json(err) => write!(f, "invalid catalog document: {}", err),
            CatalogError::Csv(err) => write!(f, "invalid investment option CSV: {}", err),
            CatalogError::UnknownQuiz(slug) => write!(f, "unknown quiz '{}'", slug),
            CatalogError::Invalid { quiz, reason } => {
                write!(f, "catalog for quiz '{}' is invalid: {}", quiz, reason)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            CatalogError::Json(err) => Some(err),
            CatalogError::Csv(err) => Some(err),
            CatalogError::UnknownQuiz(_) | CatalogError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<csv::Error> for CatalogError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Source of fully materialized quiz catalogs.
pub trait CatalogLoader: Send + Sync {
    fn load(&self, slug: &str) -> Result<QuizCatalog, CatalogError>;
    fn quizzes(&self) -> Result<Vec<QuizDefinition>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    quizzes: Vec<QuizCatalog>,
}

/// In-memory catalog validated once at construction.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    quizzes: BTreeMap<String, QuizCatalog>,
}

impl StaticCatalog {
    pub fn new(catalogs: Vec<QuizCatalog>) -> Result<Self, CatalogError> {
        let mut quizzes = BTreeMap::new();

        for catalog in catalogs {
            validate(&catalog)?;
            let slug = catalog.quiz.slug.clone();
            if quizzes.insert(slug.clone(), catalog).is_some() {
                return Err(CatalogError::Invalid {
                    quiz: slug,
                    reason: "duplicate quiz slug".to_string(),
                });
            }
        }

        Ok(Self { quizzes })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_reader(reader)?;
        Self::new(document.quizzes)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Replace the investment options of every investment-mode quiz.
    pub fn with_investment_options(
        mut self,
        options: Vec<InvestmentOption>,
    ) -> Result<Self, CatalogError> {
        for catalog in self.quizzes.values_mut() {
            if matches!(catalog.quiz.mode, QuizMode::Investment { .. }) {
                catalog.investment_options = options.clone();
                validate(catalog)?;
            }
        }
        Ok(self)
    }
}

impl CatalogLoader for StaticCatalog {
    fn load(&self, slug: &str) -> Result<QuizCatalog, CatalogError> {
        self.quizzes
            .get(slug)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownQuiz(slug.to_string()))
    }

    fn quizzes(&self) -> Result<Vec<QuizDefinition>, CatalogError> {
        Ok(self
            .quizzes
            .values()
            .map(|catalog| catalog.quiz.clone())
            .collect())
    }
}

/// Reads investment options from a CSV export.
///
/// Expected headers: `id,title,description,link,tags,priority,quiz_tags`.
pub struct InvestmentOptionImporter;

impl InvestmentOptionImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<InvestmentOption>, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<InvestmentOption>, CatalogError> {
        Ok(parser::parse_options(reader)?)
    }
}

fn validate(catalog: &QuizCatalog) -> Result<(), CatalogError> {
    let quiz = catalog.quiz.slug.as_str();
    let invalid = |reason: String| CatalogError::Invalid {
        quiz: quiz.to_string(),
        reason,
    };

    if quiz.trim().is_empty() {
        return Err(invalid("quiz slug is empty".to_string()));
    }
    if let QuizMode::Investment {
        max_results: Some(0),
    } = catalog.quiz.mode
    {
        return Err(invalid("max_results must be at least 1".to_string()));
    }

    let mut question_ids = HashSet::new();
    let mut orders = HashSet::new();
    for question in &catalog.questions {
        if !question_ids.insert(question.id.as_str()) {
            return Err(invalid(format!("duplicate question id '{}'", question.id)));
        }
        if !orders.insert(question.order) {
            return Err(invalid(format!(
                "question '{}' reuses display order {}",
                question.id, question.order
            )));
        }
        if question.options.is_empty() {
            return Err(invalid(format!("question '{}' has no options", question.id)));
        }

        let mut option_ids = HashSet::new();
        for option in &question.options {
            if !option_ids.insert(option.id.as_str()) {
                return Err(invalid(format!(
                    "question '{}' repeats option id '{}'",
                    question.id, option.id
                )));
            }
            if !(option.weight.is_finite() && option.weight > 0.0) {
                return Err(invalid(format!(
                    "option '{}' of question '{}' has non-positive weight {}",
                    option.id, question.id, option.weight
                )));
            }
        }
    }

    let mut investment_ids = HashSet::new();
    for option in &catalog.investment_options {
        if !investment_ids.insert(option.id.as_str()) {
            return Err(invalid(format!("duplicate investment option '{}'", option.id)));
        }
    }

    Ok(())
}
