use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::normalizer::{normalize_tag, split_tags};
use crate::workflows::quiz::domain::InvestmentOption;

pub(crate) fn parse_options<R: Read>(reader: R) -> Result<Vec<InvestmentOption>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut options = Vec::new();

    for record in csv_reader.deserialize::<OptionRow>() {
        let row = record?;
        options.push(row.into_option());
    }

    Ok(options)
}

#[derive(Debug, Deserialize)]
struct OptionRow {
    id: String,
    title: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    link: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    tags: Option<String>,
    /// Blank cells mean no priority; anything else must be an integer.
    #[serde(default)]
    priority: Option<i32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    quiz_tags: Option<String>,
}

impl OptionRow {
    fn into_option(self) -> InvestmentOption {
        let tags = self
            .tags
            .as_deref()
            .map(|raw| split_tags(raw).collect())
            .unwrap_or_default();
        let priority = self.priority.unwrap_or(0);
        let quiz_tags = self
            .quiz_tags
            .as_deref()
            .map(parse_quiz_tags)
            .unwrap_or_default();

        InvestmentOption {
            id: normalize_tag(&self.id),
            title: self.title,
            description: self.description.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
            tags,
            priority,
            quiz_tags,
        }
    }
}

/// Parse `slug:tag|tag;slug2:tag` into per-quiz tag sets. Segments without a slug are ignored.
fn parse_quiz_tags(raw: &str) -> BTreeMap<String, BTreeSet<String>> {
    let mut overrides: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for segment in raw.split(';') {
        let Some((slug, tags)) = segment.split_once(':') else {
            continue;
        };
        let slug = normalize_tag(slug);
        if slug.is_empty() {
            continue;
        }

        overrides.entry(slug).or_default().extend(split_tags(tags));
    }

    overrides
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
