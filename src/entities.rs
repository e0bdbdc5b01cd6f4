// 🏷️ Entity Filter
// Runs a named-entity classifier over the impact text and keeps only people,
// groups, places and organisations. Multi-word spans become one token
// ("NHS Trust" -> "NHS_Trust").
//
// "Classifier found nothing" is an empty EntityTokens.
// "Classifier could not run" is a ClassifierError.

use crate::error::ClassifierError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// ENTITY CATEGORY
// ============================================================================

/// OntoNotes labels as emitted by common NER models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityCategory {
    Person,
    Norp,
    Fac,
    Org,
    Gpe,
    Loc,
    Product,
    Event,
    WorkOfArt,
    Law,
    Language,
    Date,
    Time,
    Percent,
    Money,
    Quantity,
    Ordinal,
    Cardinal,
}

impl EntityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::Person => "PERSON",
            EntityCategory::Norp => "NORP",
            EntityCategory::Fac => "FAC",
            EntityCategory::Org => "ORG",
            EntityCategory::Gpe => "GPE",
            EntityCategory::Loc => "LOC",
            EntityCategory::Product => "PRODUCT",
            EntityCategory::Event => "EVENT",
            EntityCategory::WorkOfArt => "WORK_OF_ART",
            EntityCategory::Law => "LAW",
            EntityCategory::Language => "LANGUAGE",
            EntityCategory::Date => "DATE",
            EntityCategory::Time => "TIME",
            EntityCategory::Percent => "PERCENT",
            EntityCategory::Money => "MONEY",
            EntityCategory::Quantity => "QUANTITY",
            EntityCategory::Ordinal => "ORDINAL",
            EntityCategory::Cardinal => "CARDINAL",
        }
    }

    /// People, groups, facilities, organisations, places
    pub fn is_place_or_party(&self) -> bool {
        matches!(
            self,
            EntityCategory::Person
                | EntityCategory::Norp
                | EntityCategory::Fac
                | EntityCategory::Org
                | EntityCategory::Gpe
                | EntityCategory::Loc
        )
    }
}

impl FromStr for EntityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_uppercase()))
            .map_err(|_| format!("unknown entity label: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub text: String,
    pub category: EntityCategory,
}

// ============================================================================
// CLASSIFIER SEAM
// ============================================================================

#[async_trait]
pub trait EntityClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Vec<EntitySpan>, ClassifierError>;
}

// ============================================================================
// FILTER
// ============================================================================

/// Entity tokens, possibly none
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityTokens(Vec<String>);

impl EntityTokens {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}

pub struct EntityFilter {
    classifier: Arc<dyn EntityClassifier>,
}

impl EntityFilter {
    pub fn new(classifier: Arc<dyn EntityClassifier>) -> Self {
        Self { classifier }
    }

    /// Classify the concatenated texts once and keep the wanted categories.
    pub async fn extract<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
    ) -> Result<EntityTokens, ClassifierError> {
        let joined = texts
            .iter()
            .map(|t| t.as_ref())
            .collect::<Vec<_>>()
            .join(" ");

        if joined.trim().is_empty() {
            return Ok(EntityTokens::default());
        }

        let spans = self.classifier.classify(&joined).await?;
        let total = spans.len();

        let tokens: Vec<String> = spans
            .into_iter()
            .filter(|span| span.category.is_place_or_party())
            .map(|span| span.text.split_whitespace().collect::<Vec<_>>().join("_"))
            .filter(|token| !token.is_empty())
            .collect();

        debug!(spans = total, kept = tokens.len(), "Entity filter finished");
        Ok(EntityTokens(tokens))
    }
}

// ============================================================================
// HTTP CLASSIFIER (spaCy-style service)
// ============================================================================

#[derive(Serialize)]
struct NerRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct NerResponse {
    ents: Vec<NerEntity>,
}

#[derive(Deserialize)]
struct NerEntity {
    text: String,
    label: String,
}

pub struct HttpClassifier {
    client: reqwest::Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl EntityClassifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<EntitySpan>, ClassifierError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&NerRequest { text })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClassifierError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: NerResponse = resp
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidOutput(e.to_string()))?;

        Ok(parsed
            .ents
            .into_iter()
            .filter_map(|ent| match ent.label.parse::<EntityCategory>() {
                Ok(category) => Some(EntitySpan {
                    text: ent.text,
                    category,
                }),
                Err(_) => {
                    debug!(label = %ent.label, "Ignoring unknown entity label");
                    None
                }
            })
            .collect())
    }
}

// ============================================================================
// GAZETTEER CLASSIFIER (local, deterministic)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazetteerEntry {
    /// Phrase to match, case-insensitive, on word boundaries
    pub pattern: String,
    pub label: EntityCategory,
}

pub struct GazetteerClassifier {
    /// Lowercased pattern words, longest phrase first
    entries: Vec<(Vec<String>, EntityCategory)>,
}

fn trim_word(word: &str) -> &str {
    word.trim_matches(|c: char| c.is_ascii_punctuation() && c != '&')
}

impl GazetteerClassifier {
    pub fn from_entries(entries: Vec<GazetteerEntry>) -> Self {
        let mut entries: Vec<(Vec<String>, EntityCategory)> = entries
            .into_iter()
            .map(|e| {
                let words: Vec<String> = e
                    .pattern
                    .split_whitespace()
                    .map(|w| trim_word(w).to_lowercase())
                    .filter(|w| !w.is_empty())
                    .collect();
                (words, e.label)
            })
            .filter(|(words, _)| !words.is_empty())
            .collect();

        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { entries }
    }

    /// Load entries from a JSON list of `{pattern, label}`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ClassifierError::Gazetteer(format!("{}: {}", path.as_ref().display(), e))
        })?;

        let entries: Vec<GazetteerEntry> = serde_json::from_str(&content)
            .map_err(|e| ClassifierError::Gazetteer(e.to_string()))?;

        Ok(Self::from_entries(entries))
    }

    /// Small built-in list for the programme's usual partners and places
    pub fn with_defaults() -> Self {
        let defaults = [
            ("NHS", EntityCategory::Org),
            ("NHS England", EntityCategory::Org),
            ("PenCHORD", EntityCategory::Org),
            ("HSMA", EntityCategory::Org),
            ("NIHR", EntityCategory::Org),
            ("University of Exeter", EntityCategory::Org),
            ("Royal Devon", EntityCategory::Fac),
            ("Royal Cornwall Hospital", EntityCategory::Fac),
            ("Exeter", EntityCategory::Gpe),
            ("Devon", EntityCategory::Gpe),
            ("Cornwall", EntityCategory::Gpe),
            ("England", EntityCategory::Gpe),
            ("Wales", EntityCategory::Gpe),
            ("Scotland", EntityCategory::Gpe),
            ("UK", EntityCategory::Gpe),
            ("South West", EntityCategory::Loc),
            ("British", EntityCategory::Norp),
            ("Welsh", EntityCategory::Norp),
            ("Scottish", EntityCategory::Norp),
        ];

        Self::from_entries(
            defaults
                .iter()
                .map(|(pattern, label)| GazetteerEntry {
                    pattern: pattern.to_string(),
                    label: *label,
                })
                .collect(),
        )
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn spans(&self, text: &str) -> Vec<EntitySpan> {
        let words: Vec<&str> = text.split_whitespace().map(trim_word).collect();
        let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

        let mut spans = Vec::new();
        let mut i = 0;
        while i < words.len() {
            let hit = self.entries.iter().find(|(pattern, _)| {
                lowered.len() - i >= pattern.len()
                    && pattern.iter().zip(&lowered[i..]).all(|(p, w)| p == w)
            });

            match hit {
                Some((pattern, category)) => {
                    spans.push(EntitySpan {
                        text: words[i..i + pattern.len()].join(" "),
                        category: *category,
                    });
                    i += pattern.len();
                }
                None => i += 1,
            }
        }

        spans
    }
}

#[async_trait]
impl EntityClassifier for GazetteerClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<EntitySpan>, ClassifierError> {
        Ok(self.spans(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FixedClassifier(Vec<EntitySpan>);

    #[async_trait]
    impl EntityClassifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<Vec<EntitySpan>, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenClassifier;

    #[async_trait]
    impl EntityClassifier for BrokenClassifier {
        async fn classify(&self, _text: &str) -> Result<Vec<EntitySpan>, ClassifierError> {
            Err(ClassifierError::Unavailable("model not loaded".to_string()))
        }
    }

    fn span(text: &str, category: EntityCategory) -> EntitySpan {
        EntitySpan {
            text: text.to_string(),
            category,
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("GPE".parse::<EntityCategory>().unwrap(), EntityCategory::Gpe);
        assert_eq!(
            "work_of_art".parse::<EntityCategory>().unwrap(),
            EntityCategory::WorkOfArt
        );
        assert!("MISC".parse::<EntityCategory>().is_err());

        let kept: Vec<&str> = [
            EntityCategory::Person,
            EntityCategory::Date,
            EntityCategory::Org,
            EntityCategory::Money,
            EntityCategory::Loc,
        ]
        .iter()
        .filter(|c| c.is_place_or_party())
        .map(|c| c.as_str())
        .collect();
        assert_eq!(kept, vec!["PERSON", "ORG", "LOC"]);
    }

    #[tokio::test]
    async fn test_filter_keeps_wanted_categories_and_joins_spans() {
        let filter = EntityFilter::new(Arc::new(FixedClassifier(vec![
            span("NHS Trust", EntityCategory::Org),
            span("January 2024", EntityCategory::Date),
            span("South West England", EntityCategory::Loc),
            span("three", EntityCategory::Cardinal),
            span("Alex", EntityCategory::Person),
        ])));

        let tokens = filter.extract(&["anything"]).await.unwrap();
        assert_eq!(
            tokens.tokens(),
            &["NHS_Trust", "South_West_England", "Alex"]
        );
        assert_eq!(tokens.joined(), "NHS_Trust South_West_England Alex");
    }

    #[tokio::test]
    async fn test_no_entities_is_empty_not_error() {
        let filter = EntityFilter::new(Arc::new(GazetteerClassifier::with_defaults()));
        let tokens = filter.extract(&["the quick brown fox jumps"]).await.unwrap();
        assert!(tokens.is_empty());
    }

    #[tokio::test]
    async fn test_classifier_failure_is_an_error() {
        let filter = EntityFilter::new(Arc::new(BrokenClassifier));
        let result = filter.extract(&["Exeter"]).await;
        assert!(matches!(result, Err(ClassifierError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_empty_text_skips_classifier() {
        let filter = EntityFilter::new(Arc::new(BrokenClassifier));
        let none: [&str; 0] = [];
        assert!(filter.extract(&none).await.unwrap().is_empty());
    }

    #[test]
    fn test_gazetteer_prefers_longest_phrase() {
        let gazetteer = GazetteerClassifier::with_defaults();
        let spans = gazetteer.spans("Launched a pilot with NHS England, then nhs trusts in Devon.");

        assert_eq!(
            spans,
            vec![
                span("NHS England", EntityCategory::Org),
                span("nhs", EntityCategory::Org),
                span("Devon", EntityCategory::Gpe),
            ]
        );
    }

    #[test]
    fn test_gazetteer_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"pattern": "Torbay Council", "label": "ORG"}}, {{"pattern": "Plymouth", "label": "GPE"}}]"#
        )
        .unwrap();

        let gazetteer = GazetteerClassifier::from_file(file.path()).unwrap();
        assert_eq!(gazetteer.entry_count(), 2);

        let spans = gazetteer.spans("Torbay Council and Plymouth");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Torbay Council");
    }

    #[test]
    fn test_gazetteer_bad_file() {
        let result = GazetteerClassifier::from_file("/nonexistent/gazetteer.json");
        assert!(matches!(result, Err(ClassifierError::Gazetteer(_))));
    }
}
