// 🔌 Wiring - one explicitly built store handle shared by pipeline and display

use crate::cache::CachedStore;
use crate::config::{Config, StoreBackend};
use crate::display::DisplayAssembler;
use crate::entities::{EntityClassifier, EntityFilter, GazetteerClassifier, HttpClassifier};
use crate::error::{ClassifierError, RegisterError, StoreError};
use crate::normalizer::normalize;
use crate::pipeline::SubmissionPipeline;
use crate::register::{ProjectRegister, RegisterSource};
use crate::store::{RecordStore, RestStore, SqliteStore};
use crate::wordcloud::WordFrequencies;
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Which text a word cloud is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudKind {
    Impacts,
    Quotes,
    Entities,
}

impl CloudKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "impacts" => Some(CloudKind::Impacts),
            "quotes" => Some(CloudKind::Quotes),
            "entities" => Some(CloudKind::Entities),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CloudKind::Impacts => "What we've been up to",
            CloudKind::Quotes => "What people say",
            CloudKind::Entities => "Who and where",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

pub struct Services {
    pub store: Arc<dyn RecordStore>,
    pub pipeline: SubmissionPipeline,
    pub display: DisplayAssembler,
    pub entities: EntityFilter,
    pub register_source: Option<RegisterSource>,
    pub cloud_max_words: usize,
}

impl Services {
    pub fn new(
        store: Arc<dyn RecordStore>,
        classifier: Arc<dyn EntityClassifier>,
        register_source: Option<RegisterSource>,
        cloud_max_words: usize,
    ) -> Self {
        Self {
            pipeline: SubmissionPipeline::new(store.clone()),
            display: DisplayAssembler::new(store.clone()),
            entities: EntityFilter::new(classifier),
            store,
            register_source,
            cloud_max_words,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let backend: Arc<dyn RecordStore> = match &config.store {
            StoreBackend::Rest { url, key } => {
                info!(url = %url, "Using hosted record store");
                Arc::new(RestStore::new(url, key.clone()))
            }
            StoreBackend::Sqlite { path } => {
                info!(path = %path.display(), "Using local SQLite record store");
                Arc::new(
                    SqliteStore::open(path)
                        .with_context(|| format!("Failed to open database {:?}", path))?,
                )
            }
        };

        let store: Arc<dyn RecordStore> = if config.cache_ttl.is_zero() {
            backend
        } else {
            Arc::new(CachedStore::new(backend, config.cache_ttl))
        };

        let classifier: Arc<dyn EntityClassifier> = match (&config.ner_url, &config.gazetteer_path) {
            (Some(url), _) => {
                info!(url = %url, "Using NER service");
                Arc::new(HttpClassifier::new(url.clone()))
            }
            (None, Some(path)) => Arc::new(
                GazetteerClassifier::from_file(path).context("Failed to load gazetteer")?,
            ),
            (None, None) => Arc::new(GazetteerClassifier::with_defaults()),
        };

        Ok(Self::new(
            store,
            classifier,
            config.register_source.clone(),
            config.cloud_max_words,
        ))
    }

    /// Frequency table for one cloud. Entities never found is an empty table.
    pub async fn cloud(&self, kind: CloudKind) -> Result<WordFrequencies, CloudError> {
        let max = self.cloud_max_words;
        let freq = match kind {
            CloudKind::Impacts => {
                let blurbs: Vec<String> = self
                    .display
                    .impact_entries()
                    .await?
                    .into_iter()
                    .map(|e| e.blurb)
                    .collect();
                WordFrequencies::from_text(&normalize(&blurbs), max)
            }
            CloudKind::Quotes => {
                let quotes: Vec<String> = self
                    .display
                    .quotes()
                    .await?
                    .into_iter()
                    .map(|q| q.quote)
                    .collect();
                WordFrequencies::from_text(&normalize(&quotes), max)
            }
            CloudKind::Entities => {
                let blurbs: Vec<String> = self
                    .display
                    .impact_entries()
                    .await?
                    .into_iter()
                    .map(|e| e.blurb)
                    .collect();
                let tokens = self.entities.extract(&blurbs).await?;
                WordFrequencies::from_tokens(tokens.tokens(), max)
            }
        };

        Ok(freq)
    }

    pub async fn register(&self) -> Result<ProjectRegister, RegisterError> {
        match &self.register_source {
            Some(source) => ProjectRegister::load(source).await,
            None => Err(RegisterError::NotConfigured),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Area, ImpactDraft, Month, QuoteDraft};

    fn services() -> Services {
        Services::new(
            Arc::new(SqliteStore::open_in_memory().unwrap()),
            Arc::new(GazetteerClassifier::with_defaults()),
            None,
            50,
        )
    }

    fn draft(blurb: &str) -> ImpactDraft {
        ImpactDraft {
            name: "Alex".to_string(),
            area: Area::CorePenChord,
            month: Month::Feb,
            year: 2024,
            blurb: blurb.to_string(),
            link: None,
        }
    }

    #[tokio::test]
    async fn test_clouds_from_stored_text() {
        let services = services();
        services
            .pipeline
            .submit_impact(draft("Pilot with NHS England in Devon."))
            .await
            .unwrap();
        services
            .pipeline
            .submit_impact(draft("Second pilot, Devon again!"))
            .await
            .unwrap();
        services
            .pipeline
            .submit_quote(QuoteDraft {
                name: "Jo".to_string(),
                org: "NHS".to_string(),
                quote: "Brilliant".to_string(),
            })
            .await
            .unwrap();

        let impacts = services.cloud(CloudKind::Impacts).await.unwrap();
        assert_eq!(impacts.words[0].word, "devon");
        assert_eq!(impacts.words[0].count, 2);

        let entities = services.cloud(CloudKind::Entities).await.unwrap();
        assert_eq!(entities.words[0].word, "Devon");
        assert!(entities.words.iter().any(|w| w.word == "NHS_England"));

        let quotes = services.cloud(CloudKind::Quotes).await.unwrap();
        assert_eq!(quotes.words[0].word, "brilliant");
    }

    #[tokio::test]
    async fn test_entity_cloud_empty_without_entities() {
        let services = services();
        services
            .pipeline
            .submit_impact(draft("the quick brown fox jumps"))
            .await
            .unwrap();

        assert!(services.cloud(CloudKind::Entities).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_not_configured() {
        let result = services().register().await;
        assert!(matches!(result, Err(RegisterError::NotConfigured)));
    }

    #[test]
    fn test_cloud_kind_parse() {
        assert_eq!(CloudKind::parse("entities"), Some(CloudKind::Entities));
        assert_eq!(CloudKind::parse("blurbs"), None);
    }
}
