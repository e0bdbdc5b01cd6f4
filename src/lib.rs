// PIMS - the PenCHORD Impact Store
// Exposes all modules for use in CLI, web server, and tests

pub mod app;
pub mod cache;
pub mod config;
pub mod display;
pub mod entities;
pub mod error;
pub mod form;
pub mod normalizer;
pub mod pipeline;
pub mod records;
pub mod register;
pub mod store;
pub mod wordcloud;

#[cfg(feature = "server")]
pub mod web;

// Re-export commonly used types
pub use app::{CloudError, CloudKind, Services};
pub use cache::CachedStore;
pub use config::{Config, StoreBackend};
pub use display::{newest_first, CardStyle, DisplayAssembler, ImpactCard};
pub use entities::{
    EntityCategory, EntityClassifier, EntityFilter, EntitySpan, EntityTokens,
    GazetteerClassifier, GazetteerEntry, HttpClassifier,
};
pub use error::{ClassifierError, ConfigError, RegisterError, StoreError, ValidationErrors};
pub use form::{ImpactForm, QuoteForm};
pub use normalizer::{normalize, tokenize};
pub use pipeline::{next_id, SubmissionPipeline};
pub use records::{
    Area, Collection, ImpactDraft, ImpactEntry, Month, QuoteDraft, QuoteEntry, Record,
};
pub use register::{ProjectRegister, ProjectRow, RegisterSource};
pub use store::{load_records, RecordStore, RestStore, Row, SqliteStore};
pub use wordcloud::{WordCount, WordFrequencies};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the fmt subscriber used by both binaries; `RUST_LOG` overrides.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pims=info,tower_http=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
