// ⚠️ Error taxonomy
// One enum per external collaborator so callers can tell "ran and found
// nothing" apart from "failed to run".

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// ============================================================================
// RECORD STORE
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Insert rejected because the id is already taken (concurrent submitter).
    #[error("Record {id} already exists in {collection}")]
    Conflict { collection: String, id: i64 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Parse(err.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

// ============================================================================
// ENTITY CLASSIFIER
// ============================================================================

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Classifier returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid classifier output: {0}")]
    InvalidOutput(String),

    #[error("Failed to load gazetteer: {0}")]
    Gazetteer(String),
}

impl From<reqwest::Error> for ClassifierError {
    fn from(err: reqwest::Error) -> Self {
        ClassifierError::Unavailable(err.to_string())
    }
}

// ============================================================================
// PROJECT REGISTER
// ============================================================================

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("No register source configured")]
    NotConfigured,

    #[error("Failed to fetch register: {0}")]
    Fetch(String),

    #[error("Failed to read register: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read register file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for RegisterError {
    fn from(err: reqwest::Error) -> Self {
        RegisterError::Fetch(err.to_string())
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

// ============================================================================
// FORM VALIDATION
// ============================================================================

/// All field failures for one draft, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Ok when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
