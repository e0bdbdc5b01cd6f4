// ⚙️ Configuration from environment variables

use crate::error::ConfigError;
use crate::register::RegisterSource;
use crate::wordcloud::DEFAULT_MAX_WORDS;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Hosted table API
    Rest { url: String, key: String },
    /// Local SQLite file, for development
    Sqlite { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub host: String,
    pub port: u16,
    pub register_source: Option<RegisterSource>,
    pub ner_url: Option<String>,
    pub gazetteer_path: Option<PathBuf>,
    pub cache_ttl: Duration,
    pub cloud_max_words: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = match get("PIMS_STORE").as_deref() {
            None | Some("rest") => StoreBackend::Rest {
                url: get("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?,
                key: get("SUPABASE_KEY").ok_or(ConfigError::Missing("SUPABASE_KEY"))?,
            },
            Some("sqlite") => StoreBackend::Sqlite {
                path: get("PIMS_SQLITE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("pims.db")),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "PIMS_STORE",
                    value: other.to_string(),
                })
            }
        };

        Ok(Config {
            store,
            host: get("PIMS_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PIMS_PORT", 3000)?,
            register_source: get("PIMS_REGISTER_SOURCE").map(|s| RegisterSource::parse(&s)),
            ner_url: get("PIMS_NER_URL"),
            gazetteer_path: get("PIMS_GAZETTEER").map(PathBuf::from),
            cache_ttl: Duration::from_secs(parse_or(&get, "PIMS_CACHE_TTL_SECS", 30)?),
            cloud_max_words: parse_or(&get, "PIMS_CLOUD_MAX_WORDS", DEFAULT_MAX_WORDS)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
