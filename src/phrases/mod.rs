//! Quick phrases
//!
//! Seeded default phrases plus user phrases persisted through a
//! [`PhraseStore`]. Defaults are never stored and cannot be edited or deleted.

pub mod book;
pub mod local;
pub mod remote;

pub use book::PhraseBook;
pub use local::LocalPhraseStore;
pub use remote::RemotePhraseStore;

use crate::config::Config;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhraseCategory {
    Emergency,
    Daily,
    Custom,
}

impl PhraseCategory {
    pub fn label(&self) -> &'static str {
        match self {
            PhraseCategory::Emergency => "Emergency",
            PhraseCategory::Daily => "Daily",
            PhraseCategory::Custom => "Custom",
        }
    }
}

impl std::str::FromStr for PhraseCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "emergency" => Ok(PhraseCategory::Emergency),
            "daily" => Ok(PhraseCategory::Daily),
            "custom" => Ok(PhraseCategory::Custom),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phrase {
    pub id: String,
    pub text: String,
    pub category: PhraseCategory,
    #[serde(default)]
    pub is_default: bool,
}

impl Phrase {
    pub fn custom(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category: PhraseCategory::Custom,
            is_default: false,
        }
    }

    fn seeded(id: &str, text: &str, category: PhraseCategory) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            category,
            is_default: true,
        }
    }
}

/// Phrases every user starts with
pub fn default_phrases() -> Vec<Phrase> {
    use PhraseCategory::{Daily, Emergency};
    vec![
        Phrase::seeded("1", "I need help", Emergency),
        Phrase::seeded("2", "I am bleeding", Emergency),
        Phrase::seeded("3", "Call 911", Emergency),
        Phrase::seeded("4", "I can't breathe", Emergency),
        Phrase::seeded("5", "I am in pain", Emergency),
        Phrase::seeded("6", "Thank you", Daily),
        Phrase::seeded("7", "I am thirsty", Daily),
        Phrase::seeded("8", "I am hungry", Daily),
    ]
}

/// New phrase id: millisecond timestamp plus a random suffix
pub fn new_phrase_id() -> String {
    use rand::Rng;
    format!(
        "{}{:03}",
        chrono::Utc::now().timestamp_millis(),
        rand::thread_rng().gen_range(0..1000)
    )
}

/// Persistence for user phrases
#[async_trait]
pub trait PhraseStore: Send + Sync + std::fmt::Debug {
    /// All stored (custom) phrases
    async fn list(&self) -> Result<Vec<Phrase>>;

    /// Store a new custom phrase
    async fn create(&self, text: &str) -> Result<Phrase>;

    async fn update(&self, id: &str, text: &str) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Get the store name
    fn name(&self) -> &str;
}

/// Remote table when signed in, local file otherwise
pub fn open_store(config: &Config) -> Arc<dyn PhraseStore> {
    if config.is_signed_in() {
        info!("☁️ Using remote phrase store at {}", config.remote_url);
        Arc::new(RemotePhraseStore::new(config))
    } else {
        info!("💾 Using local phrase store at {}", config.phrase_store_path);
        Arc::new(LocalPhraseStore::new(PathBuf::from(&config.phrase_store_path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_seeded_and_protected() {
        let defaults = default_phrases();
        assert_eq!(defaults.len(), 8);
        assert!(defaults.iter().all(|p| p.is_default));
        assert_eq!(
            defaults
                .iter()
                .filter(|p| p.category == PhraseCategory::Emergency)
                .count(),
            5
        );
        assert_eq!(defaults[0].text, "I need help");
    }

    #[test]
    fn test_phrase_json_shape() {
        let phrase = Phrase::custom("42", "Please call my sister");
        let json = serde_json::to_string(&phrase).unwrap();
        assert!(json.contains("\"category\":\"custom\""));
        assert!(json.contains("\"isDefault\":false"));

        let parsed: Phrase =
            serde_json::from_str(r#"{"id":"9","text":"Hi","category":"custom"}"#).unwrap();
        assert!(!parsed.is_default);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Daily".parse(), Ok(PhraseCategory::Daily));
        assert!("other".parse::<PhraseCategory>().is_err());
    }

    #[test]
    fn test_open_store_selects_by_identity() {
        let mut config = Config::default();
        assert_eq!(open_store(&config).name(), "local");

        config.access_token = "abc".to_string();
        config.remote_url = "http://localhost:1".to_string();
        assert_eq!(open_store(&config).name(), "remote");
    }
}
