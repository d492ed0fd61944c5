use crate::emergency::{default_contacts, default_medical_info, EmergencyContact, MedicalInfo};
use crate::error::{VoiceAidError, VoiceAidResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Speech
    pub tts_engine: String,
    pub speech_rate: f32,
    pub speech_volume: f32,
    pub speech_pitch: f32,
    pub repeat_pause_ms: u64,

    // Phrase storage
    pub phrase_store_path: String,
    pub remote_url: String,
    pub remote_api_key: String,
    /// Bearer token of the signed-in user. Empty means local storage.
    pub access_token: String,
    pub user_id: String,

    // Emergency
    pub emergency_stagger_ms: u64,
    pub emergency_contacts: Vec<EmergencyContact>,
    pub medical_info: MedicalInfo,

    // Mood
    pub mood_log_path: String,

    // Meta
    pub ui_language: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tts_engine: "system".to_string(),
            speech_rate: 0.8,
            speech_volume: 1.0,
            speech_pitch: 1.0,
            repeat_pause_ms: 1000,
            phrase_store_path: dirs::data_dir()
                .unwrap_or_default()
                .join("voiceaid/quick_phrases.json")
                .to_string_lossy()
                .to_string(),
            remote_url: String::new(),
            remote_api_key: String::new(),
            access_token: String::new(),
            user_id: String::new(),
            emergency_stagger_ms: 2000,
            emergency_contacts: default_contacts(),
            medical_info: default_medical_info(),
            mood_log_path: dirs::data_dir()
                .unwrap_or_default()
                .join("voiceaid/mood_log.json")
                .to_string_lossy()
                .to_string(),
            ui_language: "en".to_string(),
            log_level: "INFO".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location, or create default
    pub fn load() -> VoiceAidResult<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from an explicit path. A corrupt file is moved aside and
    /// defaults are used instead; a well-formed file with out-of-range
    /// values is an error.
    pub fn load_from(path: &Path) -> VoiceAidResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                let backup_path = path.with_extension("json.corrupt");
                if let Err(e) = std::fs::rename(path, &backup_path) {
                    tracing::warn!("⚠️ Could not back up corrupt config: {}", e);
                }
                return Ok(Self::default());
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject voice and timing values no engine can use
    pub fn validate(&self) -> VoiceAidResult<()> {
        for (name, value, max) in [
            ("speech_rate", self.speech_rate, 10.0),
            ("speech_volume", self.speech_volume, 1.0),
            ("speech_pitch", self.speech_pitch, 2.0),
        ] {
            if !value.is_finite() || value < 0.0 || value > max {
                return Err(VoiceAidError::Config(format!(
                    "{} must be between 0 and {}, got {}",
                    name, max, value
                )));
            }
        }
        if self.repeat_pause_ms == 0 {
            return Err(VoiceAidError::Config(
                "repeat_pause_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Save config to the default location
    pub fn save(&self) -> VoiceAidResult<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> VoiceAidResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Whether a signed-in identity is present (selects the remote phrase store)
    pub fn is_signed_in(&self) -> bool {
        !self.access_token.trim().is_empty()
    }
}

/// Get config file path (`VOICEAID_CONFIG` overrides)
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("VOICEAID_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("voiceaid")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_speech_parameters() {
        let config = Config::default();
        assert_eq!(config.speech_rate, 0.8);
        assert_eq!(config.speech_volume, 1.0);
        assert_eq!(config.speech_pitch, 1.0);
        assert_eq!(config.repeat_pause_ms, 1000);
        assert!(!config.is_signed_in());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.tts_engine = "speechd".to_string();
        config.access_token = "token".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.tts_engine, "speechd");
        assert!(loaded.is_signed_in());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"repeat_pause_ms": 250}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.repeat_pause_ms, 250);
        assert_eq!(loaded.speech_rate, 0.8);
        assert_eq!(loaded.emergency_contacts.len(), 4);
    }

    #[test]
    fn test_corrupt_file_falls_back_and_backs_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.tts_engine, "system");
        assert!(dir.path().join("config.json.corrupt").exists());
        assert!(!path.exists());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"speech_volume": 3.5}"#).unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, VoiceAidError::Config(ref msg) if msg.contains("speech_volume")));
        // Unlike a corrupt file, the user's file is left in place
        assert!(path.exists());

        let config = Config {
            repeat_pause_ms: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(VoiceAidError::Config(_))));
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_save_into_unwritable_location_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        let err = Config::default()
            .save_to(&blocker.join("config.json"))
            .unwrap_err();
        assert!(matches!(err, VoiceAidError::Io(_)));
    }
}
