//! Mood Log
//!
//! Manual mood entries plus a placeholder "camera" reading that picks a
//! random emotion. Readings are kept newest first, capped at
//! [`HISTORY_LIMIT`], and optionally persisted as a JSON file.

use crate::error::{VoiceAidError, VoiceAidResult};
use crate::i18n::tr;
use crate::notify::{Notice, Notifier};
use chrono::{DateTime, Local};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Readings kept in the log
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Happy,
    Neutral,
    Sad,
    Anxious,
}

impl Emotion {
    pub const ALL: [Emotion; 4] = [
        Emotion::Happy,
        Emotion::Neutral,
        Emotion::Sad,
        Emotion::Anxious,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Happy => "Happy",
            Emotion::Neutral => "Neutral",
            Emotion::Sad => "Sad",
            Emotion::Anxious => "Anxious",
        }
    }

    /// Wellbeing score on a 0-10 scale
    pub fn score(&self) -> f32 {
        match self {
            Emotion::Happy => 9.0,
            Emotion::Neutral => 6.0,
            Emotion::Sad => 3.0,
            Emotion::Anxious => 4.0,
        }
    }

    /// Low moods get pointed at support
    pub fn needs_support(&self) -> bool {
        matches!(self, Emotion::Sad | Emotion::Anxious)
    }
}

impl std::str::FromStr for Emotion {
    type Err = VoiceAidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| VoiceAidError::UnknownEmotion(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionReading {
    pub emotion: Emotion,
    /// Percent; manual entries are always 100
    pub confidence: u8,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug)]
pub struct MoodLog {
    history: Vec<EmotionReading>,
    path: Option<PathBuf>,
    notifier: Arc<dyn Notifier>,
}

impl MoodLog {
    /// Empty log kept in memory only
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            history: Vec::new(),
            path: None,
            notifier,
        }
    }

    /// Log backed by a JSON file. A missing file is an empty log; a corrupt
    /// one is moved aside.
    pub fn open(path: PathBuf, notifier: Arc<dyn Notifier>) -> VoiceAidResult<Self> {
        let history = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<EmotionReading>>(&content) {
                Ok(mut history) => {
                    history.truncate(HISTORY_LIMIT);
                    history
                }
                Err(e) => {
                    warn!("⚠️ Mood log corrupted, starting empty: {}", e);
                    std::fs::rename(&path, path.with_extension("json.corrupt"))?;
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("Loaded {} mood readings from {}", history.len(), path.display());
        Ok(Self {
            history,
            path: Some(path),
            notifier,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record how the user says they feel
    pub fn log_manual(&mut self, emotion: Emotion) -> VoiceAidResult<EmotionReading> {
        let reading = EmotionReading {
            emotion,
            confidence: 100,
            timestamp: Local::now(),
        };
        self.record(reading.clone())?;
        info!("📝 Mood logged: {}", emotion.label());
        self.notifier.notify(Notice::info(
            tr("mood.logged"),
            tr("mood.loggedDescription").replace("{mood}", &emotion.label().to_lowercase()),
        ));
        Ok(reading)
    }

    /// Stand-in for camera analysis: a random emotion at 70-99% confidence
    pub fn placeholder_reading<R: Rng>(&mut self, rng: &mut R) -> VoiceAidResult<EmotionReading> {
        let emotion = Emotion::ALL[rng.gen_range(0..Emotion::ALL.len())];
        let reading = EmotionReading {
            emotion,
            confidence: rng.gen_range(70..100),
            timestamp: Local::now(),
        };
        self.record(reading.clone())?;
        info!(
            "📷 Placeholder reading: {} ({}%)",
            emotion.label(),
            reading.confidence
        );

        if emotion.needs_support() {
            self.notifier.notify(Notice::error(
                tr("mood.support"),
                tr("mood.supportDescription"),
            ));
        } else if emotion == Emotion::Happy {
            self.notifier.notify(Notice::info(
                tr("mood.happy"),
                tr("mood.happyDescription"),
            ));
        }
        Ok(reading)
    }

    /// Most recent reading
    pub fn current(&self) -> Option<&EmotionReading> {
        self.history.first()
    }

    /// Newest first
    pub fn history(&self) -> &[EmotionReading] {
        &self.history
    }

    /// Mean score over the whole log
    pub fn average(&self) -> Option<f32> {
        if self.history.is_empty() {
            return None;
        }
        Some(mean_score(&self.history))
    }

    /// Mean score of the latest three readings minus that of the three
    /// before them. Zero with fewer than two readings; with no older
    /// readings the recent mean is compared with itself.
    pub fn trend(&self) -> f32 {
        if self.history.len() < 2 {
            return 0.0;
        }
        let recent = &self.history[..self.history.len().min(3)];
        let older = &self.history[recent.len()..self.history.len().min(6)];

        let recent_avg = mean_score(recent);
        let older_avg = if older.is_empty() {
            recent_avg
        } else {
            mean_score(older)
        };
        recent_avg - older_avg
    }

    fn record(&mut self, reading: EmotionReading) -> VoiceAidResult<()> {
        let mut history = Vec::with_capacity(HISTORY_LIMIT);
        history.push(reading);
        history.extend(self.history.iter().take(HISTORY_LIMIT - 1).cloned());

        if let Some(path) = &self.path {
            save(path, &history)?;
        }
        self.history = history;
        Ok(())
    }
}

fn mean_score(readings: &[EmotionReading]) -> f32 {
    readings.iter().map(|r| r.emotion.score()).sum::<f32>() / readings.len() as f32
}

fn save(path: &Path, history: &[EmotionReading]) -> VoiceAidResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(history)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// `+1.5`, `-0.7`, `0.0`
pub fn format_trend(trend: f32) -> String {
    if trend > 0.0 {
        format!("+{:.1}", trend)
    } else {
        format!("{:.1}", trend)
    }
}
