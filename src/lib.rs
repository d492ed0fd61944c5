//! VoiceAid Library
//!
//! Repeating quick-phrase announcements and the phrase book behind them, the
//! emergency contact alert, read-aloud speech practice and a mood log.

pub mod announce;
pub mod audit;
pub mod config;
pub mod emergency;
pub mod error;
pub mod i18n;
pub mod mood;
pub mod notify;
pub mod phrases;
pub mod therapy;
pub mod tts;
