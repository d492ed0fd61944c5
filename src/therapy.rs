//! Speech Practice
//!
//! A fixed set of read-aloud exercises. The user's attempt arrives as a
//! transcript and is scored by word overlap with the target sentence; the
//! target can be played back once through the configured speech engine.

use crate::announce::{ControllerEvent, EventReceiver, SessionId};
use crate::error::{VoiceAidError, VoiceAidResult};
use crate::i18n::tr;
use crate::notify::{Notice, Notifier};
use crate::tts::{SpeechEngine, Utterance, VoiceSettings};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Accuracy strictly above this counts as a pass
pub const PASS_THRESHOLD: u32 = 70;

/// Session progress gained per finished attempt, in percent
pub const PROGRESS_STEP: u32 = 25;

/// Handle used for playback; playback never overlaps an announcement session
/// because it owns its own engine and event channel.
const LISTEN_SESSION: SessionId = SessionId(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub text: String,
    pub difficulty: Difficulty,
    pub category: String,
}

pub fn exercises() -> Vec<Exercise> {
    let exercise = |id: &str, text: &str, difficulty, category: &str| Exercise {
        id: id.to_string(),
        text: text.to_string(),
        difficulty,
        category: category.to_string(),
    };
    vec![
        exercise(
            "1",
            "The quick brown fox jumps over the lazy dog",
            Difficulty::Beginner,
            "Pronunciation",
        ),
        exercise(
            "2",
            "She sells seashells by the seashore",
            Difficulty::Intermediate,
            "Tongue Twisters",
        ),
        exercise(
            "3",
            "Peter Piper picked a peck of pickled peppers",
            Difficulty::Advanced,
            "Advanced Practice",
        ),
    ]
}

fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| c.is_ascii_punctuation())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Percentage of target words matched by the spoken words.
///
/// Every spoken word found anywhere in the target counts, so repeating a
/// word counts it again; the result is capped at 100.
pub fn accuracy(spoken: &str, target: &str) -> u32 {
    let target_words = words(target);
    if target_words.is_empty() {
        return 0;
    }
    let lookup: HashSet<&str> = target_words.iter().map(String::as_str).collect();
    let matches = words(spoken)
        .iter()
        .filter(|w| lookup.contains(w.as_str()))
        .count();
    let percent = (matches as f64 / target_words.len() as f64 * 100.0).round() as u32;
    percent.min(100)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Excellent,
    Fair,
    NeedsPractice,
}

impl Rating {
    pub fn for_accuracy(accuracy: u32) -> Self {
        if accuracy > PASS_THRESHOLD {
            Rating::Excellent
        } else if accuracy > 50 {
            Rating::Fair
        } else {
            Rating::NeedsPractice
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent!",
            Rating::Fair => "Getting there",
            Rating::NeedsPractice => "Keep practicing",
        }
    }
}

/// One practice session over the exercise list
#[derive(Debug)]
pub struct TherapySession {
    exercises: Vec<Exercise>,
    current: usize,
    transcript: String,
    accuracy: u32,
    progress: u32,
    completed: usize,
    notifier: Arc<dyn Notifier>,
}

impl TherapySession {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            exercises: exercises(),
            current: 0,
            transcript: String::new(),
            accuracy: 0,
            progress: 0,
            completed: 0,
            notifier,
        }
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercises[self.current]
    }

    /// 1-based position and total, for "Exercise n of m"
    pub fn position(&self) -> (usize, usize) {
        (self.current + 1, self.exercises.len())
    }

    /// Jump to an exercise by 1-based number
    pub fn select(&mut self, number: usize) -> VoiceAidResult<&Exercise> {
        if number == 0 || number > self.exercises.len() {
            return Err(VoiceAidError::ExerciseNotFound(number));
        }
        self.current = number - 1;
        self.reset();
        Ok(self.exercise())
    }

    /// Score a transcript against the current exercise
    pub fn score(&mut self, transcript: &str) -> u32 {
        self.transcript = transcript.trim().to_string();
        self.accuracy = accuracy(&self.transcript, &self.exercise().text);
        debug!(
            "Exercise {} scored {}%: '{}'",
            self.exercise().id,
            self.accuracy,
            self.transcript
        );

        if self.accuracy > PASS_THRESHOLD {
            self.notifier.notify(Notice::info(
                tr("therapy.greatJob"),
                tr("therapy.greatJobDescription")
                    .replace("{accuracy}", &self.accuracy.to_string()),
            ));
        }
        self.accuracy
    }

    /// End the current attempt: advance session progress and count a pass
    pub fn finish_attempt(&mut self) -> u32 {
        self.progress = (self.progress + PROGRESS_STEP).min(100);
        if self.accuracy > PASS_THRESHOLD {
            self.completed += 1;
        }
        info!(
            "🎯 Attempt finished: {}% accuracy, session {}%",
            self.accuracy, self.progress
        );
        self.progress
    }

    /// Move to the next exercise. False when already on the last one.
    pub fn next_exercise(&mut self) -> bool {
        if self.current + 1 >= self.exercises.len() {
            return false;
        }
        self.current += 1;
        self.reset();
        true
    }

    /// Clear the current attempt
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.accuracy = 0;
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn accuracy(&self) -> u32 {
        self.accuracy
    }

    pub fn rating(&self) -> Rating {
        Rating::for_accuracy(self.accuracy)
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn completed(&self) -> usize {
        self.completed
    }
}

/// Speak `text` once and wait for the engine to finish.
///
/// `inbox` must be the receiver paired with the engine's event sender.
pub async fn listen(
    engine: &dyn SpeechEngine,
    inbox: &mut EventReceiver,
    text: &str,
    voice: VoiceSettings,
) -> VoiceAidResult<()> {
    if !engine.is_supported() {
        return Err(VoiceAidError::EngineUnsupported);
    }
    info!("🔈 Playing exercise: {}", text);
    engine.submit(LISTEN_SESSION, Utterance::new(text, voice))?;

    while let Some(event) = inbox.recv().await {
        match event {
            ControllerEvent::Completed(session) if session == LISTEN_SESSION => return Ok(()),
            ControllerEvent::Errored(session, reason) if session == LISTEN_SESSION => {
                return Err(VoiceAidError::Engine(reason));
            }
            other => debug!("Ignoring {:?} during playback", other),
        }
    }
    Err(VoiceAidError::Engine("speech engine went away".to_string()))
}
