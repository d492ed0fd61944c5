//! Internationalization (i18n) Support
//!
//! Notice strings for the supported languages (en, hi, ta, te). English is
//! built in; other languages come from JSON locale files and fall back to
//! English key by key.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{debug, info};

/// Supported UI languages
pub const LANGUAGES: &[&str] = &["en", "hi", "ta", "te"];

/// Current active language
static CURRENT_LANG: RwLock<String> = RwLock::new(String::new());

type Translations = HashMap<String, HashMap<String, String>>;

/// Loaded translations (language -> key -> value)
static TRANSLATIONS: RwLock<Option<Translations>> = RwLock::new(None);

/// Built-in English strings
const ENGLISH: &[(&str, &str)] = &[
    ("phrases.speaking", "Speaking phrase"),
    ("phrases.repeating", "Repeating"),
    ("phrases.stopped", "Stopped speaking"),
    ("phrases.notSupported", "Not supported"),
    (
        "phrases.notSupportedDescription",
        "Speech synthesis is not supported on this system",
    ),
    ("phrases.speechError", "Speech error"),
    ("phrases.added", "Phrase added"),
    ("phrases.addedDescription", "Your custom phrase has been saved"),
    ("phrases.updated", "Phrase updated"),
    ("phrases.updatedDescription", "Your phrase has been updated"),
    ("phrases.deleted", "Phrase deleted"),
    ("phrases.deletedDescription", "The phrase has been removed"),
    ("phrases.cannotDelete", "Cannot delete"),
    (
        "phrases.cannotDeleteDescription",
        "Default phrases cannot be deleted",
    ),
    ("phrases.cannotEdit", "Cannot edit"),
    (
        "phrases.cannotEditDescription",
        "Default phrases cannot be edited",
    ),
    ("phrases.storeError", "Could not save phrases"),
    ("emergency.activated", "EMERGENCY ALERT ACTIVATED"),
    (
        "emergency.activatedDescription",
        "Contacting your emergency contacts and sharing your location",
    ),
    ("emergency.contacting", "Contacting"),
    ("emergency.calling", "Calling"),
    ("emergency.cancelled", "Emergency alert cancelled"),
    (
        "emergency.cancelledDescription",
        "All contacts will be notified that the emergency is resolved",
    ),
    ("therapy.greatJob", "Great job! 🎉"),
    (
        "therapy.greatJobDescription",
        "You achieved {accuracy}% accuracy!",
    ),
    ("mood.logged", "Emotion logged"),
    ("mood.loggedDescription", "Your {mood} mood has been recorded"),
    ("mood.support", "We notice you might need support"),
    (
        "mood.supportDescription",
        "Consider trying our breathing exercises or reaching out to a support contact",
    ),
    ("mood.happy", "Great to see you happy! 😊"),
    ("mood.happyDescription", "Keep up the positive energy!"),
];

/// Initialize i18n with the configured language
pub fn init(lang: Option<&str>) {
    let lang = lang.unwrap_or("en");
    set_language(lang);
}

/// Set the active language. Unsupported codes fall back to English.
pub fn set_language(lang: &str) {
    let lang = if LANGUAGES.contains(&lang) { lang } else { "en" };
    if let Ok(mut current) = CURRENT_LANG.write() {
        *current = lang.to_string();
    }
    info!("🌐 Language set to: {}", lang);

    if lang != "en" {
        load_translations(lang);
    }
}

/// Get the current language
pub fn current_language() -> String {
    CURRENT_LANG
        .read()
        .map(|l| if l.is_empty() { "en".to_string() } else { l.clone() })
        .unwrap_or_else(|_| "en".to_string())
}

/// Translate a key in the active language
pub fn tr(key: &str) -> String {
    tr_in(&current_language(), key)
}

/// Translate a key in a specific language
pub fn tr_in(lang: &str, key: &str) -> String {
    if lang != "en" {
        if let Ok(translations) = TRANSLATIONS.read() {
            if let Some(value) = translations
                .as_ref()
                .and_then(|all| all.get(lang))
                .and_then(|lang_trans| lang_trans.get(key))
            {
                return value.clone();
            }
        }
    }

    english(key).unwrap_or(key).to_string()
}

fn english(key: &str) -> Option<&'static str> {
    ENGLISH.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Load translations from locale directory
fn load_translations(lang: &str) {
    let locale_dirs = [
        dirs::data_local_dir().map(|p| p.join("voiceaid/locale")),
        Some(PathBuf::from("/usr/local/share/voiceaid/locale")),
        Some(PathBuf::from("locale")),
    ];

    for maybe_dir in locale_dirs.iter().flatten() {
        let path = maybe_dir.join(format!("{}.json", lang));
        if let Ok(content) = std::fs::read_to_string(&path) {
            if let Ok(trans) = serde_json::from_str::<HashMap<String, String>>(&content) {
                insert_translations(lang, trans);
                return;
            }
        }
    }

    debug!("No translations found for '{}', using English", lang);
}

/// Register translations for a language (used by locale loading and tests)
pub fn insert_translations(lang: &str, trans: HashMap<String, String>) {
    if let Ok(mut all) = TRANSLATIONS.write() {
        let map = all.get_or_insert_with(HashMap::new);
        debug!("Loaded {} translations for '{}'", trans.len(), lang);
        map.insert(lang.to_string(), trans);
    }
}
