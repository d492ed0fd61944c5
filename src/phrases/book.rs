//! In-memory phrase list backed by a store
//!
//! Every mutation goes to the store first and is applied locally only after
//! it succeeds, so a failed call leaves the list as it was.

use super::{default_phrases, Phrase, PhraseCategory, PhraseStore};
use crate::error::{VoiceAidError, VoiceAidResult};
use crate::i18n::tr;
use crate::notify::{Notice, Notifier};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct PhraseBook {
    store: Arc<dyn PhraseStore>,
    notifier: Arc<dyn Notifier>,
    phrases: Vec<Phrase>,
}

impl PhraseBook {
    /// Defaults only; call [`PhraseBook::load`] to pull stored phrases
    pub fn new(store: Arc<dyn PhraseStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            phrases: default_phrases(),
        }
    }

    /// Create and load in one step
    pub async fn open(
        store: Arc<dyn PhraseStore>,
        notifier: Arc<dyn Notifier>,
    ) -> VoiceAidResult<Self> {
        let mut book = Self::new(store, notifier);
        book.load().await?;
        Ok(book)
    }

    /// Replace custom phrases with the store's contents
    pub async fn load(&mut self) -> VoiceAidResult<()> {
        let stored = self.store.list().await.map_err(|e| self.store_failure(e))?;

        let mut phrases = default_phrases();
        let mut seen: HashSet<String> = phrases.iter().map(|p| p.id.clone()).collect();
        for phrase in stored {
            if !seen.insert(phrase.id.clone()) {
                warn!("⚠️ Skipping phrase with duplicate id '{}'", phrase.id);
                continue;
            }
            phrases.push(Phrase {
                category: PhraseCategory::Custom,
                is_default: false,
                ..phrase
            });
        }

        info!(
            "📚 Loaded {} phrases ({} custom) from {} store",
            phrases.len(),
            phrases.len() - default_phrases().len(),
            self.store.name()
        );
        self.phrases = phrases;
        Ok(())
    }

    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    pub fn by_category(&self, category: PhraseCategory) -> Vec<&Phrase> {
        self.phrases
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Phrase> {
        self.phrases.iter().find(|p| p.id == id)
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    pub async fn add(&mut self, text: &str) -> VoiceAidResult<Phrase> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VoiceAidError::EmptyPhrase);
        }

        let mut phrase = self
            .store
            .create(text)
            .await
            .map_err(|e| self.store_failure(e))?;
        phrase.category = PhraseCategory::Custom;
        phrase.is_default = false;

        if self.get(&phrase.id).is_some() {
            // The row is already saved. Deleting it by id would also remove the
            // phrase it clashes with, so it is left for the next load to skip.
            let err = anyhow::anyhow!(
                "store saved '{}' under existing id '{}'; the store is now inconsistent \
                 and the duplicate will be skipped on load",
                text,
                phrase.id
            );
            return Err(self.store_failure(err));
        }

        self.phrases.push(phrase.clone());
        self.notifier.notify(Notice::info(
            tr("phrases.added"),
            tr("phrases.addedDescription"),
        ));
        Ok(phrase)
    }

    pub async fn edit(&mut self, id: &str, text: &str) -> VoiceAidResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VoiceAidError::EmptyPhrase);
        }
        let phrase = self
            .get(id)
            .ok_or_else(|| VoiceAidError::PhraseNotFound(id.to_string()))?;
        if phrase.is_default {
            self.notifier.notify(Notice::error(
                tr("phrases.cannotEdit"),
                tr("phrases.cannotEditDescription"),
            ));
            return Err(VoiceAidError::EditDefaultPhrase(id.to_string()));
        }

        self.store
            .update(id, text)
            .await
            .map_err(|e| self.store_failure(e))?;

        if let Some(phrase) = self.phrases.iter_mut().find(|p| p.id == id) {
            phrase.text = text.to_string();
        }
        self.notifier.notify(Notice::info(
            tr("phrases.updated"),
            tr("phrases.updatedDescription"),
        ));
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> VoiceAidResult<()> {
        let phrase = self
            .get(id)
            .ok_or_else(|| VoiceAidError::PhraseNotFound(id.to_string()))?;
        if phrase.is_default {
            self.notifier.notify(Notice::error(
                tr("phrases.cannotDelete"),
                tr("phrases.cannotDeleteDescription"),
            ));
            return Err(VoiceAidError::DeleteDefaultPhrase(id.to_string()));
        }

        self.store
            .delete(id)
            .await
            .map_err(|e| self.store_failure(e))?;

        self.phrases.retain(|p| p.id != id);
        self.notifier.notify(Notice::info(
            tr("phrases.deleted"),
            tr("phrases.deletedDescription"),
        ));
        Ok(())
    }

    fn store_failure(&self, err: anyhow::Error) -> VoiceAidError {
        warn!("❌ {} phrase store failed: {}", self.store.name(), err);
        self.notifier
            .notify(Notice::error(tr("phrases.storeError"), err.to_string()));
        VoiceAidError::Store(err.to_string())
    }
}
