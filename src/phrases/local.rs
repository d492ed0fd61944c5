//! Local phrase store: a JSON array of custom phrases on disk

use super::{new_phrase_id, Phrase, PhraseStore};
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct LocalPhraseStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl LocalPhraseStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Vec<Phrase>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Vec<Phrase>>(&content) {
            Ok(phrases) => Ok(phrases.into_iter().filter(|p| !p.is_default).collect()),
            Err(e) => {
                warn!("⚠️ Phrase file corrupted, starting empty: {}", e);
                let backup_path = self.path.with_extension("json.corrupt");
                let _ = tokio::fs::rename(&self.path, &backup_path).await;
                Ok(Vec::new())
            }
        }
    }

    async fn write(&self, phrases: &[Phrase]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(phrases)?;
        // Write to a sibling and rename so a crash never leaves half a file
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        debug!("Saved {} phrases to {}", phrases.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl PhraseStore for LocalPhraseStore {
    async fn list(&self) -> Result<Vec<Phrase>> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn create(&self, text: &str) -> Result<Phrase> {
        let _guard = self.lock.lock().await;
        let mut phrases = self.read().await?;

        let mut id = new_phrase_id();
        while phrases.iter().any(|p| p.id == id) {
            id = new_phrase_id();
        }

        let phrase = Phrase::custom(id, text);
        phrases.push(phrase.clone());
        self.write(&phrases).await?;
        Ok(phrase)
    }

    async fn update(&self, id: &str, text: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut phrases = self.read().await?;
        let phrase = phrases
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| anyhow::anyhow!("No stored phrase with id {}", id))?;
        phrase.text = text.to_string();
        self.write(&phrases).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut phrases = self.read().await?;
        let before = phrases.len();
        phrases.retain(|p| p.id != id);
        if phrases.len() == before {
            anyhow::bail!("No stored phrase with id {}", id);
        }
        self.write(&phrases).await
    }

    fn name(&self) -> &str {
        "local"
    }
}
