//! Remote phrase store: an authenticated REST table (`quick_phrases`)
//!
//! Rows are scoped to the signed-in user. The backend owns authentication;
//! this side only forwards the configured API key and bearer token.

use super::{Phrase, PhraseCategory, PhraseStore};
use crate::config::Config;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const TABLE: &str = "quick_phrases";

#[derive(Debug, Deserialize)]
struct PhraseRow {
    id: serde_json::Value,
    text: String,
    #[serde(default)]
    category: Option<PhraseCategory>,
}

impl From<PhraseRow> for Phrase {
    fn from(row: PhraseRow) -> Self {
        let id = match row.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Phrase {
            id,
            text: row.text,
            category: row.category.unwrap_or(PhraseCategory::Custom),
            is_default: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewPhraseRow<'a> {
    user_id: &'a str,
    text: &'a str,
    category: PhraseCategory,
}

#[derive(Debug)]
pub struct RemotePhraseStore {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: String,
    user_id: String,
    max_retries: u32,
}

impl RemotePhraseStore {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.remote_url.trim_end_matches('/').to_string(),
            api_key: config.remote_api_key.clone(),
            access_token: config.access_token.clone(),
            user_id: config.user_id.clone(),
            max_retries: 3,
        }
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.access_token)
            .timeout(Duration::from_secs(10))
    }

    /// Send with retry on connection failures, then check the status
    async fn send<F>(&self, what: &str, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        for attempt in 0..self.max_retries {
            match build().send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if !status.is_success() {
                        let body = resp.text().await.unwrap_or_default();
                        anyhow::bail!("{} failed ({}): {}", what, status, body);
                    }
                    return Ok(resp);
                }
                Err(e) if attempt + 1 < self.max_retries && (e.is_connect() || e.is_timeout()) => {
                    warn!(
                        "⚠️ Phrase store retry {}/{} for {}: {}",
                        attempt + 1,
                        self.max_retries,
                        what,
                        e
                    );
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Err(e) => {
                    if e.is_connect() {
                        return Err(anyhow::anyhow!(
                            "Could not reach phrase store at {}",
                            self.base_url
                        ));
                    }
                    return Err(e.into());
                }
            }
        }

        anyhow::bail!("{} failed after {} retries", what, self.max_retries)
    }
}

#[async_trait]
impl PhraseStore for RemotePhraseStore {
    async fn list(&self) -> Result<Vec<Phrase>> {
        let url = self.table_url();
        let resp = self
            .send("list phrases", || {
                self.authorized(self.client.get(&url)).query(&[
                    ("select", "id,text,category".to_string()),
                    ("user_id", format!("eq.{}", self.user_id)),
                    ("order", "created_at.asc".to_string()),
                ])
            })
            .await?;
        let rows: Vec<PhraseRow> = resp.json().await?;
        debug!("☁️ Fetched {} phrases", rows.len());
        Ok(rows.into_iter().map(Phrase::from).collect())
    }

    async fn create(&self, text: &str) -> Result<Phrase> {
        let url = self.table_url();
        let row = NewPhraseRow {
            user_id: &self.user_id,
            text,
            category: PhraseCategory::Custom,
        };
        let resp = self
            .send("create phrase", || {
                self.authorized(self.client.post(&url))
                    .header("Prefer", "return=representation")
                    .json(&row)
            })
            .await?;
        let mut rows: Vec<PhraseRow> = resp.json().await?;
        let row = rows
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Phrase store returned no row"))?;
        Ok(row.into())
    }

    async fn update(&self, id: &str, text: &str) -> Result<()> {
        let url = self.table_url();
        self.send("update phrase", || {
            self.authorized(self.client.patch(&url))
                .query(&[("id", format!("eq.{}", id))])
                .json(&serde_json::json!({ "text": text }))
        })
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = self.table_url();
        self.send("delete phrase", || {
            self.authorized(self.client.delete(&url))
                .query(&[("id", format!("eq.{}", id))])
        })
        .await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "remote"
    }
}
