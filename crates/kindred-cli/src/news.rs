//! Topical headline lookup for conversation starters.
//!
//! Same best-effort contract as text generation: any failure yields
//! `None` and the starter generator moves on to the next fallback.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Headline {
    pub title: String,
    #[serde(default)]
    pub url: String,
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Most relevant current headline for `topic`, if any.
    async fn top_headline(&self, topic: &str) -> Option<Headline>;
}

#[derive(Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<Headline>,
}

pub struct HttpNewsSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpNewsSource {
    pub fn from_config(config: &Config) -> Option<Self> {
        let base_url = config.news_url.clone()?;
        Some(HttpNewsSource {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            base_url,
            api_key: config.news_key.clone(),
        })
    }
}

#[async_trait]
impl NewsSource for HttpNewsSource {
    async fn top_headline(&self, topic: &str) -> Option<Headline> {
        let mut request = self
            .client
            .get(&self.base_url)
            .query(&[("q", topic), ("pageSize", "1")]);
        if let Some(key) = &self.api_key {
            request = request.header("X-Api-Key", key);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("news request for '{topic}' failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("news lookup for '{topic}' returned {}", response.status());
            return None;
        }

        let body: NewsResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("news response not parseable: {e}");
                return None;
            }
        };

        body.articles
            .into_iter()
            .find(|h| !h.title.trim().is_empty())
    }
}
