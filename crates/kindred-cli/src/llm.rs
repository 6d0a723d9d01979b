//! Text generation over an OpenAI-compatible chat completions API.
//!
//! Every call site treats generation as best-effort: a `None` means the
//! caller uses its template fallback. Network problems are logged, never
//! surfaced as errors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::config::Config;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a short completion for `prompt`, or `None` if the
    /// backend is unavailable or returns garbage.
    async fn generate(&self, prompt: &str) -> Option<String>;
}

pub struct HttpTextGenerator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpTextGenerator {
    /// `None` when no LLM endpoint is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let base_url = config.llm_url.clone()?;
        Some(HttpTextGenerator {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url,
            api_key: config.llm_key.clone(),
            model: config.llm_model.clone(),
        })
    }

    fn extract_text(body: &Value) -> Option<String> {
        let text = body
            .get("choices")?
            .get(0)?
            .get("message")?
            .get("content")?
            .as_str()?
            .trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str) -> Option<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let payload = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": 300,
            "temperature": 0.7,
        });

        let mut request = self.client.post(&url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("text generation request failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("text generation returned {}", response.status());
            return None;
        }

        let body: Value = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("text generation response not JSON: {e}");
                return None;
            }
        };

        Self::extract_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_happy_path() {
        let body = json!({
            "choices": [{"message": {"content": "  Hello there.  "}}]
        });
        assert_eq!(
            HttpTextGenerator::extract_text(&body),
            Some("Hello there.".to_string())
        );
    }

    #[test]
    fn test_extract_text_rejects_empty_and_malformed() {
        assert_eq!(
            HttpTextGenerator::extract_text(&json!({
                "choices": [{"message": {"content": "   "}}]
            })),
            None
        );
        assert_eq!(HttpTextGenerator::extract_text(&json!({})), None);
        assert_eq!(
            HttpTextGenerator::extract_text(&json!({"choices": []})),
            None
        );
    }

    #[test]
    fn test_from_config_requires_url() {
        let config = Config {
            data_dir: std::path::PathBuf::from("/tmp"),
            llm_url: None,
            llm_key: Some("key".to_string()),
            llm_model: "m".to_string(),
            news_url: None,
            news_key: None,
        };
        assert!(HttpTextGenerator::from_config(&config).is_none());
    }
}
