use std::env;
use std::path::PathBuf;

use kindred_store::default_base_dir;

/// Runtime configuration, read once from the environment at startup.
/// Missing LLM or news settings disable those collaborators; the
/// starter generator falls back to templates.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub llm_url: Option<String>,
    pub llm_key: Option<String>,
    pub llm_model: String,
    pub news_url: Option<String>,
    pub news_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = env::var("KINDRED_DATA_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(default_base_dir);

        Config {
            data_dir,
            llm_url: non_empty(env::var("KINDRED_LLM_URL").ok()),
            llm_key: non_empty(env::var("KINDRED_LLM_KEY").ok()),
            llm_model: env::var("KINDRED_LLM_MODEL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            news_url: non_empty(env::var("KINDRED_NEWS_URL").ok()),
            news_key: non_empty(env::var("KINDRED_NEWS_KEY").ok()),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("kindred.db")
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}
