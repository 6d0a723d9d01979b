//! Conversation pattern analysis.
//!
//! Samples a user's recent messages, asks the text generator to profile
//! them as strict JSON, validates the result, and persists it wholesale.
//! Any failure along the way leaves the previous stored pattern untouched.

use serde::Deserialize;

use kindred_core::{
    CommunicationStyle, ConversationPattern, ResponseLength, now_unix_secs,
};
use kindred_store::Store;

use crate::llm::TextGenerator;

/// Only messages from the last 30 days inform a profile.
pub const ANALYSIS_WINDOW_SECS: u64 = 30 * 86_400;

/// Newest messages sampled per analysis run.
pub const SAMPLE_LIMIT: usize = 100;

/// Raw shape the model is asked to emit. Levels arrive unclamped and
/// string fields unvalidated; `to_pattern` does the checking.
#[derive(Deserialize)]
struct RawProfile {
    communication_style: String,
    curiosity_level: i64,
    topic_depth: i64,
    question_asking: i64,
    intellectual_curiosity: i64,
    emotional_intelligence: i64,
    response_length: String,
    #[serde(default)]
    interests: Vec<String>,
    #[serde(default)]
    conversation_topics: Vec<String>,
}

impl RawProfile {
    fn to_pattern(&self, user_id: &str, now: u64) -> Option<ConversationPattern> {
        let communication_style = CommunicationStyle::parse(&self.communication_style)?;
        let response_length = ResponseLength::parse(&self.response_length)?;

        let mut pattern = ConversationPattern {
            user_id: user_id.to_string(),
            communication_style,
            curiosity_level: self.curiosity_level,
            topic_depth: self.topic_depth,
            question_asking: self.question_asking,
            intellectual_curiosity: self.intellectual_curiosity,
            emotional_intelligence: self.emotional_intelligence,
            response_length,
            interests: self.interests.clone(),
            conversation_topics: self.conversation_topics.clone(),
            last_analyzed: now,
        };
        pattern.clamp_levels();
        Some(pattern)
    }
}

fn analysis_prompt(messages: &[String]) -> String {
    let mut prompt = String::from(
        "Profile the author of the following chat messages. Respond with ONLY a \
         JSON object, no prose, with exactly these fields:\n\
         communication_style: one of \"analytical\", \"creative\", \"empathetic\", \
         \"direct\", \"philosophical\"\n\
         curiosity_level, topic_depth, question_asking, intellectual_curiosity, \
         emotional_intelligence: integers 0-100\n\
         response_length: one of \"concise\", \"moderate\", \"detailed\"\n\
         interests: array of short lowercase strings\n\
         conversation_topics: array of short lowercase strings\n\nMessages:\n",
    );
    for m in messages {
        prompt.push_str("- ");
        prompt.push_str(m);
        prompt.push('\n');
    }
    prompt
}

pub struct PatternAnalyzer<'a> {
    store: &'a Store,
    generator: &'a dyn TextGenerator,
}

impl<'a> PatternAnalyzer<'a> {
    pub fn new(store: &'a Store, generator: &'a dyn TextGenerator) -> Self {
        PatternAnalyzer { store, generator }
    }

    /// Analyze `user_id` and persist the resulting pattern. Returns the
    /// stored pattern, or `None` when there is nothing to analyze or the
    /// profile came back unusable.
    pub async fn analyze(&self, user_id: &str) -> Option<ConversationPattern> {
        let now = now_unix_secs();
        self.analyze_at(user_id, now).await
    }

    pub async fn analyze_at(&self, user_id: &str, now: u64) -> Option<ConversationPattern> {
        let since = now.saturating_sub(ANALYSIS_WINDOW_SECS);
        let messages = match self.store.recent_messages(user_id, since, SAMPLE_LIMIT) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("failed to load messages for {user_id}: {e}");
                return None;
            }
        };
        if messages.is_empty() {
            tracing::debug!("no recent messages for {user_id}, skipping analysis");
            return None;
        }

        let reply = self.generator.generate(&analysis_prompt(&messages)).await?;
        let pattern = match parse_profile(&reply, user_id, now) {
            Some(p) => p,
            None => {
                tracing::warn!("unusable profile for {user_id}, keeping previous pattern");
                return None;
            }
        };

        if let Err(e) = self.store.upsert_pattern(&pattern) {
            tracing::warn!("failed to store pattern for {user_id}: {e}");
            return None;
        }
        tracing::info!(
            "analyzed {user_id}: {} / {} interests",
            pattern.communication_style.as_str(),
            pattern.interests.len()
        );
        Some(pattern)
    }
}

/// Strict parse: the reply must be a bare JSON object matching
/// [`RawProfile`] with recognized enum strings. No markdown stripping,
/// no case folding.
fn parse_profile(reply: &str, user_id: &str, now: u64) -> Option<ConversationPattern> {
    let raw: RawProfile = serde_json::from_str(reply.trim()).ok()?;
    raw.to_pattern(user_id, now)
}
