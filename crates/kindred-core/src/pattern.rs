use serde::{Deserialize, Serialize};

/// Dominant register a user writes in, derived from message history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationStyle {
    Analytical,
    Creative,
    Empathetic,
    Direct,
    Philosophical,
}

impl CommunicationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommunicationStyle::Analytical => "analytical",
            CommunicationStyle::Creative => "creative",
            CommunicationStyle::Empathetic => "empathetic",
            CommunicationStyle::Direct => "direct",
            CommunicationStyle::Philosophical => "philosophical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "analytical" => Some(CommunicationStyle::Analytical),
            "creative" => Some(CommunicationStyle::Creative),
            "empathetic" => Some(CommunicationStyle::Empathetic),
            "direct" => Some(CommunicationStyle::Direct),
            "philosophical" => Some(CommunicationStyle::Philosophical),
            _ => None,
        }
    }
}

/// Typical message length bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseLength {
    Concise,
    Moderate,
    Detailed,
}

impl ResponseLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseLength::Concise => "concise",
            ResponseLength::Moderate => "moderate",
            ResponseLength::Detailed => "detailed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "concise" => Some(ResponseLength::Concise),
            "moderate" => Some(ResponseLength::Moderate),
            "detailed" => Some(ResponseLength::Detailed),
            _ => None,
        }
    }
}

/// Derived conversational profile for one user, latest-wins.
///
/// Recomputed wholesale by the pattern analyzer — there are no partial
/// updates, and every other component treats this as read-only.
///
/// The five trait levels are integers in [0,100]. `interests` is an ordered
/// set of free-text strings matched by exact case-sensitive equality
/// downstream; `conversation_topics` is recency-biased, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationPattern {
    pub user_id: String,
    pub communication_style: CommunicationStyle,
    pub curiosity_level: i64,
    pub topic_depth: i64,
    pub question_asking: i64,
    pub intellectual_curiosity: i64,
    pub emotional_intelligence: i64,
    pub response_length: ResponseLength,
    pub interests: Vec<String>,
    pub conversation_topics: Vec<String>,
    /// Unix seconds of the last recomputation.
    pub last_analyzed: u64,
}

impl ConversationPattern {
    /// Clamp every trait level into [0,100]. Applied at the analyzer
    /// boundary so downstream arithmetic can assume the range.
    pub fn clamp_levels(&mut self) {
        for level in [
            &mut self.curiosity_level,
            &mut self.topic_depth,
            &mut self.question_asking,
            &mut self.intellectual_curiosity,
            &mut self.emotional_intelligence,
        ] {
            *level = (*level).clamp(0, 100);
        }
    }
}
