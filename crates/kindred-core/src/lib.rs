//! Conversation-compatibility scoring engine.
//!
//! Turns two users' derived conversational profiles into a bounded [0,100]
//! compatibility score with reproducible reason strings, ranks candidate
//! partners, and models the match/conversation lifecycle state machines.
//!
//! Zero I/O — pure logic with no opinions about transport or persistence.

pub mod candidates;
pub mod compatibility;
pub mod lifecycle;
pub mod pattern;
pub mod starter;
pub mod time;

pub use candidates::{CANDIDATE_CUTOFF, rank_candidates};
pub use compatibility::{
    Compatibility, GENERAL_COMPATIBILITY, SHARED_INTEREST_POINTS, compute_compatibility,
    style_affinity,
};
pub use lifecycle::{ConversationStatus, MatchStatus};
pub use pattern::{CommunicationStyle, ConversationPattern, ResponseLength};
pub use starter::{DEFAULT_STARTER, interest_starter, news_starter, style_starter};
pub use time::{now_unix_secs, unix_to_iso8601, utc_day_start};
