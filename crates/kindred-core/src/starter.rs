//! Opening-line templates for accepted matches.
//!
//! The pure half of the starter generator: the CLI layer decides which
//! grounding is available (news headline, shared interest, style only) and
//! these functions render the line. Every path returns a non-empty string.

use rand::Rng;

use crate::pattern::CommunicationStyle;

/// Fixed final fallback when nothing is known about either participant.
pub const DEFAULT_STARTER: &str =
    "Hi! Our conversation styles seemed like a good match — what have you been thinking about lately?";

/// Shared-interest starter grounded in a current headline.
pub fn news_starter(interest: &str, headline: &str) -> String {
    format!(
        "I noticed we're both into {interest} — did you catch \"{headline}\"? Curious what you make of it."
    )
}

/// Shared-interest starter without news grounding.
pub fn interest_starter(interest: &str) -> String {
    format!("I saw we're both interested in {interest} — what drew you to it?")
}

/// Style-matched starter, picked from a small per-style pool.
pub fn style_starter(style: CommunicationStyle, rng: &mut impl Rng) -> String {
    let pool: &[&str] = match style {
        CommunicationStyle::Analytical => &[
            "What's a problem you've been taking apart lately? I'd like to hear how you approach it.",
            "If you had to pick one idea you changed your mind about this year, what would it be?",
        ],
        CommunicationStyle::Creative => &[
            "What's something you've made or imagined recently that you're excited about?",
            "If you could remix any idea from another field into your own, what would it be?",
        ],
        CommunicationStyle::Empathetic => &[
            "What's been on your mind lately? I'm a good listener.",
            "What's a conversation you had recently that stuck with you?",
        ],
        CommunicationStyle::Direct => &[
            "Quick one: what's the most interesting thing you're working on right now?",
            "What should more people be paying attention to?",
        ],
        CommunicationStyle::Philosophical => &[
            "What question have you been sitting with lately?",
            "What's a belief you hold that most people around you don't?",
        ],
    };
    pool[rng.random_range(0..pool.len())].to_string()
}
