//! Match and conversation lifecycle state machines.
//!
//! A match starts `pending` and moves exactly once to `accepted`, `declined`,
//! or `expired`. All three are terminal. The storage layer enforces the
//! transitions with scoped conditional updates; these types encode the rules
//! so callers and tests can reason about them without a database.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Accepted => "accepted",
            MatchStatus::Declined => "declined",
            MatchStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(MatchStatus::Pending),
            "accepted" => Some(MatchStatus::Accepted),
            "declined" => Some(MatchStatus::Declined),
            "expired" => Some(MatchStatus::Expired),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, MatchStatus::Pending)
    }

    /// Whether a transition from `self` to `to` is allowed.
    pub fn can_transition(&self, to: MatchStatus) -> bool {
        matches!(self, MatchStatus::Pending) && to != MatchStatus::Pending
    }
}

/// Status of a networking conversation. Starts at `Initiated` when a match
/// is accepted and moves to `Active` on the first real message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Initiated,
    Active,
    Paused,
    Ended,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Initiated => "initiated",
            ConversationStatus::Active => "active",
            ConversationStatus::Paused => "paused",
            ConversationStatus::Ended => "ended",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "initiated" => Some(ConversationStatus::Initiated),
            "active" => Some(ConversationStatus::Active),
            "paused" => Some(ConversationStatus::Paused),
            "ended" => Some(ConversationStatus::Ended),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            MatchStatus::Pending,
            MatchStatus::Accepted,
            MatchStatus::Declined,
            MatchStatus::Expired,
        ] {
            assert_eq!(MatchStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MatchStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_pending_is_only_non_terminal() {
        assert!(!MatchStatus::Pending.is_terminal());
        assert!(MatchStatus::Accepted.is_terminal());
        assert!(MatchStatus::Declined.is_terminal());
        assert!(MatchStatus::Expired.is_terminal());
    }

    #[test]
    fn test_transitions_only_out_of_pending() {
        assert!(MatchStatus::Pending.can_transition(MatchStatus::Accepted));
        assert!(MatchStatus::Pending.can_transition(MatchStatus::Declined));
        assert!(MatchStatus::Pending.can_transition(MatchStatus::Expired));
        assert!(!MatchStatus::Pending.can_transition(MatchStatus::Pending));

        for terminal in [
            MatchStatus::Accepted,
            MatchStatus::Declined,
            MatchStatus::Expired,
        ] {
            for to in [
                MatchStatus::Pending,
                MatchStatus::Accepted,
                MatchStatus::Declined,
                MatchStatus::Expired,
            ] {
                assert!(!terminal.can_transition(to));
            }
        }
    }

    #[test]
    fn test_conversation_status_roundtrip() {
        for status in [
            ConversationStatus::Initiated,
            ConversationStatus::Active,
            ConversationStatus::Paused,
            ConversationStatus::Ended,
        ] {
            assert_eq!(ConversationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ConversationStatus::parse("archived"), None);
    }
}
