use serde::{Deserialize, Serialize};

use crate::pattern::{CommunicationStyle, ConversationPattern};

/// Points added per exactly-matching interest string.
pub const SHARED_INTEREST_POINTS: i64 = 15;

/// Match reason used when no scoring signal produced a reason string.
pub const GENERAL_COMPATIBILITY: &str = "General compatibility";

/// Compatibility verdict between a "self" pattern and a candidate pattern.
///
/// The score itself is symmetric; `user_id_1`/`user_id_2` only record which
/// side was "self" when the pair was evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compatibility {
    pub user_id_1: String,
    pub user_id_2: String,
    /// Clamped to [0,100].
    pub score: i64,
    /// Exact-string intersection of the two interest lists, in
    /// `user_id_1`'s interest order.
    pub shared_interests: Vec<String>,
    /// Human-readable reasons, in signal evaluation order.
    pub complementary_traits: Vec<String>,
    /// Pre-clamp score — kept separately because clamping is lossy.
    pub conversation_potential: i64,
    pub match_reason: String,
}

/// Hand-authored style affinity table.
///
/// Transcribed literally, one arm per ordered pair — the table happens to
/// read as symmetric but is not symmetric by construction, so no arm is
/// derived from its mirror.
pub fn style_affinity(a: CommunicationStyle, b: CommunicationStyle) -> i64 {
    use CommunicationStyle::*;
    match (a, b) {
        (Analytical, Analytical) => 15,
        (Analytical, Philosophical) => 20,
        (Analytical, Creative) => 10,
        (Analytical, Empathetic) => 8,
        (Analytical, Direct) => 12,

        (Philosophical, Philosophical) => 15,
        (Philosophical, Analytical) => 20,
        (Philosophical, Creative) => 18,
        (Philosophical, Empathetic) => 15,
        (Philosophical, Direct) => 5,

        (Creative, Creative) => 15,
        (Creative, Philosophical) => 18,
        (Creative, Empathetic) => 20,
        (Creative, Analytical) => 10,
        (Creative, Direct) => 8,

        (Empathetic, Empathetic) => 15,
        (Empathetic, Creative) => 20,
        (Empathetic, Philosophical) => 15,
        (Empathetic, Analytical) => 8,
        (Empathetic, Direct) => 10,

        (Direct, Direct) => 15,
        (Direct, Analytical) => 12,
        (Direct, Empathetic) => 10,
        (Direct, Creative) => 8,
        (Direct, Philosophical) => 5,
    }
}

/// Score two patterns against each other. Pure and deterministic.
///
/// Signals are evaluated in a fixed order so the reason list is
/// reproducible:
/// 1. shared interests (+15 each, one listing reason when non-empty)
/// 2. style affinity table (reason when the value exceeds 10)
/// 3. curiosity proximity, `max(0, 20 - gap)` (reason when gap < 15)
/// 4. intellectual-curiosity proximity, `max(0, 15 - gap)`
/// 5. topic-depth proximity, `max(0, 10 - gap)`
///
/// Interest matching is exact case-sensitive string equality with no
/// normalization. Broadening it would inflate scores the fixed point
/// budget was not tuned for.
pub fn compute_compatibility(
    me: &ConversationPattern,
    candidate: &ConversationPattern,
) -> Compatibility {
    let mut score: i64 = 0;
    let mut reasons: Vec<String> = Vec::new();

    let shared: Vec<String> = me
        .interests
        .iter()
        .filter(|interest| candidate.interests.contains(interest))
        .cloned()
        .collect();
    score += shared.len() as i64 * SHARED_INTEREST_POINTS;
    if !shared.is_empty() {
        reasons.push(format!("Shared interests: {}", shared.join(", ")));
    }

    let style = style_affinity(me.communication_style, candidate.communication_style);
    score += style;
    if style > 10 {
        reasons.push("Compatible communication styles".to_string());
    }

    let curiosity_gap = (me.curiosity_level - candidate.curiosity_level).abs();
    score += (20 - curiosity_gap).max(0);
    if curiosity_gap < 15 {
        reasons.push("Similar curiosity levels".to_string());
    }

    let intellectual_gap = (me.intellectual_curiosity - candidate.intellectual_curiosity).abs();
    score += (15 - intellectual_gap).max(0);

    let depth_gap = (me.topic_depth - candidate.topic_depth).abs();
    score += (10 - depth_gap).max(0);

    let match_reason = if reasons.is_empty() {
        GENERAL_COMPATIBILITY.to_string()
    } else {
        reasons.join("; ")
    };

    Compatibility {
        user_id_1: me.user_id.clone(),
        user_id_2: candidate.user_id.clone(),
        score: score.min(100),
        shared_interests: shared,
        complementary_traits: reasons,
        conversation_potential: score,
        match_reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::ResponseLength;
    use proptest::prelude::*;

    fn pattern(
        user_id: &str,
        style: CommunicationStyle,
        curiosity: i64,
        depth: i64,
        intellectual: i64,
        interests: &[&str],
    ) -> ConversationPattern {
        ConversationPattern {
            user_id: user_id.to_string(),
            communication_style: style,
            curiosity_level: curiosity,
            topic_depth: depth,
            question_asking: 50,
            intellectual_curiosity: intellectual,
            emotional_intelligence: 50,
            response_length: ResponseLength::Moderate,
            interests: interests.iter().map(|s| s.to_string()).collect(),
            conversation_topics: vec![],
            last_analyzed: 0,
        }
    }

    #[test]
    fn test_worked_scenario() {
        // analytical {ai, chess} vs philosophical {chess, art}:
        // chess +15, style +20 (reason), curiosity gap 2 -> +18,
        // intellectual gap 3 -> +12, depth gap 5 -> +5 = raw 70
        let me = pattern(
            "alice",
            CommunicationStyle::Analytical,
            80,
            70,
            85,
            &["ai", "chess"],
        );
        let other = pattern(
            "bob",
            CommunicationStyle::Philosophical,
            82,
            75,
            88,
            &["chess", "art"],
        );

        let c = compute_compatibility(&me, &other);
        assert_eq!(c.score, 70);
        assert_eq!(c.conversation_potential, 70);
        assert_eq!(c.shared_interests, vec!["chess".to_string()]);

        // Reason order follows signal evaluation order
        let chess_pos = c.match_reason.find("chess").unwrap();
        let style_pos = c
            .match_reason
            .find("Compatible communication styles")
            .unwrap();
        assert!(chess_pos < style_pos, "reason: {}", c.match_reason);
        assert_eq!(c.user_id_1, "alice");
        assert_eq!(c.user_id_2, "bob");
    }

    #[test]
    fn test_identical_patterns_score_sixty() {
        // Self-pair style 15, curiosity +20, intellectual +15, depth +10 = 60.
        // Sits exactly on the > 60 candidate cutoff, so identical twins with
        // no shared interests are excluded from matching.
        let a = pattern("a", CommunicationStyle::Analytical, 50, 50, 50, &[]);
        let b = pattern("b", CommunicationStyle::Analytical, 50, 50, 50, &[]);

        let c = compute_compatibility(&a, &b);
        assert_eq!(c.conversation_potential, 60);
        assert_eq!(c.score, 60);
    }

    #[test]
    fn test_general_compatibility_default() {
        // Far apart in every dimension with a low-affinity style pair:
        // no signal fires a reason.
        let a = pattern("a", CommunicationStyle::Direct, 0, 0, 0, &["rust"]);
        let b = pattern(
            "b",
            CommunicationStyle::Philosophical,
            100,
            100,
            100,
            &["sailing"],
        );

        let c = compute_compatibility(&a, &b);
        assert!(c.complementary_traits.is_empty());
        assert_eq!(c.match_reason, GENERAL_COMPATIBILITY);
        // direct->philosophical is 5, every proximity term floors at 0
        assert_eq!(c.conversation_potential, 5);
    }

    #[test]
    fn test_score_clamped_at_hundred() {
        let a = pattern(
            "a",
            CommunicationStyle::Philosophical,
            80,
            80,
            80,
            &["ai", "chess", "art", "music"],
        );
        let b = pattern(
            "b",
            CommunicationStyle::Analytical,
            80,
            80,
            80,
            &["ai", "chess", "art", "music"],
        );

        let c = compute_compatibility(&a, &b);
        // 4 * 15 + 20 + 20 + 15 + 10 = 125 raw
        assert_eq!(c.conversation_potential, 125);
        assert_eq!(c.score, 100);
    }

    #[test]
    fn test_interest_match_is_case_sensitive() {
        let a = pattern("a", CommunicationStyle::Direct, 50, 50, 50, &["Chess"]);
        let b = pattern("b", CommunicationStyle::Direct, 50, 50, 50, &["chess"]);

        let c = compute_compatibility(&a, &b);
        assert!(c.shared_interests.is_empty());
    }

    #[test]
    fn test_style_reason_requires_strictly_above_ten() {
        // creative->analytical is exactly 10: no style reason
        let a = pattern("a", CommunicationStyle::Creative, 0, 0, 0, &[]);
        let b = pattern("b", CommunicationStyle::Analytical, 100, 100, 100, &[]);

        let c = compute_compatibility(&a, &b);
        assert!(
            !c.complementary_traits
                .iter()
                .any(|r| r.contains("Compatible communication styles"))
        );
    }

    #[test]
    fn test_curiosity_reason_boundary() {
        // Gap of exactly 15: +5 points but no reason (strict < 15)
        let a = pattern("a", CommunicationStyle::Direct, 50, 0, 0, &[]);
        let b = pattern("b", CommunicationStyle::Philosophical, 65, 100, 100, &[]);

        let c = compute_compatibility(&a, &b);
        assert!(
            !c.complementary_traits
                .iter()
                .any(|r| r.contains("Similar curiosity"))
        );

        // Gap of 14: reason fires
        let b2 = pattern("b", CommunicationStyle::Philosophical, 64, 100, 100, &[]);
        let c2 = compute_compatibility(&a, &b2);
        assert!(
            c2.complementary_traits
                .iter()
                .any(|r| r.contains("Similar curiosity"))
        );
    }

    #[test]
    fn test_style_table_literal_values() {
        use CommunicationStyle::*;
        let expected: &[(CommunicationStyle, CommunicationStyle, i64)] = &[
            (Analytical, Analytical, 15),
            (Analytical, Philosophical, 20),
            (Analytical, Creative, 10),
            (Analytical, Empathetic, 8),
            (Analytical, Direct, 12),
            (Philosophical, Philosophical, 15),
            (Philosophical, Analytical, 20),
            (Philosophical, Creative, 18),
            (Philosophical, Empathetic, 15),
            (Philosophical, Direct, 5),
            (Creative, Creative, 15),
            (Creative, Philosophical, 18),
            (Creative, Empathetic, 20),
            (Creative, Analytical, 10),
            (Creative, Direct, 8),
            (Empathetic, Empathetic, 15),
            (Empathetic, Creative, 20),
            (Empathetic, Philosophical, 15),
            (Empathetic, Analytical, 8),
            (Empathetic, Direct, 10),
            (Direct, Direct, 15),
            (Direct, Analytical, 12),
            (Direct, Empathetic, 10),
            (Direct, Creative, 8),
            (Direct, Philosophical, 5),
        ];
        assert_eq!(expected.len(), 25);
        for (a, b, value) in expected {
            assert_eq!(
                style_affinity(*a, *b),
                *value,
                "{} -> {}",
                a.as_str(),
                b.as_str()
            );
        }
    }

    fn arb_style() -> impl Strategy<Value = CommunicationStyle> {
        prop_oneof![
            Just(CommunicationStyle::Analytical),
            Just(CommunicationStyle::Creative),
            Just(CommunicationStyle::Empathetic),
            Just(CommunicationStyle::Direct),
            Just(CommunicationStyle::Philosophical),
        ]
    }

    fn arb_pattern(user_id: &'static str) -> impl Strategy<Value = ConversationPattern> {
        (
            arb_style(),
            0i64..=100,
            0i64..=100,
            0i64..=100,
            proptest::collection::vec("[a-z]{1,8}", 0..6),
        )
            .prop_map(
                move |(style, curiosity, depth, intellectual, interests)| ConversationPattern {
                    user_id: user_id.to_string(),
                    communication_style: style,
                    curiosity_level: curiosity,
                    topic_depth: depth,
                    question_asking: 50,
                    intellectual_curiosity: intellectual,
                    emotional_intelligence: 50,
                    response_length: ResponseLength::Moderate,
                    interests,
                    conversation_topics: vec![],
                    last_analyzed: 0,
                },
            )
    }

    proptest! {
        #[test]
        fn prop_score_bounded(a in arb_pattern("a"), b in arb_pattern("b")) {
            let c = compute_compatibility(&a, &b);
            prop_assert!((0..=100).contains(&c.score));
            prop_assert!(c.conversation_potential >= c.score);
        }

        #[test]
        fn prop_score_symmetric(a in arb_pattern("a"), b in arb_pattern("b")) {
            // The given table instance is symmetric in practice, and every
            // other signal is an absolute difference, so the numeric score
            // commutes even though the table is not symmetric by contract.
            let ab = compute_compatibility(&a, &b);
            let ba = compute_compatibility(&b, &a);
            prop_assert_eq!(ab.conversation_potential, ba.conversation_potential);
        }

        #[test]
        fn prop_reason_never_empty_string(a in arb_pattern("a"), b in arb_pattern("b")) {
            let c = compute_compatibility(&a, &b);
            prop_assert!(!c.match_reason.is_empty());
            if c.complementary_traits.is_empty() {
                prop_assert_eq!(c.match_reason.as_str(), GENERAL_COMPATIBILITY);
            }
        }
    }
}
