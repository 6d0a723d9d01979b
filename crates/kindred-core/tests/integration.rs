//! Integration tests exercising the full scoring pipeline:
//! patterns → compatibility → candidate ranking → starter rendering.

use kindred_core::{
    CANDIDATE_CUTOFF, CommunicationStyle, Compatibility, ConversationPattern, ResponseLength,
    compute_compatibility, interest_starter, news_starter, rank_candidates, style_starter,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

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

/// Score a pool of candidates, rank them, and render a starter for the top
/// result — the same chain the lifecycle manager drives.
#[test]
fn score_rank_starter_pipeline() {
    let me = pattern(
        "me",
        CommunicationStyle::Analytical,
        80,
        70,
        85,
        &["ai", "chess"],
    );
    let pool = vec![
        // Strong: shared interest + top style affinity
        pattern(
            "kindred-spirit",
            CommunicationStyle::Philosophical,
            82,
            75,
            88,
            &["chess", "art"],
        ),
        // Weak: distant traits, clashing style, nothing shared
        pattern("stranger", CommunicationStyle::Direct, 5, 5, 5, &["sailing"]),
        // Exactly at the cutoff: identical traits, nothing shared
        pattern("twin", CommunicationStyle::Analytical, 80, 70, 85, &[]),
    ];

    let ranked = rank_candidates(&me, &pool);
    assert_eq!(ranked.len(), 1, "only the strong candidate clears > 60");
    let top: &Compatibility = &ranked[0];
    assert_eq!(top.user_id_2, "kindred-spirit");
    assert_eq!(top.score, 70);
    assert_eq!(top.shared_interests, vec!["chess".to_string()]);

    // Starter preference order: news-grounded, then plain interest, then style
    let with_news = news_starter(&top.shared_interests[0], "Engine defeats reigning champion");
    assert!(with_news.contains("chess"));

    let plain = interest_starter(&top.shared_interests[0]);
    assert!(plain.contains("chess"));

    let mut rng = SmallRng::seed_from_u64(42);
    let styled = style_starter(me.communication_style, &mut rng);
    assert!(!styled.is_empty());
}

/// Every ordered pair of styles, at identical traits and no shared
/// interests, lands in [score_floor, 100] and respects the cutoff contract.
#[test]
fn all_style_pairs_bounded() {
    let styles = [
        CommunicationStyle::Analytical,
        CommunicationStyle::Creative,
        CommunicationStyle::Empathetic,
        CommunicationStyle::Direct,
        CommunicationStyle::Philosophical,
    ];

    for a in styles {
        for b in styles {
            let me = pattern("a", a, 50, 50, 50, &[]);
            let other = pattern("b", b, 50, 50, 50, &[]);
            let c = compute_compatibility(&me, &other);
            assert!((0..=100).contains(&c.score));
            // Identical traits contribute 45; the table adds 5..=20
            assert!(
                (50..=65).contains(&c.conversation_potential),
                "{} -> {}: {}",
                a.as_str(),
                b.as_str(),
                c.conversation_potential
            );
            // Only the 18/20-affinity pairs clear the strict cutoff here
            assert_eq!(
                c.score > CANDIDATE_CUTOFF,
                kindred_core::style_affinity(a, b) > 15
            );
        }
    }
}
