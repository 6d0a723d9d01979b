use crate::compatibility::{Compatibility, compute_compatibility};
use crate::pattern::ConversationPattern;

/// Fixed inclusion cutoff for match candidates. Strict: a score of exactly
/// 60 (identical twins with no shared interests) is excluded.
pub const CANDIDATE_CUTOFF: i64 = 60;

/// Score `me` against every other pattern and rank the viable candidates.
///
/// Keeps only scores strictly above [`CANDIDATE_CUTOFF`], sorted descending.
/// The sort is stable, so equal scores keep the enumeration order of
/// `others` — there is deliberately no secondary sort key.
pub fn rank_candidates(
    me: &ConversationPattern,
    others: &[ConversationPattern],
) -> Vec<Compatibility> {
    let mut ranked: Vec<Compatibility> = others
        .iter()
        .filter(|p| p.user_id != me.user_id)
        .map(|p| compute_compatibility(me, p))
        .filter(|c| c.score > CANDIDATE_CUTOFF)
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}
