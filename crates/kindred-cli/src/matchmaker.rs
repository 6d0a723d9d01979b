//! Match discovery and lifecycle.
//!
//! Discovery is opt-in: a user with no preferences row, or with matching
//! disabled, never gets new matches. Every discovery run starts by sweeping
//! overdue pending matches so stale candidates cannot be accepted later in
//! the same run.

use kindred_core::{rank_candidates, utc_day_start};
use kindred_store::{ConversationRecord, MatchRecord, Result, Store, StoreError};

use crate::starter_gen::StarterGenerator;

pub struct Matchmaker<'a> {
    store: &'a Store,
}

impl<'a> Matchmaker<'a> {
    pub fn new(store: &'a Store) -> Self {
        Matchmaker { store }
    }

    /// Discover and persist new pending matches for `user_id`.
    ///
    /// Candidates are ranked by compatibility, then filtered against prior
    /// partners, the user's block list, and their minimum score. At most
    /// the remaining daily quota is created; a concurrent duplicate is
    /// skipped, not an error.
    pub fn find_new_matches(&self, user_id: &str, now: u64) -> Result<Vec<MatchRecord>> {
        let Some(prefs) = self.store.preferences(user_id)? else {
            tracing::debug!("{user_id} has no preferences, matching disabled");
            return Ok(Vec::new());
        };
        if !prefs.enabled {
            tracing::debug!("{user_id} has matching disabled");
            return Ok(Vec::new());
        }

        let swept = self.store.expire_overdue(now)?;
        if swept > 0 {
            tracing::info!("expired {swept} overdue pending matches");
        }

        let created_today = self
            .store
            .matches_created_since(user_id, utc_day_start(now))?;
        let remaining = prefs.daily_cap - created_today;
        if remaining <= 0 {
            tracing::debug!("{user_id} reached daily match cap ({})", prefs.daily_cap);
            return Ok(Vec::new());
        }

        let Some(pattern) = self.store.get_pattern(user_id)? else {
            tracing::debug!("{user_id} has no conversation pattern yet");
            return Ok(Vec::new());
        };
        let others = self.store.patterns_except(user_id)?;
        let prior_partners = self.store.matched_partner_ids(user_id)?;

        let candidates = rank_candidates(&pattern, &others)
            .into_iter()
            .filter(|c| !prior_partners.contains(&c.user_id_2))
            .filter(|c| !prefs.blocked.contains(&c.user_id_2))
            .filter(|c| c.score >= prefs.min_score)
            .take(remaining as usize);

        let mut created = Vec::new();
        for compat in candidates {
            match self.store.create_match(&compat, now) {
                Ok(record) => {
                    if let Err(e) = self.store.log_activity(
                        user_id,
                        "match_found",
                        &format!("{} (score {})", record.user_id_2, record.score),
                        now,
                    ) {
                        tracing::warn!("activity log write failed: {e}");
                    }
                    created.push(record);
                }
                Err(StoreError::DuplicateMatch) => {
                    tracing::debug!("active match already exists with {}", compat.user_id_2);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!("created {} new matches for {user_id}", created.len());
        Ok(created)
    }

    /// Accept a pending match as `user_id` and open a conversation seeded
    /// with a generated starter. Returns `None` when the match is missing,
    /// already resolved, expired, or `user_id` is not a participant.
    pub async fn accept_match(
        &self,
        user_id: &str,
        match_id: uuid::Uuid,
        starters: &mut StarterGenerator<'_>,
        now: u64,
    ) -> Result<Option<ConversationRecord>> {
        self.store.expire_overdue(now)?;

        if !self.store.update_status_if_participant(
            match_id,
            user_id,
            kindred_core::MatchStatus::Accepted,
        )? {
            return Ok(None);
        }
        let Some(record) = self.store.get_match(match_id)? else {
            return Ok(None);
        };

        // Starter is written from the initiator's side, styled for the
        // candidate it addresses.
        let partner_style = self
            .store
            .get_pattern(&record.user_id_2)?
            .map(|p| p.communication_style);
        let starter = starters
            .starter_for(&record.shared_interests, partner_style, now)
            .await;

        let conversation = match self.store.create_conversation(
            match_id,
            &record.user_id_1,
            &record.user_id_2,
            &starter,
            now,
        ) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("match {match_id} accepted but conversation failed: {e}");
                return Ok(None);
            }
        };

        if let Err(e) =
            self.store
                .append_conversation_message(conversation.id, &record.user_id_1, &starter, now)
        {
            tracing::warn!("failed to record starter message: {e}");
        }
        if let Err(e) = self
            .store
            .log_activity(user_id, "match_accepted", &record.user_id_2, now)
        {
            tracing::warn!("activity log write failed: {e}");
        }

        Ok(Some(conversation))
    }

    /// Decline a pending match as `user_id`. Returns whether a transition
    /// actually happened.
    pub fn decline_match(&self, user_id: &str, match_id: uuid::Uuid, now: u64) -> Result<bool> {
        self.store.expire_overdue(now)?;

        let declined = self.store.update_status_if_participant(
            match_id,
            user_id,
            kindred_core::MatchStatus::Declined,
        )?;
        if declined
            && let Err(e) = self
                .store
                .log_activity(user_id, "match_declined", "", now)
        {
            tracing::warn!("activity log write failed: {e}");
        }
        Ok(declined)
    }
}
