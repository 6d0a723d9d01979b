use std::env;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use kindred_core::{
    Compatibility, CommunicationStyle, ConversationPattern, ConversationStatus, MatchStatus,
    ResponseLength,
};

use crate::error::{Result, StoreError};
use crate::schema;

/// Default base directory for kindred storage.
pub fn default_base_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".kindred")
}

/// Normalized unordered-pair key: `min|max` of the two user ids.
/// Backs the active-pair uniqueness index.
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}|{b}")
    } else {
        format!("{b}|{a}")
    }
}

/// Per-user matching preferences. `min_score` may be stricter than the
/// fixed candidate cutoff, never looser in effect.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub user_id: String,
    pub enabled: bool,
    pub daily_cap: i64,
    pub min_score: i64,
    pub blocked: Vec<String>,
}

/// Persisted match row wrapping a compatibility verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub id: Uuid,
    pub user_id_1: String,
    pub user_id_2: String,
    pub score: i64,
    pub shared_interests: Vec<String>,
    pub match_reason: String,
    pub conversation_potential: i64,
    pub status: MatchStatus,
    pub created_at: u64,
    pub expires_at: u64,
}

/// Conversation row created when a match is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationRecord {
    pub id: Uuid,
    pub match_id: Uuid,
    pub user_id_1: String,
    pub user_id_2: String,
    pub starter: String,
    pub status: ConversationStatus,
    pub created_at: u64,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        tracing::debug!("opened store at {}", path.display());
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Conversation patterns (analyzer owns writes) ---

    /// Wholesale upsert keyed by user id — no partial updates by design.
    pub fn upsert_pattern(&self, p: &ConversationPattern) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO conversation_patterns
             (user_id, communication_style, curiosity_level, topic_depth,
              question_asking, intellectual_curiosity, emotional_intelligence,
              response_length, interests, conversation_topics, last_analyzed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                p.user_id,
                p.communication_style.as_str(),
                p.curiosity_level,
                p.topic_depth,
                p.question_asking,
                p.intellectual_curiosity,
                p.emotional_intelligence,
                p.response_length.as_str(),
                encode_list(&p.interests),
                encode_list(&p.conversation_topics),
                p.last_analyzed,
            ],
        )?;
        Ok(())
    }

    pub fn get_pattern(&self, user_id: &str) -> Result<Option<ConversationPattern>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, communication_style, curiosity_level, topic_depth,
                    question_asking, intellectual_curiosity, emotional_intelligence,
                    response_length, interests, conversation_topics, last_analyzed
             FROM conversation_patterns WHERE user_id = ?1",
        )?;
        let row = stmt
            .query_row([user_id], pattern_columns)
            .optional()?;
        row.map(pattern_from_columns).transpose()
    }

    /// Every other user's stored pattern, in insertion order. The candidate
    /// enumeration order matters: equal scores are not re-sorted downstream.
    pub fn patterns_except(&self, user_id: &str) -> Result<Vec<ConversationPattern>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, communication_style, curiosity_level, topic_depth,
                    question_asking, intellectual_curiosity, emotional_intelligence,
                    response_length, interests, conversation_topics, last_analyzed
             FROM conversation_patterns WHERE user_id != ?1 ORDER BY rowid",
        )?;
        let rows: Vec<PatternColumns> = stmt
            .query_map([user_id], pattern_columns)?
            .collect::<std::result::Result<_, _>>()?;
        rows.into_iter().map(pattern_from_columns).collect()
    }

    // --- Messages (analyzer input) ---

    pub fn record_message(&self, user_id: &str, body: &str, created_at: u64) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO messages (id, user_id, body, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id.to_string(), user_id, body, created_at],
        )?;
        Ok(id)
    }

    /// Bounded recent-message sample: newest `limit` bodies since `since`,
    /// returned in chronological order.
    pub fn recent_messages(&self, user_id: &str, since: u64, limit: usize) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT body FROM messages
             WHERE user_id = ?1 AND created_at >= ?2
             ORDER BY created_at DESC LIMIT ?3",
        )?;
        let mut bodies: Vec<String> = stmt
            .query_map(params![user_id, since, limit as i64], |row| row.get(0))?
            .collect::<std::result::Result<_, _>>()?;
        bodies.reverse();
        Ok(bodies)
    }

    // --- Preferences ---

    pub fn preferences(&self, user_id: &str) -> Result<Option<Preferences>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, enabled, daily_cap, min_score, blocked
             FROM networking_preferences WHERE user_id = ?1",
        )?;
        let row = stmt
            .query_row([user_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)? != 0,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .optional()?;

        row.map(|(user_id, enabled, daily_cap, min_score, blocked)| {
            Ok(Preferences {
                user_id,
                enabled,
                daily_cap,
                min_score,
                blocked: decode_list(&blocked)?,
            })
        })
        .transpose()
    }

    pub fn set_preferences(&self, prefs: &Preferences) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO networking_preferences
             (user_id, enabled, daily_cap, min_score, blocked)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                prefs.user_id,
                prefs.enabled as i64,
                prefs.daily_cap,
                prefs.min_score,
                encode_list(&prefs.blocked),
            ],
        )?;
        Ok(())
    }

    // --- Matches ---

    /// Persist a new pending match from a compatibility verdict.
    /// `expires_at` is stamped here, at the storage layer.
    /// Returns [`StoreError::DuplicateMatch`] when the active-pair index
    /// rejects the insert.
    pub fn create_match(&self, compat: &Compatibility, now: u64) -> Result<MatchRecord> {
        let record = MatchRecord {
            id: Uuid::new_v4(),
            user_id_1: compat.user_id_1.clone(),
            user_id_2: compat.user_id_2.clone(),
            score: compat.score,
            shared_interests: compat.shared_interests.clone(),
            match_reason: compat.match_reason.clone(),
            conversation_potential: compat.conversation_potential,
            status: MatchStatus::Pending,
            created_at: now,
            expires_at: now + schema::MATCH_TTL_SECS,
        };

        let inserted = self.conn.execute(
            "INSERT INTO user_matches
             (id, user_id_1, user_id_2, pair_key, score, shared_interests,
              match_reason, conversation_potential, status, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.id.to_string(),
                record.user_id_1,
                record.user_id_2,
                pair_key(&record.user_id_1, &record.user_id_2),
                record.score,
                encode_list(&record.shared_interests),
                record.match_reason,
                record.conversation_potential,
                record.status.as_str(),
                record.created_at,
                record.expires_at,
            ],
        );

        match inserted {
            Ok(_) => Ok(record),
            Err(e) if StoreError::is_constraint(&e) => Err(StoreError::DuplicateMatch),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_match(&self, match_id: Uuid) -> Result<Option<MatchRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id_1, user_id_2, score, shared_interests, match_reason,
                    conversation_potential, status, created_at, expires_at
             FROM user_matches WHERE id = ?1",
        )?;
        let row = stmt
            .query_row([match_id.to_string()], match_columns)
            .optional()?;
        row.map(match_from_columns).transpose()
    }

    /// Matches created by this user since `since` — the daily-quota counter
    /// when called with the UTC day start. Counts all statuses: a declined
    /// match still consumed quota.
    pub fn matches_created_since(&self, user_id: &str, since: u64) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM user_matches WHERE user_id_1 = ?1 AND created_at >= ?2",
            params![user_id, since],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Every user this one has ever been matched with, in either direction,
    /// regardless of status. Prior pairs are never re-proposed.
    pub fn matched_partner_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT CASE WHEN user_id_1 = ?1 THEN user_id_2 ELSE user_id_1 END
             FROM user_matches WHERE user_id_1 = ?1 OR user_id_2 = ?1",
        )?;
        let partners = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(partners)
    }

    /// Authorization-by-query-scope transition helper: flips a pending
    /// match to `to` only when `user_id` is one of the two participants.
    /// Zero rows updated means "not found, not a participant, or already
    /// resolved" — callers handle all three identically.
    pub fn update_status_if_participant(
        &self,
        match_id: Uuid,
        user_id: &str,
        to: MatchStatus,
    ) -> Result<bool> {
        debug_assert!(MatchStatus::Pending.can_transition(to));
        let rows = self.conn.execute(
            "UPDATE user_matches SET status = ?1
             WHERE id = ?2 AND status = 'pending'
               AND (user_id_1 = ?3 OR user_id_2 = ?3)",
            params![to.as_str(), match_id.to_string(), user_id],
        )?;
        Ok(rows > 0)
    }

    /// Sweep pending matches past their deadline into `expired`.
    pub fn expire_overdue(&self, now: u64) -> Result<usize> {
        let rows = self.conn.execute(
            "UPDATE user_matches SET status = 'expired'
             WHERE status = 'pending' AND expires_at <= ?1",
            [now],
        )?;
        Ok(rows)
    }

    // --- Conversations ---

    pub fn create_conversation(
        &self,
        match_id: Uuid,
        user_id_1: &str,
        user_id_2: &str,
        starter: &str,
        now: u64,
    ) -> Result<ConversationRecord> {
        let record = ConversationRecord {
            id: Uuid::new_v4(),
            match_id,
            user_id_1: user_id_1.to_string(),
            user_id_2: user_id_2.to_string(),
            starter: starter.to_string(),
            status: ConversationStatus::Initiated,
            created_at: now,
        };
        self.conn.execute(
            "INSERT INTO networking_conversations
             (id, match_id, user_id_1, user_id_2, starter, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id.to_string(),
                record.match_id.to_string(),
                record.user_id_1,
                record.user_id_2,
                record.starter,
                record.status.as_str(),
                record.created_at,
            ],
        )?;
        Ok(record)
    }

    pub fn get_conversation(&self, conversation_id: Uuid) -> Result<Option<ConversationRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, match_id, user_id_1, user_id_2, starter, status, created_at
             FROM networking_conversations WHERE id = ?1",
        )?;
        let row = stmt
            .query_row([conversation_id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, u64>(6)?,
                ))
            })
            .optional()?;

        row.map(|(id, match_id, user_id_1, user_id_2, starter, status, created_at)| {
            Ok(ConversationRecord {
                id: parse_uuid(&id)?,
                match_id: parse_uuid(&match_id)?,
                user_id_1,
                user_id_2,
                starter,
                status: ConversationStatus::parse(&status).ok_or_else(|| {
                    StoreError::InvalidData(format!("unknown conversation status '{status}'"))
                })?,
                created_at,
            })
        })
        .transpose()
    }

    pub fn append_conversation_message(
        &self,
        conversation_id: Uuid,
        sender_id: &str,
        body: &str,
        now: u64,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO networking_messages (id, conversation_id, sender_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id.to_string(),
                conversation_id.to_string(),
                sender_id,
                body,
                now
            ],
        )?;
        Ok(id)
    }

    /// Move an initiated conversation to active — first real message only.
    pub fn activate_conversation(&self, conversation_id: Uuid) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE networking_conversations SET status = 'active'
             WHERE id = ?1 AND status = 'initiated'",
            [conversation_id.to_string()],
        )?;
        Ok(rows > 0)
    }

    // --- Activity log ---

    /// Append-only audit trail. Callers treat failures as non-fatal.
    pub fn log_activity(&self, user_id: &str, event: &str, detail: &str, now: u64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO networking_activity (user_id, event, detail, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, event, detail, now],
        )?;
        Ok(())
    }

    pub fn activity_count(&self, user_id: &str, event: &str) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM networking_activity WHERE user_id = ?1 AND event = ?2",
            params![user_id, event],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

// --- Row mapping helpers ---

type PatternColumns = (
    String,
    String,
    i64,
    i64,
    i64,
    i64,
    i64,
    String,
    String,
    String,
    u64,
);

fn pattern_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatternColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
    ))
}

fn pattern_from_columns(cols: PatternColumns) -> Result<ConversationPattern> {
    let (
        user_id,
        style,
        curiosity_level,
        topic_depth,
        question_asking,
        intellectual_curiosity,
        emotional_intelligence,
        length,
        interests,
        topics,
        last_analyzed,
    ) = cols;

    Ok(ConversationPattern {
        user_id,
        communication_style: CommunicationStyle::parse(&style)
            .ok_or_else(|| StoreError::InvalidData(format!("unknown style '{style}'")))?,
        curiosity_level,
        topic_depth,
        question_asking,
        intellectual_curiosity,
        emotional_intelligence,
        response_length: ResponseLength::parse(&length)
            .ok_or_else(|| StoreError::InvalidData(format!("unknown response length '{length}'")))?,
        interests: decode_list(&interests)?,
        conversation_topics: decode_list(&topics)?,
        last_analyzed,
    })
}

type MatchColumns = (
    String,
    String,
    String,
    i64,
    String,
    String,
    i64,
    String,
    u64,
    u64,
);

fn match_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<MatchColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

fn match_from_columns(cols: MatchColumns) -> Result<MatchRecord> {
    let (
        id,
        user_id_1,
        user_id_2,
        score,
        shared_interests,
        match_reason,
        conversation_potential,
        status,
        created_at,
        expires_at,
    ) = cols;

    Ok(MatchRecord {
        id: parse_uuid(&id)?,
        user_id_1,
        user_id_2,
        score,
        shared_interests: decode_list(&shared_interests)?,
        match_reason,
        conversation_potential,
        status: MatchStatus::parse(&status)
            .ok_or_else(|| StoreError::InvalidData(format!("unknown match status '{status}'")))?,
        created_at,
        expires_at,
    })
}

fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn decode_list(json: &str) -> Result<Vec<String>> {
    serde_json::from_str(json)
        .map_err(|e| StoreError::InvalidData(format!("bad JSON list '{json}': {e}")))
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| StoreError::InvalidData(format!("invalid UUID '{s}': {e}")))
}
