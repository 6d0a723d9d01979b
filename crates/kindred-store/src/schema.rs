use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 1;

/// Pending matches expire a week after creation. Stamped by the storage
/// layer at insert time, swept by `Store::expire_overdue`.
pub const MATCH_TTL_SECS: u64 = 7 * 86_400;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS conversation_patterns (
            user_id                TEXT PRIMARY KEY,
            communication_style    TEXT NOT NULL,
            curiosity_level        INTEGER NOT NULL,
            topic_depth            INTEGER NOT NULL,
            question_asking        INTEGER NOT NULL,
            intellectual_curiosity INTEGER NOT NULL,
            emotional_intelligence INTEGER NOT NULL,
            response_length        TEXT NOT NULL,
            interests              TEXT NOT NULL DEFAULT '[]',
            conversation_topics    TEXT NOT NULL DEFAULT '[]',
            last_analyzed          INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS messages (
            id         TEXT PRIMARY KEY,
            user_id    TEXT NOT NULL,
            body       TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_matches (
            id                     TEXT PRIMARY KEY,
            user_id_1              TEXT NOT NULL,
            user_id_2              TEXT NOT NULL,
            pair_key               TEXT NOT NULL,
            score                  INTEGER NOT NULL,
            shared_interests       TEXT NOT NULL DEFAULT '[]',
            match_reason           TEXT NOT NULL DEFAULT '',
            conversation_potential INTEGER NOT NULL,
            status                 TEXT NOT NULL DEFAULT 'pending',
            created_at             INTEGER NOT NULL,
            expires_at             INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS networking_preferences (
            user_id   TEXT PRIMARY KEY,
            enabled   INTEGER NOT NULL DEFAULT 0,
            daily_cap INTEGER NOT NULL DEFAULT 3,
            min_score INTEGER NOT NULL DEFAULT 60,
            blocked   TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS networking_conversations (
            id         TEXT PRIMARY KEY,
            match_id   TEXT NOT NULL REFERENCES user_matches(id),
            user_id_1  TEXT NOT NULL,
            user_id_2  TEXT NOT NULL,
            starter    TEXT NOT NULL,
            status     TEXT NOT NULL DEFAULT 'initiated',
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS networking_messages (
            id              TEXT PRIMARY KEY,
            conversation_id TEXT NOT NULL REFERENCES networking_conversations(id),
            sender_id       TEXT NOT NULL,
            body            TEXT NOT NULL,
            created_at      INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS networking_activity (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    TEXT NOT NULL,
            event      TEXT NOT NULL,
            detail     TEXT NOT NULL DEFAULT '',
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_user_time ON messages(user_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_matches_user1 ON user_matches(user_id_1);
        CREATE INDEX IF NOT EXISTS idx_matches_user2 ON user_matches(user_id_2);
        CREATE INDEX IF NOT EXISTS idx_matches_created ON user_matches(user_id_1, created_at);
        CREATE INDEX IF NOT EXISTS idx_activity_user ON networking_activity(user_id);
        CREATE INDEX IF NOT EXISTS idx_conv_messages ON networking_messages(conversation_id);

        -- At most one active match per unordered user pair. The matchmaker's
        -- read-then-write dedup check cannot see a peer's concurrent insert;
        -- this index can.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_match_active_pair
            ON user_matches(pair_key)
            WHERE status IN ('pending', 'accepted');
        ",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT value FROM metadata WHERE key = 'schema_version'")?;
    let version = stmt
        .query_row([], |row| {
            let v: String = row.get(0)?;
            Ok(v.parse::<i64>().unwrap_or(0))
        })
        .ok();
    Ok(version)
}
