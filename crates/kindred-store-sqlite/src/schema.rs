//! SQL schema for the Kindred SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS profiles (
    user_id               TEXT PRIMARY KEY,
    display_name          TEXT NOT NULL,
    interests             TEXT NOT NULL DEFAULT '[]',  -- JSON array
    connection_preference TEXT NOT NULL,  -- 'workout' | 'meal' | 'cowork' | 'chat'
    availability          TEXT NOT NULL,  -- 'mornings' | 'lunchtime' | 'afternoons' | 'evenings'
    voice_intro           TEXT,
    created_at            TEXT NOT NULL,  -- ISO 8601 UTC; server-assigned
    updated_at            TEXT NOT NULL
);

-- The swipe ledger. Append-only in normal flow: no UPDATE is ever issued,
-- and DELETE only through the administrative per-user reset.
-- The primary key enforces at most one decision per ordered pair.
CREATE TABLE IF NOT EXISTS swipe_decisions (
    swiper_id  TEXT NOT NULL,
    target_id  TEXT NOT NULL,
    liked      INTEGER NOT NULL,  -- 0 | 1
    decided_at TEXT NOT NULL,
    PRIMARY KEY (swiper_id, target_id),
    CHECK (swiper_id != target_id)
);

-- Derived, monotonic view over the ledger: one row per mutual like.
-- Ids are stored in canonical order so the primary key dedupes the
-- unordered pair. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS matches (
    match_id   TEXT NOT NULL UNIQUE,
    user_a_id  TEXT NOT NULL,
    user_b_id  TEXT NOT NULL,
    matched_at TEXT NOT NULL,
    PRIMARY KEY (user_a_id, user_b_id),
    CHECK (user_a_id < user_b_id)
);

CREATE INDEX IF NOT EXISTS swipes_target_idx  ON swipe_decisions(target_id);
CREATE INDEX IF NOT EXISTS matches_user_b_idx ON matches(user_b_id);

PRAGMA user_version = 1;
";
