//! v001 -- Initial schema creation.
//!
//! Creates `letters` (durable letter documents) and `local_storage` (string
//! key/value pairs, used by the client-side history ledger).

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Letters
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS letters (
    id             TEXT PRIMARY KEY NOT NULL,  -- opaque, store-assigned
    title          TEXT NOT NULL,
    body           TEXT NOT NULL,
    recipient_name TEXT,
    envelope_theme TEXT NOT NULL,
    letter_theme   TEXT NOT NULL,
    music_url      TEXT,
    audio_url      TEXT,
    opened         INTEGER NOT NULL DEFAULT 0, -- boolean 0/1
    created_at     TEXT NOT NULL               -- ISO-8601 / RFC-3339
);

CREATE INDEX IF NOT EXISTS idx_letters_created_at ON letters(created_at);

-- ----------------------------------------------------------------
-- Local storage (key -> serialized value)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS local_storage (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
