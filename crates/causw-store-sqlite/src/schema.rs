//! SQL schema for the CAUSW SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id    TEXT PRIMARY KEY,
    email      TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL,
    role       TEXT NOT NULL,    -- 'NONE' | 'STUDENT' | ... | 'ADMIN'
    state      TEXT NOT NULL,    -- 'AWAIT' | 'ACTIVE' | ...
    circle_id  TEXT
);

CREATE TABLE IF NOT EXISTS boards (
    board_id     TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    description  TEXT,
    category     TEXT NOT NULL,
    create_roles TEXT NOT NULL DEFAULT '[]',   -- JSON array of role names
    is_home      INTEGER NOT NULL DEFAULT 0,
    is_deleted   INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    post_id     TEXT PRIMARY KEY,
    board_id    TEXT NOT NULL REFERENCES boards(board_id),
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    writer_id   TEXT NOT NULL,
    writer_name TEXT NOT NULL,
    is_deleted  INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id TEXT PRIMARY KEY,
    post_id    TEXT NOT NULL REFERENCES posts(post_id),
    writer_id  TEXT NOT NULL,
    content    TEXT NOT NULL,
    is_deleted INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS favorite_boards (
    favorite_board_id TEXT PRIMARY KEY,
    user_id           TEXT NOT NULL REFERENCES users(user_id),
    board_id          TEXT NOT NULL REFERENCES boards(board_id),
    created_at        TEXT NOT NULL,
    UNIQUE (user_id, board_id)
);

CREATE TABLE IF NOT EXISTS lockers (
    locker_id     TEXT PRIMARY KEY,
    locker_number INTEGER NOT NULL,
    location      TEXT NOT NULL,
    is_active     INTEGER NOT NULL DEFAULT 1,
    user_id       TEXT REFERENCES users(user_id),
    expired_at    TEXT,             -- local due date, no offset
    UNIQUE (location, locker_number)
);

-- At most one locker per user.
CREATE UNIQUE INDEX IF NOT EXISTS lockers_holder_idx
    ON lockers(user_id) WHERE user_id IS NOT NULL;

-- Locker logs are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS locker_logs (
    log_id        TEXT PRIMARY KEY,
    locker_number INTEGER NOT NULL,
    location_name TEXT NOT NULL,
    user_id       TEXT NOT NULL,
    user_email    TEXT NOT NULL,
    action        TEXT NOT NULL,    -- 'REGISTER' | 'RETURN' | 'ACTIVATE' | 'DEACTIVATE'
    message       TEXT NOT NULL DEFAULT '',
    created_at    TEXT NOT NULL     -- RFC 3339 UTC, fixed width
);

CREATE TABLE IF NOT EXISTS flags (
    key   TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS text_fields (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS posts_board_idx       ON posts(board_id, created_at);
CREATE INDEX IF NOT EXISTS comments_post_idx     ON comments(post_id);
CREATE INDEX IF NOT EXISTS locker_logs_user_idx  ON locker_logs(user_id, action, created_at);
CREATE INDEX IF NOT EXISTS locker_logs_place_idx ON locker_logs(location_name, locker_number);

PRAGMA user_version = 1;
";
