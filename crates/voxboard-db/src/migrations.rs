use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                email       TEXT NOT NULL UNIQUE,
                name        TEXT NOT NULL DEFAULT '',
                picture     TEXT NOT NULL DEFAULT '',
                provider    TEXT NOT NULL DEFAULT '',
                role        TEXT NOT NULL DEFAULT 'user'
                            CHECK (role IN ('app_admin', 'stakeholder', 'user')),
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE boards (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE board_members (
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                board_id    INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
                role        TEXT NOT NULL CHECK (role IN ('stakeholder', 'user')),
                PRIMARY KEY (user_id, board_id)
            );

            CREATE INDEX idx_board_members_board ON board_members(board_id);

            CREATE TABLE categories (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL UNIQUE
            );

            CREATE TABLE feedback (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                board_id    INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
                title       TEXT NOT NULL,
                description TEXT NOT NULL,
                category_id INTEGER NOT NULL REFERENCES categories(id),
                upvotes     INTEGER NOT NULL DEFAULT 0 CHECK (upvotes >= 0),
                downvotes   INTEGER NOT NULL DEFAULT 0 CHECK (downvotes >= 0),
                status      TEXT NOT NULL DEFAULT 'pending'
                            CHECK (status IN ('pending', 'reviewing', 'approved', 'declined')),
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_feedback_board ON feedback(board_id);

            CREATE TABLE votes (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                feedback_id INTEGER NOT NULL REFERENCES feedback(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                vote_type   TEXT NOT NULL CHECK (vote_type IN ('upvote', 'downvote')),
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (feedback_id, user_id)
            );

            CREATE TABLE comments (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                feedback_id INTEGER NOT NULL REFERENCES feedback(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                content     TEXT NOT NULL,
                likes       INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
                dislikes    INTEGER NOT NULL DEFAULT 0 CHECK (dislikes >= 0),
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_comments_feedback ON comments(feedback_id, created_at);

            CREATE TABLE comment_replies (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                comment_id  INTEGER NOT NULL REFERENCES comments(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                content     TEXT NOT NULL,
                likes       INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
                dislikes    INTEGER NOT NULL DEFAULT 0 CHECK (dislikes >= 0),
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_replies_comment ON comment_replies(comment_id, created_at);

            -- Exactly one of comment_id / reply_id is set.
            CREATE TABLE reactions (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                comment_id  INTEGER REFERENCES comments(id) ON DELETE CASCADE,
                reply_id    INTEGER REFERENCES comment_replies(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                is_like     INTEGER NOT NULL CHECK (is_like IN (0, 1)),
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                CHECK ((comment_id IS NULL) <> (reply_id IS NULL)),
                UNIQUE (comment_id, user_id),
                UNIQUE (reply_id, user_id)
            );

            INSERT INTO categories (name) VALUES ('Feature'), ('Bug'), ('Improvement');

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
