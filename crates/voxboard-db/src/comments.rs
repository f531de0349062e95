use std::collections::HashMap;

use anyhow::Result;
use rusqlite::Row;
use voxboard_types::models::{Comment, Reply};

use crate::Database;
use crate::columns::timestamp;

impl Database {
    /// Comments newest first, each with its replies oldest first. `is_liked`
    /// and `is_disliked` reflect `viewer`'s own reaction.
    pub fn list_comments(&self, feedback_id: i64, viewer: i64) -> Result<Vec<Comment>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.feedback_id, c.user_id, c.content, c.likes, c.dislikes,
                        c.created_at, r.is_like
                 FROM comments c
                 LEFT JOIN reactions r ON r.comment_id = c.id AND r.user_id = ?2
                 WHERE c.feedback_id = ?1
                 ORDER BY c.created_at DESC, c.id DESC",
            )?;
            let mut comments = stmt
                .query_map((feedback_id, viewer), map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            // Replies for every comment on this feedback in one query (no N+1)
            let mut stmt = conn.prepare(
                "SELECT cr.id, cr.comment_id, cr.user_id, cr.content, cr.likes, cr.dislikes,
                        cr.created_at, r.is_like
                 FROM comment_replies cr
                 JOIN comments c ON c.id = cr.comment_id
                 LEFT JOIN reactions r ON r.reply_id = cr.id AND r.user_id = ?2
                 WHERE c.feedback_id = ?1
                 ORDER BY cr.created_at ASC, cr.id ASC",
            )?;
            let mut replies: HashMap<i64, Vec<Reply>> = HashMap::new();
            for reply in stmt.query_map((feedback_id, viewer), map_reply)? {
                let reply = reply?;
                replies.entry(reply.comment_id).or_default().push(reply);
            }

            for comment in &mut comments {
                comment.replies = replies.remove(&comment.id).unwrap_or_default();
            }
            Ok(comments)
        })
    }

    pub fn create_comment(&self, feedback_id: i64, user_id: i64, content: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO comments (feedback_id, user_id, content) VALUES (?1, ?2, ?3)",
                (feedback_id, user_id, content),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn create_reply(&self, comment_id: i64, user_id: i64, content: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO comment_replies (comment_id, user_id, content) VALUES (?1, ?2, ?3)",
                (comment_id, user_id, content),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }
}

fn reaction_flags(is_like: Option<bool>) -> (bool, bool) {
    match is_like {
        Some(true) => (true, false),
        Some(false) => (false, true),
        None => (false, false),
    }
}

fn map_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    let (is_liked, is_disliked) = reaction_flags(row.get(7)?);
    Ok(Comment {
        id: row.get(0)?,
        feedback_id: row.get(1)?,
        user_id: row.get(2)?,
        content: row.get(3)?,
        likes: row.get(4)?,
        dislikes: row.get(5)?,
        created_at: timestamp(row, 6)?,
        is_liked,
        is_disliked,
        replies: Vec::new(),
    })
}

fn map_reply(row: &Row<'_>) -> rusqlite::Result<Reply> {
    let (is_liked, is_disliked) = reaction_flags(row.get(7)?);
    Ok(Reply {
        id: row.get(0)?,
        comment_id: row.get(1)?,
        user_id: row.get(2)?,
        content: row.get(3)?,
        likes: row.get(4)?,
        dislikes: row.get(5)?,
        created_at: timestamp(row, 6)?,
        is_liked,
        is_disliked,
    })
}
