use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row};
use tracing::info;
use voxboard_types::models::{Feedback, FeedbackStatus};

use crate::Database;
use crate::columns::{OptionalExt, parsed, parsed_opt};

#[derive(Debug, Clone)]
pub struct NewFeedback<'a> {
    pub board_id: i64,
    pub title: &'a str,
    pub description: &'a str,
    pub category_id: i64,
}

const FEEDBACK_COLUMNS: &str =
    "f.id, f.board_id, f.title, f.description, f.category_id, f.upvotes, f.downvotes, f.status";

impl Database {
    /// Feedback on a board, each annotated with `viewer`'s own vote.
    pub fn list_feedback(&self, board_id: i64, viewer: Option<i64>) -> Result<Vec<Feedback>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {FEEDBACK_COLUMNS}, v.vote_type
                 FROM feedback f
                 LEFT JOIN votes v ON v.feedback_id = f.id AND v.user_id = ?2
                 WHERE f.board_id = ?1
                 ORDER BY f.id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map((board_id, viewer), |row| {
                    Ok(Feedback {
                        my_vote: parsed_opt(row, 8)?,
                        ..map_feedback(row)?
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// New feedback always starts pending with zero votes.
    pub fn create_feedback(&self, new: &NewFeedback<'_>) -> Result<Feedback> {
        let feedback = self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO feedback (board_id, title, description, category_id, upvotes, downvotes, status)
                 VALUES (?1, ?2, ?3, ?4, 0, 0, 'pending')",
                (new.board_id, new.title, new.description, new.category_id),
            )?;
            let id = tx.last_insert_rowid();
            query_feedback(tx, id)?.ok_or_else(|| anyhow!("Feedback {} vanished after insert", id))
        })?;
        info!("Feedback {} created on board {}", feedback.id, feedback.board_id);
        Ok(feedback)
    }

    /// Returns false when the feedback does not exist.
    pub fn update_feedback_status(&self, id: i64, status: FeedbackStatus) -> Result<bool> {
        let changed = self.with_conn_mut(|conn| {
            Ok(conn.execute(
                "UPDATE feedback SET status = ?1 WHERE id = ?2",
                (status.as_str(), id),
            )?)
        })?;
        if changed == 1 {
            info!("Feedback {} moved to {}", id, status.as_str());
        }
        Ok(changed == 1)
    }
}

fn query_feedback(conn: &Connection, id: i64) -> Result<Option<Feedback>> {
    let sql = format!("SELECT {FEEDBACK_COLUMNS} FROM feedback f WHERE f.id = ?1");
    conn.query_row(&sql, [id], map_feedback).optional()
}

fn map_feedback(row: &Row<'_>) -> rusqlite::Result<Feedback> {
    Ok(Feedback {
        id: row.get(0)?,
        board_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category_id: row.get(4)?,
        upvotes: row.get(5)?,
        downvotes: row.get(6)?,
        status: parsed(row, 7)?,
        my_vote: None,
    })
}
