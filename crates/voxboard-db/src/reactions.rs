//! Reaction engine: the single toggle state machine behind feedback votes,
//! comment likes and reply likes.
//!
//! Each toggle reads the subject's current reaction, mutates the reaction
//! record and adjusts the target's denormalized counters. All of it runs in
//! one IMMEDIATE transaction, so the write lock is held before the current
//! reaction is read and a failure at any step rolls the whole toggle back.
//! The counters therefore always equal the number of reaction rows of each
//! polarity for the target.

use anyhow::{Result, anyhow};
use rusqlite::{Connection, ErrorCode, TransactionBehavior};
use thiserror::Error;
use tracing::{debug, warn};
use voxboard_types::reaction::{Counters, Polarity, ReactionTarget, ToggleOutcome, Transition, VoteType};

use crate::Database;
use crate::columns::{OptionalExt, parsed};

const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("{} {} not found", .0.kind(), .0.id())]
    TargetNotFound(ReactionTarget),
    #[error("reaction update conflicted with a concurrent request")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// A subject's stored reaction on one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionRecord {
    pub id: i64,
    pub polarity: Polarity,
}

/// Storage operations a toggle is built from. An implementation must run
/// every call of one toggle inside the same transaction.
pub trait ReactionStore {
    /// `None` when the target does not exist.
    fn counters(&self, target: ReactionTarget) -> Result<Option<Counters>>;
    fn get_reaction(&self, target: ReactionTarget, subject_id: i64) -> Result<Option<ReactionRecord>>;
    fn upsert_reaction(&self, target: ReactionTarget, subject_id: i64, polarity: Polarity) -> Result<()>;
    fn delete_reaction(&self, target: ReactionTarget, reaction_id: i64) -> Result<()>;
    fn adjust_counter(&self, target: ReactionTarget, polarity: Polarity, delta: i64) -> Result<()>;
}

/// Apply one toggle step for `subject_id` on `target`.
pub fn toggle<S: ReactionStore + ?Sized>(
    store: &S,
    target: ReactionTarget,
    subject_id: i64,
    requested: Polarity,
) -> Result<ToggleOutcome, ToggleError> {
    if store.counters(target)?.is_none() {
        return Err(ToggleError::TargetNotFound(target));
    }

    let existing = store.get_reaction(target, subject_id)?;
    let previous = existing.map(|r| r.polarity);
    let step = Transition::plan(previous, requested);

    match (step, existing) {
        (Transition::Remove { .. }, Some(record)) => store.delete_reaction(target, record.id)?,
        _ => store.upsert_reaction(target, subject_id, requested)?,
    }
    for (polarity, delta) in step.deltas() {
        store.adjust_counter(target, polarity, delta)?;
    }

    let counters = store
        .counters(target)?
        .ok_or(ToggleError::TargetNotFound(target))?;
    debug!(?target, subject_id, ?step, "Reaction toggled");

    Ok(ToggleOutcome {
        previous,
        current: step.resulting(),
        counters,
    })
}

impl Database {
    /// Toggle `subject_id`'s reaction on `target` atomically. Lock contention
    /// is retried a few times before surfacing as [`ToggleError::Conflict`].
    pub fn toggle_reaction(
        &self,
        target: ReactionTarget,
        subject_id: i64,
        requested: Polarity,
    ) -> Result<ToggleOutcome, ToggleError> {
        let mut attempt = 1;
        loop {
            match self.try_toggle(target, subject_id, requested) {
                Err(ToggleError::Conflict) if attempt < MAX_ATTEMPTS => {
                    warn!(?target, subject_id, attempt, "Reaction toggle conflicted, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn try_toggle(
        &self,
        target: ReactionTarget,
        subject_id: i64,
        requested: Polarity,
    ) -> Result<ToggleOutcome, ToggleError> {
        let mut conn = self.writer()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(classify)?;

        // Dropping `tx` on any early return rolls back.
        let outcome = toggle(&*tx, target, subject_id, requested).map_err(|e| match e {
            ToggleError::Storage(inner) => match inner.downcast::<rusqlite::Error>() {
                Ok(sqlite) => classify(sqlite),
                Err(other) => ToggleError::Storage(other),
            },
            other => other,
        })?;
        tx.commit().map_err(classify)?;
        Ok(outcome)
    }

    /// Count stored reaction records per polarity. Always equal to
    /// [`Database::reaction_counters`] outside a toggle.
    pub fn count_reactions(&self, target: ReactionTarget) -> Result<Counters> {
        self.with_conn(|conn| {
            let (table, fk) = record_table(target);
            let positive = match target {
                ReactionTarget::Feedback(_) => "vote_type = 'upvote'",
                ReactionTarget::Comment(_) | ReactionTarget::Reply(_) => "is_like = 1",
            };
            let sql = format!(
                "SELECT COALESCE(SUM(CASE WHEN {positive} THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN {positive} THEN 0 ELSE 1 END), 0)
                 FROM {table} WHERE {fk} = ?1"
            );
            let counters = conn.query_row(&sql, [target.id()], |row| {
                Ok(Counters {
                    positive: row.get(0)?,
                    negative: row.get(1)?,
                })
            })?;
            Ok(counters)
        })
    }

    pub fn reaction_counters(&self, target: ReactionTarget) -> Result<Option<Counters>> {
        self.with_conn(|conn| conn.counters(target))
    }

    /// Board that owns the target, walking reply -> comment -> feedback.
    pub fn board_for_target(&self, target: ReactionTarget) -> Result<Option<i64>> {
        let sql = match target {
            ReactionTarget::Feedback(_) => "SELECT board_id FROM feedback WHERE id = ?1",
            ReactionTarget::Comment(_) => {
                "SELECT f.board_id FROM comments c
                 JOIN feedback f ON f.id = c.feedback_id
                 WHERE c.id = ?1"
            }
            ReactionTarget::Reply(_) => {
                "SELECT f.board_id FROM comment_replies cr
                 JOIN comments c ON c.id = cr.comment_id
                 JOIN feedback f ON f.id = c.feedback_id
                 WHERE cr.id = ?1"
            }
        };
        self.with_conn(|conn| conn.query_row(sql, [target.id()], |row| row.get(0)).optional())
    }
}

fn classify(err: rusqlite::Error) -> ToggleError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => ToggleError::Conflict,
        _ => ToggleError::Storage(err.into()),
    }
}

/// (counter table, positive column, negative column)
fn counter_table(target: ReactionTarget) -> (&'static str, &'static str, &'static str) {
    match target {
        ReactionTarget::Feedback(_) => ("feedback", "upvotes", "downvotes"),
        ReactionTarget::Comment(_) => ("comments", "likes", "dislikes"),
        ReactionTarget::Reply(_) => ("comment_replies", "likes", "dislikes"),
    }
}

/// (record table, target foreign key)
fn record_table(target: ReactionTarget) -> (&'static str, &'static str) {
    match target {
        ReactionTarget::Feedback(_) => ("votes", "feedback_id"),
        ReactionTarget::Comment(_) => ("reactions", "comment_id"),
        ReactionTarget::Reply(_) => ("reactions", "reply_id"),
    }
}

impl ReactionStore for Connection {
    fn counters(&self, target: ReactionTarget) -> Result<Option<Counters>> {
        let (table, positive, negative) = counter_table(target);
        let sql = format!("SELECT {positive}, {negative} FROM {table} WHERE id = ?1");
        self.query_row(&sql, [target.id()], |row| {
            Ok(Counters {
                positive: row.get(0)?,
                negative: row.get(1)?,
            })
        })
        .optional()
    }

    fn get_reaction(&self, target: ReactionTarget, subject_id: i64) -> Result<Option<ReactionRecord>> {
        let (table, fk) = record_table(target);
        match target {
            ReactionTarget::Feedback(_) => {
                let sql = format!("SELECT id, vote_type FROM {table} WHERE {fk} = ?1 AND user_id = ?2");
                self.query_row(&sql, (target.id(), subject_id), |row| {
                    Ok(ReactionRecord {
                        id: row.get(0)?,
                        polarity: parsed::<VoteType>(row, 1)?.into(),
                    })
                })
                .optional()
            }
            ReactionTarget::Comment(_) | ReactionTarget::Reply(_) => {
                let sql = format!("SELECT id, is_like FROM {table} WHERE {fk} = ?1 AND user_id = ?2");
                self.query_row(&sql, (target.id(), subject_id), |row| {
                    Ok(ReactionRecord {
                        id: row.get(0)?,
                        polarity: Polarity::from_is_like(row.get(1)?),
                    })
                })
                .optional()
            }
        }
    }

    fn upsert_reaction(&self, target: ReactionTarget, subject_id: i64, polarity: Polarity) -> Result<()> {
        let (table, fk) = record_table(target);
        match target {
            ReactionTarget::Feedback(_) => {
                let sql = format!(
                    "INSERT INTO {table} ({fk}, user_id, vote_type) VALUES (?1, ?2, ?3)
                     ON CONFLICT ({fk}, user_id) DO UPDATE SET vote_type = excluded.vote_type"
                );
                let vote = VoteType::from(polarity);
                self.execute(&sql, (target.id(), subject_id, vote.as_str()))?;
            }
            ReactionTarget::Comment(_) | ReactionTarget::Reply(_) => {
                let sql = format!(
                    "INSERT INTO {table} ({fk}, user_id, is_like) VALUES (?1, ?2, ?3)
                     ON CONFLICT ({fk}, user_id) DO UPDATE SET is_like = excluded.is_like"
                );
                self.execute(&sql, (target.id(), subject_id, polarity.is_positive()))?;
            }
        }
        Ok(())
    }

    fn delete_reaction(&self, target: ReactionTarget, reaction_id: i64) -> Result<()> {
        let (table, _) = record_table(target);
        let sql = format!("DELETE FROM {table} WHERE id = ?1");
        let deleted = self.execute(&sql, [reaction_id])?;
        if deleted != 1 {
            return Err(anyhow!("Reaction {} missing from {}", reaction_id, table));
        }
        Ok(())
    }

    fn adjust_counter(&self, target: ReactionTarget, polarity: Polarity, delta: i64) -> Result<()> {
        let (table, positive, negative) = counter_table(target);
        let column = if polarity.is_positive() { positive } else { negative };
        let sql = format!("UPDATE {table} SET {column} = {column} + ?1 WHERE id = ?2");
        let changed = self.execute(&sql, (delta, target.id()))?;
        if changed != 1 {
            return Err(anyhow!("{} {} vanished during toggle", target.kind(), target.id()));
        }
        Ok(())
    }
}
