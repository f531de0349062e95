use std::collections::BTreeMap;

use anyhow::Result;
use rusqlite::{Connection, Row};
use tracing::info;
use voxboard_types::models::{Board, BoardMember};
use voxboard_types::roles::BoardRole;

use crate::Database;
use crate::columns::{OptionalExt, parsed};

impl Database {
    // -- Boards --

    pub fn list_all_boards(&self) -> Result<Vec<Board>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM boards ORDER BY id")?;
            let rows = stmt
                .query_map([], map_board)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Boards the user holds a membership on.
    pub fn list_boards_for_user(&self, user_id: i64) -> Result<Vec<Board>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT b.id, b.name
                 FROM boards b
                 JOIN board_members bm ON bm.board_id = b.id
                 WHERE bm.user_id = ?1
                 ORDER BY b.id",
            )?;
            let rows = stmt
                .query_map([user_id], map_board)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_board(&self, id: i64) -> Result<Option<Board>> {
        self.with_conn(|conn| query_board(conn, id))
    }

    /// Insert the board and grant its creator a stakeholder membership in
    /// the same transaction.
    pub fn create_board(&self, name: &str, creator_id: i64) -> Result<Board> {
        let board = self.with_tx(|tx| {
            tx.execute("INSERT INTO boards (name) VALUES (?1)", [name])?;
            let id = tx.last_insert_rowid();
            upsert_member(tx, id, creator_id, BoardRole::Stakeholder)?;
            Ok(Board {
                id,
                name: name.to_string(),
            })
        })?;
        info!("Board {} '{}' created by user {}", board.id, board.name, creator_id);
        Ok(board)
    }

    /// Returns false when the board does not exist.
    pub fn rename_board(&self, id: i64, name: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("UPDATE boards SET name = ?1 WHERE id = ?2", (name, id))?;
            Ok(changed == 1)
        })
    }

    // -- Memberships --

    pub fn board_role(&self, user_id: i64, board_id: i64) -> Result<Option<BoardRole>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT role FROM board_members WHERE user_id = ?1 AND board_id = ?2",
                (user_id, board_id),
                |row| parsed(row, 0),
            )
            .optional()
        })
    }

    pub fn board_roles_for_user(&self, user_id: i64) -> Result<BTreeMap<i64, BoardRole>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT board_id, role FROM board_members WHERE user_id = ?1")?;
            let roles = stmt
                .query_map([user_id], |row| {
                    Ok((row.get::<_, i64>(0)?, parsed::<BoardRole>(row, 1)?))
                })?
                .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;
            Ok(roles)
        })
    }

    /// Add or re-role a member; a second add for the same pair replaces the role.
    pub fn add_board_member(&self, board_id: i64, user_id: i64, role: BoardRole) -> Result<()> {
        self.with_conn_mut(|conn| upsert_member(conn, board_id, user_id, role))?;
        info!("User {} is now {} on board {}", user_id, role.as_str(), board_id);
        Ok(())
    }

    /// Returns false when there was no such membership.
    pub fn remove_board_member(&self, board_id: i64, user_id: i64) -> Result<bool> {
        let removed = self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "DELETE FROM board_members WHERE user_id = ?1 AND board_id = ?2",
                (user_id, board_id),
            )?;
            Ok(changed == 1)
        })?;
        if removed {
            info!("User {} removed from board {}", user_id, board_id);
        }
        Ok(removed)
    }

    pub fn list_board_members(&self, board_id: i64) -> Result<Vec<BoardMember>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.email, u.name, u.role, bm.role
                 FROM users u
                 JOIN board_members bm ON bm.user_id = u.id
                 WHERE bm.board_id = ?1
                 ORDER BY u.id",
            )?;
            let rows = stmt
                .query_map([board_id], |row| {
                    Ok(BoardMember {
                        user_id: row.get(0)?,
                        email: row.get(1)?,
                        name: row.get(2)?,
                        global_role: parsed(row, 3)?,
                        board_role: parsed(row, 4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn upsert_member(conn: &Connection, board_id: i64, user_id: i64, role: BoardRole) -> Result<()> {
    conn.execute(
        "INSERT INTO board_members (user_id, board_id, role) VALUES (?1, ?2, ?3)
         ON CONFLICT (user_id, board_id) DO UPDATE SET role = excluded.role",
        (user_id, board_id, role.as_str()),
    )?;
    Ok(())
}

fn query_board(conn: &Connection, id: i64) -> Result<Option<Board>> {
    conn.query_row("SELECT id, name FROM boards WHERE id = ?1", [id], map_board)
        .optional()
}

fn map_board(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}
