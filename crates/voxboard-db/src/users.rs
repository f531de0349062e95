use anyhow::Result;
use rusqlite::{Connection, Row};
use tracing::info;
use voxboard_types::models::User;
use voxboard_types::roles::GlobalRole;

use crate::Database;
use crate::columns::{OptionalExt, parsed, timestamp};

/// Profile data asserted by the identity provider on login.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub picture: &'a str,
    pub provider: &'a str,
    pub role: GlobalRole,
}

const USER_COLUMNS: &str = "id, email, name, picture, provider, role, created_at";

impl Database {
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", &id))
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "email = ?1", &email))
    }

    pub fn create_user(&self, new: &NewUser<'_>) -> Result<User> {
        self.with_tx(|tx| insert_user(tx, new))
    }

    /// Look up the user by email, creating it on first login. An existing
    /// user keeps its global role; name and picture follow the provider.
    pub fn find_or_create_user(&self, new: &NewUser<'_>) -> Result<User> {
        self.with_tx(|tx| {
            match query_user(tx, "email = ?1", &new.email)? {
                Some(existing) => {
                    tx.execute(
                        "UPDATE users SET name = ?1, picture = ?2 WHERE id = ?3",
                        (new.name, new.picture, existing.id),
                    )?;
                    Ok(User {
                        name: new.name.to_string(),
                        picture: new.picture.to_string(),
                        ..existing
                    })
                }
                None => {
                    let user = insert_user(tx, new)?;
                    info!("Created user {} ({}) as {}", user.id, user.email, user.role.as_str());
                    Ok(user)
                }
            }
        })
    }

    /// Returns false when no such user exists.
    pub fn update_user_role(&self, id: i64, role: GlobalRole) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET role = ?1 WHERE id = ?2",
                (role.as_str(), id),
            )?;
            Ok(changed == 1)
        })
    }
}

fn insert_user(conn: &Connection, new: &NewUser<'_>) -> Result<User> {
    conn.execute(
        "INSERT INTO users (email, name, picture, provider, role) VALUES (?1, ?2, ?3, ?4, ?5)",
        (new.email, new.name, new.picture, new.provider, new.role.as_str()),
    )?;
    let id = conn.last_insert_rowid();
    query_user(conn, "id = ?1", &id)?
        .ok_or_else(|| anyhow::anyhow!("User {} vanished after insert", id))
}

fn query_user(
    conn: &Connection,
    filter: &str,
    value: &dyn rusqlite::ToSql,
) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {filter}");
    conn.query_row(&sql, [value], map_user).optional()
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        picture: row.get(3)?,
        provider: row.get(4)?,
        role: parsed(row, 5)?,
        created_at: timestamp(row, 6)?,
    })
}
