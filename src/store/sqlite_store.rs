use super::models::{Resume, Vacancy};
use super::schema::{
    AUTH_TOKEN_TABLE, RESUME_TABLE, USER_PASSWORD_CREDENTIALS_TABLE, USER_TABLE, VACANCY_TABLE,
    VERSIONED_SCHEMAS,
};
use super::{ResumeStore, UserStore, VacancyStore};
use crate::sqlite_persistence::BASE_DB_VERSION;
use crate::user::{AuthToken, AuthTokenValue, UserAuthCredentials, UsernamePasswordCredentials};
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    path::Path,
    str::FromStr,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tracing::info;

fn to_epoch_secs(t: SystemTime) -> i64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn from_epoch_secs(secs: i64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64)
}

#[derive(Clone)]
pub struct SqliteHunterStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHunterStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = if db_path.as_ref().exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        } else {
            let conn = Connection::open(db_path)?;
            VERSIONED_SCHEMAS
                .last()
                .expect("at least one schema version")
                .create(&conn)?;
            conn
        };

        let db_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read database version")?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            bail!(
                "Database version {} is too old, does not contain base db version {}",
                db_version,
                BASE_DB_VERSION
            );
        }
        let version = db_version as usize;

        if db_version >= VERSIONED_SCHEMAS.len() as i64 {
            bail!("Database version {} is too new", db_version);
        }
        VERSIONED_SCHEMAS
            .get(version)
            .context("Failed to get schema")?
            .validate(&conn)?;

        Self::migrate_if_needed(&conn, version)?;

        conn.execute("PRAGMA foreign_keys = ON;", [])?;

        Ok(SqliteHunterStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<()> {
        let mut latest_from = version;
        for schema in VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating db from version {} to {}",
                    latest_from, schema.version
                );
                migration_fn(conn)?;
                latest_from = schema.version;
            }
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;

        Ok(())
    }
}

impl UserStore for SqliteHunterStore {
    fn create_user(&self, email: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("INSERT INTO {} (email) VALUES (?1)", USER_TABLE.name),
            params![email],
        )
        .with_context(|| format!("Failed to create user {}", email))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user_id(&self, email: &str) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        let id = conn
            .query_row(
                &format!("SELECT id FROM {} WHERE email = ?1", USER_TABLE.name),
                params![email],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(|id| id as usize))
    }

    fn get_user_email(&self, user_id: usize) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!("SELECT email FROM {} WHERE id = ?1", USER_TABLE.name),
                params![user_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn get_user_auth_credentials(&self, email: &str) -> Result<Option<UserAuthCredentials>> {
        let conn = self.conn.lock().unwrap();
        let user_id = match conn
            .query_row(
                &format!("SELECT id FROM {} WHERE email = ?1", USER_TABLE.name),
                params![email],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
        {
            Some(id) => id as usize,
            None => return Ok(None),
        };

        let username_password = conn
            .query_row(
                &format!(
                    "SELECT salt, hash, hasher, created, last_tried, last_used FROM {} WHERE user_id = ?1",
                    USER_PASSWORD_CREDENTIALS_TABLE.name
                ),
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, Option<i64>>(4)?,
                        row.get::<_, Option<i64>>(5)?,
                    ))
                },
            )
            .optional()?;

        let username_password = match username_password {
            Some((salt, hash, hasher, created, last_tried, last_used)) => {
                Some(UsernamePasswordCredentials {
                    user_id,
                    salt,
                    hash,
                    hasher: crate::user::HunterHasher::from_str(&hasher)?,
                    created: from_epoch_secs(created),
                    last_tried: last_tried.map(from_epoch_secs),
                    last_used: last_used.map(from_epoch_secs),
                })
            }
            None => None,
        };

        Ok(Some(UserAuthCredentials {
            user_id,
            username_password,
        }))
    }

    fn update_user_auth_credentials(&self, credentials: UserAuthCredentials) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "DELETE FROM {} WHERE user_id = ?1",
                USER_PASSWORD_CREDENTIALS_TABLE.name
            ),
            params![credentials.user_id],
        )?;
        if let Some(pw) = credentials.username_password {
            conn.execute(
                &format!(
                    "INSERT INTO {} (user_id, salt, hash, hasher, created, last_tried, last_used) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    USER_PASSWORD_CREDENTIALS_TABLE.name
                ),
                params![
                    pw.user_id,
                    pw.salt,
                    pw.hash,
                    pw.hasher.to_string(),
                    to_epoch_secs(pw.created),
                    pw.last_tried.map(to_epoch_secs),
                    pw.last_used.map(to_epoch_secs),
                ],
            )?;
        }
        Ok(())
    }

    fn add_user_auth_token(&self, token: AuthToken) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, value, created, last_used) VALUES (?1, ?2, ?3, ?4)",
                AUTH_TOKEN_TABLE.name
            ),
            params![
                token.user_id,
                token.value.0,
                to_epoch_secs(token.created),
                token.last_used.map(to_epoch_secs),
            ],
        )?;
        Ok(())
    }

    fn get_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!(
                    "SELECT user_id, value, created, last_used FROM {} WHERE value = ?1",
                    AUTH_TOKEN_TABLE.name
                ),
                params![token.0],
                |row| {
                    Ok(AuthToken {
                        user_id: row.get::<_, i64>(0)? as usize,
                        value: AuthTokenValue(row.get(1)?),
                        created: from_epoch_secs(row.get(2)?),
                        last_used: row.get::<_, Option<i64>>(3)?.map(from_epoch_secs),
                    })
                },
            )
            .optional()?)
    }

    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let existing = self.get_user_auth_token(token)?;
        if existing.is_some() {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                &format!("DELETE FROM {} WHERE value = ?1", AUTH_TOKEN_TABLE.name),
                params![token.0],
            )?;
        }
        Ok(existing)
    }

    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "UPDATE {} SET last_used = ?1 WHERE value = ?2",
                AUTH_TOKEN_TABLE.name
            ),
            params![to_epoch_secs(SystemTime::now()), token.0],
        )?;
        Ok(())
    }

    fn prune_unused_auth_tokens(&self, unused_for_days: u64) -> Result<usize> {
        let cutoff = to_epoch_secs(SystemTime::now()) - (unused_for_days as i64 * 24 * 60 * 60);
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            &format!(
                "DELETE FROM {} WHERE COALESCE(last_used, created) < ?1",
                AUTH_TOKEN_TABLE.name
            ),
            params![cutoff],
        )?;
        Ok(deleted)
    }
}

impl VacancyStore for SqliteHunterStore {
    fn insert_vacancy_if_new(&self, board_id: &str, name: &str, url: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (board_id, name, url) VALUES (?1, ?2, ?3)",
                VACANCY_TABLE.name
            ),
            params![board_id, name, url],
        )?;
        Ok(inserted > 0)
    }

    fn get_vacancy(&self, id: usize) -> Result<Option<Vacancy>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!(
                    "SELECT id, board_id, name, url, description FROM {} WHERE id = ?1",
                    VACANCY_TABLE.name
                ),
                params![id],
                map_vacancy_row,
            )
            .optional()?)
    }

    fn get_vacancy_by_board_id(&self, board_id: &str) -> Result<Option<Vacancy>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!(
                    "SELECT id, board_id, name, url, description FROM {} WHERE board_id = ?1",
                    VACANCY_TABLE.name
                ),
                params![board_id],
                map_vacancy_row,
            )
            .optional()?)
    }

    fn set_vacancy_description(&self, board_id: &str, description: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET description = ?1 WHERE board_id = ?2",
                VACANCY_TABLE.name
            ),
            params![description, board_id],
        )?;
        if updated == 0 {
            bail!("No vacancy with board id {}", board_id);
        }
        Ok(())
    }
}

fn map_vacancy_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Vacancy> {
    Ok(Vacancy {
        id: row.get::<_, i64>(0)? as usize,
        board_id: row.get(1)?,
        name: row.get(2)?,
        url: row.get(3)?,
        description: row.get(4)?,
    })
}

impl ResumeStore for SqliteHunterStore {
    fn create_resume(&self, user_id: usize, content: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, content) VALUES (?1, ?2)",
                RESUME_TABLE.name
            ),
            params![user_id, content],
        )
        .with_context(|| format!("Failed to save resume for user {}", user_id))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_resume(&self, id: usize) -> Result<Option<Resume>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!(
                    "SELECT id, user_id, content FROM {} WHERE id = ?1",
                    RESUME_TABLE.name
                ),
                params![id],
                map_resume_row,
            )
            .optional()?)
    }

    fn get_all_resumes(&self) -> Result<Vec<Resume>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, user_id, content FROM {} ORDER BY id",
            RESUME_TABLE.name
        ))?;
        let resumes = stmt
            .query_map([], map_resume_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(resumes)
    }

}

fn map_resume_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Resume> {
    Ok(Resume {
        id: row.get::<_, i64>(0)? as usize,
        user_id: row.get::<_, i64>(1)? as usize,
        content: row.get(2)?,
    })
}
