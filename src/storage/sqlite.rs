use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::str::FromStr;

use crate::error::Result;
use crate::models::{ExportRow, NormalizedPair, RepoStatus};

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    fn init_db(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS owners (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL DEFAULT '',
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS repos (
                id INTEGER NOT NULL,
                name TEXT NOT NULL,
                status TEXT NOT NULL,
                stars_count INTEGER NOT NULL,
                owner_id INTEGER NOT NULL REFERENCES owners(id),
                updated_at TEXT NOT NULL,
                PRIMARY KEY (id, owner_id)
            );

            CREATE INDEX IF NOT EXISTS idx_repos_owner_id ON repos(owner_id);
            "#,
        )?;

        Ok(())
    }

    /// Upsert all pairs in a single transaction. Idempotent: a second call
    /// with the same pairs leaves the tables unchanged apart from timestamps,
    /// and changed field values overwrite the previous row.
    pub fn save_pairs(&mut self, pairs: &[NormalizedPair]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        for pair in pairs {
            tx.execute(
                r#"
                INSERT INTO owners (id, name, email, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    email = excluded.email,
                    updated_at = excluded.updated_at
                "#,
                params![pair.owner.id, pair.owner.name, pair.owner.email, now],
            )?;

            tx.execute(
                r#"
                INSERT INTO repos (id, name, status, stars_count, owner_id, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id, owner_id) DO UPDATE SET
                    name = excluded.name,
                    status = excluded.status,
                    stars_count = excluded.stars_count,
                    updated_at = excluded.updated_at
                "#,
                params![
                    pair.repo.id,
                    pair.repo.name,
                    pair.repo.status.to_string(),
                    pair.repo.stars_count,
                    pair.repo.owner_id,
                    now,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// All stored rows in export column order, sorted by (owner id, repo id)
    /// so repeated exports of the same store are identical.
    pub fn export_rows(&self) -> Result<Vec<ExportRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT o.id, o.name, o.email, r.id, r.name, r.status, r.stars_count
            FROM repos r
            JOIN owners o ON r.owner_id = o.id
            ORDER BY o.id, r.id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let status_str: String = row.get(5)?;
            let status = RepoStatus::from_str(&status_str).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?;

            Ok(ExportRow {
                owner_id: row.get(0)?,
                owner_name: row.get(1)?,
                owner_email: row.get(2)?,
                repo_id: row.get(3)?,
                repo_name: row.get(4)?,
                status,
                stars_count: row.get(6)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    pub fn counts(&self) -> Result<(u64, u64)> {
        let owners: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM owners", [], |row| row.get(0))?;
        let repos: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM repos", [], |row| row.get(0))?;
        Ok((owners, repos))
    }
}
