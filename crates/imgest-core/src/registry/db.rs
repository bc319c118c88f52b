//! SQLite-backed local asset registry.
//!
//! `AssetDb` is the async handle; `SqliteRegistry` adapts it to the
//! synchronous [`AssetRegistry`] port for use from blocking ingestion threads.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

use super::{AssetRecord, AssetRegistry, RegistrationId, RegistryError};

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// One registered asset as listed by the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRow {
    pub id: i64,
    pub parent_id: i64,
    pub url: String,
    pub mime: String,
    pub title: String,
    pub alt_text: String,
    pub source_url: String,
    pub created_at: i64,
}

/// Handle to the SQLite asset database at `~/.local/state/imgest/assets.db`.
#[derive(Clone)]
pub struct AssetDb {
    pool: Pool<Sqlite>,
}

impl AssetDb {
    /// Open (or create) the default asset database and run migrations.
    pub async fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("imgest")?;
        let db_path = xdg_dirs.place_state_file("assets.db")?;
        Self::open_at(db_path).await
    }

    /// Open (or create) the database at a specific path. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&uri)
            .await?;
        let db = AssetDb { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS assets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                parent_id INTEGER NOT NULL,
                path TEXT NOT NULL,
                url TEXT NOT NULL,
                mime TEXT NOT NULL,
                title TEXT NOT NULL,
                alt_text TEXT NOT NULL,
                source_url TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert an asset row and return its id.
    pub async fn insert(&self, record: &AssetRecord) -> Result<i64> {
        let parent_id = i64::try_from(record.parent_id)?;
        let id = sqlx::query(
            r#"
            INSERT INTO assets (parent_id, path, url, mime, title, alt_text, source_url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(parent_id)
        .bind(record.path.to_string_lossy().into_owned())
        .bind(record.url.as_str())
        .bind(record.mime.as_str())
        .bind(record.title.as_str())
        .bind(record.alt_text.as_str())
        .bind(record.source_url.as_str())
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    /// All assets, oldest first.
    pub async fn list(&self) -> Result<Vec<AssetRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, parent_id, url, mime, title, alt_text, source_url, created_at
            FROM assets
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| AssetRow {
                id: row.get("id"),
                parent_id: row.get("parent_id"),
                url: row.get("url"),
                mime: row.get("mime"),
                title: row.get("title"),
                alt_text: row.get("alt_text"),
                source_url: row.get("source_url"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
/// Open an in-memory database for tests (no disk I/O).
pub(crate) async fn open_memory() -> Result<AssetDb> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let db = AssetDb { pool };
    db.migrate().await?;
    Ok(db)
}

/// [`AssetRegistry`] over an [`AssetDb`]. `register` blocks on the runtime
/// behind `handle`, so it must be called from a blocking thread (for example
/// inside `tokio::task::spawn_blocking`), never from an async task.
#[derive(Clone)]
pub struct SqliteRegistry {
    db: AssetDb,
    handle: tokio::runtime::Handle,
}

impl SqliteRegistry {
    pub fn new(db: AssetDb, handle: tokio::runtime::Handle) -> Self {
        Self { db, handle }
    }
}

impl AssetRegistry for SqliteRegistry {
    fn register(&self, record: &AssetRecord) -> Result<RegistrationId, RegistryError> {
        self.handle
            .block_on(self.db.insert(record))
            .map(|id| id.to_string())
            .map_err(|e| RegistryError(format!("{e:#}")))
    }
}
