//! SQLite-backed joke store.
//!
//! This is the database backend, used where a document database would otherwise
//! sit: identifiers are generated on insert (UUIDv4, simple form) and pagination is
//! pushed down into the queries with `LIMIT`/`OFFSET`. A `COUNT(*)` in the same read
//! transaction supplies the size of the full result set.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use super::{JokeStore, Listing, MAX_ID_ATTEMPTS};
use crate::errors::AppError;
use crate::models::Joke;
use crate::pagination::PageParams;

const SELECT_JOKE: &str = "SELECT id, title, body, score FROM jokes";
const TEXT_FILTER: &str = "instr(lower(title), lower(?1)) > 0 OR instr(lower(body), lower(?1)) > 0";

/// Database repository for jokes.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database at `db_path` and run migrations.
    pub async fn connect(db_path: &Path) -> Result<Self, AppError> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        run_migrations(&pool).await?;

        Ok(Self::new(pool))
    }

    /// Number of stored jokes.
    pub async fn count(&self) -> Result<usize, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM jokes")
            .fetch_one(&self.pool)
            .await?;
        Ok(to_count(row.get("total")))
    }

    /// Bulk-load jokes in one transaction, keeping their identifiers. Jokes whose
    /// identifier already exists are skipped. Returns how many were inserted.
    pub async fn import(&self, jokes: &[Joke]) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for joke in jokes {
            let result = sqlx::query(
                "INSERT INTO jokes (id, title, body, score) VALUES (?, ?, ?, ?) ON CONFLICT(id) DO NOTHING",
            )
            .bind(&joke.id)
            .bind(&joke.title)
            .bind(&joke.body)
            .bind(joke.score)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected() as usize;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Count every joke and fetch one window of them, ordered by `order_by`.
    async fn fetch_window(&self, order_by: &str, page: PageParams) -> Result<Listing, AppError> {
        // One read transaction, so the count and the window see the same rows.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT COUNT(*) AS total FROM jokes")
            .fetch_one(&mut *tx)
            .await?;
        let total = to_count(row.get("total"));

        let sql = format!("{} ORDER BY {} LIMIT ? OFFSET ?", SELECT_JOKE, order_by);
        let rows = sqlx::query(&sql)
            .bind(to_sql_int(page.limit))
            .bind(to_sql_int(page.skip))
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Listing::windowed(rows.iter().map(joke_from_row).collect(), total))
    }
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jokes (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            score INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jokes_score ON jokes(score DESC, seq);")
        .execute(pool)
        .await?;

    Ok(())
}

#[async_trait]
impl JokeStore for SqliteStore {
    fn kind(&self) -> &'static str {
        "sqlite"
    }

    async fn list(&self, page: PageParams) -> Result<Listing, AppError> {
        self.fetch_window("seq", page).await
    }

    async fn insert(&self, title: &str, body: &str, score: i64) -> Result<Joke, AppError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = uuid::Uuid::new_v4().simple().to_string();
            let result = sqlx::query(
                "INSERT INTO jokes (id, title, body, score) VALUES (?, ?, ?, ?) ON CONFLICT(id) DO NOTHING",
            )
            .bind(&id)
            .bind(title)
            .bind(body)
            .bind(score)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 1 {
                return Ok(Joke::new(id, title, body, score));
            }
            tracing::warn!("Identifier {} already taken, drawing again", id);
        }

        Err(AppError::Storage(format!(
            "Could not generate a unique identifier after {} attempts",
            MAX_ID_ATTEMPTS
        )))
    }

    async fn find_by_text(&self, page: PageParams, text: &str) -> Result<Listing, AppError> {
        let mut tx = self.pool.begin().await?;

        let count_sql = format!("SELECT COUNT(*) AS total FROM jokes WHERE {}", TEXT_FILTER);
        let row = sqlx::query(&count_sql)
            .bind(text)
            .fetch_one(&mut *tx)
            .await?;
        let total = to_count(row.get("total"));
        if total == 0 {
            return Err(AppError::NotFound(format!("No jokes matching {:?}", text)));
        }

        let sql = format!(
            "{} WHERE {} ORDER BY seq LIMIT ?2 OFFSET ?3",
            SELECT_JOKE, TEXT_FILTER
        );
        let rows = sqlx::query(&sql)
            .bind(text)
            .bind(to_sql_int(page.limit))
            .bind(to_sql_int(page.skip))
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Listing::windowed(
            rows.iter().map(joke_from_row).collect(),
            total,
        ))
    }

    async fn find_by_id(&self, id: &str) -> Result<Joke, AppError> {
        let sql = format!("{} WHERE id = ?", SELECT_JOKE);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(joke_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Joke {} not found", id)))
    }

    async fn sample_random(&self, size: usize) -> Result<Listing, AppError> {
        let sql = format!("{} ORDER BY RANDOM() LIMIT ?", SELECT_JOKE);
        let rows = sqlx::query(&sql)
            .bind(to_sql_int(size))
            .fetch_all(&self.pool)
            .await?;

        Ok(Listing::whole(rows.iter().map(joke_from_row).collect()))
    }

    async fn list_by_score_desc(&self, page: PageParams) -> Result<Listing, AppError> {
        self.fetch_window("score DESC, seq", page).await
    }
}

// Helper functions for row conversion

fn joke_from_row(row: &SqliteRow) -> Joke {
    Joke {
        id: row.get("id"),
        title: row.get("title"),
        body: row.get("body"),
        score: row.get("score"),
    }
}

fn to_sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn to_count(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}
