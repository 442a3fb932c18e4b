//! Joke storage.
//!
//! One capability trait with three interchangeable backends, chosen at startup:
//! an in-memory collection, a JSON file, and an SQLite database. The in-memory and
//! file backends return whole (filtered or sorted) collections and leave slicing to
//! [`PageView`]; the database pushes `skip`/`limit` down into its queries. Every
//! [`Listing`] reports the true total and says which of the two it holds.
//!
//! SQLite takes the place of a document database here: it is the backend that
//! windows results itself and assigns database-native identifiers.

mod collection;
mod file;
mod memory;
mod sqlite;

pub use collection::*;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StorageBackend};
use crate::errors::AppError;
use crate::models::Joke;
use crate::pagination::{PageParams, PageView};

/// Maximum number of identifier draws before an insert gives up.
pub const MAX_ID_ATTEMPTS: usize = 16;

/// Jokes returned by a store operation, with the size of the full result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub jokes: Vec<Joke>,
    pub total: usize,
    /// True when `jokes` already starts at the requested `skip`.
    pub windowed: bool,
}

impl Listing {
    /// A listing holding a complete result set.
    pub fn whole(jokes: Vec<Joke>) -> Self {
        let total = jokes.len();
        Self {
            jokes,
            total,
            windowed: false,
        }
    }

    /// A listing holding only the requested window of a result set of `total` items.
    pub fn windowed(jokes: Vec<Joke>, total: usize) -> Self {
        Self {
            jokes,
            total,
            windowed: true,
        }
    }

    pub fn into_page(self, params: PageParams) -> PageView {
        if self.windowed {
            PageView::windowed(params, self.total, self.jokes)
        } else {
            PageView::new(params, self.total, self.jokes)
        }
    }
}

/// Storage capability consumed by the request handlers.
#[async_trait]
pub trait JokeStore: Send + Sync {
    /// Short backend name for logs.
    fn kind(&self) -> &'static str;

    /// All jokes in insertion order.
    async fn list(&self, page: PageParams) -> Result<Listing, AppError>;

    /// Add a joke under a fresh collection-unique identifier.
    async fn insert(&self, title: &str, body: &str, score: i64) -> Result<Joke, AppError>;

    /// Jokes whose title or body contains `text`, ignoring case.
    ///
    /// Fails with `NotFound` when nothing matches.
    async fn find_by_text(&self, page: PageParams, text: &str) -> Result<Listing, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Joke, AppError>;

    /// Up to `size` randomly chosen jokes; `total` is the number actually drawn.
    async fn sample_random(&self, size: usize) -> Result<Listing, AppError>;

    /// All jokes ordered by score, highest first, ties in insertion order.
    async fn list_by_score_desc(&self, page: PageParams) -> Result<Listing, AppError>;
}

/// Open the backend selected by `config`.
pub async fn open(config: &Config) -> Result<Arc<dyn JokeStore>, AppError> {
    let store: Arc<dyn JokeStore> = match config.storage {
        StorageBackend::Memory => {
            let jokes = match &config.seed_path {
                Some(path) => load_json(path).await?,
                None => Vec::new(),
            };
            tracing::info!("Loaded {} jokes into memory", jokes.len());
            Arc::new(MemoryStore::new(jokes))
        }
        StorageBackend::File => Arc::new(FileStore::open(&config.data_path).await?),
        StorageBackend::Sqlite => {
            let store = SqliteStore::connect(&config.db_path).await?;
            if let Some(path) = &config.seed_path {
                if store.count().await? == 0 {
                    let jokes = load_json(path).await?;
                    let imported = store.import(&jokes).await?;
                    tracing::info!("Imported {} seed jokes from {:?}", imported, path);
                }
            }
            Arc::new(store)
        }
    };

    Ok(store)
}

/// Read a JSON array of jokes.
pub async fn load_json(path: &std::path::Path) -> Result<Vec<Joke>, AppError> {
    let raw = tokio::fs::read(path).await.map_err(|e| {
        AppError::Storage(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_slice(&raw)
        .map_err(|e| AppError::Storage(format!("Failed to decode {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;
    use tempfile::TempDir;

    async fn write_seed(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("seed.json");
        let jokes = vec![
            Joke::new("aaa001", "First joke", "Normal", 3),
            Joke::new("aaa002", "Second joke", "Incredible", 35),
        ];
        tokio::fs::write(&path, serde_json::to_vec(&jokes).unwrap())
            .await
            .unwrap();
        path
    }

    fn config_for(storage: &str, dir: &Path, seed: &Path) -> Config {
        let vars: HashMap<&str, String> = HashMap::from([
            ("JOKES_STORAGE", storage.to_string()),
            ("JOKES_DATA_PATH", dir.join("jokes.json").display().to_string()),
            ("JOKES_DB_PATH", dir.join("jokes.sqlite").display().to_string()),
            ("JOKES_SEED_PATH", seed.display().to_string()),
        ]);
        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[tokio::test]
    async fn test_open_memory_backend_loads_seed() {
        let temp_dir = TempDir::new().unwrap();
        let seed = write_seed(temp_dir.path()).await;

        let store = open(&config_for("memory", temp_dir.path(), &seed))
            .await
            .unwrap();
        assert_eq!(store.kind(), "memory");
        assert_eq!(store.list(PageParams::default()).await.unwrap().total, 2);
    }

    #[tokio::test]
    async fn test_open_file_backend_uses_data_path() {
        let temp_dir = TempDir::new().unwrap();
        let seed = write_seed(temp_dir.path()).await;
        let config = config_for("file", temp_dir.path(), &seed);

        let store = open(&config).await.unwrap();
        assert_eq!(store.kind(), "file");
        assert_eq!(store.list(PageParams::default()).await.unwrap().total, 0);

        store.insert("Saved", "Body", 0).await.unwrap();
        assert!(tokio::fs::try_exists(&config.data_path).await.unwrap());

        let reopened = open(&config).await.unwrap();
        assert_eq!(reopened.list(PageParams::default()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_open_sqlite_backend_imports_seed_once() {
        let temp_dir = TempDir::new().unwrap();
        let seed = write_seed(temp_dir.path()).await;
        let config = config_for("sqlite", temp_dir.path(), &seed);

        let store = open(&config).await.unwrap();
        assert_eq!(store.kind(), "sqlite");
        let listing = store.list(PageParams::default()).await.unwrap();
        assert_eq!(listing.total, 2);
        assert!(listing.windowed);

        store.insert("Third joke", "Funny", 15).await.unwrap();
        drop(store);

        // A non-empty database is not seeded again.
        let reopened = open(&config).await.unwrap();
        assert_eq!(reopened.list(PageParams::default()).await.unwrap().total, 3);
    }

    #[tokio::test]
    async fn test_open_missing_seed_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for("memory", temp_dir.path(), &temp_dir.path().join("absent.json"));

        let err = open(&config).await.err().unwrap();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
