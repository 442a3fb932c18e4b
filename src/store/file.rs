//! Joke store persisted as a pretty-printed JSON array.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{load_json, JokeCollection, JokeStore, Listing};
use crate::errors::AppError;
use crate::models::Joke;
use crate::pagination::PageParams;

/// Jokes loaded from a JSON file and written back in full on every insert.
pub struct FileStore {
    path: PathBuf,
    jokes: RwLock<JokeCollection>,
}

impl FileStore {
    /// Load the store from `path`. A missing file yields an empty store; the file
    /// is created on the first insert.
    pub async fn open(path: &Path) -> Result<Self, AppError> {
        let jokes = match tokio::fs::try_exists(path).await {
            Ok(true) => load_json(path).await?,
            Ok(false) => Vec::new(),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to access {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let jokes = JokeCollection::new(jokes);
        if jokes.is_empty() {
            tracing::warn!("Joke file {:?} is empty or missing", path);
        } else {
            tracing::info!("Loaded {} jokes from {:?}", jokes.len(), path);
        }

        Ok(Self {
            path: path.to_path_buf(),
            jokes: RwLock::new(jokes),
        })
    }

    /// Rewrite the whole file. Written to a sibling first and renamed into place.
    async fn persist(&self, jokes: &[Joke]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let raw = serde_json::to_vec_pretty(jokes)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, raw).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                tracing::warn!("Failed to remove {:?}: {}", tmp, cleanup);
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

#[async_trait]
impl JokeStore for FileStore {
    fn kind(&self) -> &'static str {
        "file"
    }

    async fn list(&self, _page: PageParams) -> Result<Listing, AppError> {
        Ok(self.jokes.read().await.list())
    }

    async fn insert(&self, title: &str, body: &str, score: i64) -> Result<Joke, AppError> {
        // Held across the file rewrite so concurrent inserts cannot interleave.
        let mut jokes = self.jokes.write().await;

        // The new joke becomes visible only once it is on disk, so an insert that
        // fails or is dropped midway leaves both copies unchanged.
        let mut updated = jokes.clone();
        let joke = updated.insert(title, body, score)?;
        self.persist(updated.as_slice()).await?;

        *jokes = updated;
        Ok(joke)
    }

    async fn find_by_text(&self, _page: PageParams, text: &str) -> Result<Listing, AppError> {
        self.jokes.read().await.find_by_text(text)
    }

    async fn find_by_id(&self, id: &str) -> Result<Joke, AppError> {
        self.jokes.read().await.find_by_id(id)
    }

    async fn sample_random(&self, size: usize) -> Result<Listing, AppError> {
        Ok(self.jokes.read().await.sample_random(size))
    }

    async fn list_by_score_desc(&self, _page: PageParams) -> Result<Listing, AppError> {
        Ok(self.jokes.read().await.list_by_score_desc())
    }
}
