//! Process-local joke store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{JokeCollection, JokeStore, Listing};
use crate::errors::AppError;
use crate::models::Joke;
use crate::pagination::PageParams;

/// Jokes held only in memory. Inserts are lost on restart.
pub struct MemoryStore {
    jokes: RwLock<JokeCollection>,
}

impl MemoryStore {
    pub fn new(jokes: Vec<Joke>) -> Self {
        Self {
            jokes: RwLock::new(JokeCollection::new(jokes)),
        }
    }
}

#[async_trait]
impl JokeStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, _page: PageParams) -> Result<Listing, AppError> {
        Ok(self.jokes.read().await.list())
    }

    async fn insert(&self, title: &str, body: &str, score: i64) -> Result<Joke, AppError> {
        self.jokes.write().await.insert(title, body, score)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_then_lookup() {
        let store = MemoryStore::new(Vec::new());
        let joke = store.insert("Test", "Body", 0).await.unwrap();
        assert_eq!(joke.score, 0);

        assert_eq!(store.find_by_id(&joke.id).await.unwrap(), joke);
        let found = store
            .find_by_text(PageParams::default(), "Test")
            .await
            .unwrap();
        assert!(found.jokes.contains(&joke));
    }

    #[tokio::test]
    async fn test_list_is_paged_by_view() {
        let jokes = (0..45)
            .map(|i| Joke::new(format!("{:06x}", i), format!("joke {}", i), "body", i))
            .collect();
        let store = MemoryStore::new(jokes);
        let params = PageParams { skip: 40, limit: 20 };

        let page = store.list(params).await.unwrap().into_page(params);
        assert_eq!(page.total, 45);
        assert_eq!(page.content.len(), 5);
        assert_eq!(page.content[0].title, "joke 40");
        assert_eq!(page.current_page, 3);
        assert_eq!(page.max_page, 3);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_get_distinct_ids() {
        let store = std::sync::Arc::new(MemoryStore::new(Vec::new()));
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.insert(&format!("joke {}", i), "body", 0).await.unwrap()
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().id);
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 32);
        assert_eq!(
            store.list(PageParams::default()).await.unwrap().total,
            32
        );
    }
}
