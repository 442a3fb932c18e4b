//! Text search and single-joke lookup.

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;

use super::with_deadline;
use crate::errors::AppError;
use crate::models::Joke;
use crate::pagination::PageQuery;
use crate::views::{render, JokePage, SearchPage};
use crate::AppState;

/// Search query parameters. `text` takes precedence over `id`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub skip: Option<String>,
    #[serde(default)]
    pub seed: Option<String>,
}

impl SearchQuery {
    fn page_query(&self) -> PageQuery {
        PageQuery {
            skip: self.skip.clone(),
            seed: self.seed.clone(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// GET /jokes/search - Search by text, open by id, or show the empty form.
pub async fn search_jokes(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, AppError> {
    if let Some(text) = non_blank(&query.text) {
        let params = query.page_query().parse()?;
        return with_deadline(&state, async {
            let listing = state.store.find_by_text(params, text).await?;
            render(&SearchPage::results(text, listing.into_page(params)))
        })
        .await;
    }

    if let Some(id) = non_blank(&query.id) {
        return with_deadline(&state, async {
            let joke = lookup_joke(&state, id).await?;
            render(&JokePage { joke })
        })
        .await;
    }

    render(&SearchPage::form())
}

/// GET /jokes/{id} - A single joke.
pub async fn get_joke(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    with_deadline(&state, async {
        let joke = lookup_joke(&state, &id).await?;
        render(&JokePage { joke })
    })
    .await
}

/// Read-through lookup: cache first, then the store, populating the cache on a miss.
async fn lookup_joke(state: &AppState, id: &str) -> Result<Joke, AppError> {
    if let Some(cache) = &state.cache {
        if let Some(joke) = cache.get(id).await {
            tracing::debug!("Cache hit for joke {}", id);
            return Ok(joke);
        }
        tracing::debug!("Cache miss for joke {}", id);
    }

    let joke = state.store.find_by_id(id).await?;

    if let Some(cache) = &state.cache {
        cache.set(id, joke.clone(), state.config.cache_ttl).await;
    }
    Ok(joke)
}
