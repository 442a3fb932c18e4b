//! Random and score-ranked listings.

use axum::{
    extract::{Query, State},
    response::Html,
};

use super::with_deadline;
use crate::errors::AppError;
use crate::pagination::PageQuery;
use crate::views::{render, JokesPage};
use crate::AppState;

/// GET /jokes/random - A fresh random sample, paged like the other lists.
pub async fn random_jokes(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let params = query.parse()?;

    with_deadline(&state, async {
        // Draw enough to cover every item up to the end of the requested window.
        let size = params.skip.saturating_add(params.limit);
        let listing = state.store.sample_random(size).await?;
        render(&JokesPage::new(
            "Random jokes",
            "/jokes/random",
            listing.into_page(params),
        ))
    })
    .await
}

/// GET /jokes/funniest - Jokes by score, highest first.
pub async fn funniest_jokes(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let params = query.parse()?;

    with_deadline(&state, async {
        let listing = state.store.list_by_score_desc(params).await?;
        render(&JokesPage::new(
            "Funniest jokes",
            "/jokes/funniest",
            listing.into_page(params),
        ))
    })
    .await
}
