//! Listing and creating jokes.

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Form,
};

use super::with_deadline;
use crate::errors::AppError;
use crate::models::CreateJokeRequest;
use crate::pagination::PageQuery;
use crate::views::{render, JokesPage};
use crate::AppState;

/// GET /jokes - All jokes in insertion order.
pub async fn list_jokes(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let params = query.parse()?;

    with_deadline(&state, async {
        let listing = state.store.list(params).await?;
        render(&JokesPage::new(
            "All jokes",
            "/jokes",
            listing.into_page(params),
        ))
    })
    .await
}

/// POST /jokes/add - Create a joke and go back to the list.
pub async fn add_joke(
    State(state): State<AppState>,
    Form(request): Form<CreateJokeRequest>,
) -> Result<Redirect, AppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidParameter("title is required".to_string()));
    }

    let joke = with_deadline(&state, state.store.insert(title, request.body.trim(), 0)).await?;
    tracing::info!("Created joke {} in {} store", joke.id, state.store.kind());

    Ok(Redirect::to("/jokes"))
}
