//! Jokes Server
//!
//! Server-rendered, paginated jokes catalogue backed by an in-memory, JSON file or
//! SQLite store, with a read-through cache for single-joke lookups.

mod api;
mod cache;
mod config;
mod errors;
mod models;
mod pagination;
mod store;
mod views;

use std::sync::Arc;

use axum::{
    response::Redirect,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cache::JokeCache;
use config::{Config, LogFormat};
use store::JokeStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JokeStore>,
    /// Absent when caching is disabled.
    pub cache: Option<Arc<JokeCache>>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting jokes server");
    tracing::info!("Storage backend: {:?}", config.storage);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Request deadline: {:?}", config.request_timeout);

    // Open the configured store
    let store = store::open(&config).await?;

    let cache = if config.cache_enabled {
        let cache = Arc::new(JokeCache::new(config.cache_ttl, config.cache_sweep_interval));
        if Arc::clone(&cache).spawn_sweeper().is_some() {
            tracing::info!(
                "Cache sweep every {:?}, ttl {:?}",
                config.cache_sweep_interval,
                config.cache_ttl
            );
        }
        Some(cache)
    } else {
        tracing::info!("Cache disabled");
        None
    };

    let state = AppState {
        store,
        cache,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(env_filter);

    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/jokes", get(api::list_jokes))
        .route("/jokes/add", post(api::add_joke))
        .route("/jokes/search", get(api::search_jokes))
        .route("/jokes/random", get(api::random_jokes))
        .route("/jokes/funniest", get(api::funniest_jokes))
        .route("/jokes/{id}", get(api::get_joke))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn index() -> Redirect {
    Redirect::to("/jokes")
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
