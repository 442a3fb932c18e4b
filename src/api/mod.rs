//! Request handlers.
//!
//! Handlers parse pagination parameters, call the store and render a view. Store
//! access and rendering run under the configured request deadline.

mod jokes;
mod ranking;
mod search;

pub use jokes::*;
pub use ranking::*;
pub use search::*;

use std::future::Future;

use crate::errors::AppError;
use crate::AppState;

/// Run `fut` under the request deadline. Expiry drops the in-flight store call
/// and surfaces as a storage failure.
pub async fn with_deadline<T, F>(state: &AppState, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(state.config.request_timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                "Request exceeded deadline of {:?}",
                state.config.request_timeout
            );
            Err(AppError::Storage("request deadline exceeded".to_string()))
        }
    }
}
