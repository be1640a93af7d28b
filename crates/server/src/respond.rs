//! Shared response helpers: form redirects and read-through lists.

use std::future::Future;

use axum::response::Redirect;
use engine::EngineError;
use serde::{Serialize, de::DeserializeOwned};

use crate::{ServerError, message_for_engine_error, server::ServerState};

/// `303 See Other` back to `list`, carrying either `success` or `error`.
pub fn redirect<T>(list: &str, success: &str, result: Result<T, EngineError>) -> Redirect {
    let (key, message) = match result {
        Ok(_) => ("success", success.to_string()),
        Err(err) => {
            tracing::info!(list, "form rejected: {err}");
            ("error", message_for_engine_error(err))
        }
    };
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(key, &message)
        .finish();
    Redirect::to(&format!("{list}?{query}"))
}

/// Serves `key` from the cache, falling back to `load` and caching the
/// result. With the store down and nothing cached the read fails with
/// [`ServerError::Unavailable`].
pub async fn read_through<T, F, Fut>(
    state: &ServerState,
    key: &str,
    load: F,
) -> Result<T, ServerError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, EngineError>>,
{
    let cache = state.engine.cache();
    if let Some(hit) = cache.get_json::<T>(key).await {
        return Ok(hit);
    }
    if !state.health.database_available().await {
        return Err(ServerError::Unavailable);
    }
    let value = load().await?;
    cache.put_json(key, &value).await;
    Ok(value)
}
