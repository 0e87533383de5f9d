use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::error;

use almanac_db::Database;

use crate::accounts::AccountStore;
use crate::error::{ApiError, ApiResult};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session: SessionConfig,
    pub downloads_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_days: i64,
    pub secure_cookies: bool,
}

impl AppStateInner {
    pub fn accounts(&self) -> AccountStore<'_> {
        AccountStore::new(&self.db)
    }
}

/// Runs blocking work (SQLite, password hashing) off the async runtime.
pub async fn blocking<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&AppStateInner) -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&*state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow!("blocking task failed: {}", e))
        })?
}
