//! Configuration file loading and store construction.
mod loader;
mod types;


pub use loader::load_config;
pub use types::{ConfigFile, StoreBackend, StoreSection};

use std::sync::Arc;

use crate::error::{AppError, AppResult, ConfigError};
use crate::store::{CallStore, MemoryCallStore, SqliteCallStore};

/// Constructs the store backend described by `config`.
///
/// # Errors
///
/// Returns a configuration error when the section is inconsistent (a sqlite
/// backend without a path, or a memory backend with one), and a store error
/// when the sqlite database cannot be opened.
pub async fn build_store(config: &ConfigFile) -> AppResult<Arc<dyn CallStore>> {
    match config.store.backend {
        StoreBackend::Sqlite => {
            let path = config
                .store
                .path
                .as_deref()
                .ok_or_else(|| AppError::config(ConfigError::MissingStorePath))?;
            Ok(Arc::new(SqliteCallStore::open(path).await?))
        }
        StoreBackend::Memory => {
            if config.store.path.is_some() {
                return Err(AppError::config(ConfigError::UnexpectedStorePath));
            }
            Ok(Arc::new(MemoryCallStore::new()))
        }
    }
}
