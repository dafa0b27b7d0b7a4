mod app;
mod config;
mod store;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use store::StoreError;
