//! Builders
//!
//! Fluent builders for configuration.

pub mod config;

pub use config::{app_config, token_cache_config, AppConfigBuilder, TokenCacheConfigBuilder};
