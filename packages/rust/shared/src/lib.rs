//! Shared types, error model, and configuration for Content Factory.
//!
//! This crate is the foundation depended on by all other Content Factory crates.
//! It provides:
//! - [`ContentFactoryError`] — the unified error type
//! - Domain types ([`TopicRow`], [`RelatedLink`], [`StyledBlock`], [`Model`])
//! - Configuration ([`AppConfig`], [`GenerationSettings`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BatchDefaultsConfig, GenerationConfig, GenerationSettings, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{ContentFactoryError, Result};
pub use types::{BatchId, BlockKind, Model, RelatedLink, StyledBlock, TopicRow};
