//! # dirconfig
//!
//! Directory-backed configuration with deep merging and live reload.
//!
//! ## Overview
//!
//! `dirconfig` reads every JSON and YAML file under a directory, deep-merges
//! them into a single configuration tree, and can keep watching the directory
//! so that every change is published as a fresh snapshot:
//! - Recursive, lexically ordered directory walk (later files win)
//! - Explicit recursive merge over an untyped value tree
//! - Event-driven watching with at most one watcher per provider
//! - Snapshots delivered over a bounded channel, so slow consumers apply
//!   backpressure instead of piling up updates
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dirconfig::prelude::*;
//! use serde::Deserialize;
//! use tokio::sync::mpsc;
//!
//! #[derive(Debug, Deserialize)]
//! struct AppConfig {
//!     server: ServerConfig,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct ServerConfig {
//!     port: u16,
//! }
//!
//! # async fn example() -> dirconfig::error::Result<()> {
//! let provider = DirectoryProvider::new(FileConfig::new("config.d").with_watch(true));
//!
//! let (tx, mut rx) = mpsc::channel(1);
//! let initial = provider.provide(tx).await?;
//! let app: AppConfig = initial.deserialize_into()?;
//! println!("Server port: {}", app.server.port);
//!
//! // Every later change arrives on the channel
//! while let Some(data) = rx.recv().await {
//!     let app: AppConfig = data.deserialize_into()?;
//!     println!("Server port is now: {}", app.server.port);
//! }
//!
//! provider.close()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod notify;
pub mod sources;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{ConfigMap, Data, ProviderType, Value};
    pub use crate::error::{ConfigError, Result};
    pub use crate::sources::{DirectoryProvider, FileConfig, Provider};
}
