//! Directory-backed configuration provider.

use super::Provider;
use super::file::read_config_file;
use crate::core::{ConfigMap, Data, ProviderType, Value, deep_merge};
use crate::error::{ConfigError, Result};
use crate::notify::DirectoryWatcher;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Settings for a [`DirectoryProvider`].
///
/// Usually embedded in the outer application's own configuration:
///
/// ```yaml
/// directory: /etc/myapp/conf.d
/// watch: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Directory whose files are merged into one configuration tree.
    pub directory: PathBuf,
    /// Keep watching the directory and publish a snapshot on every change.
    #[serde(default)]
    pub watch: bool,
}

impl FileConfig {
    /// Settings for `directory` with watching disabled.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            watch: false,
        }
    }

    /// Enable or disable watching.
    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }
}

/// Loads every file in a directory, deep-merges them, and optionally keeps
/// watching the directory for changes.
///
/// Files are visited depth-first in lexical order, so when two files define
/// the same key the lexically later one wins. Every non-directory entry must
/// be a `.json`, `.yml` or `.yaml` file or the load fails.
///
/// # Examples
///
/// ```rust,no_run
/// use dirconfig::prelude::*;
/// use tokio::sync::mpsc;
///
/// # async fn example() -> Result<()> {
/// let provider = DirectoryProvider::new(FileConfig::new("/etc/myapp/conf.d").with_watch(true));
///
/// let (tx, mut rx) = mpsc::channel(1);
/// let initial = provider.provide(tx).await?;
/// println!("loaded {} top-level keys", initial.config().len());
///
/// while let Some(data) = rx.recv().await {
///     println!("configuration changed: {:?}", data.config());
/// }
/// # Ok(())
/// # }
/// ```
pub struct DirectoryProvider {
    config: FileConfig,
    watcher: DirectoryWatcher,
}

impl DirectoryProvider {
    /// Create a provider. Nothing is read until [`Provider::provide`] is called.
    pub fn new(config: FileConfig) -> Self {
        Self {
            config,
            watcher: DirectoryWatcher::new(),
        }
    }

    /// The settings this provider was created with.
    pub fn config(&self) -> &FileConfig {
        &self.config
    }

    /// Read and merge the directory once.
    pub fn load(&self) -> Result<Data> {
        load_directory(&self.config.directory)
    }

    /// Read and merge the directory once on tokio's blocking pool, keeping
    /// the walk and file reads off the async worker threads.
    pub async fn load_blocking(&self) -> Result<Data> {
        let directory = self.config.directory.clone();
        tokio::task::spawn_blocking(move || load_directory(&directory))
            .await
            .unwrap_or_else(|e| Err(ConfigError::IoError(e.into())))
    }

    /// Start the background watch loop, publishing snapshots to `data_tx`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyWatching`] if a watch is already active
    /// on this provider, or [`ConfigError::WatchError`] if the directory
    /// cannot be watched. An existing watch is never disturbed.
    pub fn watch(&self, data_tx: mpsc::Sender<Data>) -> Result<JoinHandle<()>> {
        let directory = self.config.directory.clone();
        self.watcher.start(
            &self.config.directory,
            move || load_directory(&directory),
            data_tx,
        )
    }

    /// Returns `true` while a watch handle is installed.
    pub fn is_watching(&self) -> bool {
        self.watcher.is_watching()
    }
}

#[async_trait]
impl Provider for DirectoryProvider {
    async fn provide(&self, data_tx: mpsc::Sender<Data>) -> Result<Data> {
        let data = match self.load_blocking().await {
            Ok(data) => data,
            Err(e) if !self.config.watch => return Err(e),
            Err(e) => {
                warn!(
                    error = %e,
                    dir = %self.config.directory.display(),
                    "initial configuration load failed, waiting for changes"
                );
                Data::empty(self.provider_type())
            }
        };

        if self.config.watch {
            if let Err(e) = self.watch(data_tx) {
                error!(
                    error = %e,
                    provider = %self.provider_type(),
                    dir = %self.config.directory.display(),
                    "failed while watching provider"
                );
            }
        }

        Ok(data)
    }

    fn close(&self) -> Result<()> {
        self.watcher.close();
        Ok(())
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::File
    }
}

/// Read every file under `dir` and deep-merge them into one snapshot.
///
/// # Errors
///
/// Fails if the walk fails or any single file cannot be read or decoded. A
/// failed load never yields a partial snapshot.
pub fn load_directory(dir: &Path) -> Result<Data> {
    let mut config = ConfigMap::new();
    let mut files = 0usize;

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let document = read_document(path).map_err(|e| {
            error!(error = %e, config_path = %path.display(), "failed to read config");
            e.in_file(path)
        })?;

        deep_merge(&mut config, document);
        files += 1;
    }

    debug!(dir = %dir.display(), files, "loaded configuration directory");
    Ok(Data::new(ProviderType::File, config))
}

/// Decode one file, requiring a mapping at the top level.
fn read_document(path: &Path) -> Result<ConfigMap> {
    match read_config_file::<Value>(path)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(ConfigMap::new()),
        other => Err(ConfigError::ParseError(format!(
            "top-level document must be a mapping, found {}",
            describe(&other)
        ))),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Integer(_) | Value::Float(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_config_defaults() {
        let config: FileConfig = serde_yaml::from_str("directory: /etc/app").unwrap();
        assert_eq!(config.directory, PathBuf::from("/etc/app"));
        assert!(!config.watch);
    }

    #[test]
    fn test_file_config_with_watch() {
        let config: FileConfig =
            serde_json::from_str(r#"{"directory": "conf.d", "watch": true}"#).unwrap();
        assert_eq!(config, FileConfig::new("conf.d").with_watch(true));
    }

    #[test]
    fn test_load_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let data = load_directory(temp_dir.path()).unwrap();
        assert!(data.is_empty());
        assert_eq!(data.provider_type(), ProviderType::File);
    }

    #[test]
    fn test_null_document_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.json"), "null").unwrap();
        fs::write(temp_dir.path().join("b.yaml"), "port: 80\n").unwrap();

        let data = load_directory(temp_dir.path()).unwrap();
        assert_eq!(data.get("port").and_then(Value::as_i64), Some(80));
    }

    #[test]
    fn test_non_mapping_document_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("list.yaml");
        fs::write(&path, "- a\n- b\n").unwrap();

        match load_directory(temp_dir.path()) {
            Err(ConfigError::FileError { path: failed, source }) => {
                assert_eq!(failed, path);
                assert!(source.to_string().contains("a sequence"));
            }
            other => panic!("expected FileError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_directory(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(ConfigError::WalkError(_))));
    }

    #[test]
    fn test_provider_load_uses_configured_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("app.json"), r#"{"name": "svc"}"#).unwrap();

        let provider = DirectoryProvider::new(FileConfig::new(temp_dir.path()));
        let data = provider.load().unwrap();
        assert_eq!(data.get("name").and_then(Value::as_str), Some("svc"));
        assert!(!provider.is_watching());
    }

    #[tokio::test]
    async fn test_load_blocking_matches_load() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.yaml"), "server:\n  port: 80\n").unwrap();
        fs::write(temp_dir.path().join("b.json"), r#"{"server": {"host": "h"}}"#).unwrap();

        let provider = DirectoryProvider::new(FileConfig::new(temp_dir.path()));
        assert_eq!(provider.load_blocking().await.unwrap(), provider.load().unwrap());

        let missing = DirectoryProvider::new(FileConfig::new(temp_dir.path().join("missing")));
        assert!(matches!(
            missing.load_blocking().await,
            Err(ConfigError::WalkError(_))
        ));
    }

    #[tokio::test]
    async fn test_close_never_started() {
        let temp_dir = TempDir::new().unwrap();
        let provider = DirectoryProvider::new(FileConfig::new(temp_dir.path()));
        assert!(provider.close().is_ok());
        assert!(provider.close().is_ok());
    }
}
