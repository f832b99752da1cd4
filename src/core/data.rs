//! Configuration snapshots handed out by providers.

use crate::core::value::{ConfigMap, Value};
use crate::error::{ConfigError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies which kind of provider produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ProviderType {
    /// Files read from a configuration directory.
    #[default]
    File,
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
        }
    }
}

/// One fully merged configuration snapshot.
///
/// Snapshots are produced fresh on every load and never mutated afterwards;
/// receivers take ownership of them.
///
/// # Examples
///
/// ```rust
/// use dirconfig::core::{ConfigMap, Data, ProviderType, Value};
///
/// let mut config = ConfigMap::new();
/// config.insert("port".to_string(), Value::Integer(8080));
///
/// let data = Data::new(ProviderType::File, config);
/// assert_eq!(data.get("port").and_then(Value::as_i64), Some(8080));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Data {
    provider_type: ProviderType,
    config: ConfigMap,
}

impl Data {
    /// Create a snapshot from a provider tag and its merged payload.
    pub fn new(provider_type: ProviderType, config: ConfigMap) -> Self {
        Self {
            provider_type,
            config,
        }
    }

    /// An empty snapshot for the given provider.
    pub fn empty(provider_type: ProviderType) -> Self {
        Self::new(provider_type, ConfigMap::new())
    }

    /// The provider that produced this snapshot.
    pub fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    /// The merged configuration tree.
    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    /// Consume the snapshot, returning the merged configuration tree.
    pub fn into_config(self) -> ConfigMap {
        self.config
    }

    /// Look up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    /// Returns `true` if the snapshot carries no configuration.
    pub fn is_empty(&self) -> bool {
        self.config.is_empty()
    }

    /// Deserialize the snapshot into a typed configuration struct.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DeserializationError`] if the tree does not
    /// match the shape of `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dirconfig::core::{ConfigMap, Data, ProviderType, Value};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct AppConfig {
    ///     port: u16,
    /// }
    ///
    /// let mut config = ConfigMap::new();
    /// config.insert("port".to_string(), Value::Integer(8080));
    ///
    /// let app: AppConfig = Data::new(ProviderType::File, config).deserialize_into().unwrap();
    /// assert_eq!(app.port, 8080);
    /// ```
    pub fn deserialize_into<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let tree = serde_json::to_value(&self.config)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        serde_json::from_value(tree).map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }
}
