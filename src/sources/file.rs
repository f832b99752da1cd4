//! Decoding of individual configuration files.

use crate::error::{ConfigError, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// `.json`
    Json,
    /// `.yml` or `.yaml`
    Yaml,
}

impl FileFormat {
    /// Detect the format from a file extension.
    ///
    /// Matching is case-sensitive: `.json`, `.yml` and `.yaml` are recognized.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFileType`] for any other extension,
    /// including a missing one.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yml" | "yaml") => Ok(Self::Yaml),
            _ => Err(ConfigError::UnsupportedFileType(path.to_path_buf())),
        }
    }

    /// Decode raw bytes in this format.
    pub fn decode<T>(self, bytes: &[u8]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        match self {
            Self::Json => serde_json::from_slice(bytes)
                .map_err(|e| ConfigError::ParseError(format!("invalid JSON: {}", e))),
            Self::Yaml => serde_yaml::from_slice(bytes)
                .map_err(|e| ConfigError::ParseError(format!("invalid YAML: {}", e))),
        }
    }
}

/// Read a configuration file and decode it according to its extension.
///
/// This is the same helper the directory provider uses for every file it
/// visits, usable on its own for single files.
///
/// # Errors
///
/// Returns an error if the extension is not supported, the file cannot be
/// read, or its content does not decode into `T`.
///
/// # Examples
///
/// ```rust,no_run
/// use dirconfig::sources::read_config_file;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct ServerConfig {
///     port: u16,
/// }
///
/// let server: ServerConfig = read_config_file("config/server.yaml")?;
/// # Ok::<(), dirconfig::error::ConfigError>(())
/// ```
pub fn read_config_file<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;
    let bytes = fs::read(path)?;
    format.decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConfigMap, Value};
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_format_json() {
        assert_eq!(FileFormat::from_path(Path::new("a.json")).unwrap(), FileFormat::Json);
    }

    #[test]
    fn test_format_yaml() {
        assert_eq!(FileFormat::from_path(Path::new("a.yaml")).unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path(Path::new("a.yml")).unwrap(), FileFormat::Yaml);
    }

    #[test]
    fn test_format_unknown() {
        for name in ["a.txt", "a.toml", "a.JSON", "Makefile", ".yaml"] {
            let result = FileFormat::from_path(Path::new(name));
            assert!(
                matches!(result, Err(ConfigError::UnsupportedFileType(_))),
                "{} should be unsupported",
                name
            );
        }
    }

    #[test]
    fn test_read_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("server.json");
        fs::write(&path, r#"{"server": {"port": 8080}}"#).unwrap();

        let config: ConfigMap = read_config_file(&path).unwrap();
        assert_eq!(
            config["server"].get("port").and_then(Value::as_i64),
            Some(8080)
        );
    }

    #[test]
    fn test_read_yaml_into_typed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("limits.yml");
        fs::write(&path, "max: 10\nmin: 2\n").unwrap();

        let limits: HashMap<String, u32> = read_config_file(&path).unwrap();
        assert_eq!(limits["max"], 10);
        assert_eq!(limits["min"], 2);
    }

    #[test]
    fn test_read_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{\"server\": ").unwrap();

        let result: Result<ConfigMap> = read_config_file(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_read_missing_file() {
        let result: Result<ConfigMap> = read_config_file("/nonexistent/config.yaml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
