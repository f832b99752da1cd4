//! Error types for dirconfig.

use std::path::PathBuf;

/// Result type alias for dirconfig operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or watching configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file extension is not one of `json`, `yml` or `yaml`.
    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFileType(PathBuf),

    /// Failed to parse a configuration document.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A single configuration file could not be read or decoded.
    ///
    /// Wraps the underlying failure with the offending path.
    #[error("could not read {}: {source}", .path.display())]
    FileError {
        /// The file that failed
        path: PathBuf,
        /// What went wrong with it
        #[source]
        source: Box<ConfigError>,
    },

    /// Traversing the configuration directory failed.
    #[error("Failed to walk configuration directory: {0}")]
    WalkError(#[from] walkdir::Error),

    /// File watching failed to initialize.
    #[error("File watching error: {0}")]
    WatchError(String),

    /// A watch is already active on this provider.
    #[error("already watching")]
    AlreadyWatching,

    /// Failed to deserialize a snapshot into a typed configuration.
    #[error("Failed to deserialize configuration: {0}")]
    DeserializationError(String),
}

impl ConfigError {
    /// Wrap an error with the path of the file that caused it.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Self::FileError {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_names_path() {
        let err = ConfigError::UnsupportedFileType(PathBuf::from("conf/app.txt"))
            .in_file("conf/app.txt");
        let msg = err.to_string();
        assert!(msg.starts_with("could not read conf/app.txt"));
        assert!(msg.contains("unsupported file type"));
    }

    #[test]
    fn test_already_watching_message() {
        assert_eq!(ConfigError::AlreadyWatching.to_string(), "already watching");
    }
}
