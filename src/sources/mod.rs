//! Configuration provider implementations.

mod directory;
mod file;
mod provider;

pub use directory::{DirectoryProvider, FileConfig, load_directory};
pub use file::{FileFormat, read_config_file};
pub use provider::Provider;
