//! Directory change notification.
//!
//! Watches a configuration directory and republishes merged snapshots when
//! its files change.

pub mod watcher;

pub use watcher::{ChangeOp, DirectoryWatcher, WatchHandle};
