//! Core configuration types: values, merging and snapshots.

mod data;
mod value;

pub use data::{Data, ProviderType};
pub use value::{ConfigMap, Value, deep_merge};
