//! Provider trait.

use crate::core::{Data, ProviderType};
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Trait for configuration providers.
///
/// A provider hands back an initial snapshot and may keep pushing fresh
/// snapshots onto a channel owned by the caller. Implement this trait to add
/// other sources (environment variables, remote stores) alongside the
/// directory provider.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Load the initial snapshot and, if the provider supports it, start
    /// publishing updates to `data_tx`.
    ///
    /// The provider writes to `data_tx` but never closes it. A bounded channel
    /// of small capacity makes slow consumers throttle the provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial load fails and the provider will not
    /// produce any further data.
    async fn provide(&self, data_tx: mpsc::Sender<Data>) -> Result<Data>;

    /// Stop publishing updates and release any background resources.
    ///
    /// Must be safe to call on a provider that was never started, and more
    /// than once.
    fn close(&self) -> Result<()>;

    /// The tag attached to every snapshot this provider produces.
    fn provider_type(&self) -> ProviderType;
}
