//! Process-wide default client
//!
//! Prefer constructing a [`BatchClient`] and passing it where it is needed.
//! The default instance exists for call sites with no injection point and
//! can be replaced or discarded, mainly for test isolation.

use super::config::ClientConfig;
use super::errors::Result;
use super::BatchClient;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

static DEFAULT_CLIENT: Lazy<RwLock<Option<BatchClient>>> = Lazy::new(|| RwLock::new(None));

/// Get the default client, building it from `ClientConfig::default()` on first use
pub fn default_client() -> Result<BatchClient> {
    if let Some(client) = DEFAULT_CLIENT.read().as_ref() {
        return Ok(client.clone());
    }

    let mut slot = DEFAULT_CLIENT.write();
    match slot.as_ref() {
        Some(client) => Ok(client.clone()),
        None => {
            let client = BatchClient::new(ClientConfig::default())?;
            *slot = Some(client.clone());
            Ok(client)
        }
    }
}

/// Replace the default client, returning the previous one
pub fn set_default_client(client: BatchClient) -> Option<BatchClient> {
    DEFAULT_CLIENT.write().replace(client)
}

/// Discard the default client; the next `default_client()` builds a fresh one
pub fn reset_default_client() {
    DEFAULT_CLIENT.write().take();
}
