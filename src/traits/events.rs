//! Push event stream trait.

use async_trait::async_trait;

use crate::error::BackendResult;
use crate::events::ServerEvent;

/// A pull interface over the backend's push stream.
///
/// Implementations must yield events strictly in arrival order; the store's
/// turn gating depends on causal order. `Ok(None)` means the stream ended.
#[async_trait]
pub trait EventSource: Send {
    async fn next_event(&mut self) -> BackendResult<Option<ServerEvent>>;
}
