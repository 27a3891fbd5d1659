//! Event stream adapter over Server-Sent Events.

use async_trait::async_trait;
use eventsource_client as es;
use es::Client;
use futures::stream::BoxStream;
use futures_util::StreamExt;

use crate::error::{BackendError, BackendResult};
use crate::events::ServerEvent;
use crate::traits::EventSource;

/// SSE-backed event source.
///
/// Preserves arrival order exactly: each SSE event maps to one
/// [`ServerEvent`], comments are skipped, and transport errors surface to
/// the caller instead of being retried here (reconnection is owned by an
/// outer layer).
pub struct SseEventSource {
    stream: BoxStream<'static, Result<es::SSE, es::Error>>,
}

impl SseEventSource {
    /// Connect to the backend's event stream endpoint.
    pub fn connect(url: &str) -> BackendResult<Self> {
        let client = es::ClientBuilder::for_url(url)
            .map_err(|e| BackendError::Connection(e.to_string()))?
            .build();
        Ok(Self {
            stream: client.stream(),
        })
    }
}

#[async_trait]
impl EventSource for SseEventSource {
    async fn next_event(&mut self) -> BackendResult<Option<ServerEvent>> {
        loop {
            match self.stream.next().await {
                None => return Ok(None),
                Some(Ok(es::SSE::Event(event))) => {
                    return Ok(Some(ServerEvent::parse(&event.event_type, &event.data)));
                }
                // Comments / keepalives carry no payload.
                Some(Ok(_)) => continue,
                Some(Err(err)) => return Err(BackendError::Stream(err.to_string())),
            }
        }
    }
}
