//! Concrete implementations of the backend traits.
//!
//! Production adapters speak HTTP/SSE; the [`mock`] module provides test
//! doubles with scripted responses and call recording.

pub mod mock;
pub mod reqwest_backend;
pub mod sse_source;

pub use mock::{MockBackend, MockEventSource, RecordedCall};
pub use reqwest_backend::ReqwestBackend;
pub use sse_source::SseEventSource;
