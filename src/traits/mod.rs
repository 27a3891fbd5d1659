//! Trait abstractions over the backend collaborators.
//!
//! The core never talks to a network directly; it goes through these traits
//! so tests can inject mocks and the production adapters stay swappable.

mod backend;
mod events;

pub use backend::ThreadBackend;
pub use events::EventSource;
