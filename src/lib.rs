//! weft - a terminal client for multi-workspace agent conversations
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod prediction;
pub mod prelude;
pub mod router;
pub mod rows;
pub mod store;
pub mod terminal;
pub mod traits;
pub mod ui;
