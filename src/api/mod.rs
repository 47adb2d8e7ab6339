//! JSON-over-HTTP adapter for the grid store.

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{router, serve, serve_with_listener, AppState};
