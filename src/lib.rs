pub mod api;
pub mod client;
pub mod config;
pub mod engine;
pub mod seed;
pub mod telemetry;

pub use crate::config::AppConfig;
pub use engine::{Grid, GridError, GridPolicy, GridStore};
