//! Employee record service: HTTP surface and runtime configuration.

pub mod config;
pub mod http;

pub use config::AppConfig;
pub use http::{AppState, ServeConfig, build_router, serve};
