//! Web control panel
//!
//! A small REST API for inspecting and steering the rotation from another
//! device on the network: current broadcast, catalog browsing, exclusion
//! toggles, and live selection settings.

pub mod api;
pub mod server;

pub use api::{ApiResponse, ErrorResponse};
pub use server::{AppState, WebServer};
