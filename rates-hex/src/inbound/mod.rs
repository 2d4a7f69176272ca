//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that exposes the rate cache.

mod handlers;
mod server;

pub use server::HttpServer;
