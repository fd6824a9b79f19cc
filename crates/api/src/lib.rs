//! HTTP API: server, routing, security pipeline, and error mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
