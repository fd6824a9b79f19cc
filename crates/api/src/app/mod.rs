//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repository and event bus selection
//! - `routes/`: HTTP routes + handlers
//! - `errors.rs`: failure-to-response translation

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use stockroom_core::DomainError;

use crate::config::ApiConfig;
use crate::middleware::{self, SecurityState};

pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let security = SecurityState::from_config(config)?;
    let services = Arc::new(services::build_services(config).await?);
    Ok(router(services, security))
}

/// Router over already-built services.
///
/// The security layer wraps everything, including the fallback, so unknown
/// paths are still subject to the catch-all deny rule.
pub fn router(services: Arc<services::AppServices>, security: SecurityState) -> Router {
    Router::new()
        .route(
            "/actuator/health",
            get(routes::system::health).fallback(routes::method_not_allowed),
        )
        .merge(routes::router())
        .fallback(not_found)
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            security,
            middleware::security_middleware,
        ))
}

async fn not_found() -> errors::ApiError {
    DomainError::not_found("no such route").into()
}
