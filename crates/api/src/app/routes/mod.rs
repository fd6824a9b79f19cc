use axum::Router;
use axum::extract::OriginalUri;
use axum::http::Method;

use stockroom_core::DomainError;

use crate::app::errors::ApiError;

pub mod products;
pub mod system;

/// Router for every endpoint behind the security layer.
pub fn router() -> Router {
    Router::new().nest("/products", products::router())
}

/// Fallback for a known path hit with a method it does not serve.
pub async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    DomainError::method_not_allowed(method.as_str(), uri.path()).into()
}
