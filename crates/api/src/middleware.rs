use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use stockroom_auth::{
    AuthenticationFailure, AuthorizationPolicy, HttpMethod, JwtVerifier, Principal, RouteAccess,
    TokenVerifier,
};

use crate::app::errors::ApiError;
use crate::config::{ApiConfig, JwtKey};
use crate::context::PrincipalContext;

/// Read-only security configuration shared by every request.
#[derive(Clone)]
pub struct SecurityState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub policy: Arc<AuthorizationPolicy>,
}

impl std::fmt::Debug for SecurityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityState")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl SecurityState {
    pub fn new(verifier: Arc<dyn TokenVerifier>, policy: AuthorizationPolicy) -> Self {
        Self {
            verifier,
            policy: Arc::new(policy),
        }
    }

    pub fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let mut verifier = match &config.jwt_key {
            JwtKey::Secret(secret) => JwtVerifier::hs256(secret.as_bytes()),
            JwtKey::PublicKeyPem(path) => {
                let pem = std::fs::read(path)
                    .with_context(|| format!("failed to read JWT public key {}", path.display()))?;
                JwtVerifier::rs256_pem(&pem).context("JWT public key is not a valid RSA PEM")?
            }
        };
        if let Some(issuer) = &config.jwt_issuer {
            verifier = verifier.with_issuer(issuer);
        }
        if let Some(audience) = &config.jwt_audience {
            verifier = verifier.with_audience(audience);
        }

        Ok(Self::new(Arc::new(verifier), AuthorizationPolicy::products(&config.roles)))
    }
}

/// Authenticate and authorize every request before it reaches a handler.
///
/// Permit-all routes skip token verification. Everything else needs a valid
/// bearer token and a role admitted by the matching policy rule.
pub async fn security_middleware(
    State(state): State<SecurityState>,
    mut req: Request,
    next: Next,
) -> Response {
    let method: HttpMethod = req.method().as_str().parse().unwrap_or(HttpMethod::Other);
    let path = req.uri().path().to_owned();

    if *state.policy.access_for(method, &path) == RouteAccess::PermitAll {
        return next.run(req).await;
    }

    let principal = match authenticate(state.verifier.as_ref(), req.headers()) {
        Ok(p) => p,
        Err(failure) => {
            tracing::debug!(%method, %path, reason = %failure, "authentication failed");
            return ApiError::from(failure).into_response();
        }
    };

    if let Err(e) = state.policy.authorize(method, &path, Some(principal.roles())) {
        tracing::warn!(
            %method,
            %path,
            subject = principal.subject().unwrap_or("unknown"),
            "access denied"
        );
        return ApiError::from(e).into_response();
    }

    req.extensions_mut().insert(PrincipalContext::new(principal));
    next.run(req).await
}

fn authenticate(
    verifier: &dyn TokenVerifier,
    headers: &HeaderMap,
) -> Result<Principal, AuthenticationFailure> {
    let token = extract_bearer(headers)?;
    let claims = verifier.verify(token)?;
    Ok(Principal::from_claims(&claims))
}

/// Bearer token from the `Authorization` header.
///
/// No header, or a non-bearer scheme, means no credentials were presented.
fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthenticationFailure> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthenticationFailure::Missing)?;

    let header = header.to_str().map_err(|_| AuthenticationFailure::Missing)?;

    let (scheme, token) = header.split_once(' ').unwrap_or((header, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthenticationFailure::Missing);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthenticationFailure::Invalid("bearer token is empty".to_string()));
    }

    Ok(token)
}
