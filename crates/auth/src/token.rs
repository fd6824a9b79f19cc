//! Bearer token verification.
//!
//! Verification (signature, expiry, issuer) happens here; role extraction only
//! ever sees claims that passed it.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use thiserror::Error;

use stockroom_core::{DomainError, ErrorKind};

use crate::JwtClaims;

/// Why a request could not be authenticated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticationFailure {
    /// No bearer token was presented.
    #[error("bearer token missing")]
    Missing,

    #[error("token has expired")]
    Expired,

    #[error("token is invalid: {0}")]
    Invalid(String),

    /// A verifier that only reports a message; see [`classify_message`].
    #[error("{0}")]
    Rejected(String),
}

impl AuthenticationFailure {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Missing => ErrorKind::AuthenticationRequired,
            Self::Expired => ErrorKind::TokenExpired,
            Self::Invalid(_) => ErrorKind::TokenInvalid,
            Self::Rejected(message) => classify_message(message),
        }
    }
}

impl From<AuthenticationFailure> for DomainError {
    fn from(failure: AuthenticationFailure) -> Self {
        DomainError::new(failure.kind())
    }
}

/// Refine an untyped verifier message: mentions of "expired" win over "invalid";
/// anything else means authentication is simply required.
pub fn classify_message(message: &str) -> ErrorKind {
    let message = message.to_ascii_lowercase();
    if message.contains("expired") {
        ErrorKind::TokenExpired
    } else if message.contains("invalid") {
        ErrorKind::TokenInvalid
    } else {
        ErrorKind::AuthenticationRequired
    }
}

/// Token verification contract used by the API layer.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<JwtClaims, AuthenticationFailure>;
}

/// JWT verifier backed by `jsonwebtoken`.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl core::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("issuer", &self.validation.iss)
            .finish_non_exhaustive()
    }
}

impl JwtVerifier {
    /// Shared-secret (HS256) verifier.
    pub fn hs256(secret: &[u8]) -> Self {
        Self::with_key(DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    /// Public-key (RS256) verifier from a PEM document.
    pub fn rs256_pem(pem: &[u8]) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self::with_key(DecodingKey::from_rsa_pem(pem)?, Algorithm::RS256))
    }

    fn with_key(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        // Audience is only checked when one is configured.
        validation.validate_aud = false;
        Self { key, validation }
    }

    /// Require the `iss` claim to equal `issuer`.
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    /// Require the `aud` claim to contain `audience`.
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<JwtClaims, AuthenticationFailure> {
        decode::<JwtClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AuthenticationFailure::Expired,
                _ => AuthenticationFailure::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    const SECRET: &[u8] = b"test-secret";
    const RSA_PRIVATE: &[u8] = include_bytes!("../tests/fixtures/rs256_private.pem");
    const RSA_PUBLIC: &[u8] = include_bytes!("../tests/fixtures/rs256_public.pem");

    fn mint_rs256(claims: serde_json::Value) -> String {
        let key = EncodingKey::from_rsa_pem(RSA_PRIVATE).expect("fixture private key");
        encode(&Header::new(Algorithm::RS256), &claims, &key).expect("failed to encode jwt")
    }

    fn mint(claims: serde_json::Value, secret: &[u8]) -> String {
        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret))
            .expect("failed to encode jwt")
    }

    fn exp_in(minutes: i64) -> i64 {
        (Utc::now() + Duration::minutes(minutes)).timestamp()
    }

    #[test]
    fn valid_token_yields_claims_and_roles() {
        let token = mint(
            json!({ "sub": "u-1", "exp": exp_in(10), "realm_access": { "roles": ["USER"] } }),
            SECRET,
        );
        let claims = JwtVerifier::hs256(SECRET).verify(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("u-1"));
        assert_eq!(claims.roles().sorted_names(), vec!["USER"]);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let token = mint(json!({ "sub": "u-1", "exp": exp_in(-10) }), SECRET);
        let err = JwtVerifier::hs256(SECRET).verify(&token).unwrap_err();
        assert_eq!(err, AuthenticationFailure::Expired);
        assert_eq!(err.kind(), ErrorKind::TokenExpired);
    }

    #[test]
    fn wrong_signature_is_invalid() {
        let token = mint(json!({ "sub": "u-1", "exp": exp_in(10) }), b"other-secret");
        let err = JwtVerifier::hs256(SECRET).verify(&token).unwrap_err();
        assert!(matches!(err, AuthenticationFailure::Invalid(_)));
        assert_eq!(err.kind(), ErrorKind::TokenInvalid);
    }

    #[test]
    fn garbage_is_invalid() {
        let err = JwtVerifier::hs256(SECRET).verify("not-a-jwt").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TokenInvalid);
    }

    #[test]
    fn issuer_is_enforced_when_configured() {
        let verifier = JwtVerifier::hs256(SECRET).with_issuer("https://idp.example/realms/store");
        let good = mint(
            json!({ "exp": exp_in(10), "iss": "https://idp.example/realms/store" }),
            SECRET,
        );
        let bad = mint(json!({ "exp": exp_in(10), "iss": "https://elsewhere" }), SECRET);
        assert!(verifier.verify(&good).is_ok());
        assert_eq!(verifier.verify(&bad).unwrap_err().kind(), ErrorKind::TokenInvalid);
    }

    #[test]
    fn audience_is_ignored_unless_configured() {
        let token = mint(json!({ "exp": exp_in(10), "aud": "account" }), SECRET);
        assert!(JwtVerifier::hs256(SECRET).verify(&token).is_ok());
        assert!(JwtVerifier::hs256(SECRET).with_audience("store-api").verify(&token).is_err());
    }

    #[test]
    fn rs256_token_verifies_against_public_key() {
        let verifier = JwtVerifier::rs256_pem(RSA_PUBLIC).unwrap();
        let token = mint_rs256(json!({
            "sub": "u-2",
            "exp": exp_in(10),
            "realm_access": { "roles": ["ADMIN", "USER"] },
        }));

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("u-2"));
        assert_eq!(claims.roles().sorted_names(), vec!["ADMIN", "USER"]);
    }

    #[test]
    fn rs256_verifier_reports_expiry_and_rejects_hs256() {
        let verifier = JwtVerifier::rs256_pem(RSA_PUBLIC).unwrap();

        let expired = mint_rs256(json!({ "exp": exp_in(-10) }));
        assert_eq!(verifier.verify(&expired).unwrap_err(), AuthenticationFailure::Expired);

        let hs = mint(json!({ "exp": exp_in(10) }), SECRET);
        assert_eq!(verifier.verify(&hs).unwrap_err().kind(), ErrorKind::TokenInvalid);
    }

    #[test]
    fn malformed_pem_is_rejected() {
        assert!(JwtVerifier::rs256_pem(b"not a pem").is_err());
    }

    #[test]
    fn untyped_messages_are_classified() {
        assert_eq!(classify_message("Jwt expired at 2024-01-01"), ErrorKind::TokenExpired);
        assert_eq!(classify_message("An error occurred: Invalid signature"), ErrorKind::TokenInvalid);
        assert_eq!(classify_message("Full authentication is required"), ErrorKind::AuthenticationRequired);
        assert_eq!(
            AuthenticationFailure::Rejected("token expired".into()).kind(),
            ErrorKind::TokenExpired
        );
    }

    #[test]
    fn failures_become_unauthorized_domain_errors() {
        for failure in [
            AuthenticationFailure::Missing,
            AuthenticationFailure::Expired,
            AuthenticationFailure::Invalid("bad".into()),
            AuthenticationFailure::Rejected("nope".into()),
        ] {
            let err: DomainError = failure.into();
            assert_eq!(err.status(), 401);
        }
    }
}
