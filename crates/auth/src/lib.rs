//! `stockroom-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it reads verified
//! token claims, derives the caller's roles, and evaluates the route policy.

pub mod claims;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod token;

pub use claims::{JwtClaims, extract_roles};
pub use policy::{
    AccessError, AuthorizationPolicy, AuthorizationRule, HttpMethod, PathPattern, RoleNames,
    RouteAccess,
};
pub use principal::Principal;
pub use roles::{Role, RoleSet};
pub use token::{AuthenticationFailure, JwtVerifier, TokenVerifier};
