//! Route authorization policy.
//!
//! An ordered, data-driven list of `(method, path pattern) -> access` rules,
//! evaluated top to bottom; the first matching rule decides. The list always ends
//! in a catch-all deny, so every request has exactly one outcome.
//!
//! - No IO
//! - No panics
//! - No HTTP framework types (methods and paths are plain values)

use core::str::FromStr;

use thiserror::Error;

use stockroom_core::DomainError;

use crate::{Role, RoleSet};

/// HTTP method as seen by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    /// Any method the policy has no dedicated variant for.
    Other,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Other => "OTHER",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = core::convert::Infallible;

    /// Method names are case-sensitive: `get` is an unknown method, not `GET`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            _ => Self::Other,
        })
    }
}

impl core::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*`: exactly one segment.
    One,
    /// `**`: zero or more segments.
    Rest,
}

/// Ant-style path pattern: `/products`, `/products/*`, `/actuator/**`.
///
/// Empty segments are ignored on both sides, so `/products/` matches `/products`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "*" => Segment::One,
                "**" => Segment::Rest,
                lit => Segment::Literal(lit.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Pattern matching every path.
    pub fn any() -> Self {
        Self::new("/**")
    }

    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        // Dot segments never match, so `/actuator/../products` cannot borrow a permit-all rule.
        if parts.iter().any(|p| *p == "." || *p == "..") {
            return false;
        }
        match_segments(&self.segments, &parts)
    }

    fn is_catch_all(&self) -> bool {
        self.segments == [Segment::Rest]
    }
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::Rest, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((Segment::One, rest)) => !path.is_empty() && match_segments(rest, &path[1..]),
        Some((Segment::Literal(lit), rest)) => {
            path.first().is_some_and(|p| p == lit) && match_segments(rest, &path[1..])
        }
    }
}

/// What a matched rule grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    /// No authentication needed.
    PermitAll,
    /// Authenticated callers holding at least one of these roles.
    AnyRole(Vec<Role>),
    /// Nobody.
    DenyAll,
}

static DENY_ALL: RouteAccess = RouteAccess::DenyAll;

/// One row of the policy table. `method: None` matches every method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRule {
    pub method: Option<HttpMethod>,
    pub pattern: PathPattern,
    pub access: RouteAccess,
}

impl AuthorizationRule {
    pub fn new(method: HttpMethod, pattern: &str, access: RouteAccess) -> Self {
        Self {
            method: Some(method),
            pattern: PathPattern::new(pattern),
            access,
        }
    }

    /// Rule applying to every method.
    pub fn any_method(pattern: &str, access: RouteAccess) -> Self {
        Self {
            method: None,
            pattern: PathPattern::new(pattern),
            access,
        }
    }

    pub fn matches(&self, method: HttpMethod, path: &str) -> bool {
        self.method.is_none_or(|m| m == method) && self.pattern.matches(path)
    }

    fn is_catch_all_deny(&self) -> bool {
        self.method.is_none() && self.pattern.is_catch_all() && self.access == RouteAccess::DenyAll
    }
}

/// Externally configured names of the two product roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleNames {
    pub admin: Role,
    pub user: Role,
}

impl RoleNames {
    pub fn new(admin: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            admin: Role::new(admin.into()),
            user: Role::new(user.into()),
        }
    }
}

impl Default for RoleNames {
    fn default() -> Self {
        Self {
            admin: Role::new("ADMIN"),
            user: Role::new("USER"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The route needs a principal and none was presented.
    #[error("authentication required")]
    AuthenticationRequired,

    /// Authenticated, but the matched rule does not admit the caller.
    #[error("{0}")]
    Denied(String),
}

impl From<AccessError> for DomainError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::AuthenticationRequired => DomainError::authentication_required(),
            AccessError::Denied(detail) => DomainError::access_denied(detail),
        }
    }
}

/// Ordered rule list, total by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationPolicy {
    rules: Vec<AuthorizationRule>,
}

impl AuthorizationPolicy {
    /// Build a policy from `rules`, appending a catch-all deny unless the list
    /// already ends with one.
    pub fn new(mut rules: Vec<AuthorizationRule>) -> Self {
        if !rules.last().is_some_and(AuthorizationRule::is_catch_all_deny) {
            rules.push(AuthorizationRule {
                method: None,
                pattern: PathPattern::any(),
                access: RouteAccess::DenyAll,
            });
        }
        Self { rules }
    }

    /// Policy for the product service.
    pub fn products(roles: &RoleNames) -> Self {
        let admin = || RouteAccess::AnyRole(vec![roles.admin.clone()]);
        let reader = || RouteAccess::AnyRole(vec![roles.admin.clone(), roles.user.clone()]);

        Self::new(vec![
            AuthorizationRule::any_method("/actuator/**", RouteAccess::PermitAll),
            AuthorizationRule::new(HttpMethod::Post, "/products", admin()),
            AuthorizationRule::new(HttpMethod::Patch, "/products/*/price", admin()),
            AuthorizationRule::new(HttpMethod::Delete, "/products/*", admin()),
            AuthorizationRule::new(HttpMethod::Get, "/products", reader()),
            AuthorizationRule::new(HttpMethod::Get, "/products/*", reader()),
            AuthorizationRule::any_method("/**", RouteAccess::DenyAll),
        ])
    }

    pub fn rules(&self) -> &[AuthorizationRule] {
        &self.rules
    }

    /// Access granted by the first rule matching `method` and `path`.
    pub fn access_for(&self, method: HttpMethod, path: &str) -> &RouteAccess {
        self.rules
            .iter()
            .find(|r| r.matches(method, path))
            .map(|r| &r.access)
            .unwrap_or(&DENY_ALL)
    }

    /// Decide a request. `caller` is `None` when no principal was authenticated.
    pub fn authorize(
        &self,
        method: HttpMethod,
        path: &str,
        caller: Option<&RoleSet>,
    ) -> Result<(), AccessError> {
        let access = self.access_for(method, path);
        if *access == RouteAccess::PermitAll {
            return Ok(());
        }

        let Some(roles) = caller else {
            return Err(AccessError::AuthenticationRequired);
        };

        let decision = match access {
            RouteAccess::PermitAll => Ok(()),
            RouteAccess::AnyRole(required) if roles.contains_any(required) => Ok(()),
            RouteAccess::AnyRole(required) => Err(AccessError::Denied(format!(
                "{method} {path} requires one of [{}]",
                required.iter().map(Role::as_str).collect::<Vec<_>>().join(", ")
            ))),
            RouteAccess::DenyAll => Err(AccessError::Denied(format!(
                "{method} {path} is not permitted"
            ))),
        };

        if let Err(AccessError::Denied(detail)) = &decision {
            tracing::debug!(roles = ?roles.sorted_names(), %detail, "access denied");
        }
        decision
    }
}
