use crate::{JwtClaims, RoleSet};

/// Authenticated caller of a single request.
///
/// Built once from verified claims; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject: Option<String>,
    roles: RoleSet,
}

impl Principal {
    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self {
            subject: claims.sub.clone(),
            roles: claims.roles(),
        }
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }
}
