use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Role, RoleSet};

/// Claim holding realm-level access grants.
pub const REALM_ACCESS_CLAIM: &str = "realm_access";

/// Entry of [`REALM_ACCESS_CLAIM`] that lists role names.
pub const ROLES_ENTRY: &str = "roles";

/// Claims of a bearer token that has already been verified.
///
/// Only the registered claims the service uses are typed; everything else
/// (including `realm_access`) stays in `extra` as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / principal identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (seconds since the epoch).
    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Remaining claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JwtClaims {
    /// Roles granted through `realm_access.roles`.
    pub fn roles(&self) -> RoleSet {
        extract_roles(&self.extra)
    }
}

/// Extract the caller's roles from a verified claim set.
///
/// Total: a missing `realm_access`, a missing `roles` entry, or a value of the
/// wrong type at either step yields an empty set. Non-string entries are skipped.
pub fn extract_roles(claims: &Map<String, Value>) -> RoleSet {
    let Some(Value::Object(realm_access)) = claims.get(REALM_ACCESS_CLAIM) else {
        return RoleSet::empty();
    };

    let Some(Value::Array(roles)) = realm_access.get(ROLES_ENTRY) else {
        return RoleSet::empty();
    };

    roles
        .iter()
        .filter_map(Value::as_str)
        .map(|name| Role::new(name.to_owned()))
        .collect()
}
