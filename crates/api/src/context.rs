use stockroom_auth::Principal;

/// Principal context for a request (authenticated identity).
///
/// Inserted by the security middleware once the request has been authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    /// Token subject, or `"unknown"` when the token carried none.
    pub fn subject(&self) -> &str {
        self.principal.subject().unwrap_or("unknown")
    }
}
