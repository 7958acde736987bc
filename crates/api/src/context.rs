use std::sync::Arc;

use gatehouse_auth::IdentityContext;

/// Request-scoped auth slot, inserted by the auth middleware on every request.
///
/// Empty for anonymous requests. Guards and handlers only read it.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    identity: Option<Arc<IdentityContext>>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(identity: Option<IdentityContext>) -> Self {
        Self {
            identity: identity.map(Arc::new),
        }
    }

    pub fn identity(&self) -> Option<&IdentityContext> {
        self.identity.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}
