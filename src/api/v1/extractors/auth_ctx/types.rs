/*
 * Responsibility
 * - The "authenticated caller" types handlers see
 * - The access middleware fills SecurityContext and stores it in request extensions;
 *   handlers only ever read it
 *
 * Notes
 * - Token verification and the credential lookup live in middleware/services
 * - One SecurityContext per request (it travels with the request, never a global)
 */

use crate::services::auth::Principal;

/// Authenticated caller of the current request.
///
/// - `username` is the token subject
/// - `authorities` come from the credential store on every request, never from the token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: i64,
    pub username: String,
    pub authorities: Vec<String>,
}

impl From<Principal> for AuthCtx {
    fn from(p: Principal) -> Self {
        Self {
            user_id: p.user_id,
            username: p.username,
            authorities: p.authorities,
        }
    }
}

/// Request-scoped slot: empty (anonymous) or one authenticated caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    current: Option<AuthCtx>,
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn set(&mut self, ctx: AuthCtx) {
        self.current = Some(ctx);
    }

    pub fn get(&self) -> Option<&AuthCtx> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yasmin() -> AuthCtx {
        AuthCtx {
            user_id: 1,
            username: "yasmin".to_string(),
            authorities: Vec::new(),
        }
    }

    #[test]
    fn starts_empty() {
        let ctx = SecurityContext::anonymous();
        assert!(ctx.get().is_none());
    }

    #[test]
    fn set_get_clear() {
        let mut ctx = SecurityContext::anonymous();
        ctx.set(yasmin());
        assert_eq!(ctx.get().map(|c| c.username.as_str()), Some("yasmin"));

        ctx.clear();
        assert_eq!(ctx, SecurityContext::anonymous());
    }

    #[test]
    fn instances_are_independent() {
        let mut a = SecurityContext::anonymous();
        let b = SecurityContext::anonymous();
        a.set(yasmin());
        assert!(a.get().is_some());
        assert!(b.get().is_none());
    }
}
