//! Pluggable identity extraction.
//!
//! An `Authenticator` decides who (if anyone) is making a request and what to
//! answer when nobody is. Both methods have defaults, so the built-in
//! [`SessionAuthenticator`] is just the empty impl.

use axum::response::Response;

use crate::mvc::{ActionError, RequestContext, USERNAME, results};

/// Shared across concurrent requests; implementations holding mutable state
/// synchronize it themselves.
pub trait Authenticator: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns `None` when the request is not authenticated.
    ///
    /// Default: the `username` session key.
    fn username(&self, ctx: &RequestContext) -> Result<Option<String>, ActionError> {
        Ok(ctx.session().get(USERNAME).map(ToOwned::to_owned))
    }

    /// Response sent instead of running the action when `username` is `None`.
    ///
    /// Default: `401 Unauthorized`.
    fn on_unauthorized(&self, _ctx: &RequestContext) -> Result<Response, ActionError> {
        Ok(results::unauthorized())
    }
}

/// Reads the user from the session and answers 401 otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionAuthenticator;

impl Authenticator for SessionAuthenticator {
    fn name(&self) -> &'static str {
        "session"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mvc::Session;
    use axum::http::StatusCode;

    #[test]
    fn reads_username_from_session() {
        let ctx = RequestContext::with_session([("username", "alice")].into_iter().collect());
        let name = SessionAuthenticator.username(&ctx).unwrap();
        assert_eq!(name.as_deref(), Some("alice"));
    }

    #[test]
    fn empty_session_is_unauthenticated() {
        let ctx = RequestContext::with_session(Session::new());
        assert_eq!(SessionAuthenticator.username(&ctx).unwrap(), None);
    }

    #[test]
    fn ignores_unrelated_session_keys() {
        let ctx = RequestContext::with_session([("user", "alice")].into_iter().collect());
        assert_eq!(SessionAuthenticator.username(&ctx).unwrap(), None);
    }

    #[test]
    fn default_fallback_is_401() {
        let ctx = RequestContext::with_session(Session::new());
        let res = SessionAuthenticator.on_unauthorized(&ctx).unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
