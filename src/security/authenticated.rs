//! Wraps an action so it only runs for authenticated requests.
//!
//! For each request:
//! 1. ask the authenticator for a username;
//! 2. if there is none, answer with its fallback and never call the action;
//! 3. otherwise stamp the username onto the context, call the action, and
//!    clear it again once the action's deferred result settles.
//!
//! The username is cleared on every exit path: success, asynchronous failure,
//! synchronous failure from `call`, a panic unwinding out of `call`, and the
//! deferred result being dropped before it settles.

use std::sync::Arc;

use axum::response::Response;
use tower::Layer;

use crate::mvc::{Action, ActionError, DeferredResult, RequestContext};

use super::Authenticator;

/// Action wrapper produced by [`AuthenticatedLayer`] or [`authenticated`].
#[derive(Clone)]
pub struct Authenticated<A> {
    authenticator: Arc<dyn Authenticator>,
    inner: A,
}

impl<A> Authenticated<A> {
    pub fn new(authenticator: Arc<dyn Authenticator>, inner: A) -> Self {
        Self {
            authenticator,
            inner,
        }
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }
}

/// Wrap `action` with `authenticator`.
pub fn authenticated<A: Action>(
    authenticator: Arc<dyn Authenticator>,
    action: A,
) -> Authenticated<A> {
    Authenticated::new(authenticator, action)
}

impl<A: Action> Action for Authenticated<A> {
    fn call(&self, ctx: RequestContext) -> Result<DeferredResult<Response>, ActionError> {
        let username = match self.authenticator.username(&ctx) {
            Ok(Some(name)) => name,
            Ok(None) => {
                tracing::debug!(
                    request_id = %ctx.id(),
                    authenticator = self.authenticator.name(),
                    "request not authenticated"
                );
                return match self.authenticator.on_unauthorized(&ctx) {
                    Ok(fallback) => Ok(DeferredResult::pure(fallback)),
                    Err(err) => Ok(DeferredResult::failed(err)),
                };
            }
            // Nothing has been stamped yet, so there is nothing to undo.
            Err(err) => return Ok(DeferredResult::failed(err)),
        };

        tracing::debug!(
            request_id = %ctx.id(),
            authenticator = self.authenticator.name(),
            username = %username,
            "request authenticated"
        );

        let scope = UsernameScope::enter(ctx.clone(), username);

        match self.inner.call(ctx) {
            Ok(deferred) => Ok(deferred.ensure(move || scope.exit())),
            Err(err) => {
                scope.exit();
                Ok(DeferredResult::failed(err))
            }
        }
    }
}

/// Username stamped on a context; removed on `exit` or drop, whichever comes first.
struct UsernameScope {
    ctx: RequestContext,
}

impl UsernameScope {
    fn enter(ctx: RequestContext, username: String) -> Self {
        ctx.set_username(Some(username));
        Self { ctx }
    }

    fn exit(self) {}
}

impl Drop for UsernameScope {
    fn drop(&mut self) {
        self.ctx.clear_username();
    }
}

/// `tower::Layer` form of [`authenticated`], for use with `ServiceBuilder`.
#[derive(Clone)]
pub struct AuthenticatedLayer {
    authenticator: Arc<dyn Authenticator>,
}

impl AuthenticatedLayer {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self { authenticator }
    }
}

impl<A> Layer<A> for AuthenticatedLayer {
    type Service = Authenticated<A>;

    fn layer(&self, inner: A) -> Self::Service {
        Authenticated::new(self.authenticator.clone(), inner)
    }
}
