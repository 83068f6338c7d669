//! Actions: request handlers that take a `RequestContext` and hand back a
//! `DeferredResult<Response>`.
//!
//! `call` has two failure paths. Returning `Err` means the action failed
//! before producing a deferred result at all; a failed `DeferredResult` means
//! it failed while running asynchronously. Wrappers must handle both.

use std::future::Future;
use std::sync::Arc;

use axum::response::Response;

use super::context::RequestContext;
use super::deferred::DeferredResult;
use super::error::{ActionError, BoxError};

pub trait Action: Send + Sync + 'static {
    fn call(&self, ctx: RequestContext) -> Result<DeferredResult<Response>, ActionError>;
}

pub type BoxAction = Arc<dyn Action>;

impl<A: Action + ?Sized> Action for Arc<A> {
    fn call(&self, ctx: RequestContext) -> Result<DeferredResult<Response>, ActionError> {
        (**self).call(ctx)
    }
}

impl<A: Action + ?Sized> Action for Box<A> {
    fn call(&self, ctx: RequestContext) -> Result<DeferredResult<Response>, ActionError> {
        (**self).call(ctx)
    }
}

/// Action backed by an async function. See [`action_fn`].
#[derive(Clone)]
pub struct ActionFn<F> {
    f: F,
}

/// Turn `async fn(RequestContext) -> Result<Response, E>` into an [`Action`].
///
/// Errors are normalized with [`ActionError::wrap`].
pub fn action_fn<F, Fut, E>(f: F) -> ActionFn<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, E>> + Send + 'static,
    E: Into<BoxError>,
{
    ActionFn { f }
}

impl<F, Fut, E> Action for ActionFn<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, E>> + Send + 'static,
    E: Into<BoxError>,
{
    fn call(&self, ctx: RequestContext) -> Result<DeferredResult<Response>, ActionError> {
        let fut = (self.f)(ctx);
        Ok(DeferredResult::new(async move {
            fut.await.map_err(ActionError::wrap)
        }))
    }
}
