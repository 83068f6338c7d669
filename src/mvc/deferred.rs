//! Single-settlement async result with attachable continuations.
//!
//! `DeferredResult` is a thin wrapper over a boxed `Send` future. It settles
//! once, with either a value or an `ActionError`, and anything chained onto it
//! (`transform`, `map`, `ensure`) runs as part of that settlement, on whatever
//! task/thread polls it to completion.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use super::error::ActionError;

#[must_use = "a DeferredResult does nothing unless awaited"]
pub struct DeferredResult<T> {
    inner: BoxFuture<'static, Result<T, ActionError>>,
}

impl<T> std::fmt::Debug for DeferredResult<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredResult").finish_non_exhaustive()
    }
}

impl<T: Send + 'static> DeferredResult<T> {
    pub fn new<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, ActionError>> + Send + 'static,
    {
        Self { inner: fut.boxed() }
    }

    /// Already settled with `value`.
    pub fn pure(value: T) -> Self {
        Self::new(future::ready(Ok(value)))
    }

    /// Already settled with `err`.
    pub fn failed(err: ActionError) -> Self {
        Self::new(future::ready(Err(err)))
    }

    /// Attach a success and a failure continuation. Exactly one of them runs.
    pub fn transform<U, S, F>(self, on_success: S, on_failure: F) -> DeferredResult<U>
    where
        U: Send + 'static,
        S: FnOnce(T) -> U + Send + 'static,
        F: FnOnce(ActionError) -> ActionError + Send + 'static,
    {
        let inner = self.inner;
        DeferredResult::new(async move {
            match inner.await {
                Ok(value) => Ok(on_success(value)),
                Err(err) => Err(on_failure(err)),
            }
        })
    }

    pub fn map<U, S>(self, f: S) -> DeferredResult<U>
    where
        U: Send + 'static,
        S: FnOnce(T) -> U + Send + 'static,
    {
        self.transform(f, |err| err)
    }

    /// Run `f` once the result settles, whichever way, then forward the outcome unchanged.
    ///
    /// `f` runs before the outcome is handed to the awaiting caller. If this
    /// result is dropped before it settles (cancelled, or unwound by a panic)
    /// `f` runs on drop instead. Either way it runs exactly once.
    pub fn ensure<F>(self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let mut hook = OnSettle(Some(f));
        let inner = self.inner;
        Self::new(async move {
            let outcome = inner.await;
            hook.fire();
            outcome
        })
    }
}

impl<T> Future for DeferredResult<T> {
    type Output = Result<T, ActionError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

struct OnSettle<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> OnSettle<F> {
    fn fire(&mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

impl<F: FnOnce()> Drop for OnSettle<F> {
    fn drop(&mut self) {
        self.fire();
    }
}
