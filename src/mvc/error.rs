/*
 * Responsibility
 * - リクエスト単位の失敗を表す ActionError
 * - handler / authenticator から返る任意のエラーを一つの形にまとめる
 *   (既に ActionError なら分類をそのまま保持する)
 */
use thiserror::Error;

use crate::services::session::SessionError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure observed by whoever awaits an action's `DeferredResult`.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// Any other failure. The original error stays reachable through `source()`.
    #[error("action failed: {0}")]
    Runtime(#[source] BoxError),
}

impl ActionError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Brings an arbitrary error into the uniform failure shape.
    ///
    /// An error that already is an `ActionError` is returned as-is; anything
    /// else becomes `Runtime` with the original kept as its source.
    pub fn wrap(err: impl Into<BoxError>) -> Self {
        let boxed: BoxError = err.into();
        match boxed.downcast::<ActionError>() {
            Ok(action_err) => *action_err,
            Err(other) => Self::Runtime(other),
        }
    }

    /// Returns the wrapped error if it is of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Runtime(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}
