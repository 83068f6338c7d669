/*
 * Responsibility
 * - Action (handler) の実行モデル: RequestContext -> DeferredResult<Response>
 * - 認証などの横断的な処理はこの上に Layer として被せる
 */
pub mod action;
pub mod context;
pub mod deferred;
pub mod error;
pub mod results;

pub use action::{Action, ActionFn, BoxAction, action_fn};
pub use context::{RequestContext, Session, USERNAME};
pub use deferred::DeferredResult;
pub use error::{ActionError, BoxError};
