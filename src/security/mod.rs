/*
 * Responsibility
 * - 認証 (Authentication) のみを扱う。認可 (role/permission) は対象外
 * - Authenticator: username の取り出し方と、未認証時のレスポンスを差し替え可能にする
 * - Authenticated: Action を包み、実行中だけ username を RequestContext に載せる
 */
pub mod authenticated;
pub mod authenticator;
pub mod bearer;
pub mod factory;
pub mod redirect;

pub use authenticated::{Authenticated, AuthenticatedLayer, authenticated};
pub use authenticator::{Authenticator, SessionAuthenticator};
pub use bearer::BearerAuthenticator;
pub use factory::{AuthenticatorRegistry, build_authenticator};
pub use redirect::RedirectAuthenticator;
