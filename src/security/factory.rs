//! Factory: resolve the configured `Authenticator` at startup.
//!
//! Strategies are looked up by name in an `AuthenticatorRegistry`. A name
//! that is not registered, or a strategy whose settings are unusable, is a
//! `ConfigError`: the server refuses to start rather than answering 401.
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{AuthConfig, ConfigError};

use super::{Authenticator, BearerAuthenticator, RedirectAuthenticator, SessionAuthenticator};

pub type AuthenticatorCtor =
    Box<dyn Fn(&AuthConfig) -> Result<Arc<dyn Authenticator>, ConfigError> + Send + Sync>;

pub struct AuthenticatorRegistry {
    ctors: HashMap<&'static str, AuthenticatorCtor>,
}

impl Default for AuthenticatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl AuthenticatorRegistry {
    pub fn empty() -> Self {
        Self {
            ctors: HashMap::new(),
        }
    }

    /// `session`, `bearer` and `redirect`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();

        registry.register("session", |_| Ok(Arc::new(SessionAuthenticator)));

        registry.register("bearer", |config| {
            if config.bearer_tokens.is_empty() {
                return Err(ConfigError::Missing("BEARER_TOKENS"));
            }
            Ok(Arc::new(BearerAuthenticator::new(
                config.bearer_tokens.iter().cloned(),
            )))
        });

        registry.register("redirect", |config| {
            if !config.login_path.starts_with('/') {
                return Err(ConfigError::Invalid("LOGIN_PATH"));
            }
            Ok(Arc::new(RedirectAuthenticator::new(config.login_path.clone())))
        });

        registry
    }

    /// Add (or replace) a strategy under `name`.
    pub fn register<F>(&mut self, name: &'static str, ctor: F)
    where
        F: Fn(&AuthConfig) -> Result<Arc<dyn Authenticator>, ConfigError> + Send + Sync + 'static,
    {
        self.ctors.insert(name, Box::new(ctor));
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.ctors.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn resolve(&self, config: &AuthConfig) -> Result<Arc<dyn Authenticator>, ConfigError> {
        let ctor = self
            .ctors
            .get(config.authenticator.as_str())
            .ok_or_else(|| ConfigError::UnknownAuthenticator(config.authenticator.clone()))?;

        let authenticator = ctor(config)?;
        tracing::info!(authenticator = authenticator.name(), "authenticator resolved");
        Ok(authenticator)
    }
}

pub fn build_authenticator(config: &AuthConfig) -> Result<Arc<dyn Authenticator>, ConfigError> {
    AuthenticatorRegistry::with_defaults().resolve(config)
}
