/*
 * Responsibility
 * - 環境変数の読み込み (PORT, 認証方式, セッション backend など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    UnknownAuthenticator(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::UnknownAuthenticator(name) => {
                write!(f, "unknown authenticator: {}", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    Valkey { url: String },
}

/// Settings the authenticator factory reads.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    // Registry name of the strategy (`session`, `bearer`, `redirect`, ...).
    pub authenticator: String,
    // Used by `redirect`.
    pub login_path: String,
    // Used by `bearer`: (token, username) pairs.
    pub bearer_tokens: Vec<(String, String)>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            authenticator: "session".to_string(),
            login_path: "/login".to_string(),
            bearer_tokens: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub cookie_name: String,
    pub ttl: Duration,
    /// How often the in-memory backend purges expired sessions.
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Memory,
            cookie_name: "session".to_string(),
            ttl: Duration::from_secs(86_400),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub auth: AuthConfig,
    pub session: SessionConfig,
    pub http: HttpConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match std::env::var("PORT") {
            Ok(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let auth = AuthConfig {
            authenticator: std::env::var("AUTHENTICATOR")
                .map(|s| s.trim().to_ascii_lowercase())
                .unwrap_or_else(|_| "session".to_string()),
            login_path: std::env::var("LOGIN_PATH").unwrap_or_else(|_| "/login".to_string()),
            bearer_tokens: parse_bearer_tokens(
                &std::env::var("BEARER_TOKENS").unwrap_or_default(),
            )?,
        };

        let backend = match std::env::var("SESSION_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => SessionBackend::Memory,
            "valkey" | "redis" => SessionBackend::Valkey {
                url: std::env::var("VALKEY_URL").map_err(|_| ConfigError::Missing("VALKEY_URL"))?,
            },
            _ => return Err(ConfigError::Invalid("SESSION_BACKEND")),
        };

        let session = SessionConfig {
            backend,
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "session".to_string()),
            ttl: Duration::from_secs(env_u64("SESSION_TTL_SECONDS", 86_400)?),
            sweep_interval: sweep_interval(env_u64("SESSION_SWEEP_SECONDS", 60)?)?,
        };

        let http = HttpConfig {
            request_timeout: Duration::from_secs(env_u64("REQUEST_TIMEOUT_SECONDS", 30)?),
            body_limit_bytes: env_u64("BODY_LIMIT_BYTES", 1024 * 1024)? as usize,
        };

        Ok(Self {
            addr,
            app_env,
            auth,
            session,
            http,
        })
    }
}

fn env_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

fn sweep_interval(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid("SESSION_SWEEP_SECONDS"));
    }
    Ok(Duration::from_secs(secs))
}

/// `token=user,token2=user2` -> pairs. Blank entries are skipped.
fn parse_bearer_tokens(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (token, user) = entry
                .split_once('=')
                .ok_or(ConfigError::Invalid("BEARER_TOKENS"))?;
            let (token, user) = (token.trim(), user.trim());
            if token.is_empty() || user.is_empty() {
                return Err(ConfigError::Invalid("BEARER_TOKENS"));
            }
            Ok((token.to_string(), user.to_string()))
        })
        .collect()
}
