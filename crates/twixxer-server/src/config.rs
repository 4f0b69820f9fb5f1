use twixxer_core::AppError;

/// Secrets shorter than this are refused in production.
pub const MIN_SECRET_LEN: usize = 32;

const DEV_SESSION_SECRET: &str = "twixxer-development-session-secret-do-not-use";

/// Server settings read from the environment.
#[derive(Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Public origin used in links sent by mail.
    pub base_url: String,
    /// Enables `Secure` cookies and requires a real session secret.
    pub production: bool,
    pub session_secret: String,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("production", &self.production)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `TWIXXER_PORT` (optional, defaults to 3000)
    /// - `TWIXXER_BASE_URL` (optional, defaults to `http://localhost:3000`)
    /// - `TWIXXER_ENV` (`production` hardens cookies)
    /// - `SESSION_SECRET` (required in production)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let port = match var("TWIXXER_PORT") {
            Some(raw) => raw.parse().map_err(|_| {
                AppError::ConfigError(format!("Invalid TWIXXER_PORT '{raw}': must be a port number"))
            })?,
            None => 3000,
        };

        let base_url = var("TWIXXER_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        let production = var("TWIXXER_ENV").is_some_and(|env| env.eq_ignore_ascii_case("production"));

        let session_secret = match var("SESSION_SECRET") {
            Some(secret) if production && secret.len() < MIN_SECRET_LEN => {
                return Err(AppError::ConfigError(format!(
                    "SESSION_SECRET must be at least {MIN_SECRET_LEN} bytes in production"
                )));
            }
            Some(secret) => secret,
            None if production => {
                return Err(AppError::ConfigError(
                    "SESSION_SECRET must be set in production".into(),
                ));
            }
            None => {
                tracing::warn!("SESSION_SECRET not set, using the development secret");
                DEV_SESSION_SECRET.to_string()
            }
        };

        Ok(Self {
            port,
            base_url,
            production,
            session_secret,
        })
    }
}
