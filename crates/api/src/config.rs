use secrecy::SecretString;
use waba_core::onboarding::{ConfiguredPolicy, OnboardingConfig};

/// Server configuration loaded from environment variables.
///
/// All fields except the database URL have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
    /// Upper bound of the connection pool (default: `20`).
    pub db_max_connections: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`         | (required)                 |
    /// | `DB_MAX_CONNECTIONS`   | `20`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_csv(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let db_max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            db_max_connections,
        }
    }
}

/// Onboarding settings: the registration PIN and the limit policy.
#[derive(Debug, Clone)]
pub struct OnboardingSettings {
    pub config: OnboardingConfig,
    pub policy: ConfiguredPolicy,
}

impl OnboardingSettings {
    /// | Env Var           | Default                          |
    /// |-------------------|----------------------------------|
    /// | `WA_REGISTER_PIN` | (empty)                          |
    /// | `ADMIN_WHITELIST` | (unset: limit policy disabled)   |
    pub fn from_env() -> Self {
        let register_pin = std::env::var("WA_REGISTER_PIN").unwrap_or_default();
        if register_pin.is_empty() {
            tracing::warn!("WA_REGISTER_PIN is not set; number registration will fail");
        }

        let whitelist = std::env::var("ADMIN_WHITELIST").ok();
        let policy = ConfiguredPolicy::from_whitelist(whitelist.as_deref());
        if matches!(policy, ConfiguredPolicy::Whitelist(_)) {
            tracing::info!("Onboarding limit policy enabled");
        }

        Self {
            config: OnboardingConfig {
                register_pin: SecretString::from(register_pin),
            },
            policy,
        }
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
