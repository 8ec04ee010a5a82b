/// Centralized environment configuration.
/// All env vars and defaults are defined here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL. Required.
    pub database_url: String,

    /// Address the HTTP server binds to.
    /// Default: 0.0.0.0:3000
    pub bind_addr: String,

    /// Session lifetime in days.
    /// Default: 30
    pub session_days: i64,

    /// Default guest-code lifetime in hours, used when issuance omits one.
    /// Default: 72
    pub guest_code_hours: i64,
}

impl Config {
    /// Build config from environment variables.
    /// Returns an error if required vars are missing.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set in .env")?;

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let session_days = std::env::var("SESSION_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .map_err(|_| "SESSION_DAYS must be a number")?;

        let guest_code_hours = std::env::var("GUEST_CODE_HOURS")
            .unwrap_or_else(|_| "72".to_string())
            .parse::<i64>()
            .map_err(|_| "GUEST_CODE_HOURS must be a number")?;

        Ok(Self {
            database_url,
            bind_addr,
            session_days,
            guest_code_hours,
        })
    }

    /// Config for tests. Uses in-memory database URL.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            session_days: 30,
            guest_code_hours: 72,
        }
    }
}
