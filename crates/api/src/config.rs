use spiral_core::inventory::MAX_UPLOAD_BYTES;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background tasks get to drain on shutdown (default: `10`).
    pub shutdown_timeout_secs: u64,
    /// Campaign launcher interval in seconds (default: `60`).
    pub campaign_tick_secs: u64,
    /// Largest accepted inventory upload (default: 10 MiB).
    pub upload_max_bytes: usize,
    /// Load demo products and wallet data at startup (default: `true`).
    pub seed_demo_data: bool,
    /// When set, admin endpoints require a matching `x-admin-key` header.
    pub admin_api_key: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `10`                    |
    /// | `CAMPAIGN_TICK_SECS`    | `60`                    |
    /// | `UPLOAD_MAX_BYTES`      | `10485760`              |
    /// | `SEED_DEMO_DATA`        | `true`                  |
    /// | `ADMIN_API_KEY`         | unset                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let campaign_tick_secs = parse(&lookup, "CAMPAIGN_TICK_SECS", 60u64, "a positive integer")?;
        if campaign_tick_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "CAMPAIGN_TICK_SECS",
                expected: "a positive integer",
                value: "0".into(),
            });
        }

        Ok(Self {
            host,
            port: parse(&lookup, "PORT", 3000u16, "a port number")?,
            cors_origins,
            request_timeout_secs: parse(&lookup, "REQUEST_TIMEOUT_SECS", 30u64, "an integer")?,
            shutdown_timeout_secs: parse(&lookup, "SHUTDOWN_TIMEOUT_SECS", 10u64, "an integer")?,
            campaign_tick_secs,
            upload_max_bytes: parse(&lookup, "UPLOAD_MAX_BYTES", MAX_UPLOAD_BYTES, "a byte count")?,
            seed_demo_data: parse_flag(&lookup, "SEED_DEMO_DATA", true)?,
            admin_api_key: lookup("ADMIN_API_KEY").filter(|k| !k.trim().is_empty()),
        })
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid {
                var,
                expected,
                value,
            }),
    }
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(var).as_deref().map(str::trim) {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            var,
            expected: "a boolean",
            value: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
