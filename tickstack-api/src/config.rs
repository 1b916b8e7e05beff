/// Configuration management for the API server
///
/// Configuration is loaded from environment variables (a `.env` file is
/// honored in development).
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: bind host (default: 0.0.0.0)
/// - `API_PORT`: bind port (default: 8080)
/// - `CORS_ORIGINS`: comma-separated allowed origins (default: `*`)
/// - `JWT_SECRET`: token signing key, at least 32 bytes (required)
/// - `JWT_ISSUER`: token issuer (default: tickstack)
/// - `JWT_AUDIENCE`: token audience (default: tickstack-clients)
/// - `EMAIL_DRIVER`: `log` or `smtp` (default: log)
/// - `SMTP_HOST` / `SMTP_PORT` / `SMTP_USERNAME` / `SMTP_PASSWORD` /
///   `SMTP_FROM` / `SMTP_INSECURE`: SMTP settings when `EMAIL_DRIVER=smtp`

use serde::{Deserialize, Serialize};
use std::env;

use tickstack_shared::auth::jwt::TokenConfig;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Bearer-token configuration
    pub jwt: TokenConfig,

    /// Email delivery configuration
    pub email: EmailConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// Which email transport to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailDriver {
    /// Log messages via tracing instead of delivering (development)
    Log,

    /// Deliver over SMTP
    Smtp,
}

/// Email delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub driver: EmailDriver,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
    pub smtp_insecure: bool,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let jwt_issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "tickstack".to_string());
        let jwt_audience =
            env::var("JWT_AUDIENCE").unwrap_or_else(|_| "tickstack-clients".to_string());

        let email_driver = match env::var("EMAIL_DRIVER").as_deref() {
            Ok("smtp") => EmailDriver::Smtp,
            _ => EmailDriver::Log,
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: TokenConfig {
                secret: jwt_secret,
                issuer: jwt_issuer,
                audience: jwt_audience,
            },
            email: EmailConfig {
                driver: email_driver,
                smtp_host: env::var("SMTP_HOST").unwrap_or_default(),
                smtp_port: env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse::<u16>()?,
                smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
                smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
                from_address: env::var("SMTP_FROM")
                    .unwrap_or_else(|_| "noreply@tickstack.local".to_string()),
                smtp_insecure: env::var("SMTP_INSECURE")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
