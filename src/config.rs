//! Configuration for carport
//!
//! CLI arguments and environment variable handling using clap. A `.env` file
//! is loaded by `main` before parsing.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::auth::jwt::{MAX_EXPIRY_SECONDS, MIN_SECRET_LEN};
use crate::auth::JwtValidator;
use crate::types::ApiError;

/// carport - car inventory API behind password login and JWT sessions
#[derive(Parser, Debug, Clone)]
#[command(name = "carport")]
#[command(about = "Car inventory API with signup, login and JWT-protected routes")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:4040")]
    pub listen: SocketAddr,

    /// MongoDB connection URI (required in production)
    #[arg(long, env = "MONGO_URI")]
    pub mongodb_uri: Option<String>,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "jwt-auth-app")]
    pub mongodb_db: String,

    /// Secret for token signing (required in production)
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Timeout for each store operation in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "5000")]
    pub request_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format: "text" or "json"
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Enable development mode (in-memory store, built-in signing secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            if self.mongodb_uri.as_deref().map_or(true, str::is_empty) {
                return Err("MONGO_URI is required in production mode".to_string());
            }
            if self.jwt_secret.as_deref().map_or(true, str::is_empty) {
                return Err("SECRET_KEY is required in production mode".to_string());
            }
        }

        // A supplied secret is held to the same length in every mode
        if let Some(secret) = self.jwt_secret.as_deref() {
            if secret.len() < MIN_SECRET_LEN {
                return Err(format!(
                    "SECRET_KEY must be at least {MIN_SECRET_LEN} characters"
                ));
            }
        }

        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err("LOG_FORMAT must be \"text\" or \"json\"".to_string());
        }

        if self.jwt_expiry_seconds == 0 {
            return Err("JWT_EXPIRY_SECONDS must be greater than zero".to_string());
        }
        if self.jwt_expiry_seconds > MAX_EXPIRY_SECONDS {
            return Err(format!(
                "JWT_EXPIRY_SECONDS must be at most {MAX_EXPIRY_SECONDS}"
            ));
        }

        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        Ok(())
    }

    /// Build the token validator (dev secret in dev mode when none is set)
    pub fn jwt_validator(&self) -> Result<JwtValidator, ApiError> {
        match (&self.jwt_secret, self.dev_mode) {
            (Some(secret), _) => JwtValidator::new(secret, self.jwt_expiry_seconds),
            (None, true) => Ok(JwtValidator::new_dev(self.jwt_expiry_seconds)),
            (None, false) => Err(ApiError::Config(
                "SECRET_KEY is required in production mode".into(),
            )),
        }
    }

    /// Timeout applied to store operations
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "config-test-secret-at-least-32-characters";

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["carport"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--dev-mode"]);
        assert_eq!(args.listen.port(), 4040);
        assert_eq!(args.mongodb_db, "jwt-auth-app");
        assert_eq!(args.jwt_expiry_seconds, 3600);
        assert_eq!(args.request_timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn test_production_requires_uri_and_secret() {
        let args = parse(&["--jwt-secret", SECRET]);
        assert!(args.validate().unwrap_err().contains("MONGO_URI"));

        let args = parse(&["--mongodb-uri", "mongodb://localhost:27017"]);
        assert!(args.validate().unwrap_err().contains("SECRET_KEY"));

        let args = parse(&[
            "--mongodb-uri",
            "mongodb://localhost:27017",
            "--jwt-secret",
            SECRET,
        ]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let args = parse(&[
            "--mongodb-uri",
            "mongodb://localhost:27017",
            "--jwt-secret",
            "short",
        ]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_dev_mode_needs_nothing() {
        let args = parse(&["--dev-mode"]);
        assert!(args.validate().is_ok());
        assert!(args.jwt_validator().is_ok());
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let args = parse(&["--dev-mode", "--log-format", "xml"]);
        assert!(args.validate().is_err());

        let args = parse(&["--dev-mode", "--log-format", "json"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let args = parse(&["--dev-mode", "--request-timeout-ms", "0"]);
        assert!(args.validate().is_err());

        let args = parse(&["--dev-mode", "--jwt-expiry-seconds", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_short_secret_rejected_in_dev_mode() {
        let args = parse(&["--dev-mode", "--jwt-secret", "short"]);
        assert!(args.validate().unwrap_err().contains("SECRET_KEY"));
    }

    #[test]
    fn test_expiry_upper_bound() {
        let args = parse(&["--dev-mode", "--jwt-expiry-seconds", "18446744073709551615"]);
        assert!(args.validate().is_err());

        let limit = MAX_EXPIRY_SECONDS.to_string();
        let args = parse(&["--dev-mode", "--jwt-expiry-seconds", &limit]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_dev_validator_uses_configured_lifetime() {
        let args = parse(&["--dev-mode", "--jwt-expiry-seconds", "60"]);
        let jwt = args.jwt_validator().unwrap();
        let claims = jwt
            .verify_token(&jwt.issue_token("a@x.com").unwrap().token)
            .unwrap();
        assert_eq!(claims.exp - claims.iat, 60);
    }
}
