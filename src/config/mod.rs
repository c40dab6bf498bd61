use std::env;

/// Runtime configuration for the document API
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Maximum upload size in bytes (default: 50 MB)
    pub max_file_size: usize,

    /// JWT Secret Key (Required in production)
    pub jwt_secret: String,

    /// Lifetime of issued access tokens in hours (default: 24)
    pub token_ttl_hours: i64,

    /// Share link lifetime when the client does not ask for one (default: 24)
    pub share_default_hours: i64,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024, // 50 MB
            jwt_secret: "secret".to_string(),
            token_ttl_hours: 24,
            share_default_hours: 24,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(), // Vite default
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            jwt_secret: env::var("JWT_SECRET").unwrap_or(default.jwt_secret),

            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|h| *h > 0)
                .unwrap_or(default.token_ttl_hours),

            share_default_hours: env::var("SHARE_DEFAULT_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|h| *h > 0)
                .unwrap_or(default.share_default_hours),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development (small uploads, short-lived tokens)
    pub fn development() -> Self {
        Self {
            max_file_size: 5 * 1024 * 1024,
            token_ttl_hours: 1,
            ..Self::default()
        }
    }

    /// Create config for production. Fails when JWT_SECRET is missing.
    pub fn production() -> anyhow::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("CRITICAL: JWT_SECRET must be set"))?;

        Ok(Self {
            jwt_secret,
            ..Self::from_env()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.max_file_size, 50 * 1024 * 1024);
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.share_default_hours, 24);
        assert_eq!(config.jwt_secret, "secret");
    }

    #[test]
    fn test_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.max_file_size, 5 * 1024 * 1024);
        assert_eq!(config.token_ttl_hours, 1);
        assert!(
            config
                .allowed_origins
                .contains(&"http://localhost:5173".to_string())
        );
    }
}
