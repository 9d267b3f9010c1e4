use std::env;
use std::net::{IpAddr, SocketAddr};
use anyhow::{Context, Result};

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database holding user records.
    pub database_url: String,
    /// The URL of the Redis server holding sessions.
    pub redis_url: String,
    /// The key namespace sessions are stored under.
    pub session_collection: String,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Whether cookies are marked `Secure`.
    pub secure_cookies: bool,
    /// Origins allowed to make credentialed cross-origin requests.
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a new `Config` from an arbitrary key lookup.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the value of a variable, or `None` if unset.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host: IpAddr = lookup("HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse()
            .context("Invalid HOST")?;
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("Invalid PORT")?;

        let session_collection = lookup("SESSION_COLLECTION")
            .unwrap_or_else(|| "sessions".to_string());
        if session_collection.trim().is_empty() {
            anyhow::bail!("SESSION_COLLECTION cannot be empty");
        }

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            redis_url: lookup("REDIS_URL")
                .unwrap_or_else(|| "redis://127.0.0.1:6379".to_string()),
            session_collection,
            bind_addr: SocketAddr::new(host, port),
            secure_cookies: lookup("APP_ENV").as_deref() == Some("production"),
            cors_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/auth"),
        ]))
        .unwrap();

        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.session_collection, "sessions");
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert!(!config.secure_cookies);
        assert_eq!(config.cors_origins, vec!["http://localhost:3000".to_string()]);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/auth"),
            ("SESSION_COLLECTION", "auth_sessions"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("APP_ENV", "production"),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
        ]))
        .unwrap();

        assert_eq!(config.session_collection, "auth_sessions");
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert!(config.secure_cookies);
        assert_eq!(config.cors_origins.len(), 2);
    }

    #[test]
    fn test_missing_database_url() {
        assert!(Config::from_lookup(lookup_from(&[("REDIS_URL", "redis://cache")])).is_err());
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("PORT", "not-a-port"),
        ]))
        .is_err());

        assert!(Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("SESSION_COLLECTION", "  "),
        ]))
        .is_err());
    }
}
