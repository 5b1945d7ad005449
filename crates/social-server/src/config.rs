//! Runtime configuration, read from the environment (and `.env` when present).

use std::net::SocketAddr;
use std::path::PathBuf;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SOCIAL_JWT_SECRET is unset or still a placeholder")]
    MissingSecret,
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = get("SOCIAL_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::MissingSecret);
        }

        let db_path = get("SOCIAL_DB_PATH").unwrap_or_else(|| "social.db".into()).into();
        let host = get("SOCIAL_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("SOCIAL_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue("SOCIAL_PORT", e.to_string()))?;

        let bind_address = format!("{}:{}", host, port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue("SOCIAL_HOST", e.to_string()))?;

        Ok(Self {
            bind_address,
            db_path,
            jwt_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = load(&[("SOCIAL_JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.db_path, PathBuf::from("social.db"));
    }

    #[test]
    fn placeholder_secret_is_refused() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingSecret)));
        assert!(matches!(
            load(&[("SOCIAL_JWT_SECRET", "dev-secret-change-me")]),
            Err(ConfigError::MissingSecret)
        ));
    }

    #[test]
    fn bad_port_is_reported() {
        let err = load(&[("SOCIAL_JWT_SECRET", "s3cret"), ("SOCIAL_PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("SOCIAL_PORT", _)));
    }
}
