//! Database configuration

use serde::Deserialize;

use super::error::ValidationError;

/// PostgreSQL connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (postgres://...).
    pub url: String,

    /// Maximum pool connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl DatabaseConfig {
    /// Validate database configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE_URL"));
        }
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.max_connections == 0 {
            return Err(ValidationError::InvalidPoolSize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    #[test]
    fn valid_postgres_url_passes() {
        assert!(config("postgresql://user@localhost/skillforge").validate().is_ok());
        assert!(config("postgres://user@localhost/skillforge").validate().is_ok());
    }

    #[test]
    fn empty_url_is_rejected() {
        assert_eq!(
            config("").validate(),
            Err(ValidationError::MissingRequired("DATABASE_URL"))
        );
    }

    #[test]
    fn non_postgres_url_is_rejected() {
        assert_eq!(
            config("mysql://localhost/db").validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        );
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let mut cfg = config("postgres://localhost/db");
        cfg.max_connections = 0;
        assert_eq!(cfg.validate(), Err(ValidationError::InvalidPoolSize));
    }
}
