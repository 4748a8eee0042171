use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment: {0}. Must be one of: development, testing, production")]
    InvalidEnvironment(String),

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Deployment profile, selected by `APP_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        }
    }

    fn default_database_url(&self) -> Option<&'static str> {
        match self {
            Environment::Development => Some("sqlite://parts_dev.db?mode=rwc"),
            Environment::Testing => Some("sqlite::memory:"),
            Environment::Production => None,
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }
}

/// Runtime configuration for the API server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub database_url: String,
    pub max_connections: u32,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Empty, or a path like `/parts` with no trailing slash
    pub base_path: String,
    pub static_dir: Option<PathBuf>,
    /// Where uploaded CAD files are stored; created at startup
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; unset and blank values both count as missing
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get("APP_ENV") {
            Some(raw) => raw.parse()?,
            None => Environment::Development,
        };

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => environment
                .default_database_url()
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingEnv("DATABASE_URL".to_string()))?,
        };

        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;
        let default_connections = match environment {
            Environment::Testing => 1,
            _ => DEFAULT_MAX_CONNECTIONS,
        };
        let max_connections = parse_or(
            "DB_MAX_CONNECTIONS",
            get("DB_MAX_CONNECTIONS"),
            default_connections,
        )?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidConfig(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        let cors_origins = get("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_else(|| parse_origins(DEFAULT_CORS_ORIGINS));
        let base_path = normalize_base_path(&get("BASE_PATH").unwrap_or_default());
        let static_dir = get("STATIC_DIR").map(PathBuf::from);
        let upload_dir = get("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));
        let max_upload_bytes = parse_or(
            "MAX_UPLOAD_BYTES",
            get("MAX_UPLOAD_BYTES"),
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;

        Ok(Self {
            environment,
            database_url,
            max_connections,
            port,
            cors_origins,
            base_path,
            static_dir,
            upload_dir,
            max_upload_bytes,
        })
    }

    /// In-memory database, no base path, no static files, uploads under the system temp dir
    pub fn for_testing() -> Self {
        Self {
            environment: Environment::Testing,
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            port: 0,
            cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
            base_path: String::new(),
            static_dir: None,
            upload_dir: env::temp_dir().join("parts-uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidConfig(format!("{} is not a valid number: {}", key, raw))),
        None => Ok(default),
    }
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// `parts/` and `/parts` both become `/parts`; `/` and blank become empty
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_development_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.database_url, "sqlite://parts_dev.db?mode=rwc");
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_connections, 5);
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000", "http://localhost:5173"]
        );
        assert_eq!(config.base_path, "");
        assert!(config.static_dir.is_none());
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_upload_settings() {
        let config = config_from(&[
            ("UPLOAD_DIR", "/srv/parts/uploads"),
            ("MAX_UPLOAD_BYTES", "1024"),
        ])
        .unwrap();
        assert_eq!(config.upload_dir, PathBuf::from("/srv/parts/uploads"));
        assert_eq!(config.max_upload_bytes, 1024);

        assert!(matches!(
            config_from(&[("MAX_UPLOAD_BYTES", "lots")]),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_testing_uses_memory_database() {
        let config = config_from(&[("APP_ENV", "testing")]).unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, 1);
    }

    #[test]
    fn test_production_requires_database_url() {
        let err = config_from(&[("APP_ENV", "production")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(ref key) if key == "DATABASE_URL"));

        let config = config_from(&[
            ("APP_ENV", "production"),
            ("DATABASE_URL", "sqlite:///var/lib/parts.db"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite:///var/lib/parts.db");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("APP_ENV", "staging")]),
            Err(ConfigError::InvalidEnvironment(_))
        ));
        assert!(matches!(
            config_from(&[("PORT", "http")]),
            Err(ConfigError::InvalidConfig(_))
        ));
        assert!(matches!(
            config_from(&[("DB_MAX_CONNECTIONS", "0")]),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_base_path_normalization() {
        assert_eq!(normalize_base_path("parts/"), "/parts");
        assert_eq!(normalize_base_path("/parts"), "/parts");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path("  "), "");
        assert_eq!(normalize_base_path("/team/parts/"), "/team/parts");
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" https://a.example/ , ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins("").is_empty());
    }
}
