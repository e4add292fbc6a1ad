//! Layered configuration
//!
//! Priority order (highest to lowest):
//! 1. CLI flags (applied by the binary)
//! 2. Environment variables (`DATABASE_URL`, `BLOGICUM_*`)
//! 3. `.env` in the current directory, then `~/.blogicum/.env`
//! 4. TOML file: explicit path, `$BLOGICUM_CONFIG`, or `~/.blogicum/config.toml`
//! 5. Built-in defaults

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Longest session lifetime accepted from config: ten years
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error(
        "DATABASE_URL not set. Set via --database-url, the DATABASE_URL env var, \
         or database_url in ~/.blogicum/config.toml"
    )]
    MissingDatabaseUrl,
}

/// Blog server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    /// Address to bind the HTTP server to
    pub bind_addr: SocketAddr,

    /// PostgreSQL connection string
    pub database_url: Option<String>,

    /// Maximum connections in the pool
    pub max_connections: u32,

    /// Lifetime of a login session, in hours
    pub session_ttl_hours: i64,

    /// Allow any CORS origin instead of localhost only
    pub cors_permissive: bool,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_url: None,
            max_connections: 5,
            // Two weeks
            session_ttl_hours: 336,
            cors_permissive: false,
        }
    }
}

impl BlogConfig {
    /// Load file and environment layers.
    ///
    /// A missing default config file is fine; a missing explicit one is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = env::var_os("BLOGICUM_CONFIG").map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path)?,
            None => match Self::config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env_from(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        check_session_ttl("session_ttl_hours", config.session_ttl_hours)?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Default config file path: ~/.blogicum/config.toml
    pub fn config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Overlay environment variables using `lookup`.
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(v) = lookup("BLOGICUM_BIND") {
            self.bind_addr = parse_value("BLOGICUM_BIND", &v)?;
        }
        if let Some(v) = lookup("BLOGICUM_MAX_CONNECTIONS") {
            self.max_connections = parse_value("BLOGICUM_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("BLOGICUM_SESSION_TTL_HOURS") {
            let hours = parse_value("BLOGICUM_SESSION_TTL_HOURS", &v)?;
            self.session_ttl_hours = check_session_ttl("BLOGICUM_SESSION_TTL_HOURS", hours)?;
        }
        if let Some(v) = lookup("BLOGICUM_CORS_PERMISSIVE") {
            self.cors_permissive = parse_bool("BLOGICUM_CORS_PERMISSIVE", &v)?;
        }
        Ok(())
    }

    /// The database URL, or an error explaining how to set it.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)
    }

    /// Session lifetime, clamped to one hour..=[`MAX_SESSION_TTL_HOURS`].
    pub fn session_ttl(&self) -> chrono::TimeDelta {
        let hours = self.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS);
        chrono::TimeDelta::try_hours(hours).unwrap_or(chrono::TimeDelta::MAX)
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_owned(),
    })
}

fn check_session_ttl(key: &'static str, hours: i64) -> Result<i64, ConfigError> {
    (1..=MAX_SESSION_TTL_HOURS)
        .contains(&hours)
        .then_some(hours)
        .filter(|h| chrono::TimeDelta::try_hours(*h).is_some())
        .ok_or(ConfigError::InvalidValue {
            key,
            value: hours.to_string(),
        })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_owned(),
        }),
    }
}

/// Get the blogicum config directory path (~/.blogicum)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".blogicum"))
}

/// Load environment variables from .env files.
///
/// The current directory wins over ~/.blogicum/.env; neither overrides
/// variables that are already set. Returns the files that were read.
pub fn load_dotenv() -> Vec<PathBuf> {
    let mut loaded_from = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded .env from current directory: {}", path.display());
        loaded_from.push(path);
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            match dotenvy::from_path(&env_file) {
                Ok(()) => {
                    debug!("Loaded .env from ~/.blogicum: {}", env_file.display());
                    loaded_from.push(env_file);
                }
                Err(e) => debug!("Failed to load {}: {}", env_file.display(), e),
            }
        }
    }

    loaded_from
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = BlogConfig::default();
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.session_ttl(), chrono::Duration::hours(336));
        assert!(!config.cors_permissive);
        assert!(matches!(
            config.database_url(),
            Err(ConfigError::MissingDatabaseUrl)
        ));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_url = \"postgres://localhost/blog\"").unwrap();
        writeln!(file, "max_connections = 12").unwrap();

        let config = BlogConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database_url().unwrap(), "postgres://localhost/blog");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.bind_addr.port(), 8000);
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_connections = \"many\"").unwrap();

        let err = BlogConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_explicit_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BlogConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = BlogConfig {
            database_url: Some("postgres://file/blog".into()),
            ..BlogConfig::default()
        };
        config
            .apply_env_from(lookup(&[
                ("DATABASE_URL", "postgres://env/blog"),
                ("BLOGICUM_BIND", "0.0.0.0:9000"),
                ("BLOGICUM_SESSION_TTL_HOURS", "24"),
                ("BLOGICUM_CORS_PERMISSIVE", "yes"),
            ]))
            .unwrap();

        assert_eq!(config.database_url().unwrap(), "postgres://env/blog");
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.session_ttl_hours, 24);
        assert!(config.cors_permissive);
    }

    #[test]
    fn empty_database_url_env_is_ignored() {
        let mut config = BlogConfig {
            database_url: Some("postgres://file/blog".into()),
            ..BlogConfig::default()
        };
        config.apply_env_from(lookup(&[("DATABASE_URL", "")])).unwrap();
        assert_eq!(config.database_url().unwrap(), "postgres://file/blog");
    }

    #[test]
    fn invalid_env_values_are_rejected() {
        let mut config = BlogConfig::default();
        let err = config
            .apply_env_from(lookup(&[("BLOGICUM_MAX_CONNECTIONS", "lots")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "BLOGICUM_MAX_CONNECTIONS", .. }
        ));

        let err = config
            .apply_env_from(lookup(&[("BLOGICUM_CORS_PERMISSIVE", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn session_ttl_has_floor() {
        let config = BlogConfig {
            session_ttl_hours: 0,
            ..BlogConfig::default()
        };
        assert_eq!(config.session_ttl(), chrono::Duration::hours(1));
    }

    #[test]
    fn oversized_session_ttl_env_is_rejected() {
        for hours in ["9223372036854775807", "2300000000", "87601", "0", "-5"] {
            let mut config = BlogConfig::default();
            let err = config
                .apply_env_from(lookup(&[("BLOGICUM_SESSION_TTL_HOURS", hours)]))
                .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue { key: "BLOGICUM_SESSION_TTL_HOURS", .. }
            ));
            assert_eq!(config.session_ttl_hours, 336);
        }

        let mut config = BlogConfig::default();
        config
            .apply_env_from(lookup(&[("BLOGICUM_SESSION_TTL_HOURS", "87600")]))
            .unwrap();
        assert_eq!(config.session_ttl(), chrono::Duration::hours(MAX_SESSION_TTL_HOURS));
    }

    #[test]
    fn oversized_session_ttl_in_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "session_ttl_hours = 9223372036854775807").unwrap();

        let err = BlogConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "session_ttl_hours", .. }
        ));
    }

    #[test]
    fn session_ttl_never_panics() {
        let config = BlogConfig {
            session_ttl_hours: i64::MAX,
            ..BlogConfig::default()
        };
        assert_eq!(config.session_ttl(), chrono::Duration::hours(MAX_SESSION_TTL_HOURS));
    }
}
