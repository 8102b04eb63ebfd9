//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Service configuration, read from `TWIN_ONBOARD_*` environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Port for the HTTP API.
    pub port: u16,
    /// Path of the libSQL database holding draft slots.
    pub db_path: PathBuf,
    /// Owner of the draft slots (single-user prototype).
    pub user_id: String,
    /// Directory for a daily-rolling log file. Logs go to stderr only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            db_path: PathBuf::from("./data/twin-onboard.db"),
            user_id: "default".to_string(),
            log_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Read the environment and prepare the log directory.
    pub fn load() -> crate::error::Result<Self> {
        let config = Self::from_env()?;
        config.ensure_log_dir()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (tests inject a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("TWIN_ONBOARD_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "TWIN_ONBOARD_PORT".to_string(),
                message: format!("{raw:?}: {e}"),
            })?,
            None => defaults.port,
        };

        let db_path = lookup("TWIN_ONBOARD_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let user_id = match lookup("TWIN_ONBOARD_USER") {
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::InvalidValue {
                    key: "TWIN_ONBOARD_USER".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
            Some(raw) => raw.trim().to_string(),
            None => defaults.user_id,
        };

        let log_dir = lookup("TWIN_ONBOARD_LOG_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            port,
            db_path,
            user_id,
            log_dir,
        })
    }

    /// Create the log directory if one is configured.
    pub fn ensure_log_dir(&self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.log_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = ServiceConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, PathBuf::from("./data/twin-onboard.db"));
        assert_eq!(config.user_id, "default");
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("TWIN_ONBOARD_PORT", "9090"),
            ("TWIN_ONBOARD_DB_PATH", "/tmp/drafts.db"),
            ("TWIN_ONBOARD_USER", " alice "),
            ("TWIN_ONBOARD_LOG_DIR", "/var/log/twin"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.db_path, PathBuf::from("/tmp/drafts.db"));
        assert_eq!(config.user_id, "alice");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/twin")));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = ServiceConfig::from_lookup(lookup_from(&[("TWIN_ONBOARD_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "TWIN_ONBOARD_PORT"));
    }

    #[test]
    fn log_dir_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("logs").join("daily");
        let config = ServiceConfig {
            log_dir: Some(dir.clone()),
            ..Default::default()
        };
        config.ensure_log_dir().unwrap();
        assert!(dir.is_dir());
        ServiceConfig::default().ensure_log_dir().unwrap();
    }

    #[test]
    fn unusable_log_dir_is_an_io_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = ServiceConfig {
            log_dir: Some(file.path().join("logs")),
            ..Default::default()
        };
        let err = config.ensure_log_dir().unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));

        let err = crate::error::Error::from(err);
        assert!(err.to_string().starts_with("Configuration error: IO error"));
    }

    #[test]
    fn blank_user_is_rejected() {
        let err =
            ServiceConfig::from_lookup(lookup_from(&[("TWIN_ONBOARD_USER", "  ")])).unwrap_err();
        assert!(err.to_string().contains("TWIN_ONBOARD_USER"));
    }
}
