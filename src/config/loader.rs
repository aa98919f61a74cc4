//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{JarConfig, StoreBackend};
use crate::config::validation::{validate_config, ValidationError};

/// Full connection URL; excludes the discrete variables below.
pub const ENV_STORE_URL: &str = "REDIS_URL";
pub const ENV_STORE_HOST: &str = "REDIS_HOST";
pub const ENV_STORE_PORT: &str = "REDIS_PORT";
pub const ENV_STORE_PASSWORD: &str = "REDIS_PASSWORD";
pub const ENV_STORE_BACKEND: &str = "JAR_STORE_BACKEND";
pub const ENV_BIND_ADDRESS: &str = "JAR_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, message: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, message } => write!(f, "Invalid {}: {}", var, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment. The result is validated.
pub fn load_config(path: Option<&Path>) -> Result<JarConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => JarConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so tests do not mutate process state.
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut JarConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(backend) = get(ENV_STORE_BACKEND) {
        config.store.backend = backend
            .parse::<StoreBackend>()
            .map_err(|message| ConfigError::Env { var: ENV_STORE_BACKEND, message })?;
    }
    if let Some(addr) = get(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }

    let url = get(ENV_STORE_URL);
    let host = get(ENV_STORE_HOST);
    let port = get(ENV_STORE_PORT);
    let password = get(ENV_STORE_PASSWORD);

    // The environment picks one scheme and replaces whatever the file set.
    if url.is_some() {
        config.store.url = url;
        config.store.host = None;
        config.store.port = None;
        config.store.password = None;
    }
    if host.is_some() || port.is_some() || password.is_some() {
        if config.store.url.is_some() && get(ENV_STORE_URL).is_none() {
            config.store.url = None;
        }
        if let Some(host) = host {
            config.store.host = Some(host);
        }
        if let Some(port) = port {
            let port = port.parse::<u16>().map_err(|e| ConfigError::Env {
                var: ENV_STORE_PORT,
                message: e.to_string(),
            })?;
            config.store.port = Some(port);
        }
        if let Some(password) = password {
            config.store.password = Some(password);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_url_replaces_file_triple() {
        let mut config = JarConfig::default();
        config.store.host = Some("file-host".into());
        config.store.port = Some(6380);

        apply_env_overrides(&mut config, env(&[(ENV_STORE_URL, "redis://env:6379")])).unwrap();

        assert_eq!(config.store.url.as_deref(), Some("redis://env:6379"));
        assert!(!config.store.uses_discrete_target());
    }

    #[test]
    fn test_env_triple_replaces_file_url() {
        let mut config = JarConfig::default();
        config.store.url = Some("redis://file:6379".into());

        apply_env_overrides(
            &mut config,
            env(&[(ENV_STORE_HOST, "cache"), (ENV_STORE_PORT, "6390"), (ENV_STORE_PASSWORD, "pw")]),
        )
        .unwrap();

        assert_eq!(config.store.url, None);
        assert_eq!(config.store.host.as_deref(), Some("cache"));
        assert_eq!(config.store.port, Some(6390));
        assert_eq!(config.store.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_both_schemes_in_env_fail_validation() {
        let mut config = JarConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[(ENV_STORE_URL, "redis://a:6379"), (ENV_STORE_HOST, "b")]),
        )
        .unwrap();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::ConflictingStoreTarget]);
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let mut config = JarConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_STORE_PORT, "sixty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_STORE_PORT, .. }));
    }

    #[test]
    fn test_backend_and_bind_overrides() {
        let mut config = JarConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[(ENV_STORE_BACKEND, "memory"), (ENV_BIND_ADDRESS, "127.0.0.1:4000"), (ENV_STORE_HOST, "")]),
        )
        .unwrap();

        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
        assert_eq!(config.store.host, None);
    }
}
