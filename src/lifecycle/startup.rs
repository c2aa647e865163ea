//! Startup orchestration.
//!
//! Resolves the effective configuration: file (or defaults), then
//! environment overrides, then command-line overrides, then validation.
//! Any error here is fatal.

use std::path::Path;

use crate::config::loader::{apply_env_overrides, load_config, ConfigError};
use crate::config::validation::validate_config;
use crate::config::GatewayConfig;

/// Build the configuration the process will run with.
pub fn resolve_config(
    path: Option<&Path>,
    bind_override: Option<&str>,
) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config);
    if let Some(bind) = bind_override {
        config.listener.bind_address = bind.to_string();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = resolve_config(None, None).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_bind_override_is_validated() {
        let config = resolve_config(None, Some("127.0.0.1:3000")).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");

        assert!(matches!(
            resolve_config(None, Some("localhost")),
            Err(ConfigError::Validation(_))
        ));
    }
}
