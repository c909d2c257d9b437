//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::SweeperConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `sweep.recipient`.
pub const RECIPIENT_ENV_VAR: &str = "SWEEPER_RECIPIENT";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<SweeperConfig, ConfigError> {
    prepare_config(read_config(path)?)
}

/// Parse a TOML file without overrides or validation.
pub fn read_config(path: &Path) -> Result<SweeperConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Apply environment overrides, expand endpoint placeholders and validate.
///
/// Used directly when running without a config file.
pub fn prepare_config(mut config: SweeperConfig) -> Result<SweeperConfig, ConfigError> {
    if let Ok(recipient) = std::env::var(RECIPIENT_ENV_VAR) {
        if !recipient.trim().is_empty() {
            config.sweep.recipient = recipient;
        }
    }

    for network in &mut config.networks {
        let declared = network.rpc_urls.len();
        network.rpc_urls = network
            .rpc_urls
            .iter()
            .filter_map(|url| expand_env(url, |name| std::env::var(name).ok()))
            .collect();
        if network.rpc_urls.len() < declared {
            tracing::warn!(
                network = %network.name,
                dropped = declared - network.rpc_urls.len(),
                "Dropped RPC URLs referencing unset environment variables"
            );
        }
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Expand `${VAR}` placeholders. Returns `None` when a variable is unset or empty.
pub fn expand_env<F>(raw: &str, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}')?;
        let value = lookup(&after[..end]).filter(|v| !v.is_empty())?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "INFURA_PROJECT_ID" => Some("abc123".to_string()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn test_expand_env() {
        assert_eq!(
            expand_env("https://sepolia.infura.io/v3/${INFURA_PROJECT_ID}", lookup).as_deref(),
            Some("https://sepolia.infura.io/v3/abc123")
        );
        assert_eq!(
            expand_env("https://rpc.sepolia.org", lookup).as_deref(),
            Some("https://rpc.sepolia.org")
        );
        assert_eq!(expand_env("https://x/${MISSING}", lookup), None);
        assert_eq!(expand_env("https://x/${EMPTY}", lookup), None);
        assert_eq!(expand_env("https://x/${UNCLOSED", lookup), None);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [batch]
            concurrency = 2

            [[networks]]
            name = "Local"
            chain_id = 31337
            currency_symbol = "ETH"
            rpc_urls = ["http://localhost:8545", "http://localhost:8546"]
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.batch.concurrency, 2);
        assert_eq!(config.networks.len(), 1);
        assert_eq!(config.networks[0].rpc_urls.len(), 2);
    }

    #[test]
    fn test_load_config_reports_validation_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [[networks]]
            name = "Broken"
            chain_id = 0
            currency_symbol = "ETH"
            rpc_urls = []
            "#
        )
        .unwrap();

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_config_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[batch\nconcurrency = ").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().starts_with("IO error"));
    }
}
