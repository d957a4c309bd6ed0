//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::DevServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    UnknownEnvironment(String),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::UnknownEnvironment(name) => {
                write!(f, "Unknown environment: {}", name)
            }
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

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path, environment: Option<&str>) -> Result<DevServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content, environment)
}

/// Parse, select the environment, and validate a TOML document.
pub fn parse_config(
    content: &str,
    environment: Option<&str>,
) -> Result<DevServerConfig, ConfigError> {
    let config: DevServerConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    prepare(config, environment)
}

/// Apply the environment overrides to an already-built config and validate the result.
pub fn prepare(
    config: DevServerConfig,
    environment: Option<&str>,
) -> Result<DevServerConfig, ConfigError> {
    let config = match environment {
        Some(name) => config
            .with_environment(name)
            .ok_or_else(|| ConfigError::UnknownEnvironment(name.to_string()))?,
        None => config,
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:3000"

            [rewrites]
            preset = "rooms"
            "#
        )
        .unwrap();

        let config = load_config(file.path(), None).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml"), None).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[listener\nbind_address = 1", None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_environment() {
        let err = parse_config("", Some("production")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEnvironment(ref name) if name == "production"));
        assert_eq!(err.to_string(), "Unknown environment: production");
    }

    #[test]
    fn test_validation_errors_are_reported_together() {
        let err = parse_config(
            r#"
            [listener]
            bind_address = "not an address"

            [[rewrites.rules]]
            name = "broken"
            from = "/rooms/(unclosed"
            action = "fixed"
            to = "/"
            "#,
            None,
        )
        .unwrap_err();

        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_environment_is_validated_after_override() {
        let content = r#"
            [environments.staging]
            public_path = "docs/app/"
        "#;

        assert!(parse_config(content, None).is_ok());
        assert!(matches!(
            parse_config(content, Some("staging")),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_demo_config_is_valid() {
        let content = include_str!("../../demos/devserver.toml");

        let base = parse_config(content, None).unwrap();
        assert_eq!(base.rewrites.rules.len(), 1);
        assert_eq!(base.assets.public_path_component(), "/");

        let staging = parse_config(content, Some("staging")).unwrap();
        assert_eq!(staging.environment.as_deref(), Some("staging"));
        assert_eq!(staging.assets.public_path_component(), "/app/");
    }
}
