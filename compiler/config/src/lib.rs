#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! wsbridge Configuration
//!
//! This crate provides configuration management for wsbridge.
//! It handles loading, saving, and managing configuration files that specify:
//! - Logging configuration
//! - Extra namespace prefixes and native → wire type mappings
//! - The web services to host, with their authoring source and WSDL cache
//!
//! Configuration is stored in TOML format and can be loaded from files or created
//! with sensible defaults for development and testing.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// The configuration parsed but is not usable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Namespace prefixes (prefix → URI) added to the built-in table
    #[serde(default)]
    pub namespaces: BTreeMap<String, String>,
    /// Native type → prefixed or packed wire type
    #[serde(default)]
    pub type_mappings: BTreeMap<String, String>,
    /// Hosted services
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Append log events to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "info".to_string(), file: None } }
}

/// One hosted web service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name, also the lookup key
    pub name: String,
    /// Target namespace; overrides the one in the authoring source
    pub namespace: Option<String>,
    /// Authoring source of the service definition
    pub resource: PathBuf,
    /// Kind of authoring source (e.g. `json`); guessed from the extension when absent
    pub resource_type: Option<String>,
    /// Directory holding generated WSDL files
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Re-check the authoring source on every request
    #[serde(default)]
    pub debug: bool,
}

fn default_cache_dir() -> PathBuf { PathBuf::from("cache") }

impl ServiceConfig {
    /// A service reading its definition from `resource`.
    pub fn new(name: impl Into<String>, resource: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            resource: resource.into(),
            resource_type: None,
            cache_dir: default_cache_dir(),
            debug: false,
        }
    }

    /// Anchor relative `resource` and `cache_dir` paths at `base`.
    pub fn rebase(&mut self, base: &Path) {
        if self.resource.is_relative() {
            self.resource = base.join(&self.resource);
        }
        if self.cache_dir.is_relative() {
            self.cache_dir = base.join(&self.cache_dir);
        }
    }
}

impl Config {
    /// Load configuration from a TOML file at `path`
    ///
    /// Relative service and log file paths are resolved against the
    /// directory containing the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = toml::from_str(&contents)?;
        config.validate()?;

        let base = path.as_ref().parent().unwrap_or_else(|| Path::new(""));
        for service in &mut config.services {
            service.rebase(base);
        }
        if let Some(file) = config.logging.file.as_mut().filter(|f| f.is_relative()) {
            *file = base.join(&*file);
        }
        Ok(config)
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/wsbridge/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir =
            dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("wsbridge");
        Ok(config_dir.join("config.toml"))
    }

    /// Configuration of the service called `name`
    pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Check that every service has a unique, non-empty name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for service in &self.services {
            if service.name.is_empty() {
                return Err(ConfigError::Invalid("service name must not be empty".to_string()));
            }
            if !seen.insert(service.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate service '{}'", service.name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_from_file() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let path = temp_dir.path().join("wsbridge.toml");
        let toml_content = r#"
            [logging]
            level = "debug"
            file = "bridge.log"

            [namespaces]
            app = "urn:app"

            [type_mappings]
            "App\\Money" = "app:Money"

            [[services]]
            name = "Calculator"
            namespace = "urn:calculator"
            resource = "calculator.json"
            resource_type = "json"
            debug = true

            [[services]]
            name = "Library"
            resource = "/srv/library.json"
            cache_dir = "/var/cache/wsbridge"
        "#;
        fs::write(&path, toml_content).expect("Failed to write TOML content");

        let config = Config::from_file(&path).expect("Failed to load config");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(temp_dir.path().join("bridge.log")));
        assert_eq!(config.namespaces.get("app").map(String::as_str), Some("urn:app"));
        assert_eq!(config.type_mappings.get("App\\Money").map(String::as_str), Some("app:Money"));

        let calculator = config.service("Calculator").expect("Calculator is configured");
        assert_eq!(calculator.namespace.as_deref(), Some("urn:calculator"));
        assert_eq!(calculator.resource, temp_dir.path().join("calculator.json"));
        assert_eq!(calculator.resource_type.as_deref(), Some("json"));
        assert_eq!(calculator.cache_dir, temp_dir.path().join("cache"));
        assert!(calculator.debug);

        let library = config.service("Library").expect("Library is configured");
        assert_eq!(library.resource, PathBuf::from("/srv/library.json"));
        assert_eq!(library.cache_dir, PathBuf::from("/var/cache/wsbridge"));
        assert!(!library.debug);
        assert!(config.service("Missing").is_none());

        // Test file not found error
        let result = Config::from_file("nonexistent_file.toml");
        match result.expect_err("Expected error for nonexistent file") {
            ConfigError::FileRead(_) => {}
            other => panic!("Expected FileRead error, got {:?}", other),
        }

        // Test parse error
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        fs::write(&temp_file, "invalid toml content").expect("Failed to write invalid TOML");
        match Config::from_file(&temp_file).expect_err("Expected parse error for invalid TOML") {
            ConfigError::Parse(_) => {}
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_services_are_rejected() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        let toml_content = r#"
            [[services]]
            name = "Calculator"
            resource = "a.json"

            [[services]]
            name = "Calculator"
            resource = "b.json"
        "#;
        fs::write(&temp_file, toml_content).expect("Failed to write TOML content");

        match Config::from_file(&temp_file).expect_err("duplicate names") {
            ConfigError::Invalid(msg) => assert!(msg.contains("Calculator")),
            other => panic!("Expected Invalid error, got {:?}", other),
        }
    }

    #[test]
    fn test_save() {
        let mut config = Config::default();
        config.namespaces.insert("app".to_string(), "urn:app".to_string());
        config.services.push(ServiceConfig::new("Calculator", "/srv/calculator.json"));
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");

        config.save(&temp_file).expect("Failed to save config");
        let contents = fs::read_to_string(&temp_file).expect("Failed to read saved config file");
        assert!(contents.contains("Calculator"));
        assert!(contents.contains("urn:app"));
        assert!(contents.contains("info"));

        let reloaded = Config::from_file(&temp_file).expect("Failed to reload saved config");
        assert_eq!(reloaded.services[0].resource, PathBuf::from("/srv/calculator.json"));
        assert_eq!(reloaded.namespaces, config.namespaces);

        // Test file write error - try to save to a non-existent directory
        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let non_existent_subdir = temp_dir.path().join("nonexistent").join("config.toml");
        match config.save(&non_existent_subdir).expect_err("Expected file write error") {
            ConfigError::FileRead(_) => (),
            other => panic!("Expected FileRead error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_path() {
        let path = Config::default_path().expect("Failed to get default config path");
        let path_str = path.to_str().expect("Path should be valid UTF-8");
        assert!(path_str.ends_with("wsbridge/config.toml"));
    }

    #[test]
    fn test_default() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, None);
        assert!(config.namespaces.is_empty());
        assert!(config.services.is_empty());
    }
}
