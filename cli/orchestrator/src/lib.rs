#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
//! Command implementations behind the `wsbridge` binary.

use std::path::Path;

use codegen::DumpOptions;
use config::{Config, ConfigError};
use service::{ServiceError, WebServiceRegistry};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The service could not be loaded or rendered.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// Writing the output failed.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;

/// Load `config_path` and build the service registry it describes.
pub fn load_services(config_path: &Path) -> Result<(Config, WebServiceRegistry)> {
    let config = Config::from_file(config_path)?;
    let services = WebServiceRegistry::from_config(&config)?;
    Ok((config, services))
}

/// Render the WSDL document of `service`.
pub fn render_wsdl(services: &WebServiceRegistry, service: &str, options: &DumpOptions) -> Result<String> {
    Ok(services.context(service)?.render(options)?)
}

/// Resolved `native type → {namespace}local` pairs of `service`, ordered by native type.
pub fn resolved_types(services: &WebServiceRegistry, service: &str) -> Result<Vec<(String, String)>> {
    let definition = services.context(service)?.service_definition()?;
    Ok(definition.type_map().iter().map(|(native, qname)| (native.clone(), qname.to_string())).collect())
}
