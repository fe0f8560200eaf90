#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `wsbridge-service`: Web Service Hosting
//!
//! This crate ties the pieces of a hosted web service together:
//!
//! - [`WebServiceContext`] loads a service definition from its authoring
//!   source once, resolves its types and builds its dispatch table.
//! - [`WsdlCache`] keeps the generated WSDL per `(service, endpoint)` on
//!   disk and rewrites it atomically when stale.
//! - [`WebServiceRegistry`] looks services up by name, serves their
//!   definition document and runs calls through a wire engine.
//!
//! ## Example
//! ```no_run
//! use service::WebServiceRegistry;
//!
//! let config = config::Config::from_file("wsbridge.toml")?;
//! let services = WebServiceRegistry::from_config(&config)?;
//! let document = services.definition("Calculator", Some("http://localhost/calc"))?;
//! assert_eq!(document.content_type, "application/wsdl+xml");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cache;
pub mod context;
pub mod loader;
pub mod services;

use std::path::PathBuf;

use codegen::CodegenError;
use dispatch::DispatchError;
use ir::DefinitionError;
use registry::RegistryError;
use thiserror::Error;

pub use cache::WsdlCache;
pub use context::WebServiceContext;
pub use loader::{DefinitionLoader, JsonDefinitionLoader};
pub use services::{DefinitionDocument, WebServiceRegistry, WSDL_CONTENT_TYPE, XML_CONTENT_TYPE};

/// Errors raised while hosting a service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No service is registered under this name.
    #[error("No webservice with name '{0}' found")]
    UnknownService(String),
    /// No loader understands the configured authoring source.
    #[error("Unsupported service resource '{}' (type {})", .resource.display(), .resource_type.as_deref().unwrap_or("unspecified"))]
    UnsupportedResource {
        /// Authoring source path
        resource: PathBuf,
        /// Declared resource type
        resource_type: Option<String>,
    },
    /// Type resolution failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Document generation failed.
    #[error(transparent)]
    Codegen(#[from] CodegenError),
    /// Dispatch table or converter setup failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// Reading or writing the cache failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The authoring source could not be read.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

impl ServiceError {
    /// Whether this error should surface as "not found" at the transport boundary.
    pub fn is_not_found(&self) -> bool { matches!(self, ServiceError::UnknownService(_)) }
}

/// Result alias for service hosting.
pub type Result<T> = std::result::Result<T, ServiceError>;
