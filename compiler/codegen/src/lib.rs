#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Interface description generation for wsbridge services.
//!
//! This crate turns a type-resolved [`ServiceDefinition`] into a WSDL 1.1
//! document (rpc style, literal use). It is split into three layers:
//!
//! - [`wsdl_document`]: the document under construction, with its namespace
//!   prefix table, schema type registry and WSDL sections.
//! - [`generators::type_strategy`]: decides how a native type is declared in
//!   the schema (named record or array-of) and declares it once.
//! - [`generators::wsdl_dumper`]: walks the definition and assembles messages,
//!   port type, binding and service.

pub mod generators;
pub mod utils;
pub mod wsdl_document;

use ir::{NameError, ServiceDefinition};
use thiserror::Error;

pub use generators::type_strategy::{TypeContext, TypeEncodingStrategy, WsdlTypeStrategy};
pub use generators::wsdl_dumper::WsdlDumper;
pub use wsdl_document::WsdlDocument;

/// Error type for document generation.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// No service definition was supplied.
    #[error("No service definition to dump")]
    MissingDefinition,
    /// A slot reached the generator without a resolved wire type.
    #[error("Operation '{operation}': slot '{slot}' has no resolved wire type")]
    UnresolvedType {
        /// Operation owning the slot
        operation: String,
        /// Slot name
        slot: String,
    },
    /// A type strategy was used before a document context was attached.
    #[error("Cannot add complex type '{0}', no context is set for this strategy")]
    NoContext(String),
    /// A qualified reference points at a namespace the document does not declare.
    #[error("No prefix declared for namespace '{0}'")]
    UnknownPrefix(String),
    /// A qualified name could not be built.
    #[error(transparent)]
    Name(#[from] NameError),
    /// Formatting error while rendering the document.
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}

/// Convenient result type for codegen functions in this crate.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Options for a single document rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpOptions {
    /// Endpoint URL placed in the service port; an empty location is written when absent
    pub endpoint: Option<String>,
    /// Stylesheet referenced by an `xml-stylesheet` processing instruction
    pub stylesheet: Option<String>,
}

impl DumpOptions {
    /// Options binding the document to `endpoint`.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self { endpoint: Some(endpoint.into()), stylesheet: None }
    }
}

/// Renders service definitions into an interface description document.
pub trait Dumper {
    /// Render `definition`; `None` fails with [`CodegenError::MissingDefinition`].
    fn dump_service_definition(
        &self,
        definition: Option<&ServiceDefinition>,
        options: &DumpOptions,
    ) -> Result<String>;
}
