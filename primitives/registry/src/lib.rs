#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Type Registry: maps native type identifiers to wire-level qualified names.
//!
//! The registry holds two tables: namespace prefixes (`xsd` →
//! `http://www.w3.org/2001/XMLSchema`) and explicit native → wire type
//! mappings. [`TypeRegistry::resolve_types`] walks a service definition and
//! writes the resolved wire type back into every slot, synthesizing names in
//! the definition's namespace for types nobody mapped explicitly.

pub mod namespaces;
pub mod type_registry;

use ir::NameError;

pub use type_registry::{default_local_name, TypeRegistry, TypeRegistryReader};

/// Errors raised by the type registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A wire type text could not be parsed or its prefix is unknown.
    #[error(transparent)]
    Name(#[from] NameError),
    /// A required argument was empty.
    #[error("Argument '{0}' must not be empty")]
    NullArgument(&'static str),
    /// A slot has no native type, so no wire type can be derived for it.
    #[error("Operation '{operation}': slot '{slot}' has no native type")]
    UnresolvedType {
        /// Operation owning the slot
        operation: String,
        /// Slot name
        slot: String,
    },
}

/// Result alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
