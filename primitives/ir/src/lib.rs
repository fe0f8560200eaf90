#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! wsbridge Intermediate Representation (IR)
//!
//! This crate defines the language-neutral description of a web service: its
//! operations, their typed arguments, headers and return values, and the
//! namespace-qualified names those types carry on the wire. The IR is the
//! shared input of the interface-description generator and the call-time
//! dispatcher, so both sides agree on every qualified name.

pub mod qname;
pub mod service_definition;

pub use qname::{NameError, QualifiedName};
pub use service_definition::*;
