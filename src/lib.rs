// SPDX-License-Identifier: CC0-1.0

//! wsbridge umbrella crate.
//!
//! Re-exports the workspace member crates so an embedding application can
//! depend on a single package: load a service definition, render its WSDL
//! document and dispatch inbound calls to an operation handler.
//!
//! All functional code lives in the member crates under `primitives`,
//! `compiler` and `backends`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(deprecated_in_future)]
#![doc(test(attr(warn(unused))))]

pub use codegen;
pub use config;
pub use dispatch;
pub use ir;
pub use registry;
pub use service;
pub use transport;

/// Miscellaneous metadata about the wsbridge workspace.
pub mod wsbridge_meta {
    /// Version string for the umbrella crate, as reported by Cargo.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
