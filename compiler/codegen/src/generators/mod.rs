//! Document generators.
//!
//! [`wsdl_dumper`] assembles the WSDL sections; [`type_strategy`] declares the
//! schema types they reference.

pub mod type_strategy;
pub mod wsdl_dumper;
