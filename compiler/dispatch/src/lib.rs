#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Call-time dispatch between a wire engine and an operation handler.
//!
//! One inbound call walks a small state machine ([`DispatchState`]): the
//! engine delivers headers, then exactly one operation; the operation's
//! positional arguments are bound to named request attributes and forwarded
//! to an [`OperationHandler`]; the handler's [`SoapResponse`] is checked,
//! its headers and return value converted back to wire form.
//!
//! Conversions go through a [`ConverterTable`] built per call. Converters
//! receive the call's request or response as a parameter instead of sharing
//! any state between calls.

pub mod binder;
pub mod converter;
pub mod message;
pub mod protocol;
pub mod service_binder;

use thiserror::Error;
use transport::TransportError;

pub use binder::{RequestMessageBinder, ResponseMessageBinder, RpcLiteralRequestBinder, RpcLiteralResponseBinder};
pub use converter::{ConverterRepository, ConverterTable, TypeConverter};
pub use message::{Response, SoapHeader, SoapRequest, SoapResponse};
pub use protocol::{dispatch, dispatch_raw, DispatchProtocol, DispatchState, HandlerError, OperationHandler};
pub use service_binder::{DispatchEntry, ServiceBinder};

/// Errors raised while dispatching a call.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The engine routed an operation the service does not declare.
    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),
    /// The handler returned nothing, or something that is not a SOAP response.
    #[error("Operation '{0}' did not return a SOAP response")]
    InvalidResponse(String),
    /// A callback arrived in a state that does not accept it.
    #[error("Unexpected {message} '{name}' while {state}")]
    UnexpectedMessage {
        /// `header` or `operation`
        message: &'static str,
        /// Name carried by the callback
        name: String,
        /// State the protocol was in
        state: DispatchState,
    },
    /// The operation handler failed.
    #[error("Operation '{operation}' failed: {reason}")]
    Handler {
        /// Operation being served
        operation: String,
        /// Handler-provided reason
        reason: String,
    },
    /// A type converter rejected a value.
    #[error("Cannot convert value of type '{type_name}': {reason}")]
    Conversion {
        /// Packed wire type name
        type_name: String,
        /// Converter-provided reason
        reason: String,
    },
}

impl DispatchError {
    /// Whether the caller, rather than the service, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DispatchError::UnknownOperation(_) | DispatchError::UnexpectedMessage { .. })
    }
}

impl From<DispatchError> for TransportError {
    fn from(err: DispatchError) -> Self {
        if err.is_client_error() {
            TransportError::Client(err.to_string())
        } else {
            TransportError::Server(err.to_string())
        }
    }
}

/// Result alias for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
