#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `wsbridge-transport`: Wire Engine Contract
//!
//! This crate defines the boundary between a wire-level message engine and
//! the in-process dispatcher.
//!
//! The engine owns envelope parsing and serialization. Per inbound call it
//! delivers every header to a [`MessageHandler`], in envelope order, and then
//! the operation exactly once, with positional arguments already decoded.
//! Whatever the handler returns is wrapped into a [`WireReply`]; handler
//! failures never escape the engine, they become a protocol-level [`Fault`].
//!
//! ## Core Concepts
//!
//! ### `WireEngine` Trait
//! Drives one call through a handler. [`StructuredEngine`] is the reference
//! implementation over already-decoded [`WireMessage`]s (JSON envelopes).
//!
//! ### `MessageHandler` Trait
//! Implemented by the dispatcher. Receives header and operation callbacks
//! and hands back the headers to attach to the outgoing envelope.
//!
//! ### `TransportError`
//! Classifies failures as caller-side (`Client`) or service-side (`Server`)
//! so the engine can pick the matching fault code.
//!
//! ## Example
//! ```
//! use serde_json::{json, Value};
//! use transport::{MessageHandler, ReplyBody, StructuredEngine, WireEngine, WireHeader, WireMessage};
//!
//! struct Echo;
//!
//! impl MessageHandler for Echo {
//!     fn handle_header(&mut self, _name: &str, _payload: Value) -> transport::Result<()> { Ok(()) }
//!
//!     fn handle_operation(&mut self, _name: &str, args: Vec<Value>) -> transport::Result<Option<Value>> {
//!         Ok(args.into_iter().next())
//!     }
//!
//!     fn take_response_headers(&mut self) -> Vec<WireHeader> { Vec::new() }
//! }
//!
//! let message = WireMessage::new("Echo", vec![json!("hi")]);
//! let reply = StructuredEngine::new().handle(message, &mut Echo);
//! assert_eq!(reply.body, ReplyBody::Return(Some(json!("hi"))));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type alias for structured error handling in transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Canonical error type for the wire boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The caller sent something the service cannot process.
    #[error("Client error: {0}")]
    Client(String),

    /// The service failed while processing a well-formed call.
    #[error("Server error: {0}")]
    Server(String),

    /// Failure to serialize or deserialize an envelope.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The envelope did not have the expected shape.
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self { TransportError::Serialization(err.to_string()) }
}

/// A header block of an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireHeader {
    /// Namespace URI of the header element
    #[serde(default)]
    pub namespace: String,
    /// Local name of the header element
    pub name: String,
    /// Decoded header content
    #[serde(default)]
    pub payload: Value,
}

impl WireHeader {
    /// Create a header.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, payload: Value) -> Self {
        Self { namespace: namespace.into(), name: name.into(), payload }
    }
}

/// An inbound call: headers plus one operation invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Header blocks in envelope order
    #[serde(default)]
    pub headers: Vec<WireHeader>,
    /// Operation name
    pub operation: String,
    /// Positional arguments
    #[serde(default)]
    pub arguments: Vec<Value>,
}

impl WireMessage {
    /// Create a message without headers.
    pub fn new(operation: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self { headers: Vec::new(), operation: operation.into(), arguments }
    }

    /// Append a header.
    pub fn with_header(mut self, header: WireHeader) -> Self {
        self.headers.push(header);
        self
    }

    /// Decode a JSON envelope.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(TransportError::InvalidFormat("envelope must be a JSON object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| TransportError::InvalidFormat(e.to_string()))
    }
}

/// A protocol-level fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    /// `Client` or `Server`
    pub code: String,
    /// Human-readable reason
    pub message: String,
}

impl From<&TransportError> for Fault {
    fn from(err: &TransportError) -> Self {
        let (code, message) = match err {
            TransportError::Client(msg) => ("Client", msg.clone()),
            TransportError::InvalidFormat(_) | TransportError::Serialization(_) => {
                ("Client", err.to_string())
            }
            TransportError::Server(msg) => ("Server", msg.clone()),
        };
        Self { code: code.to_string(), message }
    }
}

/// Body of an outgoing envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyBody {
    /// The operation's return value (`None` for operations without one)
    Return(Option<Value>),
    /// The call failed
    Fault(Fault),
}

/// An outgoing envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireReply {
    /// Operation the reply answers (empty when the request could not be decoded)
    pub operation: String,
    /// Header blocks to emit, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<WireHeader>,
    /// Return value or fault
    pub body: ReplyBody,
}

impl WireReply {
    /// Build a fault reply.
    pub fn fault(operation: impl Into<String>, err: &TransportError) -> Self {
        Self { operation: operation.into(), headers: Vec::new(), body: ReplyBody::Fault(err.into()) }
    }

    /// Whether the reply carries a fault.
    pub fn is_fault(&self) -> bool { matches!(self.body, ReplyBody::Fault(_)) }

    /// Encode as a JSON envelope.
    pub fn to_json_string(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }
}

/// Receiver of the engine's per-call callbacks.
pub trait MessageHandler {
    /// Called once per inbound header, before the operation.
    fn handle_header(&mut self, name: &str, payload: Value) -> Result<()>;

    /// Called exactly once with the operation name and its positional arguments.
    fn handle_operation(&mut self, name: &str, arguments: Vec<Value>) -> Result<Option<Value>>;

    /// Headers to include in the outgoing envelope, in emission order.
    fn take_response_headers(&mut self) -> Vec<WireHeader>;
}

/// An engine that turns one inbound message into one reply.
pub trait WireEngine: Send + Sync {
    /// Drive `message` through `handler`.
    ///
    /// Never fails: handler errors are reported as a fault reply.
    fn handle(&self, message: WireMessage, handler: &mut dyn MessageHandler) -> WireReply;

    /// Decode a raw envelope and drive it through `handler`.
    fn handle_raw(&self, raw: &str, handler: &mut dyn MessageHandler) -> WireReply {
        match WireMessage::from_json_str(raw) {
            Ok(message) => self.handle(message, handler),
            Err(err) => {
                tracing::warn!("rejecting undecodable envelope: {}", err);
                WireReply::fault("", &err)
            }
        }
    }
}

/// Reference engine over decoded [`WireMessage`]s.
#[derive(Debug, Clone, Default)]
pub struct StructuredEngine;

impl StructuredEngine {
    /// Create an engine.
    pub fn new() -> Self { Self }
}

impl WireEngine for StructuredEngine {
    fn handle(&self, message: WireMessage, handler: &mut dyn MessageHandler) -> WireReply {
        let WireMessage { headers, operation, arguments } = message;

        for header in headers {
            if let Err(err) = handler.handle_header(&header.name, header.payload) {
                return WireReply::fault(operation, &err);
            }
        }

        match handler.handle_operation(&operation, arguments) {
            Ok(value) => WireReply {
                operation,
                headers: handler.take_response_headers(),
                body: ReplyBody::Return(value),
            },
            Err(err) => WireReply::fault(operation, &err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from() {
        let err = serde_json::from_str::<serde_json::Value>("not-json")
            .expect_err("Expected JSON parsing to fail");
        let terr: TransportError = err.into();

        match terr {
            TransportError::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("expected Serialization error variant"),
        }
    }

    #[test]
    fn test_fault_codes() {
        let client: Fault = (&TransportError::Client("unknown operation".into())).into();
        assert_eq!(client.code, "Client");
        assert_eq!(client.message, "unknown operation");

        let server: Fault = (&TransportError::Server("boom".into())).into();
        assert_eq!(server.code, "Server");

        let format: Fault = (&TransportError::InvalidFormat("bad".into())).into();
        assert_eq!(format.code, "Client");
    }

    #[test]
    fn test_wire_message_from_json_str() {
        let message = WireMessage::from_json_str(
            r#"{"headers":[{"name":"auth","payload":"secret"}],"operation":"Add","arguments":[2,3]}"#,
        )
        .expect("valid envelope");
        assert_eq!(message.operation, "Add");
        assert_eq!(message.headers[0].name, "auth");
        assert_eq!(message.headers[0].namespace, "");
        assert_eq!(message.arguments, vec![Value::from(2), Value::from(3)]);

        assert!(matches!(WireMessage::from_json_str("[]"), Err(TransportError::InvalidFormat(_))));
        assert!(matches!(WireMessage::from_json_str("{"), Err(TransportError::Serialization(_))));
    }
}
