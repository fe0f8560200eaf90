//! Native request and response objects of a single call

use indexmap::IndexMap;
use serde_json::Value;
use transport::WireHeader;

/// A header in native form.
#[derive(Debug, Clone, PartialEq)]
pub struct SoapHeader {
    /// Namespace URI of the header element
    pub namespace: String,
    /// Header name
    pub name: String,
    /// Native header value
    pub data: Value,
}

impl SoapHeader {
    /// Create a header.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, data: Value) -> Self {
        Self { namespace: namespace.into(), name: name.into(), data }
    }

    /// Wire form of this header.
    pub fn into_wire(self) -> WireHeader { WireHeader::new(self.namespace, self.name, self.data) }
}

/// The native request handed to the operation handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoapRequest {
    /// Operation being invoked; empty until the operation callback arrives
    pub operation: String,
    /// Arguments keyed by name, in declaration order
    pub attributes: IndexMap<String, Value>,
    /// Recognized request headers, in arrival order
    pub headers: Vec<SoapHeader>,
}

impl SoapRequest {
    /// Create an empty request.
    pub fn new() -> Self { Self::default() }

    /// Named argument.
    pub fn attribute(&self, name: &str) -> Option<&Value> { self.attributes.get(name) }

    /// First request header with this name.
    pub fn header(&self, name: &str) -> Option<&SoapHeader> {
        self.headers.iter().find(|h| h.name == name)
    }
}

/// The native response produced by the operation handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoapResponse {
    /// Value of the operation's `return` part
    pub return_value: Option<Value>,
    /// Headers to emit, in order
    pub headers: Vec<SoapHeader>,
}

impl SoapResponse {
    /// Response carrying `value`.
    pub fn with_return(value: Value) -> Self { Self { return_value: Some(value), headers: Vec::new() } }

    /// Append an outgoing header.
    pub fn add_header(&mut self, header: SoapHeader) { self.headers.push(header); }
}

/// Whatever an operation handler hands back.
///
/// Only [`Response::Soap`] is a valid answer to a SOAP call; the other shape
/// exists so handlers shared with plain endpoints can be detected.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// A SOAP response
    Soap(SoapResponse),
    /// A plain (non-SOAP) response body
    Plain {
        /// Status code
        status: u16,
        /// Body text
        body: String,
    },
}

impl From<SoapResponse> for Response {
    fn from(response: SoapResponse) -> Self { Response::Soap(response) }
}
