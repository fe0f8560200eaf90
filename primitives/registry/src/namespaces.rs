//! Well-known namespace URIs and their conventional prefixes.

/// XML Schema
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema";
/// SOAP 1.1 encoding
pub const SOAP_ENC: &str = "http://schemas.xmlsoap.org/soap/encoding/";
/// WSDL 1.1
pub const WSDL: &str = "http://schemas.xmlsoap.org/wsdl/";
/// WSDL 1.1 SOAP binding
pub const WSDL_SOAP: &str = "http://schemas.xmlsoap.org/wsdl/soap/";
/// SOAP over HTTP transport
pub const SOAP_HTTP_TRANSPORT: &str = "http://schemas.xmlsoap.org/soap/http";

/// Prefixes registered by [`crate::TypeRegistry::with_defaults`].
pub const WELL_KNOWN: &[(&str, &str)] =
    &[("xsd", XSD), ("soap-enc", SOAP_ENC), ("soap", WSDL_SOAP), ("wsdl", WSDL)];

/// Scalar native types and the `xsd` types they map to.
pub const SCALAR_TYPES: &[(&str, &str)] = &[
    ("string", "xsd:string"),
    ("int", "xsd:int"),
    ("integer", "xsd:int"),
    ("float", "xsd:float"),
    ("double", "xsd:double"),
    ("bool", "xsd:boolean"),
    ("boolean", "xsd:boolean"),
    ("mixed", "xsd:anyType"),
    ("date", "xsd:date"),
    ("dateTime", "xsd:dateTime"),
    ("base64", "xsd:base64Binary"),
];
