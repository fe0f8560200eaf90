//! WSDL 1.1 document under construction
//!
//! [`WsdlDocument`] collects the sections of an interface description and
//! renders them in canonical order: `types`, `message`, `portType`,
//! `binding`, `service`. Schema types are keyed by local name and declared at
//! most once.

use std::fmt::Write;

use indexmap::IndexMap;
use ir::QualifiedName;
use registry::namespaces::{SOAP_ENC, WSDL, WSDL_SOAP, XSD};

use crate::utils::{attrs, indent};
use crate::{CodegenError, Result};

/// Prefix bound to the document's target namespace.
pub const TARGET_PREFIX: &str = "tns";

/// An element of a schema type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaElement {
    /// Element name
    pub name: String,
    /// Qualified type reference, e.g. `xsd:string`
    pub type_ref: String,
    /// Whether the element may be nil
    pub nillable: bool,
}

/// A schema type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaType {
    /// Named record: `xsd:complexType` / `xsd:all`
    Record {
        /// Local type name
        name: String,
        /// Fields in declaration order
        fields: Vec<SchemaElement>,
    },
    /// Array-of: `xsd:complexType` / `xsd:sequence` of unbounded `item` elements
    ArrayOf {
        /// Local type name
        name: String,
        /// Qualified reference of the item type
        item_type: String,
    },
}

impl SchemaType {
    /// Local name of the declared type.
    pub fn name(&self) -> &str {
        match self {
            SchemaType::Record { name, .. } | SchemaType::ArrayOf { name, .. } => name,
        }
    }
}

/// How a message travels inside a binding operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyBinding {
    /// Space-separated part names
    pub parts: String,
    /// `literal` or `encoded`
    pub use_: String,
    /// Namespace of the rpc wrapper element
    pub namespace: String,
    /// Encoding style URI
    pub encoding_style: String,
}

impl BodyBinding {
    /// Literal body in `namespace` carrying `parts`.
    pub fn literal(parts: &[&str], namespace: &str) -> Self {
        Self {
            parts: parts.join(" "),
            use_: "literal".to_string(),
            namespace: namespace.to_string(),
            encoding_style: SOAP_ENC.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Message {
    name: String,
    parts: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct PortOperation {
    name: String,
    parameter_order: String,
    input: String,
    output: String,
}

#[derive(Debug, Clone)]
struct BindingOperation {
    name: String,
    soap_action: Option<String>,
    input: BodyBinding,
    output: BodyBinding,
}

#[derive(Debug, Clone)]
struct Binding {
    name: String,
    port_type: String,
    style: Option<String>,
    operations: Vec<BindingOperation>,
}

#[derive(Debug, Clone)]
struct Service {
    name: String,
    port_name: String,
    binding: String,
    location: String,
}

/// A WSDL document being assembled.
#[derive(Debug, Clone)]
pub struct WsdlDocument {
    name: String,
    target_namespace: String,
    namespaces: Vec<(String, String)>,
    schema_types: IndexMap<String, SchemaType>,
    messages: Vec<Message>,
    port_type: Option<(String, Vec<PortOperation>)>,
    binding: Option<Binding>,
    service: Option<Service>,
}

impl WsdlDocument {
    /// Start a document for service `name` in `target_namespace`.
    ///
    /// Declares `tns`, `soap`, `xsd`, `soap-enc` and `wsdl`.
    pub fn new(name: impl Into<String>, target_namespace: impl Into<String>) -> Self {
        let target_namespace = target_namespace.into();
        let namespaces = [
            (TARGET_PREFIX, target_namespace.as_str()),
            ("soap", WSDL_SOAP),
            ("xsd", XSD),
            ("soap-enc", SOAP_ENC),
            ("wsdl", WSDL),
        ]
        .iter()
        .map(|(p, u)| (p.to_string(), u.to_string()))
        .collect();

        Self {
            name: name.into(),
            target_namespace,
            namespaces,
            schema_types: IndexMap::new(),
            messages: Vec::new(),
            port_type: None,
            binding: None,
            service: None,
        }
    }

    /// Service name.
    pub fn name(&self) -> &str { &self.name }

    /// Target namespace URI.
    pub fn target_namespace(&self) -> &str { &self.target_namespace }

    /// Declare an additional prefix. A prefix that is already declared keeps its first URI.
    pub fn declare_namespace(&mut self, prefix: &str, uri: &str) {
        if !self.namespaces.iter().any(|(p, _)| p == prefix) {
            self.namespaces.push((prefix.to_string(), uri.to_string()));
        }
    }

    /// First prefix declared for `uri`.
    pub fn lookup_prefix(&self, uri: &str) -> Result<&str> {
        self.namespaces
            .iter()
            .find(|(_, u)| u == uri)
            .map(|(p, _)| p.as_str())
            .ok_or_else(|| CodegenError::UnknownPrefix(uri.to_string()))
    }

    /// `prefix:name` for a name in `namespace`.
    pub fn qualify(&self, name: &str, namespace: &str) -> Result<String> {
        Ok(format!("{}:{}", self.lookup_prefix(namespace)?, name))
    }

    /// `prefix:local` for a qualified type name.
    pub fn qualify_type(&self, qname: &QualifiedName) -> Result<String> {
        Ok(qname.to_prefixed(self.lookup_prefix(qname.namespace())?))
    }

    /// Whether a schema type with this local name is declared.
    pub fn has_schema_type(&self, name: &str) -> bool { self.schema_types.contains_key(name) }

    /// Declare a schema type. Returns false, leaving the first declaration, when the name is taken.
    pub fn add_schema_type(&mut self, schema_type: SchemaType) -> bool {
        if self.has_schema_type(schema_type.name()) {
            return false;
        }
        self.schema_types.insert(schema_type.name().to_string(), schema_type);
        true
    }

    /// Replace the fields of a declared record type.
    pub fn set_record_fields(&mut self, name: &str, new_fields: Vec<SchemaElement>) {
        if let Some(SchemaType::Record { fields, .. }) = self.schema_types.get_mut(name) {
            *fields = new_fields;
        }
    }

    /// Declared schema types in declaration order.
    pub fn schema_types(&self) -> impl Iterator<Item = &SchemaType> { self.schema_types.values() }

    /// Add a message with `(part name, qualified type)` parts.
    pub fn add_message(&mut self, name: impl Into<String>, parts: Vec<(String, String)>) {
        self.messages.push(Message { name: name.into(), parts });
    }

    /// Create the port type.
    pub fn add_port_type(&mut self, name: impl Into<String>) {
        self.port_type = Some((name.into(), Vec::new()));
    }

    /// Add an operation to the port type.
    pub fn add_port_operation(
        &mut self,
        name: &str,
        parameter_order: &[&str],
        input: String,
        output: String,
    ) {
        if let Some((_, operations)) = self.port_type.as_mut() {
            operations.push(PortOperation {
                name: name.to_string(),
                parameter_order: parameter_order.join(" "),
                input,
                output,
            });
        }
    }

    /// Create the binding for `port_type` (a qualified reference).
    pub fn add_binding(&mut self, name: impl Into<String>, port_type: String) {
        self.binding =
            Some(Binding { name: name.into(), port_type, style: None, operations: Vec::new() });
    }

    /// Mark the binding as a SOAP-over-HTTP binding of the given style.
    pub fn add_soap_binding(&mut self, style: &str) {
        if let Some(binding) = self.binding.as_mut() {
            binding.style = Some(style.to_string());
        }
    }

    /// Add an operation to the binding.
    pub fn add_binding_operation(&mut self, name: &str, input: BodyBinding, output: BodyBinding) {
        if let Some(binding) = self.binding.as_mut() {
            binding.operations.push(BindingOperation {
                name: name.to_string(),
                soap_action: None,
                input,
                output,
            });
        }
    }

    /// Attach a SOAP action to a binding operation.
    pub fn add_soap_operation(&mut self, name: &str, soap_action: impl Into<String>) {
        let operation = self
            .binding
            .as_mut()
            .and_then(|b| b.operations.iter_mut().find(|op| op.name == name));
        if let Some(operation) = operation {
            operation.soap_action = Some(soap_action.into());
        }
    }

    /// Create the service with a single port.
    pub fn add_service(
        &mut self,
        name: impl Into<String>,
        port_name: impl Into<String>,
        binding: String,
        location: impl Into<String>,
    ) {
        self.service = Some(Service {
            name: name.into(),
            port_name: port_name.into(),
            binding,
            location: location.into(),
        });
    }

    /// Serialize the document, optionally preceded by an `xml-stylesheet` instruction.
    pub fn render(&self, stylesheet: Option<&str>) -> Result<String> {
        let mut out = String::new();
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        if let Some(href) = stylesheet {
            writeln!(out, "<?xml-stylesheet{}?>", attrs(&[("type", "text/xsl"), ("href", href)]))?;
        }

        let mut root = vec![("xmlns".to_string(), WSDL.to_string())];
        root.extend(self.namespaces.iter().map(|(p, u)| (format!("xmlns:{}", p), u.clone())));
        root.push(("name".to_string(), self.name.clone()));
        root.push(("targetNamespace".to_string(), self.target_namespace.clone()));
        let root: Vec<(&str, &str)> = root.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        writeln!(out, "<definitions{}>", attrs(&root))?;

        self.render_types(&mut out)?;
        self.render_messages(&mut out)?;
        self.render_port_type(&mut out)?;
        self.render_binding(&mut out)?;
        self.render_service(&mut out)?;

        writeln!(out, "</definitions>")?;
        Ok(out)
    }

    fn render_types(&self, out: &mut String) -> Result<()> {
        if self.schema_types.is_empty() {
            return Ok(());
        }
        writeln!(out, "{}<types>", indent(1))?;
        writeln!(out, "{}<xsd:schema{}>", indent(2), attrs(&[("targetNamespace", &self.target_namespace)]))?;
        for schema_type in self.schema_types.values() {
            writeln!(out, "{}<xsd:complexType{}>", indent(3), attrs(&[("name", schema_type.name())]))?;
            match schema_type {
                SchemaType::Record { fields, .. } => {
                    if fields.is_empty() {
                        writeln!(out, "{}<xsd:all/>", indent(4))?;
                    } else {
                        writeln!(out, "{}<xsd:all>", indent(4))?;
                        for field in fields {
                            let mut pairs = vec![("name", field.name.as_str()), ("type", field.type_ref.as_str())];
                            if field.nillable {
                                pairs.push(("nillable", "true"));
                            }
                            writeln!(out, "{}<xsd:element{}/>", indent(5), attrs(&pairs))?;
                        }
                        writeln!(out, "{}</xsd:all>", indent(4))?;
                    }
                }
                SchemaType::ArrayOf { item_type, .. } => {
                    writeln!(out, "{}<xsd:sequence>", indent(4))?;
                    writeln!(
                        out,
                        "{}<xsd:element{}/>",
                        indent(5),
                        attrs(&[
                            ("name", "item"),
                            ("type", item_type),
                            ("minOccurs", "0"),
                            ("maxOccurs", "unbounded"),
                        ])
                    )?;
                    writeln!(out, "{}</xsd:sequence>", indent(4))?;
                }
            }
            writeln!(out, "{}</xsd:complexType>", indent(3))?;
        }
        writeln!(out, "{}</xsd:schema>", indent(2))?;
        writeln!(out, "{}</types>", indent(1))?;
        Ok(())
    }

    fn render_messages(&self, out: &mut String) -> Result<()> {
        for message in &self.messages {
            if message.parts.is_empty() {
                writeln!(out, "{}<message{}/>", indent(1), attrs(&[("name", &message.name)]))?;
                continue;
            }
            writeln!(out, "{}<message{}>", indent(1), attrs(&[("name", &message.name)]))?;
            for (part, type_ref) in &message.parts {
                writeln!(out, "{}<part{}/>", indent(2), attrs(&[("name", part), ("type", type_ref)]))?;
            }
            writeln!(out, "{}</message>", indent(1))?;
        }
        Ok(())
    }

    fn render_port_type(&self, out: &mut String) -> Result<()> {
        let Some((name, operations)) = &self.port_type else {
            return Ok(());
        };
        writeln!(out, "{}<portType{}>", indent(1), attrs(&[("name", name)]))?;
        for op in operations {
            writeln!(
                out,
                "{}<operation{}>",
                indent(2),
                attrs(&[("name", &op.name), ("parameterOrder", &op.parameter_order)])
            )?;
            writeln!(out, "{}<input{}/>", indent(3), attrs(&[("message", &op.input)]))?;
            writeln!(out, "{}<output{}/>", indent(3), attrs(&[("message", &op.output)]))?;
            writeln!(out, "{}</operation>", indent(2))?;
        }
        writeln!(out, "{}</portType>", indent(1))?;
        Ok(())
    }

    fn render_binding(&self, out: &mut String) -> Result<()> {
        let Some(binding) = &self.binding else {
            return Ok(());
        };
        writeln!(
            out,
            "{}<binding{}>",
            indent(1),
            attrs(&[("name", &binding.name), ("type", &binding.port_type)])
        )?;
        if let Some(style) = &binding.style {
            writeln!(
                out,
                "{}<soap:binding{}/>",
                indent(2),
                attrs(&[("style", style), ("transport", registry::namespaces::SOAP_HTTP_TRANSPORT)])
            )?;
        }
        for op in &binding.operations {
            writeln!(out, "{}<operation{}>", indent(2), attrs(&[("name", &op.name)]))?;
            if let Some(action) = &op.soap_action {
                writeln!(out, "{}<soap:operation{}/>", indent(3), attrs(&[("soapAction", action)]))?;
            }
            for (tag, body) in [("input", &op.input), ("output", &op.output)] {
                writeln!(out, "{}<{}>", indent(3), tag)?;
                writeln!(
                    out,
                    "{}<soap:body{}/>",
                    indent(4),
                    attrs(&[
                        ("parts", &body.parts),
                        ("use", &body.use_),
                        ("namespace", &body.namespace),
                        ("encodingStyle", &body.encoding_style),
                    ])
                )?;
                writeln!(out, "{}</{}>", indent(3), tag)?;
            }
            writeln!(out, "{}</operation>", indent(2))?;
        }
        writeln!(out, "{}</binding>", indent(1))?;
        Ok(())
    }

    fn render_service(&self, out: &mut String) -> Result<()> {
        let Some(service) = &self.service else {
            return Ok(());
        };
        writeln!(out, "{}<service{}>", indent(1), attrs(&[("name", &service.name)]))?;
        writeln!(
            out,
            "{}<port{}>",
            indent(2),
            attrs(&[("name", &service.port_name), ("binding", &service.binding)])
        )?;
        writeln!(out, "{}<soap:address{}/>", indent(3), attrs(&[("location", &service.location)]))?;
        writeln!(out, "{}</port>", indent(2))?;
        writeln!(out, "{}</service>", indent(1))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_prefix() {
        let mut doc = WsdlDocument::new("Calc", "urn:calc");
        assert_eq!(doc.lookup_prefix("urn:calc").expect("declared"), "tns");
        assert_eq!(doc.lookup_prefix(XSD).expect("declared"), "xsd");
        assert!(matches!(doc.lookup_prefix("urn:other"), Err(CodegenError::UnknownPrefix(_))));

        doc.declare_namespace("other", "urn:other");
        doc.declare_namespace("other", "urn:ignored");
        assert_eq!(doc.qualify("Thing", "urn:other").expect("declared"), "other:Thing");
        assert!(matches!(doc.lookup_prefix("urn:ignored"), Err(CodegenError::UnknownPrefix(_))));
    }

    #[test]
    fn test_qualify_type() {
        let doc = WsdlDocument::new("Calc", "urn:calc");
        let money = QualifiedName::new("urn:calc", "Money").expect("valid");
        assert_eq!(doc.qualify_type(&money).expect("declared"), "tns:Money");

        let point = QualifiedName::new("urn:geo", "Point").expect("valid");
        assert!(matches!(doc.qualify_type(&point), Err(CodegenError::UnknownPrefix(ref uri)) if uri == "urn:geo"));
    }

    #[test]
    fn test_add_schema_type_is_idempotent() {
        let mut doc = WsdlDocument::new("Calc", "urn:calc");
        let first = SchemaType::ArrayOf { name: "IntArray".into(), item_type: "xsd:int".into() };
        let second = SchemaType::ArrayOf { name: "IntArray".into(), item_type: "xsd:long".into() };

        assert!(doc.add_schema_type(first.clone()));
        assert!(!doc.add_schema_type(second));
        assert_eq!(doc.schema_types().collect::<Vec<_>>(), vec![&first]);
    }

    #[test]
    fn test_render_minimal_document() {
        let doc = WsdlDocument::new("Empty", "urn:empty");
        let xml = doc.render(Some("style.xsl")).expect("renders");

        let mut lines = xml.lines();
        assert_eq!(lines.next(), Some(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert_eq!(lines.next(), Some(r#"<?xml-stylesheet type="text/xsl" href="style.xsl"?>"#));
        assert!(xml.contains(r#"name="Empty" targetNamespace="urn:empty""#));
        assert!(!xml.contains("<types>"));
        assert!(xml.trim_end().ends_with("</definitions>"));
    }
}
