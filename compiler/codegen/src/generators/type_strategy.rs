//! Schema type encoding
//!
//! A [`TypeEncodingStrategy`] declares native types in the schema section of a
//! [`WsdlDocument`]. [`WsdlTypeStrategy`] picks between two encodings: array
//! types (`T[]`) become an `xsd:sequence` of `item` elements, everything else
//! a named record. Each type is declared at most once; a placeholder is
//! registered before the fields are encoded so self-referencing types
//! terminate.

use ir::{array_element_type, QualifiedName, ServiceDefinition};
use registry::default_local_name;

use crate::wsdl_document::{SchemaElement, SchemaType, WsdlDocument};
use crate::{CodegenError, Result};

/// The document a strategy writes into, plus the definition it reads types from.
#[derive(Debug)]
pub struct TypeContext<'d> {
    document: WsdlDocument,
    definition: &'d ServiceDefinition,
}

impl<'d> TypeContext<'d> {
    /// Bind `document` to the definition whose types will be encoded.
    pub fn new(document: WsdlDocument, definition: &'d ServiceDefinition) -> Self {
        Self { document, definition }
    }

    /// The document under construction.
    pub fn document(&self) -> &WsdlDocument { &self.document }

    /// Mutable access to the document.
    pub fn document_mut(&mut self) -> &mut WsdlDocument { &mut self.document }

    /// Give the document back.
    pub fn into_document(self) -> WsdlDocument { self.document }

    /// Wire name of a native type: the definition's resolved mapping, or a
    /// synthesized name in the target namespace.
    pub fn type_name(&self, native_type: &str) -> Result<QualifiedName> {
        match self.definition.resolved_type(native_type) {
            Some(qname) => Ok(qname.clone()),
            None => Ok(QualifiedName::new(
                self.definition.namespace(),
                default_local_name(native_type),
            )?),
        }
    }

    fn is_local(&self, qname: &QualifiedName) -> bool {
        qname.namespace() == self.document.target_namespace()
    }
}

/// Declares native types in a document's schema section.
pub trait TypeEncodingStrategy<'d> {
    /// Attach the context subsequent declarations go into.
    fn set_context(&mut self, context: TypeContext<'d>);

    /// Detach and return the current context.
    fn take_context(&mut self) -> Option<TypeContext<'d>>;

    /// The current context, if any.
    fn context_mut(&mut self) -> Option<&mut TypeContext<'d>>;

    /// Declare `native_type` (and whatever it references) and return its
    /// qualified wire name.
    ///
    /// Fails with [`CodegenError::NoContext`] when no context is attached.
    fn encode_complex_type(&mut self, native_type: &str) -> Result<QualifiedName>;

    /// Declare `native_type` under an already resolved wire name.
    ///
    /// Slots carrying an explicit wire type may name a native type differently
    /// from the definition's type map; the declaration follows the slot.
    fn encode_complex_type_as(&mut self, native_type: &str, name: &QualifiedName) -> Result<QualifiedName>;
}

/// The default strategy: array-of sequences and named records.
#[derive(Debug, Default)]
pub struct WsdlTypeStrategy<'d> {
    context: Option<TypeContext<'d>>,
}

impl<'d> WsdlTypeStrategy<'d> {
    /// Create a strategy without a context.
    pub fn new() -> Self { Self { context: None } }
}

impl<'d> TypeEncodingStrategy<'d> for WsdlTypeStrategy<'d> {
    fn set_context(&mut self, context: TypeContext<'d>) { self.context = Some(context); }

    fn take_context(&mut self) -> Option<TypeContext<'d>> { self.context.take() }

    fn context_mut(&mut self) -> Option<&mut TypeContext<'d>> { self.context.as_mut() }

    fn encode_complex_type(&mut self, native_type: &str) -> Result<QualifiedName> {
        let context = self
            .context
            .as_mut()
            .ok_or_else(|| CodegenError::NoContext(native_type.to_string()))?;
        encode(context, native_type)
    }

    fn encode_complex_type_as(&mut self, native_type: &str, name: &QualifiedName) -> Result<QualifiedName> {
        let context = self
            .context
            .as_mut()
            .ok_or_else(|| CodegenError::NoContext(native_type.to_string()))?;
        declare(context, native_type, name.clone())
    }
}

/// One way of turning a native type into a schema declaration.
trait ComplexTypeEncoding {
    fn declare(&self, context: &mut TypeContext<'_>, native_type: &str, name: &str) -> Result<()>;
}

/// `xsd:complexType` / `xsd:all` with one element per declared field.
struct DefaultComplexType;

impl ComplexTypeEncoding for DefaultComplexType {
    fn declare(&self, context: &mut TypeContext<'_>, native_type: &str, name: &str) -> Result<()> {
        context
            .document
            .add_schema_type(SchemaType::Record { name: name.to_string(), fields: Vec::new() });

        let definition = context.definition;
        let mut fields = Vec::new();
        for field in definition.complex_type(native_type).unwrap_or_default() {
            fields.push(SchemaElement {
                name: field.name.clone(),
                type_ref: type_ref(context, &field.native_type)?,
                nillable: field.nillable,
            });
        }
        context.document.set_record_fields(name, fields);
        Ok(())
    }
}

/// `xsd:complexType` / `xsd:sequence` of unbounded, optional `item` elements.
struct ArrayOfTypeSequence;

impl ComplexTypeEncoding for ArrayOfTypeSequence {
    fn declare(&self, context: &mut TypeContext<'_>, native_type: &str, name: &str) -> Result<()> {
        let element = array_element_type(native_type).unwrap_or(native_type);
        let item_type = type_ref(context, element)?;
        context.document.add_schema_type(SchemaType::ArrayOf { name: name.to_string(), item_type });
        Ok(())
    }
}

fn encode(context: &mut TypeContext<'_>, native_type: &str) -> Result<QualifiedName> {
    let qname = context.type_name(native_type)?;
    declare(context, native_type, qname)
}

fn declare(context: &mut TypeContext<'_>, native_type: &str, qname: QualifiedName) -> Result<QualifiedName> {
    if !context.is_local(&qname) || context.document.has_schema_type(qname.local()) {
        return Ok(qname);
    }

    tracing::trace!(native_type, wire_type = %qname, "declaring schema type");
    if array_element_type(native_type).is_some() {
        ArrayOfTypeSequence.declare(context, native_type, qname.local())?;
    } else {
        DefaultComplexType.declare(context, native_type, qname.local())?;
    }
    Ok(qname)
}

fn type_ref(context: &mut TypeContext<'_>, native_type: &str) -> Result<String> {
    let qname = encode(context, native_type)?;
    context.document.qualify_type(&qname)
}
