//! WSDL 1.1 dumper (rpc style, literal use)
//!
//! Naming follows the service name: `<Name>PortType`, `<Name>Binding`,
//! `<Name>Service` and `<Name>Port`. Every operation gets an
//! `<Operation>Request` message with one part per argument and an
//! `<Operation>Response` message with a single `return` part (empty when
//! the operation returns nothing). The SOAP action is the target namespace
//! concatenated with the operation name.

use ir::{ServiceDefinition, TypedSlot};
use registry::TypeRegistryReader;

use super::type_strategy::{TypeContext, TypeEncodingStrategy, WsdlTypeStrategy};
use crate::wsdl_document::{BodyBinding, WsdlDocument, TARGET_PREFIX};
use crate::{CodegenError, DumpOptions, Dumper, Result};

/// Name of the single response part.
pub const RETURN_PART: &str = "return";

/// Renders a type-resolved [`ServiceDefinition`] as a WSDL document.
#[derive(Debug, Clone, Default)]
pub struct WsdlDumper {
    namespaces: Vec<(String, String)>,
}

impl WsdlDumper {
    /// Create a dumper that only declares the standard prefixes.
    pub fn new() -> Self { Self::default() }

    /// Also declare every prefix known to `registry`.
    pub fn with_namespaces(mut self, registry: &dyn TypeRegistryReader) -> Self {
        self.namespaces
            .extend(registry.namespaces().into_iter().map(|(p, u)| (p.to_string(), u.to_string())));
        self
    }

    /// Render `definition` using a caller-supplied type strategy.
    ///
    /// The strategy's context is replaced for the duration of the call and
    /// left empty afterwards.
    pub fn dump_with_strategy<'d>(
        &self,
        definition: &'d ServiceDefinition,
        options: &DumpOptions,
        strategy: &mut dyn TypeEncodingStrategy<'d>,
    ) -> Result<String> {
        check_resolved(definition)?;

        let name = definition.name();
        let namespace = definition.namespace();
        let mut document = WsdlDocument::new(name, namespace);
        for (prefix, uri) in &self.namespaces {
            document.declare_namespace(prefix, uri);
        }

        strategy.set_context(TypeContext::new(document, definition));
        let encoded = encode_slot_types(definition, strategy);
        let mut document = strategy
            .take_context()
            .ok_or_else(|| CodegenError::NoContext(name.to_string()))?
            .into_document();
        encoded?;

        let port_type = format!("{}PortType", name);
        let binding = format!("{}Binding", name);
        document.add_port_type(&port_type);
        document.add_binding(&binding, qualify_local(&port_type));
        document.add_soap_binding("rpc");
        document.add_service(
            format!("{}Service", name),
            format!("{}Port", name),
            qualify_local(&binding),
            options.endpoint.clone().unwrap_or_default(),
        );

        for op in definition.operations() {
            let mut request_parts = Vec::with_capacity(op.arguments.len());
            for argument in &op.arguments {
                request_parts.push((argument.name.clone(), part_type(&document, &op.name, argument)?));
            }
            let mut response_parts = Vec::new();
            if let Some(ret) = &op.return_type {
                response_parts.push((RETURN_PART.to_string(), part_type(&document, &op.name, ret)?));
            }

            let request = format!("{}Request", op.name);
            let response = format!("{}Response", op.name);
            document.add_message(&request, request_parts);
            document.add_message(&response, response_parts);

            let argument_names = op.argument_names();
            let response_names: &[&str] = if op.return_type.is_some() { &[RETURN_PART] } else { &[] };
            document.add_port_operation(
                &op.name,
                &argument_names,
                qualify_local(&request),
                qualify_local(&response),
            );
            document.add_binding_operation(
                &op.name,
                BodyBinding::literal(&argument_names, namespace),
                BodyBinding::literal(response_names, namespace),
            );
            document.add_soap_operation(&op.name, format!("{}{}", namespace, op.name));
        }

        tracing::debug!(
            service = name,
            operations = definition.operation_count(),
            endpoint = options.endpoint.as_deref().unwrap_or(""),
            "dumped service definition"
        );
        document.render(options.stylesheet.as_deref())
    }
}

impl Dumper for WsdlDumper {
    fn dump_service_definition(
        &self,
        definition: Option<&ServiceDefinition>,
        options: &DumpOptions,
    ) -> Result<String> {
        let definition = definition.ok_or(CodegenError::MissingDefinition)?;
        let mut strategy = WsdlTypeStrategy::new();
        self.dump_with_strategy(definition, options, &mut strategy)
    }
}

fn check_resolved(definition: &ServiceDefinition) -> Result<()> {
    for op in definition.operations() {
        let mut slots = op.arguments.iter().chain(op.headers.iter()).chain(op.return_type.iter());
        if let Some(slot) = slots.find(|s| s.xml_type.is_none()) {
            return Err(CodegenError::UnresolvedType {
                operation: op.name.clone(),
                slot: slot.name.clone(),
            });
        }
    }
    Ok(())
}

/// Declare the schema types of every slot living in the target namespace,
/// headers included, under the wire name the slot resolved to.
fn encode_slot_types<'d>(
    definition: &'d ServiceDefinition,
    strategy: &mut dyn TypeEncodingStrategy<'d>,
) -> Result<()> {
    for slot in definition.all_types() {
        let Some(wire_type) = slot.xml_type().filter(|q| q.namespace() == definition.namespace()) else {
            continue;
        };
        if let Some(native) = slot.native_type() {
            strategy.encode_complex_type_as(native, wire_type)?;
        }
    }
    Ok(())
}

fn part_type(document: &WsdlDocument, operation: &str, slot: &TypedSlot) -> Result<String> {
    let qname = slot.xml_type().ok_or_else(|| CodegenError::UnresolvedType {
        operation: operation.to_string(),
        slot: slot.name.clone(),
    })?;
    document.qualify_type(qname)
}

fn qualify_local(name: &str) -> String { format!("{}:{}", TARGET_PREFIX, name) }
