//! Dispatch table of a service
//!
//! Every header and operation name of a resolved [`ServiceDefinition`] is
//! entered into one table, tagged with what it is. The table is built once
//! per service and only read afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use ir::{array_element_type, Operation, QualifiedName, ServiceDefinition, TypedSlot};
use serde_json::Value;

use crate::binder::{RequestMessageBinder, ResponseMessageBinder, RpcLiteralRequestBinder, RpcLiteralResponseBinder};
use crate::converter::ConverterTable;
use crate::message::{SoapHeader, SoapRequest, SoapResponse};
use crate::{DispatchError, Result};

/// What a message name refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEntry {
    /// A request header and its declared slot
    Header(TypedSlot),
    /// An operation
    Operation(String),
}

/// Dispatch table plus the binders applied to each call.
pub struct ServiceBinder {
    definition: Arc<ServiceDefinition>,
    entries: BTreeMap<String, DispatchEntry>,
    request_binder: Box<dyn RequestMessageBinder>,
    response_binder: Box<dyn ResponseMessageBinder>,
}

impl std::fmt::Debug for ServiceBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceBinder")
            .field("service", &self.definition.name())
            .field("entries", &self.entries)
            .finish()
    }
}

impl ServiceBinder {
    /// Build the table with the rpc/literal binders.
    pub fn new(definition: Arc<ServiceDefinition>) -> Self {
        Self::with_binders(definition, Box::new(RpcLiteralRequestBinder), Box::new(RpcLiteralResponseBinder))
    }

    /// Build the table with custom binders.
    ///
    /// A header declared by several operations keeps its first declaration.
    /// A name used both as header and operation resolves to the header.
    pub fn with_binders(
        definition: Arc<ServiceDefinition>,
        request_binder: Box<dyn RequestMessageBinder>,
        response_binder: Box<dyn ResponseMessageBinder>,
    ) -> Self {
        let mut entries = BTreeMap::new();
        for op in definition.operations() {
            for header in &op.headers {
                entries.entry(header.name.clone()).or_insert_with(|| DispatchEntry::Header(header.clone()));
            }
        }
        for op in definition.operations() {
            entries.entry(op.name.clone()).or_insert_with(|| DispatchEntry::Operation(op.name.clone()));
        }
        Self { definition, entries, request_binder, response_binder }
    }

    /// The definition this binder serves.
    pub fn definition(&self) -> &ServiceDefinition { &self.definition }

    /// Table entry for a message name.
    pub fn entry(&self, name: &str) -> Option<&DispatchEntry> { self.entries.get(name) }

    /// Whether `name` is a declared request header.
    pub fn is_service_header(&self, name: &str) -> bool {
        matches!(self.entry(name), Some(DispatchEntry::Header(_)))
    }

    /// Whether `name` is a declared operation.
    pub fn is_service_method(&self, name: &str) -> bool {
        matches!(self.entry(name), Some(DispatchEntry::Operation(_)))
    }

    /// Convert a recognized request header to native form.
    pub fn process_service_header(
        &self,
        name: &str,
        payload: Value,
        converters: &ConverterTable,
        request: &SoapRequest,
    ) -> Result<SoapHeader> {
        let Some(DispatchEntry::Header(slot)) = self.entry(name) else {
            return Err(DispatchError::UnknownOperation(name.to_string()));
        };
        let data = self.convert_inbound(slot, payload, converters, request)?;
        Ok(SoapHeader::new(self.definition.namespace(), name, data))
    }

    /// Bind and convert the positional arguments of `operation`.
    pub fn process_service_method_arguments(
        &self,
        operation: &str,
        arguments: Vec<Value>,
        converters: &ConverterTable,
        request: &SoapRequest,
    ) -> Result<IndexMap<String, Value>> {
        let op = self.operation(operation)?;
        let bound = self.request_binder.bind_request(op, arguments)?;

        let mut attributes = IndexMap::with_capacity(bound.len());
        for (slot, (name, value)) in op.arguments.iter().zip(bound) {
            attributes.insert(name, self.convert_inbound(slot, value, converters, request)?);
        }
        Ok(attributes)
    }

    /// Convert the handler's return value to wire form.
    pub fn process_service_method_return_value(
        &self,
        operation: &str,
        converters: &ConverterTable,
        response: &SoapResponse,
    ) -> Result<Option<Value>> {
        let op = self.operation(operation)?;
        let value = self.response_binder.bind_response(op, response.return_value.clone())?;
        match (value, op.return_type.as_ref()) {
            (Some(value), Some(slot)) => Ok(Some(self.convert_outbound(slot, value, converters, response)?)),
            (value, _) => Ok(value),
        }
    }

    /// Convert an outgoing header, using the declared type of a header with the same name.
    pub fn process_response_header(
        &self,
        header: SoapHeader,
        converters: &ConverterTable,
        response: &SoapResponse,
    ) -> Result<SoapHeader> {
        let Some(DispatchEntry::Header(slot)) = self.entry(&header.name) else {
            return Ok(header);
        };
        let data = self.convert_outbound(slot, header.data, converters, response)?;
        Ok(SoapHeader { data, ..header })
    }

    fn operation(&self, name: &str) -> Result<&Operation> {
        self.definition.operation(name).ok_or_else(|| DispatchError::UnknownOperation(name.to_string()))
    }

    fn convert_inbound(
        &self,
        slot: &TypedSlot,
        value: Value,
        converters: &ConverterTable,
        request: &SoapRequest,
    ) -> Result<Value> {
        let convert = |wire_type: &QualifiedName, value: Value| converters.wire_to_native(wire_type, value, request);
        self.convert_value(slot.native_type(), slot.xml_type(), value, converters, &convert)
    }

    fn convert_outbound(
        &self,
        slot: &TypedSlot,
        value: Value,
        converters: &ConverterTable,
        response: &SoapResponse,
    ) -> Result<Value> {
        let convert = |wire_type: &QualifiedName, value: Value| converters.native_to_wire(wire_type, value, response);
        self.convert_value(slot.native_type(), slot.xml_type(), value, converters, &convert)
    }

    /// Convert `value` at every nesting level.
    ///
    /// A converter registered for the value's own wire type takes the whole
    /// value. Otherwise array items are converted as their element type and
    /// record fields as their declared field types. A non-array value in an
    /// array position is a collapsed single-element array and is converted
    /// as one element.
    fn convert_value(
        &self,
        native_type: Option<&str>,
        wire_type: Option<&QualifiedName>,
        value: Value,
        converters: &ConverterTable,
        convert: &dyn Fn(&QualifiedName, Value) -> Result<Value>,
    ) -> Result<Value> {
        if let Some(wire_type) = wire_type.filter(|w| converters.has_converter(w)) {
            return convert(wire_type, value);
        }
        let Some(native_type) = native_type else {
            return Ok(value);
        };

        if let Some(element) = array_element_type(native_type) {
            let element_wire = self.definition.resolved_type(element);
            return match value {
                Value::Null => Ok(Value::Null),
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| self.convert_value(Some(element), element_wire, item, converters, convert))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array),
                single => self.convert_value(Some(element), element_wire, single, converters, convert),
            };
        }

        match (self.definition.complex_type(native_type), value) {
            (Some(fields), Value::Object(mut object)) => {
                for field in fields {
                    if let Some(entry) = object.get_mut(&field.name) {
                        let field_wire = self.definition.resolved_type(&field.native_type);
                        let item = std::mem::take(entry);
                        *entry = self.convert_value(Some(&field.native_type), field_wire, item, converters, convert)?;
                    }
                }
                Ok(Value::Object(object))
            }
            (_, value) => Ok(value),
        }
    }
}
