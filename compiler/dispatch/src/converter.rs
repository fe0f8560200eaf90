//! Type converters
//!
//! A [`TypeConverter`] translates values of one wire type. Converters are
//! registered once in a [`ConverterRepository`]; each call builds its own
//! [`ConverterTable`] from the repository and passes the call's request or
//! response into every conversion.

use std::collections::BTreeMap;
use std::sync::Arc;

use ir::QualifiedName;
use serde_json::Value;

use crate::message::{SoapRequest, SoapResponse};
use crate::{DispatchError, Result};

/// Converts values of a single wire type.
pub trait TypeConverter: Send + Sync {
    /// Local name of the wire type.
    fn type_name(&self) -> &str;

    /// Namespace URI of the wire type.
    fn type_namespace(&self) -> &str;

    /// Wire value to native value, for the call whose request is `request`.
    fn convert_xml_to_native(&self, request: &SoapRequest, value: Value) -> Result<Value>;

    /// Native value to wire value, for the call whose response is `response`.
    fn convert_native_to_xml(&self, response: &SoapResponse, value: Value) -> Result<Value>;
}

/// Registered converters, shared by all calls of a service.
#[derive(Clone, Default)]
pub struct ConverterRepository {
    converters: Vec<Arc<dyn TypeConverter>>,
}

impl std::fmt::Debug for ConverterRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.converters.iter().map(|c| format!("{{{}}}{}", c.type_namespace(), c.type_name())))
            .finish()
    }
}

impl ConverterRepository {
    /// Create an empty repository.
    pub fn new() -> Self { Self::default() }

    /// Register a converter.
    pub fn add_type_converter(&mut self, converter: Arc<dyn TypeConverter>) {
        self.converters.push(converter);
    }

    /// Registered converters in registration order.
    pub fn type_converters(&self) -> &[Arc<dyn TypeConverter>] { &self.converters }
}

/// Converters of one call, keyed by wire type.
#[derive(Clone, Default)]
pub struct ConverterTable {
    entries: BTreeMap<QualifiedName, Arc<dyn TypeConverter>>,
}

impl ConverterTable {
    /// Build a table from every converter in `repository`; a later converter
    /// for the same wire type replaces an earlier one.
    pub fn from_repository(repository: &ConverterRepository) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for converter in repository.type_converters() {
            let qname = QualifiedName::new(converter.type_namespace(), converter.type_name())
                .map_err(|e| DispatchError::Conversion {
                    type_name: converter.type_name().to_string(),
                    reason: e.to_string(),
                })?;
            entries.insert(qname, Arc::clone(converter));
        }
        Ok(Self { entries })
    }

    /// Whether a converter is registered for `wire_type`.
    pub fn has_converter(&self, wire_type: &QualifiedName) -> bool {
        self.entries.contains_key(wire_type)
    }

    /// Convert an inbound value; values without a converter pass through.
    pub fn wire_to_native(
        &self,
        wire_type: &QualifiedName,
        value: Value,
        request: &SoapRequest,
    ) -> Result<Value> {
        match self.entries.get(wire_type) {
            Some(converter) => converter.convert_xml_to_native(request, value),
            None => Ok(value),
        }
    }

    /// Convert an outbound value; values without a converter pass through.
    pub fn native_to_wire(
        &self,
        wire_type: &QualifiedName,
        value: Value,
        response: &SoapResponse,
    ) -> Result<Value> {
        match self.entries.get(wire_type) {
            Some(converter) => converter.convert_native_to_xml(response, value),
            None => Ok(value),
        }
    }

    /// Number of registered wire types.
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct Cents;

    impl TypeConverter for Cents {
        fn type_name(&self) -> &str { "Money" }

        fn type_namespace(&self) -> &str { "urn:shop" }

        fn convert_xml_to_native(&self, _request: &SoapRequest, value: Value) -> Result<Value> {
            let amount = value.as_f64().ok_or_else(|| DispatchError::Conversion {
                type_name: "{urn:shop}Money".into(),
                reason: "not a number".into(),
            })?;
            Ok(json!((amount * 100.0).round() as i64))
        }

        fn convert_native_to_xml(&self, _response: &SoapResponse, value: Value) -> Result<Value> {
            Ok(json!(value.as_i64().unwrap_or_default() as f64 / 100.0))
        }
    }

    #[test]
    fn test_table_converts_registered_types_only() {
        let mut repository = ConverterRepository::new();
        repository.add_type_converter(Arc::new(Cents));
        let table = ConverterTable::from_repository(&repository).expect("valid converter");

        let money = QualifiedName::new("urn:shop", "Money").expect("valid");
        let other = QualifiedName::new("urn:shop", "Other").expect("valid");
        let request = SoapRequest::new();

        assert!(table.has_converter(&money));
        assert_eq!(table.wire_to_native(&money, json!(1.5), &request).expect("converts"), json!(150));
        assert_eq!(table.wire_to_native(&other, json!(1.5), &request).expect("passes"), json!(1.5));
        assert_eq!(
            table.native_to_wire(&money, json!(250), &SoapResponse::default()).expect("converts"),
            json!(2.5)
        );
        assert!(matches!(
            table.wire_to_native(&money, json!("x"), &request),
            Err(DispatchError::Conversion { .. })
        ));
    }
}
