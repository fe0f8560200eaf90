//! Service definition model
//!
//! A [`ServiceDefinition`] owns an ordered, name-keyed set of [`Operation`]s.
//! Every argument, header and return value is a [`TypedSlot`] that carries a
//! native type identifier and, once the type registry has resolved it, the
//! [`QualifiedName`] of its wire type.
//!
//! Definitions are authored once (usually loaded from JSON), resolved once,
//! and then shared read-only between document generation and dispatch.

use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::QualifiedName;

/// Marker appended to a native type identifier to denote "array of".
pub const ARRAY_SUFFIX: &str = "[]";

/// Errors raised while authoring or loading a service definition.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    /// An operation with the same name was already added.
    #[error("Duplicate operation: {0}")]
    DuplicateOperation(String),
    /// I/O error while reading or writing a definition file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// An argument, header or return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedSlot {
    /// Slot name (argument name, header name, or `return`)
    pub name: String,
    /// Native type identifier, e.g. `int`, `App\Model\Book` or `App\Model\Book[]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_type: Option<String>,
    /// Explicit wire type as authored, prefixed (`xsd:int`) or packed (`{uri}Local`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire_type: Option<String>,
    /// Resolved wire type; absent until the type registry has run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml_type: Option<QualifiedName>,
}

impl TypedSlot {
    /// Create a slot for a native type with no explicit wire type.
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self { name: name.into(), native_type: Some(native_type.into()), wire_type: None, xml_type: None }
    }

    /// Set the explicit wire type text.
    pub fn with_wire_type(mut self, wire_type: impl Into<String>) -> Self {
        self.wire_type = Some(wire_type.into());
        self
    }

    /// The native type identifier, if authored.
    pub fn native_type(&self) -> Option<&str> { self.native_type.as_deref() }

    /// The resolved wire type, if resolution has run.
    pub fn xml_type(&self) -> Option<&QualifiedName> { self.xml_type.as_ref() }

    /// Whether the native type carries the array marker.
    pub fn is_array(&self) -> bool { self.native_type().is_some_and(is_array_type) }
}

/// Whether a native type identifier carries the array marker.
pub fn is_array_type(native_type: &str) -> bool { native_type.ends_with(ARRAY_SUFFIX) }

/// Element type of an array native type (`Foo[]` → `Foo`), or `None` for scalars and records.
pub fn array_element_type(native_type: &str) -> Option<&str> {
    native_type.strip_suffix(ARRAY_SUFFIX)
}

/// A callable operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation name, unique within its definition
    pub name: String,
    /// Positional arguments in wire order
    #[serde(default)]
    pub arguments: Vec<TypedSlot>,
    /// Headers this operation understands
    #[serde(default)]
    pub headers: Vec<TypedSlot>,
    /// Return value, if any
    #[serde(default, rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypedSlot>,
}

impl Operation {
    /// Create an operation with no arguments, headers or return value.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), arguments: Vec::new(), headers: Vec::new(), return_type: None }
    }

    /// Append an argument.
    pub fn with_argument(mut self, name: impl Into<String>, native_type: impl Into<String>) -> Self {
        self.arguments.push(TypedSlot::new(name, native_type));
        self
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, native_type: impl Into<String>) -> Self {
        self.headers.push(TypedSlot::new(name, native_type));
        self
    }

    /// Set the return value type.
    pub fn with_return(mut self, native_type: impl Into<String>) -> Self {
        self.return_type = Some(TypedSlot::new("return", native_type));
        self
    }

    /// Argument names in positional order.
    pub fn argument_names(&self) -> Vec<&str> {
        self.arguments.iter().map(|a| a.name.as_str()).collect()
    }

    /// Look up a header slot by name.
    pub fn header(&self, name: &str) -> Option<&TypedSlot> {
        self.headers.iter().find(|h| h.name == name)
    }
}

/// A field of a named record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexTypeField {
    /// Field name
    pub name: String,
    /// Native type of the field
    pub native_type: String,
    /// Whether the field may be nil on the wire
    #[serde(default)]
    pub nillable: bool,
}

impl ComplexTypeField {
    /// Create a non-nillable field.
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self { name: name.into(), native_type: native_type.into(), nillable: false }
    }
}

/// The complete description of one web service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    name: String,
    namespace: String,
    #[serde(with = "operation_list")]
    operations: IndexMap<String, Operation>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    complex_types: IndexMap<String, Vec<ComplexTypeField>>,
    /// nativeType → wire type, written by the last resolution pass
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    type_map: BTreeMap<String, QualifiedName>,
}

impl ServiceDefinition {
    /// Create an empty definition.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self { name: name.into(), namespace: namespace.into(), ..Self::default() }
    }

    /// Load a definition from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, DefinitionError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse a definition from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Save the definition as pretty-printed JSON.
    pub fn to_file(&self, path: &Path) -> Result<(), DefinitionError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        use std::io::Write;
        writeln!(file)?;
        Ok(())
    }

    /// Service name.
    pub fn name(&self) -> &str { &self.name }

    /// Set the service name.
    pub fn set_name(&mut self, name: impl Into<String>) { self.name = name.into(); }

    /// Target namespace URI.
    pub fn namespace(&self) -> &str { &self.namespace }

    /// Set the target namespace URI.
    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace = namespace.into();
    }

    /// Add an operation. Names must be unique.
    pub fn add_operation(&mut self, operation: Operation) -> Result<(), DefinitionError> {
        if self.operations.contains_key(&operation.name) {
            return Err(DefinitionError::DuplicateOperation(operation.name));
        }
        self.operations.insert(operation.name.clone(), operation);
        Ok(())
    }

    /// Operations in insertion order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> { self.operations.values() }

    /// Look up an operation by name.
    pub fn operation(&self, name: &str) -> Option<&Operation> { self.operations.get(name) }

    /// Number of operations.
    pub fn operation_count(&self) -> usize { self.operations.len() }

    /// Every slot reachable from the definition: arguments, headers and return of each operation.
    pub fn all_types(&self) -> Vec<&TypedSlot> {
        let mut types = Vec::new();
        for op in self.operations.values() {
            types.extend(op.arguments.iter());
            types.extend(op.headers.iter());
            types.extend(op.return_type.iter());
        }
        types
    }

    /// Mutable counterpart of [`ServiceDefinition::all_types`], same order.
    pub fn all_types_mut(&mut self) -> Vec<&mut TypedSlot> {
        let mut types = Vec::new();
        for op in self.operations.values_mut() {
            types.extend(op.arguments.iter_mut());
            types.extend(op.headers.iter_mut());
            types.extend(op.return_type.iter_mut());
        }
        types
    }

    /// True once every slot carries a resolved wire type.
    pub fn is_resolved(&self) -> bool { self.all_types().iter().all(|t| t.xml_type.is_some()) }

    /// Declare the fields of a named record type.
    pub fn add_complex_type(&mut self, native_type: impl Into<String>, fields: Vec<ComplexTypeField>) {
        self.complex_types.insert(native_type.into(), fields);
    }

    /// Fields of a declared record type.
    pub fn complex_type(&self, native_type: &str) -> Option<&[ComplexTypeField]> {
        self.complex_types.get(native_type).map(Vec::as_slice)
    }

    /// All declared record types in declaration order.
    pub fn complex_types(&self) -> impl Iterator<Item = (&str, &[ComplexTypeField])> {
        self.complex_types.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Resolved wire types keyed by native type.
    pub fn type_map(&self) -> &BTreeMap<String, QualifiedName> { &self.type_map }

    /// Replace the resolved type map.
    pub fn set_type_map(&mut self, type_map: BTreeMap<String, QualifiedName>) {
        self.type_map = type_map;
    }

    /// Resolved wire type of a native type, if known.
    pub fn resolved_type(&self, native_type: &str) -> Option<&QualifiedName> {
        self.type_map.get(native_type)
    }
}

/// Operations are authored as a JSON list; duplicates are rejected on load.
mod operation_list {
    use indexmap::IndexMap;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Operation;

    pub fn serialize<S>(ops: &IndexMap<String, Operation>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(ops.values())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<IndexMap<String, Operation>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let list = Vec::<Operation>::deserialize(deserializer)?;
        let mut ops = IndexMap::with_capacity(list.len());
        for op in list {
            if ops.contains_key(&op.name) {
                return Err(D::Error::custom(format!("duplicate operation '{}'", op.name)));
            }
            ops.insert(op.name.clone(), op);
        }
        Ok(ops)
    }
}
