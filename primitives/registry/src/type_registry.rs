//! Native → wire type resolution

use std::collections::BTreeMap;

use ir::{array_element_type, NameError, QualifiedName, ServiceDefinition, ARRAY_SUFFIX};

use crate::namespaces::{SCALAR_TYPES, WELL_KNOWN};
use crate::{RegistryError, Result};

/// Registry of namespace prefixes and explicit native → wire type mappings.
///
/// Registration is the only way the registry grows. Resolution passes memoize
/// synthesized names in a pass-local table and never write back into the
/// registry, so definitions sharing one registry cannot observe each other.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    namespaces: BTreeMap<String, String>,
    default_type_map: BTreeMap<String, QualifiedName>,
}

/// Read-only interface to a [`TypeRegistry`].
///
/// Document generation and dispatch only ever query the registry, so they take
/// this trait instead of the concrete type.
pub trait TypeRegistryReader {
    /// Resolve a namespace prefix to its URI.
    fn resolve_namespace(&self, prefix: &str) -> std::result::Result<String, NameError>;

    /// All registered `(prefix, uri)` pairs, ordered by prefix.
    fn namespaces(&self) -> Vec<(&str, &str)>;

    /// Explicit mapping for a native type, if registered.
    fn default_mapping(&self, native_type: &str) -> Option<&QualifiedName>;
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self { Self::default() }

    /// Create a registry preloaded with the well-known namespace prefixes and
    /// the scalar `xsd` mappings.
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        for (prefix, uri) in WELL_KNOWN {
            registry.register_namespace(*prefix, *uri);
        }
        for (native, wire) in SCALAR_TYPES {
            registry.register_default_mapping(native, wire)?;
        }
        Ok(registry)
    }

    /// Register (or replace) a namespace prefix.
    pub fn register_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.namespaces.insert(prefix.into(), uri.into());
    }

    /// Map a native type to a wire type given as prefixed or packed text.
    ///
    /// The wire type is resolved eagerly, so an unknown prefix fails here
    /// rather than during a later resolution pass.
    pub fn register_default_mapping(&mut self, native_type: &str, wire_type: &str) -> Result<()> {
        if native_type.is_empty() {
            return Err(RegistryError::NullArgument("native_type"));
        }
        if wire_type.is_empty() {
            return Err(RegistryError::NullArgument("wire_type"));
        }
        let qname = self.parse_wire_type(wire_type)?;
        self.default_type_map.insert(native_type.to_string(), qname);
        Ok(())
    }

    /// Resolve every slot of `definition` and record the per-definition type map.
    ///
    /// For each slot: an explicit wire type is parsed; otherwise the native
    /// type is looked up in the registered mappings and, failing that, a name
    /// is synthesized in the definition's namespace (see
    /// [`default_local_name`]). Element types of arrays and the field types of
    /// declared record types are resolved the same way so the document
    /// generator can reference them.
    ///
    /// The definition is only modified when every slot resolves; on error it
    /// is left exactly as it was.
    pub fn resolve_types(&self, definition: &mut ServiceDefinition) -> Result<()> {
        let namespace = definition.namespace().to_string();
        let mut memo = self.default_type_map.clone();
        let mut type_map: BTreeMap<String, QualifiedName> = BTreeMap::new();
        let mut resolved = Vec::new();

        for op in definition.operations() {
            let slots = op.arguments.iter().chain(op.headers.iter()).chain(op.return_type.iter());
            for slot in slots {
                let native = slot.native_type().filter(|t| !t.is_empty()).ok_or_else(|| {
                    RegistryError::UnresolvedType {
                        operation: op.name.clone(),
                        slot: slot.name.clone(),
                    }
                })?;

                let qname = match slot.wire_type.as_deref() {
                    Some(text) => self.parse_wire_type(text)?,
                    None => lookup_or_synthesize(&mut memo, native, &namespace)?,
                };
                type_map.entry(native.to_string()).or_insert_with(|| qname.clone());
                resolved.push(qname);
            }
        }

        let mut dependent: Vec<String> = type_map
            .keys()
            .filter_map(|native| array_element_type(native).map(str::to_string))
            .collect();
        for (_, fields) in definition.complex_types() {
            dependent.extend(fields.iter().map(|f| f.native_type.clone()));
        }
        while let Some(native) = dependent.pop() {
            if type_map.contains_key(&native) {
                continue;
            }
            let qname = lookup_or_synthesize(&mut memo, &native, &namespace)?;
            if let Some(element) = array_element_type(&native) {
                dependent.push(element.to_string());
            }
            type_map.insert(native, qname);
        }

        for (slot, qname) in definition.all_types_mut().into_iter().zip(resolved) {
            slot.xml_type = Some(qname);
        }
        tracing::debug!(
            service = definition.name(),
            types = type_map.len(),
            "resolved service definition types"
        );
        definition.set_type_map(type_map);
        Ok(())
    }

    fn parse_wire_type(&self, text: &str) -> Result<QualifiedName> {
        Ok(QualifiedName::parse(text, |prefix| self.resolve_namespace(prefix))?)
    }
}

impl TypeRegistryReader for TypeRegistry {
    fn resolve_namespace(&self, prefix: &str) -> std::result::Result<String, NameError> {
        self.namespaces.get(prefix).cloned().ok_or_else(|| NameError::UnknownPrefix(prefix.to_string()))
    }

    fn namespaces(&self) -> Vec<(&str, &str)> {
        self.namespaces.iter().map(|(p, u)| (p.as_str(), u.as_str())).collect()
    }

    fn default_mapping(&self, native_type: &str) -> Option<&QualifiedName> {
        self.default_type_map.get(native_type)
    }
}

fn lookup_or_synthesize(
    memo: &mut BTreeMap<String, QualifiedName>,
    native_type: &str,
    namespace: &str,
) -> Result<QualifiedName> {
    if let Some(qname) = memo.get(native_type) {
        return Ok(qname.clone());
    }
    let qname = QualifiedName::new(namespace, default_local_name(native_type))?;
    tracing::trace!(native_type, wire_type = %qname, "synthesized default wire type");
    memo.insert(native_type.to_string(), qname.clone());
    Ok(qname)
}

/// Local wire name derived from a native type identifier.
///
/// Takes the last path segment, upper-cases its first character and replaces
/// the array marker with `Array`: `App\Model\book[]` → `BookArray`.
pub fn default_local_name(native_type: &str) -> String {
    let segment = native_type.rsplit(['\\', '/', '.', ':']).next().unwrap_or(native_type);
    let mut chars = segment.chars();
    let mut name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    if native_type.ends_with(ARRAY_SUFFIX) {
        name = name.replace(ARRAY_SUFFIX, "Array");
    }
    name
}
