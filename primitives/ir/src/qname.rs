//! Namespace-qualified names
//!
//! A [`QualifiedName`] pairs a namespace URI with a local name. It has two
//! textual encodings on the wire: the prefixed form `ns:Local`, whose prefix is
//! resolved through a caller-supplied lookup, and the packed form
//! `{uri}Local`. Both parse into the same value, and the packed form is also
//! the canonical string representation.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Errors raised while parsing or resolving qualified names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// The text is neither a valid prefixed nor a valid packed name.
    #[error("Malformed qualified name: '{0}'")]
    Malformed(String),
    /// A namespace prefix has no registered URI.
    #[error("Unknown namespace prefix: '{0}'")]
    UnknownPrefix(String),
}

/// Result alias for name operations.
pub type Result<T> = std::result::Result<T, NameError>;

/// A namespace URI + local name pair identifying a wire-level type or element.
///
/// Both parts are non-empty. Values are immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName {
    namespace: String,
    local: String,
}

impl QualifiedName {
    /// Create a qualified name from its parts.
    ///
    /// Fails with [`NameError::Malformed`] when either part is empty.
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let local = local.into();
        if namespace.is_empty() || local.is_empty() {
            return Err(NameError::Malformed(format!("{{{}}}{}", namespace, local)));
        }
        Ok(Self { namespace, local })
    }

    /// Returns true iff `text` contains the `:` prefix separator.
    ///
    /// Packed names whose URI contains a scheme (`{urn:x}A`) also satisfy
    /// this check; use [`QualifiedName::parse`] to pick the right decoder.
    pub fn is_prefixed(text: &str) -> bool { text.contains(':') }

    /// Parse `prefix:Local`, resolving the prefix through `resolve_prefix`.
    ///
    /// The text is split on the first `:`. The lookup is expected to fail with
    /// [`NameError::UnknownPrefix`] for unregistered prefixes; its error is
    /// propagated unchanged.
    pub fn from_prefixed<F>(text: &str, resolve_prefix: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        let (prefix, local) =
            text.split_once(':').ok_or_else(|| NameError::Malformed(text.to_string()))?;
        if prefix.is_empty() || local.is_empty() {
            return Err(NameError::Malformed(text.to_string()));
        }
        let namespace = resolve_prefix(prefix)?;
        Self::new(namespace, local)
    }

    /// Parse the packed form `{uri}Local`.
    pub fn from_packed(text: &str) -> Result<Self> {
        let re = Regex::new(r"^\{(.+)\}(.+)$")
            .map_err(|e| NameError::Malformed(format!("{} ({})", text, e)))?;
        let caps = re.captures(text).ok_or_else(|| NameError::Malformed(text.to_string()))?;
        Self::new(&caps[1], &caps[2])
    }

    /// Parse either encoding.
    ///
    /// Text starting with `{` is decoded as a packed name, anything else that
    /// carries a `:` as a prefixed name.
    pub fn parse<F>(text: &str, resolve_prefix: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        if text.starts_with('{') {
            Self::from_packed(text)
        } else if Self::is_prefixed(text) {
            Self::from_prefixed(text, resolve_prefix)
        } else {
            Err(NameError::Malformed(text.to_string()))
        }
    }

    /// The namespace URI.
    pub fn namespace(&self) -> &str { &self.namespace }

    /// The local name.
    pub fn local(&self) -> &str { &self.local }

    /// Render as `prefix:Local`.
    pub fn to_prefixed(&self, prefix: &str) -> String { format!("{}:{}", prefix, self.local) }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local)
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self> { Self::from_packed(&value) }
}

impl From<QualifiedName> for String {
    fn from(value: QualifiedName) -> Self { value.to_string() }
}
