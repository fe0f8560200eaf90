//! Authoring sources of service definitions

use std::path::Path;

use ir::ServiceDefinition;

use crate::{Result, ServiceError};

/// Produces an unresolved [`ServiceDefinition`] from an external resource.
pub trait DefinitionLoader: Send + Sync {
    /// Whether this loader understands `resource`.
    fn supports(&self, resource: &Path, resource_type: Option<&str>) -> bool;

    /// Load the definition stored in `resource`.
    fn load(&self, resource: &Path, resource_type: Option<&str>) -> Result<ServiceDefinition>;
}

/// Loads the JSON form of [`ServiceDefinition`].
///
/// Accepts resources declared as `json`, or undeclared ones with a `.json`
/// extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDefinitionLoader;

impl DefinitionLoader for JsonDefinitionLoader {
    fn supports(&self, resource: &Path, resource_type: Option<&str>) -> bool {
        match resource_type {
            Some(kind) => kind.eq_ignore_ascii_case("json"),
            None => resource.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")),
        }
    }

    fn load(&self, resource: &Path, resource_type: Option<&str>) -> Result<ServiceDefinition> {
        if !self.supports(resource, resource_type) {
            return Err(ServiceError::UnsupportedResource {
                resource: resource.to_path_buf(),
                resource_type: resource_type.map(str::to_string),
            });
        }
        logging::trace("LOADER", &format!("loading service definition from {}", resource.display()));
        Ok(ServiceDefinition::from_file(resource)?)
    }
}
