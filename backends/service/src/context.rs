//! A hosted web service

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use codegen::{DumpOptions, Dumper, WsdlDumper};
use config::ServiceConfig;
use dispatch::{ConverterRepository, OperationHandler, ServiceBinder};
use ir::ServiceDefinition;
use registry::TypeRegistry;
use transport::{WireEngine, WireMessage, WireReply};

use crate::cache::WsdlCache;
use crate::loader::{DefinitionLoader, JsonDefinitionLoader};
use crate::{Result, ServiceError};

type BinderFactory = Box<dyn Fn(Arc<ServiceDefinition>) -> ServiceBinder + Send + Sync>;

/// Everything needed to serve one web service.
///
/// The definition is loaded, renamed and type-resolved on first use and then
/// shared read-only by every call; the dispatch table is built once from it.
pub struct WebServiceContext {
    options: ServiceConfig,
    loader: Box<dyn DefinitionLoader>,
    dumper: Box<dyn Dumper + Send + Sync>,
    registry: Arc<TypeRegistry>,
    converters: ConverterRepository,
    binder_factory: BinderFactory,
    definition: OnceLock<Arc<ServiceDefinition>>,
    binder: OnceLock<ServiceBinder>,
}

impl std::fmt::Debug for WebServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebServiceContext")
            .field("options", &self.options)
            .field("converters", &self.converters)
            .field("loaded", &self.definition.get().is_some())
            .finish()
    }
}

impl WebServiceContext {
    /// Context reading JSON definitions and rendering WSDL with every prefix
    /// known to `registry`.
    pub fn new(options: ServiceConfig, registry: Arc<TypeRegistry>) -> Self {
        let dumper = WsdlDumper::new().with_namespaces(&*registry);
        Self {
            options,
            loader: Box::new(JsonDefinitionLoader),
            dumper: Box::new(dumper),
            registry,
            converters: ConverterRepository::new(),
            binder_factory: Box::new(ServiceBinder::new),
            definition: OnceLock::new(),
            binder: OnceLock::new(),
        }
    }

    /// Replace the authoring source loader.
    pub fn with_loader(mut self, loader: Box<dyn DefinitionLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Replace the document dumper.
    pub fn with_dumper(mut self, dumper: Box<dyn Dumper + Send + Sync>) -> Self {
        self.dumper = dumper;
        self
    }

    /// Use these type converters for every call.
    pub fn with_converters(mut self, converters: ConverterRepository) -> Self {
        self.converters = converters;
        self
    }

    /// Build the dispatch table with custom message binders.
    pub fn with_binder_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(Arc<ServiceDefinition>) -> ServiceBinder + Send + Sync + 'static,
    {
        self.binder_factory = Box::new(factory);
        self
    }

    /// Service name.
    pub fn name(&self) -> &str { &self.options.name }

    /// Options this context was created with.
    pub fn options(&self) -> &ServiceConfig { &self.options }

    /// Registered type converters.
    pub fn converters(&self) -> &ConverterRepository { &self.converters }

    /// The resolved service definition, loaded on first access.
    ///
    /// Any authoring error aborts loading; nothing is cached in that case and
    /// the next access tries again.
    pub fn service_definition(&self) -> Result<Arc<ServiceDefinition>> {
        if let Some(definition) = self.definition.get() {
            return Ok(Arc::clone(definition));
        }
        let loaded = Arc::new(self.load_definition()?);
        Ok(Arc::clone(self.definition.get_or_init(|| loaded)))
    }

    fn load_definition(&self) -> Result<ServiceDefinition> {
        let resource = &self.options.resource;
        let resource_type = self.options.resource_type.as_deref();
        if !self.loader.supports(resource, resource_type) {
            return Err(ServiceError::UnsupportedResource {
                resource: resource.clone(),
                resource_type: resource_type.map(str::to_string),
            });
        }

        let mut definition = self.loader.load(resource, resource_type)?;
        definition.set_name(self.options.name.clone());
        if let Some(namespace) = &self.options.namespace {
            definition.set_namespace(namespace.clone());
        }
        self.registry.resolve_types(&mut definition)?;

        tracing::info!(
            service = definition.name(),
            operations = definition.operation_count(),
            "loaded service definition"
        );
        Ok(definition)
    }

    /// Cache entry of the document for `endpoint`.
    pub fn wsdl_cache(&self, endpoint: Option<&str>) -> WsdlCache {
        WsdlCache::new(&self.options.cache_dir, &self.options.name, endpoint, self.options.debug)
    }

    /// Path of an up-to-date WSDL file for `endpoint`, regenerating it if stale.
    pub fn wsdl_file(&self, endpoint: Option<&str>) -> Result<PathBuf> {
        let cache = self.wsdl_cache(endpoint);
        if cache.is_fresh(&self.options.resource) {
            tracing::debug!(service = self.name(), path = %cache.path().display(), "wsdl cache hit");
            return Ok(cache.path().to_path_buf());
        }

        tracing::debug!(service = self.name(), path = %cache.path().display(), "wsdl cache miss");
        let options = DumpOptions { endpoint: endpoint.map(str::to_string), stylesheet: None };
        cache.write(&self.render(&options)?)?;
        Ok(cache.path().to_path_buf())
    }

    /// Render the document without touching the cache.
    pub fn render(&self, options: &DumpOptions) -> Result<String> {
        let definition = self.service_definition()?;
        Ok(self.dumper.dump_service_definition(Some(definition.as_ref()), options)?)
    }

    /// Content of the WSDL file for `endpoint`.
    pub fn wsdl_file_content(&self, endpoint: Option<&str>) -> Result<String> {
        let path = self.wsdl_file(endpoint)?;
        Ok(std::fs::read_to_string(path)?)
    }

    /// The service's dispatch table.
    pub fn service_binder(&self) -> Result<&ServiceBinder> {
        if let Some(binder) = self.binder.get() {
            return Ok(binder);
        }
        let binder = (self.binder_factory)(self.service_definition()?);
        Ok(self.binder.get_or_init(|| binder))
    }

    /// Serve one call.
    ///
    /// Only setup failures are returned as errors; anything going wrong
    /// during the call itself is reported as a fault in the reply.
    pub fn call(
        &self,
        engine: &dyn WireEngine,
        message: WireMessage,
        handler: &mut dyn OperationHandler,
    ) -> Result<WireReply> {
        let binder = self.service_binder()?;
        Ok(dispatch::dispatch(engine, binder, &self.converters, handler, message))
    }

    /// Serve one call from a raw envelope, decoded by `engine`.
    pub fn call_raw(
        &self,
        engine: &dyn WireEngine,
        raw: &str,
        handler: &mut dyn OperationHandler,
    ) -> Result<WireReply> {
        let binder = self.service_binder()?;
        Ok(dispatch::dispatch_raw(engine, binder, &self.converters, handler, raw))
    }
}
