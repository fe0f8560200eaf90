//! Services by name

use std::collections::BTreeMap;
use std::sync::Arc;

use config::Config;
use dispatch::OperationHandler;
use registry::TypeRegistry;
use transport::{StructuredEngine, WireEngine, WireMessage, WireReply};

use crate::context::WebServiceContext;
use crate::{Result, ServiceError};

/// Content type of a document bound to an endpoint.
pub const WSDL_CONTENT_TYPE: &str = "application/wsdl+xml";

/// Content type of a definition-only document.
pub const XML_CONTENT_TYPE: &str = "text/xml";

/// An interface description ready to be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionDocument {
    /// Document text
    pub content: String,
    /// Content type to serve it under
    pub content_type: &'static str,
}

/// All hosted services, keyed by name.
pub struct WebServiceRegistry {
    contexts: BTreeMap<String, WebServiceContext>,
    engine: Arc<dyn WireEngine>,
}

impl std::fmt::Debug for WebServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebServiceRegistry").field("contexts", &self.contexts).finish()
    }
}

impl Default for WebServiceRegistry {
    fn default() -> Self { Self::new() }
}

impl WebServiceRegistry {
    /// Empty registry using the [`StructuredEngine`].
    pub fn new() -> Self { Self::with_engine(Arc::new(StructuredEngine::new())) }

    /// Empty registry using `engine` for every call.
    pub fn with_engine(engine: Arc<dyn WireEngine>) -> Self {
        Self { contexts: BTreeMap::new(), engine }
    }

    /// One context per configured service, sharing a type registry built from
    /// the built-in table plus the configured namespaces and mappings.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut types = TypeRegistry::with_defaults()?;
        for (prefix, uri) in &config.namespaces {
            types.register_namespace(prefix.as_str(), uri.as_str());
        }
        for (native, wire) in &config.type_mappings {
            types.register_default_mapping(native, wire)?;
        }
        let types = Arc::new(types);

        let mut services = Self::new();
        for options in &config.services {
            services.register(WebServiceContext::new(options.clone(), Arc::clone(&types)));
        }
        Ok(services)
    }

    /// Add (or replace) a service.
    pub fn register(&mut self, context: WebServiceContext) {
        logging::trace("SERVICES", &format!("registering webservice '{}'", context.name()));
        self.contexts.insert(context.name().to_string(), context);
    }

    /// Names of all services.
    pub fn names(&self) -> impl Iterator<Item = &str> { self.contexts.keys().map(String::as_str) }

    /// Context of the service called `name`.
    pub fn context(&self, name: &str) -> Result<&WebServiceContext> {
        self.contexts.get(name).ok_or_else(|| ServiceError::UnknownService(name.to_string()))
    }

    /// Interface description of `service`.
    ///
    /// With an endpoint the port points at it and the document is served as
    /// `application/wsdl+xml`; without one it is a definition-only `text/xml`
    /// document.
    pub fn definition(&self, service: &str, endpoint: Option<&str>) -> Result<DefinitionDocument> {
        let context = self.context(service)?;
        let content = context.wsdl_file_content(endpoint)?;
        let content_type = if endpoint.is_some() { WSDL_CONTENT_TYPE } else { XML_CONTENT_TYPE };
        Ok(DefinitionDocument { content, content_type })
    }

    /// Serve one call to `service`.
    pub fn call(
        &self,
        service: &str,
        message: WireMessage,
        handler: &mut dyn OperationHandler,
    ) -> Result<WireReply> {
        self.context(service)?.call(self.engine.as_ref(), message, handler)
    }

    /// Serve one call to `service` from a raw envelope decoded by the engine.
    pub fn call_raw(
        &self,
        service: &str,
        raw: &str,
        handler: &mut dyn OperationHandler,
    ) -> Result<WireReply> {
        self.context(service)?.call_raw(self.engine.as_ref(), raw, handler)
    }
}
