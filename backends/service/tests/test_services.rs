//! Integration tests for hosted services.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use config::{Config, ServiceConfig};
use dispatch::{HandlerError, Response, SoapRequest, SoapResponse};
use registry::TypeRegistry;
use serde_json::{json, Value};
use service::cache::cache_file_name;
use service::{ServiceError, WebServiceContext, WebServiceRegistry, WSDL_CONTENT_TYPE, XML_CONTENT_TYPE};
use tempfile::TempDir;
use transport::{MessageHandler, ReplyBody, StructuredEngine, WireEngine, WireMessage, WireReply};

const WSDL_SOAP: &str = "http://schemas.xmlsoap.org/wsdl/soap/";

const CALCULATOR: &str = r#"{
    "name": "Authored",
    "namespace": "urn:authored",
    "operations": [
        {
            "name": "Add",
            "arguments": [
                { "name": "a", "native_type": "int" },
                { "name": "b", "native_type": "int" }
            ],
            "return": { "name": "return", "native_type": "App\\Money" }
        }
    ],
    "complex_types": {
        "App\\Money": [ { "name": "amount", "native_type": "float" } ]
    }
}"#;

fn setup(dir: &Path) -> Config {
    fs::write(dir.join("calculator.json"), CALCULATOR).expect("write definition");
    let mut service = ServiceConfig::new("Calculator", dir.join("calculator.json"));
    service.namespace = Some("urn:calculator/".to_string());
    service.cache_dir = dir.join("cache");

    let mut config = Config::default();
    config.services.push(service);
    config
}

fn location(content: &str) -> String {
    let doc = roxmltree::Document::parse(content).expect("well-formed wsdl");
    doc.descendants()
        .find(|n| n.has_tag_name((WSDL_SOAP, "address")))
        .and_then(|n| n.attribute("location"))
        .expect("soap:address location")
        .to_string()
}

#[test]
fn definition_document_depends_on_endpoint() {
    let dir = TempDir::new().expect("temporary directory");
    let services = WebServiceRegistry::from_config(&setup(dir.path())).expect("valid config");

    let bound = services.definition("Calculator", Some("http://localhost/calc")).expect("document");
    assert_eq!(bound.content_type, WSDL_CONTENT_TYPE);
    assert_eq!(location(&bound.content), "http://localhost/calc");
    assert!(bound.content.contains(r#"name="Calculator" targetNamespace="urn:calculator/""#));
    assert!(bound.content.contains(r#"soapAction="urn:calculator/Add""#));
    assert!(bound.content.contains(r#"<xsd:complexType name="Money">"#));

    let detached = services.definition("Calculator", None).expect("document");
    assert_eq!(detached.content_type, XML_CONTENT_TYPE);
    assert_eq!(location(&detached.content), "");

    let cache = dir.path().join("cache");
    assert!(cache.join(cache_file_name("Calculator", Some("http://localhost/calc"))).is_file());
    assert!(cache.join(cache_file_name("Calculator", None)).is_file());
}

#[test]
fn cached_documents_are_reused() {
    let dir = TempDir::new().expect("temporary directory");
    let services = WebServiceRegistry::from_config(&setup(dir.path())).expect("valid config");
    let context = services.context("Calculator").expect("registered");

    let path = context.wsdl_file(None).expect("generated");
    fs::write(&path, "<definitions/>").expect("overwrite cache");
    // not in debug mode: the existing file is served as is
    assert_eq!(context.wsdl_file_content(None).expect("cached"), "<definitions/>");
}

#[test]
fn unknown_services_are_not_found() {
    let dir = TempDir::new().expect("temporary directory");
    let services = WebServiceRegistry::from_config(&setup(dir.path())).expect("valid config");

    let err = services.definition("Billing", None).expect_err("not registered");
    assert!(err.is_not_found());
    assert!(matches!(err, ServiceError::UnknownService(ref name) if name == "Billing"));

    let mut handler = |_: &SoapRequest| -> Result<Option<Response>, HandlerError> { Ok(None) };
    let err = services
        .call("Billing", WireMessage::new("Add", vec![]), &mut handler)
        .expect_err("not registered");
    assert!(err.is_not_found());
}

#[test]
fn calls_are_dispatched_to_the_handler() {
    let dir = TempDir::new().expect("temporary directory");
    let services = WebServiceRegistry::from_config(&setup(dir.path())).expect("valid config");

    let mut handler = |request: &SoapRequest| -> Result<Option<Response>, HandlerError> {
        let sum: i64 = request.attributes.values().filter_map(Value::as_i64).sum();
        Ok(Some(SoapResponse::with_return(json!({ "amount": sum })).into()))
    };
    let reply = services
        .call("Calculator", WireMessage::new("Add", vec![json!(2), json!(3)]), &mut handler)
        .expect("service exists");
    assert_eq!(reply.body, ReplyBody::Return(Some(json!({ "amount": 5 }))));

    let reply = services
        .call_raw("Calculator", r#"{"operation":"Add","arguments":[40,2]}"#, &mut handler)
        .expect("service exists");
    assert_eq!(reply.body, ReplyBody::Return(Some(json!({ "amount": 42 }))));

    let reply = services.call_raw("Calculator", "not json", &mut handler).expect("service exists");
    assert!(reply.is_fault());

    let definition = services.context("Calculator").expect("registered").service_definition().expect("loaded");
    assert_eq!(definition.name(), "Calculator");
    assert_eq!(definition.namespace(), "urn:calculator/");
    assert!(definition.is_resolved());
}

#[test]
fn configured_mappings_are_applied() {
    let dir = TempDir::new().expect("temporary directory");
    let mut config = setup(dir.path());
    config.namespaces.insert("fin".to_string(), "urn:finance".to_string());
    config.type_mappings.insert("App\\Money".to_string(), "fin:Money".to_string());

    let services = WebServiceRegistry::from_config(&config).expect("valid config");
    let document = services.definition("Calculator", None).expect("document");
    assert!(document.content.contains(r#"xmlns:fin="urn:finance""#));
    assert!(document.content.contains(r#"<part name="return" type="fin:Money"/>"#));
    assert!(!document.content.contains("<types>"));

    config.type_mappings.insert("Broken".to_string(), "nope:Broken".to_string());
    let err = WebServiceRegistry::from_config(&config).expect_err("unknown prefix");
    assert!(matches!(err, ServiceError::Registry(_)));
}

#[test]
fn unsupported_resources_are_rejected() {
    let dir = TempDir::new().expect("temporary directory");
    let mut config = setup(dir.path());
    config.services[0].resource_type = Some("annotation".to_string());

    let services = WebServiceRegistry::from_config(&config).expect("valid config");
    let err = services.definition("Calculator", None).expect_err("no loader");
    assert!(matches!(err, ServiceError::UnsupportedResource { .. }));
    assert!(!err.is_not_found());
}

/// Reads envelopes of the form `Operation arg arg ...` with integer arguments.
struct LineEngine;

impl WireEngine for LineEngine {
    fn handle(&self, message: WireMessage, handler: &mut dyn MessageHandler) -> WireReply {
        StructuredEngine::new().handle(message, handler)
    }

    fn handle_raw(&self, raw: &str, handler: &mut dyn MessageHandler) -> WireReply {
        let mut words = raw.split_whitespace();
        let operation = words.next().unwrap_or_default().to_string();
        let arguments = words.filter_map(|w| w.parse::<i64>().ok()).map(Value::from).collect();
        self.handle(WireMessage::new(operation, arguments), handler)
    }
}

#[test]
fn raw_envelopes_are_decoded_by_the_engine() {
    let dir = TempDir::new().expect("temporary directory");
    let config = setup(dir.path());
    let types = Arc::new(TypeRegistry::with_defaults().expect("defaults"));

    let mut services = WebServiceRegistry::with_engine(Arc::new(LineEngine));
    services.register(WebServiceContext::new(config.services[0].clone(), types));

    let mut handler = |request: &SoapRequest| -> Result<Option<Response>, HandlerError> {
        let sum: i64 = request.attributes.values().filter_map(Value::as_i64).sum();
        Ok(Some(SoapResponse::with_return(json!({ "amount": sum })).into()))
    };
    let reply = services.call_raw("Calculator", "Add 40 2", &mut handler).expect("service exists");
    assert_eq!(reply.operation, "Add");
    assert_eq!(reply.body, ReplyBody::Return(Some(json!({ "amount": 42 }))));
}
