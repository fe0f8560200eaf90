//! Integration tests for the wire engine contract.

use serde_json::{json, Value};
use transport::{
    MessageHandler, ReplyBody, StructuredEngine, TransportError, WireEngine, WireHeader,
    WireMessage,
};

#[derive(Default)]
struct RecordingHandler {
    calls: Vec<String>,
    fail_header: Option<String>,
}

impl MessageHandler for RecordingHandler {
    fn handle_header(&mut self, name: &str, _payload: Value) -> transport::Result<()> {
        self.calls.push(format!("header:{}", name));
        if self.fail_header.as_deref() == Some(name) {
            return Err(TransportError::Client(format!("bad header {}", name)));
        }
        Ok(())
    }

    fn handle_operation(&mut self, name: &str, arguments: Vec<Value>) -> transport::Result<Option<Value>> {
        self.calls.push(format!("operation:{}", name));
        match name {
            "Sum" => Ok(Some(json!(arguments.iter().filter_map(Value::as_i64).sum::<i64>()))),
            "Notify" => Ok(None),
            _ => Err(TransportError::Server("exploded".to_string())),
        }
    }

    fn take_response_headers(&mut self) -> Vec<WireHeader> {
        vec![WireHeader::new("urn:test", "trace", json!("t-1"))]
    }
}

#[test]
fn headers_are_delivered_in_order_before_the_operation() {
    let message = WireMessage::new("Sum", vec![json!(2), json!(3)])
        .with_header(WireHeader::new("urn:test", "first", json!(1)))
        .with_header(WireHeader::new("urn:test", "second", json!(2)));
    let mut handler = RecordingHandler::default();

    let reply = StructuredEngine::new().handle(message, &mut handler);

    assert_eq!(handler.calls, vec!["header:first", "header:second", "operation:Sum"]);
    assert_eq!(reply.operation, "Sum");
    assert_eq!(reply.body, ReplyBody::Return(Some(json!(5))));
    assert_eq!(reply.headers, vec![WireHeader::new("urn:test", "trace", json!("t-1"))]);
}

#[test]
fn operations_without_return_value_reply_with_none() {
    let mut handler = RecordingHandler::default();
    let reply = StructuredEngine::new().handle(WireMessage::new("Notify", vec![]), &mut handler);
    assert_eq!(reply.body, ReplyBody::Return(None));
    assert!(!reply.is_fault());
}

#[test]
fn handler_errors_become_faults() {
    let mut handler = RecordingHandler::default();
    let reply = StructuredEngine::new().handle(WireMessage::new("Explode", vec![]), &mut handler);

    match reply.body {
        ReplyBody::Fault(fault) => {
            assert_eq!(fault.code, "Server");
            assert_eq!(fault.message, "exploded");
        }
        other => panic!("expected fault, got {:?}", other),
    }
    assert!(reply.headers.is_empty());
}

#[test]
fn header_failure_stops_before_the_operation() {
    let message = WireMessage::new("Sum", vec![])
        .with_header(WireHeader::new("urn:test", "broken", Value::Null));
    let mut handler = RecordingHandler { fail_header: Some("broken".into()), ..Default::default() };

    let reply = StructuredEngine::new().handle(message, &mut handler);

    assert!(reply.is_fault());
    assert_eq!(handler.calls, vec!["header:broken"]);
}

#[test]
fn undecodable_envelopes_are_client_faults() {
    let mut handler = RecordingHandler::default();
    let reply = StructuredEngine::new().handle_raw("{not json", &mut handler);

    match &reply.body {
        ReplyBody::Fault(fault) => assert_eq!(fault.code, "Client"),
        other => panic!("expected fault, got {:?}", other),
    }
    assert!(handler.calls.is_empty());

    let encoded = reply.to_json_string().expect("serializable");
    assert!(encoded.contains("\"fault\""));
}
