//! Per-call dispatch state machine

use std::fmt;
use std::mem;

use serde_json::Value;
use transport::{MessageHandler, TransportError, WireEngine, WireHeader, WireMessage, WireReply};

use crate::converter::{ConverterRepository, ConverterTable};
use crate::message::{Response, SoapRequest, SoapResponse};
use crate::service_binder::{DispatchEntry, ServiceBinder};
use crate::{DispatchError, Result};

/// Error type returned by operation handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// The business-logic side of a call.
pub trait OperationHandler {
    /// Serve a fully bound request. `Ok(None)` means the handler produced no response.
    fn handle(&mut self, request: &SoapRequest) -> std::result::Result<Option<Response>, HandlerError>;
}

impl<F> OperationHandler for F
where
    F: FnMut(&SoapRequest) -> std::result::Result<Option<Response>, HandlerError>,
{
    fn handle(&mut self, request: &SoapRequest) -> std::result::Result<Option<Response>, HandlerError> {
        self(request)
    }
}

/// Where a call currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Nothing received yet, or the previous call completed
    Idle,
    /// At least one header received
    ReceivingHeaders,
    /// Binding the operation's arguments
    InvokingOperation,
    /// Waiting for the operation handler
    Forwarding,
    /// Converting the handler's response
    ConvertingResponse,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DispatchState::Idle => "idle",
            DispatchState::ReceivingHeaders => "receiving headers",
            DispatchState::InvokingOperation => "invoking operation",
            DispatchState::Forwarding => "forwarding",
            DispatchState::ConvertingResponse => "converting response",
        };
        write!(f, "{}", s)
    }
}

/// Dispatch of one call. Create one per inbound message.
pub struct DispatchProtocol<'a> {
    binder: &'a ServiceBinder,
    converters: ConverterTable,
    handler: &'a mut dyn OperationHandler,
    state: DispatchState,
    invoked: bool,
    request: SoapRequest,
    response: Option<SoapResponse>,
    response_headers: Vec<WireHeader>,
}

impl<'a> DispatchProtocol<'a> {
    /// Start a call served by `handler`, converting through `converters`.
    pub fn new(
        binder: &'a ServiceBinder,
        converters: ConverterTable,
        handler: &'a mut dyn OperationHandler,
    ) -> Self {
        Self {
            binder,
            converters,
            handler,
            state: DispatchState::Idle,
            invoked: false,
            request: SoapRequest::new(),
            response: None,
            response_headers: Vec::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> DispatchState { self.state }

    /// The request built so far.
    pub fn request(&self) -> &SoapRequest { &self.request }

    /// The handler's response, once the operation completed.
    pub fn response(&self) -> Option<&SoapResponse> { self.response.as_ref() }

    fn transition(&mut self, next: DispatchState) {
        tracing::debug!(from = %self.state, to = %next, "dispatch state transition");
        self.state = next;
    }

    fn accept(&self, message: &'static str, name: &str) -> Result<()> {
        let accepting = matches!(self.state, DispatchState::Idle | DispatchState::ReceivingHeaders);
        if self.invoked || !accepting {
            return Err(DispatchError::UnexpectedMessage { message, name: name.to_string(), state: self.state });
        }
        Ok(())
    }

    fn receive_header(&mut self, name: &str, payload: Value) -> Result<()> {
        self.accept("header", name)?;
        if self.state == DispatchState::Idle {
            self.transition(DispatchState::ReceivingHeaders);
        }

        if !self.binder.is_service_header(name) {
            tracing::warn!(header = name, "ignoring unknown header");
            return Ok(());
        }
        let header =
            self.binder.process_service_header(name, payload, &self.converters, &self.request)?;
        tracing::debug!(header = name, "accepted header");
        self.request.headers.push(header);
        Ok(())
    }

    fn invoke(&mut self, name: &str, arguments: Vec<Value>) -> Result<Option<Value>> {
        self.accept("operation", name)?;
        if !matches!(self.binder.entry(name), Some(DispatchEntry::Operation(_))) {
            return Err(DispatchError::UnknownOperation(name.to_string()));
        }
        self.invoked = true;

        self.transition(DispatchState::InvokingOperation);
        self.request.operation = name.to_string();
        let attributes = self.binder.process_service_method_arguments(
            name,
            arguments,
            &self.converters,
            &self.request,
        )?;
        self.request.attributes = attributes;

        self.transition(DispatchState::Forwarding);
        let response = match self.handler.handle(&self.request) {
            Ok(Some(Response::Soap(response))) => response,
            Ok(_) => {
                tracing::error!(operation = name, "operation handler returned no SOAP response");
                return Err(DispatchError::InvalidResponse(name.to_string()));
            }
            Err(err) => {
                tracing::error!(operation = name, error = %err, "operation handler failed");
                return Err(DispatchError::Handler { operation: name.to_string(), reason: err.to_string() });
            }
        };

        self.transition(DispatchState::ConvertingResponse);
        let mut headers = Vec::with_capacity(response.headers.len());
        for header in response.headers.iter().cloned() {
            let header = self.binder.process_response_header(header, &self.converters, &response)?;
            headers.push(header.into_wire());
        }
        let value =
            self.binder.process_service_method_return_value(name, &self.converters, &response)?;

        self.response_headers = headers;
        self.response = Some(response);
        self.transition(DispatchState::Idle);
        Ok(value)
    }

    fn fail(&mut self, err: DispatchError) -> TransportError {
        self.state = DispatchState::Idle;
        err.into()
    }
}

impl MessageHandler for DispatchProtocol<'_> {
    fn handle_header(&mut self, name: &str, payload: Value) -> transport::Result<()> {
        self.receive_header(name, payload).map_err(|e| self.fail(e))
    }

    fn handle_operation(&mut self, name: &str, arguments: Vec<Value>) -> transport::Result<Option<Value>> {
        self.invoke(name, arguments).map_err(|e| self.fail(e))
    }

    fn take_response_headers(&mut self) -> Vec<WireHeader> { mem::take(&mut self.response_headers) }
}

/// Run one message through `engine`, dispatching to `handler`.
///
/// Builds the call's converter table from `converters`; a converter that
/// cannot be registered fails the call with a server fault.
pub fn dispatch(
    engine: &dyn WireEngine,
    binder: &ServiceBinder,
    converters: &ConverterRepository,
    handler: &mut dyn OperationHandler,
    message: WireMessage,
) -> WireReply {
    let table = match ConverterTable::from_repository(converters) {
        Ok(table) => table,
        Err(err) => return WireReply::fault(message.operation, &err.into()),
    };
    let mut protocol = DispatchProtocol::new(binder, table, handler);
    engine.handle(message, &mut protocol)
}

/// Like [`dispatch`], but lets `engine` decode the raw envelope itself.
pub fn dispatch_raw(
    engine: &dyn WireEngine,
    binder: &ServiceBinder,
    converters: &ConverterRepository,
    handler: &mut dyn OperationHandler,
    raw: &str,
) -> WireReply {
    let table = match ConverterTable::from_repository(converters) {
        Ok(table) => table,
        Err(err) => return WireReply::fault("", &err.into()),
    };
    let mut protocol = DispatchProtocol::new(binder, table, handler);
    engine.handle_raw(raw, &mut protocol)
}
