//! Message binders
//!
//! Binders translate between the engine's positional view of a message and
//! the named view operation handlers work with.

use indexmap::IndexMap;
use ir::Operation;
use serde_json::Value;

use crate::Result;

/// Binds positional wire arguments to named request attributes.
pub trait RequestMessageBinder: Send + Sync {
    /// Name every argument of `operation`.
    fn bind_request(&self, operation: &Operation, arguments: Vec<Value>) -> Result<IndexMap<String, Value>>;
}

/// Shapes a handler's return value for the engine.
pub trait ResponseMessageBinder: Send + Sync {
    /// Value of the `return` part, `None` when the operation declares no return.
    fn bind_response(&self, operation: &Operation, return_value: Option<Value>) -> Result<Option<Value>>;
}

/// rpc/literal request binding: arguments are matched by position.
///
/// Missing trailing arguments are bound to `null`; surplus arguments are
/// dropped. A scalar delivered for an array-typed argument is wrapped into a
/// one-element array, since engines collapse single-element arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcLiteralRequestBinder;

impl RequestMessageBinder for RpcLiteralRequestBinder {
    fn bind_request(&self, operation: &Operation, arguments: Vec<Value>) -> Result<IndexMap<String, Value>> {
        if arguments.len() > operation.arguments.len() {
            tracing::debug!(
                operation = %operation.name,
                expected = operation.arguments.len(),
                received = arguments.len(),
                "dropping surplus arguments"
            );
        }

        let mut values = arguments.into_iter();
        let mut bound = IndexMap::with_capacity(operation.arguments.len());
        for slot in &operation.arguments {
            let value = match values.next() {
                Some(Value::Null) | None => Value::Null,
                Some(Value::Array(items)) => Value::Array(items),
                Some(scalar) if slot.is_array() => Value::Array(vec![scalar]),
                Some(value) => value,
            };
            bound.insert(slot.name.clone(), value);
        }
        Ok(bound)
    }
}

/// rpc/literal response binding: the return value passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcLiteralResponseBinder;

impl ResponseMessageBinder for RpcLiteralResponseBinder {
    fn bind_response(&self, operation: &Operation, return_value: Option<Value>) -> Result<Option<Value>> {
        if operation.return_type.is_none() {
            return Ok(None);
        }
        Ok(return_value)
    }
}
