//! Context validation.
//!
//! Two stages run before any handler executes:
//! 1. [`validate_shape`] - the raw context is an object carrying `state`,
//!    `action`, `action.input` and a non-empty `action.input.function`
//! 2. [`validate_function_known`] - the function is registered on the contract
//!
//! Only then is the raw state decoded into the contract's state type with
//! [`decode_state`].
//!
//! A request failing either stage never reaches a handler, so state is never
//! partially mutated by an invalid request.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ContractError, Result};
use crate::handler::{Action, Context, Input};

/// Truthiness of a JSON value: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn take_object(fields: &mut Map<String, Value>, key: &str) -> Option<Map<String, Value>> {
    match fields.remove(key) {
        Some(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Validate the shape of a raw context.
///
/// Checks are evaluated in order and the first failure wins:
/// missing context, non-object context, missing state, invalid action,
/// invalid input, invalid function. The state is left as raw JSON.
/// A `caller` that is not a string is ignored.
pub fn validate_shape(context: Value) -> Result<Context<Value>> {
    if !is_truthy(&context) {
        return Err(ContractError::MissingContext);
    }

    let Value::Object(mut fields) = context else {
        return Err(ContractError::InvalidContextType);
    };

    let state = fields
        .remove("state")
        .filter(is_truthy)
        .ok_or(ContractError::MissingState)?;

    let mut action = take_object(&mut fields, "action").ok_or(ContractError::InvalidAction)?;
    let mut input = take_object(&mut action, "input").ok_or(ContractError::InvalidInput)?;

    let function = match input.remove("function") {
        Some(Value::String(function)) if !function.is_empty() => function,
        _ => return Err(ContractError::InvalidFunction),
    };

    let caller = match action.remove("caller") {
        None | Some(Value::Null) => None,
        Some(Value::String(caller)) => Some(caller),
        Some(other) => {
            tracing::debug!("Ignoring non-string caller: {}", other);
            None
        }
    };

    let payload = input.remove("payload").unwrap_or(Value::Null);

    Ok(Context::new(
        state,
        Action {
            input: Input { function, payload },
            caller,
        },
    ))
}

/// Decode the raw state of a validated context into `S`.
pub fn decode_state<S: DeserializeOwned>(context: Context<Value>) -> Result<Context<S>> {
    let action = context.action;
    let state = S::deserialize(context.state).map_err(ContractError::StateDecode)?;
    Ok(Context::new(state, action))
}

/// Validate that a typed context names a function at all.
pub fn validate_function_name<S>(context: &Context<S>) -> Result<()> {
    if context.function().is_empty() {
        return Err(ContractError::InvalidFunction);
    }
    Ok(())
}

/// Validate that the requested function is one of `known`.
pub fn validate_function_known<S>(context: &Context<S>, known: &[String]) -> Result<()> {
    if known.is_empty() {
        return Err(ContractError::NoFunctionsDefined);
    }

    let function = context.function();
    if !known.iter().any(|k| k == function) {
        return Err(ContractError::UnknownFunction(function.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Storage {
        storage: Vec<String>,
    }

    fn shape(value: Value) -> Result<Context<Value>> {
        validate_shape(value)
    }

    fn decoded(value: Value) -> Result<Context<Storage>> {
        decode_state(validate_shape(value)?)
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("0")));
    }

    #[test]
    fn test_valid_context() {
        let ctx = decoded(json!({
            "state": { "storage": [] },
            "action": {
                "input": { "function": "add", "payload": { "item": "x" } },
                "caller": "alice"
            }
        }))
        .unwrap();

        assert_eq!(ctx.state, Storage { storage: vec![] });
        assert_eq!(ctx.function(), "add");
        assert_eq!(ctx.action.input.payload, json!({ "item": "x" }));
        assert_eq!(ctx.action.caller.as_deref(), Some("alice"));
    }

    #[test]
    fn test_missing_payload_is_null() {
        let ctx = shape(json!({
            "state": { "n": 1 },
            "action": { "input": { "function": "ping" } }
        }))
        .unwrap();
        assert_eq!(ctx.action.input.payload, Value::Null);
    }

    #[test]
    fn test_missing_context() {
        assert!(matches!(shape(Value::Null), Err(ContractError::MissingContext)));
        assert!(matches!(shape(json!(false)), Err(ContractError::MissingContext)));
        assert!(matches!(shape(json!("")), Err(ContractError::MissingContext)));
    }

    #[test]
    fn test_invalid_context_type() {
        assert!(matches!(shape(json!(42)), Err(ContractError::InvalidContextType)));
        assert!(matches!(shape(json!("ctx")), Err(ContractError::InvalidContextType)));
        assert!(matches!(shape(json!([1])), Err(ContractError::InvalidContextType)));
    }

    #[test]
    fn test_missing_state_checked_first() {
        assert!(matches!(shape(json!({})), Err(ContractError::MissingState)));
        assert!(matches!(
            shape(json!({ "state": 0, "action": { "input": { "function": "add" } } })),
            Err(ContractError::MissingState)
        ));
        assert!(matches!(
            shape(json!({ "state": null })),
            Err(ContractError::MissingState)
        ));
    }

    #[test]
    fn test_invalid_action() {
        assert!(matches!(
            shape(json!({ "state": {} })),
            Err(ContractError::InvalidAction)
        ));
        assert!(matches!(
            shape(json!({ "state": {}, "action": "add" })),
            Err(ContractError::InvalidAction)
        ));
    }

    #[test]
    fn test_non_string_caller_is_ignored() {
        for caller in [json!(7), json!({ "id": "alice" }), json!(true)] {
            let ctx = shape(json!({
                "state": { "count": 1 },
                "action": { "input": { "function": "inc" }, "caller": caller }
            }))
            .unwrap();
            assert_eq!(ctx.function(), "inc");
            assert_eq!(ctx.action.caller, None);
        }
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            shape(json!({ "state": {}, "action": {} })),
            Err(ContractError::InvalidInput)
        ));
        assert!(matches!(
            shape(json!({ "state": {}, "action": { "input": null } })),
            Err(ContractError::InvalidInput)
        ));
    }

    #[test]
    fn test_invalid_function() {
        for input in [json!({}), json!({ "function": "" }), json!({ "function": 3 })] {
            let result = shape(json!({ "state": {}, "action": { "input": input } }));
            assert!(matches!(result, Err(ContractError::InvalidFunction)));
        }
    }

    #[test]
    fn test_state_decode_error() {
        let result = decoded(json!({
            "state": { "storage": "not a list" },
            "action": { "input": { "function": "add" } }
        }));
        assert!(matches!(result, Err(ContractError::StateDecode(_))));
    }

    #[test]
    fn test_function_known() {
        let ctx = Context::new((), Action::new("add", Value::Null));
        let known = vec!["add".to_string(), "subtract".to_string()];

        assert!(validate_function_known(&ctx, &known).is_ok());
        assert!(matches!(
            validate_function_known(&ctx, &[]),
            Err(ContractError::NoFunctionsDefined)
        ));

        let unknown = Context::new((), Action::new("nope", Value::Null));
        let err = validate_function_known(&unknown, &known).unwrap_err();
        assert_eq!(err.to_string(), "Unknown function 'nope' provided");
    }

    #[test]
    fn test_function_name() {
        assert!(validate_function_name(&Context::new((), Action::new("add", Value::Null))).is_ok());
        assert!(matches!(
            validate_function_name(&Context::new((), Action::new("", Value::Null))),
            Err(ContractError::InvalidFunction)
        ));
    }
}
