//! Per-invocation context for action handlers.
//!
//! A [`Context`] carries:
//! - `state` - the caller-owned application state
//! - `action` - the requested function name and its payload
//! - `contract` - the delegation map, attached by the dispatcher
//!
//! Handlers take the context by value and hand it back, so state is moved
//! through a call rather than copied.
//!
//! # Example
//!
//! ```ignore
//! async fn pop(ctx: Context<Greetings>) -> Result<Context<Greetings>> {
//!     // Forward to the handler that does the work
//!     ctx.delegate("pop_actual").await
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Chain;
use crate::error::{ContractError, Result};

/// Routing input of an action: the function to call and its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    /// Name of the function to route to.
    pub function: String,
    /// Function arguments, free-form.
    #[serde(default)]
    pub payload: Value,
}

impl Input {
    /// Create a new input.
    pub fn new(function: impl Into<String>, payload: Value) -> Self {
        Self {
            function: function.into(),
            payload,
        }
    }

    /// Decode the payload into a concrete type.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.payload).map_err(ContractError::PayloadDecode)
    }
}

/// The interaction sent by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Routing input.
    pub input: Input,
    /// Identity of the caller, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
}

impl Action {
    /// Create an action calling `function` with `payload`.
    pub fn new(function: impl Into<String>, payload: Value) -> Self {
        Self {
            input: Input::new(function, payload),
            caller: None,
        }
    }

    /// Set the caller.
    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }
}

/// Members of the compiled contract exposed to handlers.
///
/// Attached by the dispatcher right before a handler runs. Handlers can read
/// it but have no way to replace it.
pub struct ContractMembers<S> {
    actions: Arc<Chain<S>>,
}

impl<S> ContractMembers<S> {
    pub(crate) fn new(actions: Arc<Chain<S>>) -> Self {
        Self { actions }
    }

    /// The registered handlers, keyed by function name.
    pub fn actions(&self) -> &Arc<Chain<S>> {
        &self.actions
    }
}

impl<S> Clone for ContractMembers<S> {
    fn clone(&self) -> Self {
        Self {
            actions: Arc::clone(&self.actions),
        }
    }
}

impl<S> fmt::Debug for ContractMembers<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractMembers")
            .field("actions", &self.actions.names().collect::<Vec<_>>())
            .finish()
    }
}

/// Context passed to action handlers.
#[derive(Debug, Serialize)]
pub struct Context<S> {
    /// Application state, mutated by handlers.
    pub state: S,
    /// The requested action.
    pub action: Action,
    #[serde(skip)]
    contract: Option<ContractMembers<S>>,
}

impl<S> Context<S> {
    /// Create a context that has not been dispatched yet.
    pub fn new(state: S, action: Action) -> Self {
        Self {
            state,
            action,
            contract: None,
        }
    }

    /// The requested function name.
    #[inline]
    pub fn function(&self) -> &str {
        &self.action.input.function
    }

    /// Decode the action payload into a concrete type.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T> {
        self.action.input.payload_as()
    }

    /// Contract members, present once the context is being dispatched.
    pub fn contract(&self) -> Option<&ContractMembers<S>> {
        self.contract.as_ref()
    }

    /// Shortcut for `contract().actions()`.
    pub fn actions(&self) -> Option<&Arc<Chain<S>>> {
        self.contract.as_ref().map(ContractMembers::actions)
    }

    /// Point the context at another function.
    ///
    /// Needed before handing the context to another proxy, which only fires
    /// for its own name.
    pub fn retarget(&mut self, function: impl Into<String>) {
        self.action.input.function = function.into();
    }

    /// Consume the context, keeping the state.
    pub fn into_state(self) -> S {
        self.state
    }

    pub(crate) fn attach_contract(&mut self, members: ContractMembers<S>) {
        self.contract = Some(members);
    }
}

impl<S: Send + 'static> Context<S> {
    /// Retarget to `function` and run its registered handler.
    ///
    /// Fails with [`ContractError::UnknownFunction`] if the context is not
    /// being dispatched or `function` is not registered.
    pub async fn delegate(mut self, function: &str) -> Result<Self> {
        let actions = match self.actions() {
            Some(actions) => Arc::clone(actions),
            None => return Err(ContractError::UnknownFunction(function.to_string())),
        };

        let proxy = actions
            .get(function)
            .ok_or_else(|| ContractError::UnknownFunction(function.to_string()))?;

        tracing::debug!("Delegating '{}' to '{}'", self.function(), function);
        self.retarget(function);
        proxy.handle(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct AddUser {
        id: u32,
        name: String,
    }

    #[test]
    fn test_context_creation() {
        let ctx = Context::new(vec![1, 2], Action::new("add", json!(3)));
        assert_eq!(ctx.function(), "add");
        assert_eq!(ctx.state, vec![1, 2]);
        assert!(ctx.contract().is_none());
        assert!(ctx.actions().is_none());
    }

    #[test]
    fn test_payload_as() {
        let ctx = Context::new(
            (),
            Action::new("add_user", json!({ "id": 1337, "name": "CRKSTZ" })),
        );

        let user: AddUser = ctx.payload_as().unwrap();
        assert_eq!(
            user,
            AddUser {
                id: 1337,
                name: "CRKSTZ".to_string()
            }
        );
    }

    #[test]
    fn test_payload_as_mismatch() {
        let ctx = Context::new((), Action::new("add_user", json!("not a user")));
        let err = ctx.payload_as::<AddUser>().unwrap_err();
        assert!(matches!(err, ContractError::PayloadDecode(_)));
    }

    #[test]
    fn test_retarget() {
        let mut ctx = Context::new((), Action::new("pop", Value::Null));
        ctx.retarget("pop_actual");
        assert_eq!(ctx.function(), "pop_actual");
    }

    #[test]
    fn test_action_deserialize_defaults() {
        let action: Action = serde_json::from_value(json!({
            "input": { "function": "ping" }
        }))
        .unwrap();

        assert_eq!(action.input.payload, Value::Null);
        assert_eq!(action.caller, None);
    }

    #[test]
    fn test_context_serialize_skips_contract() {
        let ctx = Context::new(
            json!({ "n": 1 }),
            Action::new("inc", Value::Null).with_caller("alice"),
        );

        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(
            value,
            json!({
                "state": { "n": 1 },
                "action": { "input": { "function": "inc", "payload": null }, "caller": "alice" }
            })
        );
    }

    #[tokio::test]
    async fn test_delegate_without_contract() {
        let ctx = Context::new((), Action::new("pop", Value::Null));
        let err = ctx.delegate("pop_actual").await.unwrap_err();
        assert!(matches!(err, ContractError::UnknownFunction(name) if name == "pop_actual"));
    }
}
