//! Contract facade and the compiled dispatcher.
//!
//! [`Contract`] is the entry point: its builders collect action handlers and
//! compile them into a [`Dispatcher`]. The dispatcher validates each incoming
//! context, routes it to the handler registered for its function name and
//! returns the context the handler hands back.
//!
//! # Example
//!
//! ```
//! use contract_weaver::Contract;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let contract = Contract::builder::<serde_json::Value>()
//!     .action_sync("add", |mut ctx| {
//!         let item = ctx.action.input.payload["item"].clone();
//!         if let Some(storage) = ctx.state["storage"].as_array_mut() {
//!             storage.push(item);
//!         }
//!         Ok(ctx)
//!     })
//!     .build()
//!     .unwrap();
//!
//! let ctx = contract
//!     .handle(json!({
//!         "state": { "storage": [] },
//!         "action": { "input": { "function": "add", "payload": { "item": "x" } } }
//!     }))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(ctx.state, json!({ "storage": ["x"] }));
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::builder::ContractBuilder;
use crate::error::{ContractError, Result};
use crate::handler::{Chain, Context, ContractMembers};
use crate::validate::{
    decode_state, validate_function_known, validate_function_name, validate_shape,
};

/// Entry point for building contracts.
///
/// Self-describing handlers implement [`crate::Handler`].
pub struct Contract;

impl Contract {
    /// Get a builder for a contract over state `S`.
    pub fn builder<S: Send + 'static>() -> ContractBuilder<S> {
        ContractBuilder::new()
    }

    /// Get a builder whose state type is inferred from `initial_state`.
    ///
    /// The value itself is not kept; callers pass state with every request.
    pub fn builder_with_state<S: Send + 'static>(_initial_state: &S) -> ContractBuilder<S> {
        ContractBuilder::new()
    }
}

/// A compiled contract.
///
/// Immutable once built. Cloning is cheap and clones share the same chain.
pub struct Dispatcher<S> {
    /// Known function names, in registration order.
    functions: Arc<[String]>,
    /// Handlers by function name.
    chain: Arc<Chain<S>>,
}

impl<S> Dispatcher<S> {
    pub(crate) fn new(functions: Vec<String>, chain: Chain<S>) -> Self {
        Self {
            functions: functions.into(),
            chain: Arc::new(chain),
        }
    }

    /// Known function names, in registration order.
    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    /// The compiled handler chain.
    pub fn chain(&self) -> &Arc<Chain<S>> {
        &self.chain
    }
}

impl<S: Send + 'static> Dispatcher<S> {
    /// Handle a raw context.
    ///
    /// Runs shape validation, checks the function is known, decodes `state`
    /// into `S` and then invokes its handler. Nothing runs if any step fails.
    pub async fn handle(&self, context: Value) -> Result<Context<S>>
    where
        S: DeserializeOwned,
    {
        let context = validate_shape(context)?;
        validate_function_known(&context, &self.functions)?;
        let context = decode_state::<S>(context)?;
        self.invoke(context).await
    }

    /// Handle an already typed context.
    ///
    /// A context failing validation is dropped untouched; use
    /// [`Dispatcher::validate`] first to keep it.
    pub async fn dispatch(&self, context: Context<S>) -> Result<Context<S>> {
        self.validate(&context)?;
        self.invoke(context).await
    }

    /// Check that a typed context would be accepted by [`Dispatcher::dispatch`].
    pub fn validate(&self, context: &Context<S>) -> Result<()> {
        validate_function_name(context)?;
        validate_function_known(context, &self.functions)
    }

    async fn invoke(&self, mut context: Context<S>) -> Result<Context<S>> {
        context.attach_contract(ContractMembers::new(Arc::clone(&self.chain)));

        let proxy = self
            .chain
            .get(context.function())
            .ok_or_else(|| ContractError::UnknownFunction(context.function().to_string()))?;

        tracing::debug!("Dispatching '{}'", context.function());
        proxy.handle(context).await
    }
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            functions: Arc::clone(&self.functions),
            chain: Arc::clone(&self.chain),
        }
    }
}

impl<S> fmt::Debug for Dispatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("functions", &self.functions)
            .finish_non_exhaustive()
    }
}
