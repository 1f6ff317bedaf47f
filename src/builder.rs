//! Contract builder.
//!
//! The [`ContractBuilder`] provides a fluent API for registering action
//! handlers and compiling them into a [`Dispatcher`].
//!
//! Each registration consumes the builder and returns the updated one.
//! Registration errors (duplicate names, missing callbacks, malformed
//! handlers) are recorded as they happen and returned by [`ContractBuilder::build`];
//! the first error wins and later registrations are ignored.
//!
//! # Example
//!
//! ```
//! use contract_weaver::Contract;
//!
//! let contract = Contract::builder::<Vec<i64>>()
//!     .action_sync("push", |mut ctx| {
//!         let n: i64 = ctx.payload_as()?;
//!         ctx.state.push(n);
//!         Ok(ctx)
//!     })
//!     .action("clear", |mut ctx| async move {
//!         ctx.state.clear();
//!         Ok(ctx)
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(contract.functions(), ["push", "clear"]);
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::contract::Dispatcher;
use crate::error::{RegistrationError, Result};
use crate::handler::{
    callback, described_callback, sync_callback, Callback, Chain, Context, Handler,
    HandlerProxy, HandlerResult,
};

/// A handler registration in either of its accepted forms.
pub enum ActionHandler<S> {
    /// A callback paired with an externally supplied function name.
    Callback {
        /// Function name to route on.
        function_name: String,
        /// The callback; `None` fails registration.
        callback: Option<Callback<S>>,
    },
    /// A handler that carries its own function name.
    Described(Arc<dyn Handler<S>>),
}

impl<S: 'static> ActionHandler<S> {
    /// Callback form.
    pub fn callback(function_name: impl Into<String>, callback: Callback<S>) -> Self {
        Self::Callback {
            function_name: function_name.into(),
            callback: Some(callback),
        }
    }

    /// Self-describing form.
    pub fn described(handler: impl Handler<S>) -> Self {
        Self::Described(Arc::new(handler))
    }

    /// Normalize into a name and callback pair.
    fn into_parts(self) -> std::result::Result<(String, Option<Callback<S>>), RegistrationError> {
        match self {
            Self::Callback {
                function_name,
                callback,
            } => Ok((function_name, callback)),
            Self::Described(handler) => {
                let function_name = handler.function_name().to_string();
                if function_name.is_empty() {
                    return Err(RegistrationError::MalformedHandler("function_name"));
                }
                Ok((function_name, Some(described_callback(handler))))
            }
        }
    }
}

impl<S: 'static> fmt::Debug for ActionHandler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback {
                function_name,
                callback,
            } => f
                .debug_struct("Callback")
                .field("function_name", function_name)
                .field("has_callback", &callback.is_some())
                .finish(),
            Self::Described(handler) => f
                .debug_tuple("Described")
                .field(&handler.function_name())
                .finish(),
        }
    }
}

/// Builder for configuring and compiling a contract.
pub struct ContractBuilder<S> {
    /// Function names in registration order.
    functions: Vec<String>,
    /// Proxies in registration order.
    proxies: Vec<HandlerProxy<S>>,
    /// First registration error, reported by `build()`.
    error: Option<RegistrationError>,
}

impl<S: Send + 'static> ContractBuilder<S> {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
            proxies: Vec::new(),
            error: None,
        }
    }

    /// Register an async action handler under `function_name`.
    pub fn action<F, Fut>(self, function_name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Context<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<S>> + Send + 'static,
    {
        self.register(ActionHandler::callback(function_name, callback(handler)))
    }

    /// Register a synchronous action handler under `function_name`.
    pub fn action_sync<F>(self, function_name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Context<S>) -> HandlerResult<S> + Send + Sync + 'static,
    {
        self.register(ActionHandler::callback(function_name, sync_callback(handler)))
    }

    /// Register a self-describing handler under its own function name.
    pub fn handler(self, handler: impl Handler<S>) -> Self {
        self.register(ActionHandler::described(handler))
    }

    /// Register a handler in either form.
    pub fn register(mut self, handler: ActionHandler<S>) -> Self {
        if self.error.is_some() {
            return self;
        }

        if let Err(e) = self.try_register(handler) {
            tracing::debug!("Action registration failed: {}", e);
            self.error = Some(e);
        }

        self
    }

    fn try_register(&mut self, handler: ActionHandler<S>) -> std::result::Result<(), RegistrationError> {
        let (function_name, callback) = handler.into_parts()?;

        if function_name.is_empty() {
            return Err(RegistrationError::MalformedHandler("function_name"));
        }

        if self.functions.contains(&function_name) {
            return Err(RegistrationError::DuplicateAction(function_name));
        }

        let callback = callback.ok_or_else(|| RegistrationError::MissingHandler(function_name.clone()))?;

        tracing::debug!("Registered action '{}'", function_name);
        self.proxies
            .push(HandlerProxy::new(function_name.clone(), callback));
        self.functions.push(function_name);
        Ok(())
    }

    /// Function names registered so far, in registration order.
    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    /// Compile the registered actions into a dispatcher.
    ///
    /// May be called more than once; every call yields an independent
    /// dispatcher that later registrations on this builder do not affect.
    pub fn build(&self) -> Result<Dispatcher<S>> {
        if let Some(err) = &self.error {
            return Err(err.clone().into());
        }

        let chain = Chain::from_proxies(self.proxies.iter().cloned());
        Ok(Dispatcher::new(self.functions.clone(), chain))
    }
}

impl<S: Send + 'static> Default for ContractBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for ContractBuilder<S> {
    fn clone(&self) -> Self {
        Self {
            functions: self.functions.clone(),
            proxies: self.proxies.clone(),
            error: self.error.clone(),
        }
    }
}

impl<S> fmt::Debug for ContractBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractBuilder")
            .field("functions", &self.functions)
            .field("error", &self.error)
            .finish()
    }
}
