//! Name-gated wrapper around a handler callback.

use std::fmt;

use super::{BoxFuture, Callback, Context, Handler, HandlerResult};

/// Wraps one handler so it only runs for its own function name.
///
/// A context naming any other function is passed through untouched, so every
/// proxy in a chain may see a context while only the matching one fires.
pub struct HandlerProxy<S> {
    function_name: String,
    callback: Callback<S>,
}

impl<S> HandlerProxy<S> {
    /// Create a proxy for `function_name`.
    pub fn new(function_name: impl Into<String>, callback: Callback<S>) -> Self {
        Self {
            function_name: function_name.into(),
            callback,
        }
    }

    /// The function name this proxy answers to.
    #[inline]
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Diagnostic name of this proxy, `__HandlerProxy__<function>`.
    pub fn label(&self) -> String {
        format!("__HandlerProxy__{}", self.function_name)
    }
}

impl<S: Send + 'static> HandlerProxy<S> {
    /// Run the wrapped handler if the context names this proxy's function.
    pub fn handle(&self, context: Context<S>) -> BoxFuture<'static, HandlerResult<S>> {
        if context.function() != self.function_name {
            tracing::trace!(
                "{} passing through context for '{}'",
                self.label(),
                context.function()
            );
            return Box::pin(async move { Ok(context) });
        }

        tracing::trace!("{} running", self.label());
        (self.callback)(context)
    }
}

impl<S> Clone for HandlerProxy<S> {
    fn clone(&self) -> Self {
        Self {
            function_name: self.function_name.clone(),
            callback: self.callback.clone(),
        }
    }
}

impl<S> fmt::Debug for HandlerProxy<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerProxy")
            .field("function_name", &self.function_name)
            .finish_non_exhaustive()
    }
}

impl<S: Send + 'static> Handler<S> for HandlerProxy<S> {
    fn function_name(&self) -> &str {
        &self.function_name
    }

    fn handle(&self, context: Context<S>) -> BoxFuture<'static, HandlerResult<S>> {
        HandlerProxy::handle(self, context)
    }
}
