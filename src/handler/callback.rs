//! Handler capability and callback adapters.
//!
//! Two kinds of handlers can be registered on a contract:
//! - a callback closure paired with a function name
//! - a self-describing type implementing [`Handler`]
//!
//! Both are normalized into a [`Callback`] at registration time.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::Context;
use crate::error::Result;

/// Boxed future for handler results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result type for handlers.
pub type HandlerResult<S> = Result<Context<S>>;

/// A self-describing action handler.
///
/// Any type exposing a function name and a `handle` method qualifies; there is
/// no base type to extend.
pub trait Handler<S>: Send + Sync + 'static {
    /// The function name this handler answers to.
    fn function_name(&self) -> &str;

    /// Handle a context and hand it back.
    fn handle(&self, context: Context<S>) -> BoxFuture<'static, HandlerResult<S>>;
}

/// Normalized handler callback.
pub type Callback<S> = Arc<dyn Fn(Context<S>) -> BoxFuture<'static, HandlerResult<S>> + Send + Sync>;

/// Wrap an async closure as a [`Callback`].
pub fn callback<S, F, Fut>(handler: F) -> Callback<S>
where
    S: 'static,
    F: Fn(Context<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult<S>> + Send + 'static,
{
    Arc::new(move |ctx: Context<S>| -> BoxFuture<'static, HandlerResult<S>> {
        Box::pin(handler(ctx))
    })
}

/// Wrap a synchronous closure as a [`Callback`].
pub fn sync_callback<S, F>(handler: F) -> Callback<S>
where
    S: Send + 'static,
    F: Fn(Context<S>) -> HandlerResult<S> + Send + Sync + 'static,
{
    Arc::new(move |ctx: Context<S>| -> BoxFuture<'static, HandlerResult<S>> {
        let result = handler(ctx);
        Box::pin(async move { result })
    })
}

/// Turn a self-describing handler into a [`Callback`] around its `handle`.
pub(crate) fn described_callback<S: 'static>(handler: Arc<dyn Handler<S>>) -> Callback<S> {
    Arc::new(move |ctx: Context<S>| handler.handle(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Action;
    use serde_json::Value;

    struct Double;

    impl Handler<i64> for Double {
        fn function_name(&self) -> &str {
            "double"
        }

        fn handle(&self, mut context: Context<i64>) -> BoxFuture<'static, HandlerResult<i64>> {
            Box::pin(async move {
                context.state *= 2;
                Ok(context)
            })
        }
    }

    #[tokio::test]
    async fn test_async_callback() {
        let cb = callback(|mut ctx: Context<i64>| async move {
            ctx.state += 1;
            Ok(ctx)
        });

        let ctx = cb(Context::new(1, Action::new("inc", Value::Null)))
            .await
            .unwrap();
        assert_eq!(ctx.state, 2);
    }

    #[tokio::test]
    async fn test_sync_callback() {
        let cb = sync_callback(|mut ctx: Context<i64>| {
            ctx.state -= 1;
            Ok(ctx)
        });

        let ctx = cb(Context::new(1, Action::new("dec", Value::Null)))
            .await
            .unwrap();
        assert_eq!(ctx.state, 0);
    }

    #[tokio::test]
    async fn test_described_callback() {
        let handler: Arc<dyn Handler<i64>> = Arc::new(Double);
        assert_eq!(handler.function_name(), "double");

        let cb = described_callback(handler);
        let ctx = cb(Context::new(21, Action::new("double", Value::Null)))
            .await
            .unwrap();
        assert_eq!(ctx.state, 42);
    }
}
