//! `handle(state, action)` entry point.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::contract::Dispatcher;
use crate::error::Result;

/// Run one interaction against `dispatcher`.
///
/// Wraps `state` and `action` into a context, dispatches it and returns
/// `{"state": <new state>}`.
pub async fn handle<S>(dispatcher: &Dispatcher<S>, state: Value, action: Value) -> Result<Value>
where
    S: Serialize + DeserializeOwned + Send + 'static,
{
    run(dispatcher, json!({ "state": state, "action": action })).await
}

/// Run one interaction encoded as a JSON context line.
pub async fn handle_line<S>(dispatcher: &Dispatcher<S>, line: &str) -> Result<Value>
where
    S: Serialize + DeserializeOwned + Send + 'static,
{
    let context: Value = serde_json::from_str(line)?;
    run(dispatcher, context).await
}

async fn run<S>(dispatcher: &Dispatcher<S>, context: Value) -> Result<Value>
where
    S: Serialize + DeserializeOwned + Send + 'static,
{
    let context = dispatcher.handle(context).await?;
    Ok(json!({ "state": serde_json::to_value(&context.state)? }))
}
