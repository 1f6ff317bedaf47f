//! Greetings Worker - line-delimited JSON contract example.
//!
//! This example demonstrates:
//! - Registering a self-describing handler and callback handlers
//! - Delegating from one action to another through the contract map
//! - Serving requests over stdin/stdout
//!
//! # Running
//!
//! ```sh
//! echo '{"state":{"greetings":[0,1]},"action":{"input":{"function":"add","payload":11}}}' \
//!     | cargo run --example greetings
//! # {"state":{"greetings":[0,1,11]}}
//! ```

use contract_weaver::boundary::{serve_stdio, ServeConfig};
use contract_weaver::handler::{BoxFuture, HandlerResult};
use contract_weaver::{Contract, Context, Handler};
use serde::{Deserialize, Serialize};

/// Contract state.
#[derive(Serialize, Deserialize, Debug)]
struct Greetings {
    greetings: Vec<i64>,
}

/// Appends the payload to the greetings.
struct Add;

impl Handler<Greetings> for Add {
    fn function_name(&self) -> &str {
        "add"
    }

    fn handle(&self, mut context: Context<Greetings>) -> BoxFuture<'static, HandlerResult<Greetings>> {
        Box::pin(async move {
            let greeting: i64 = context.payload_as()?;
            context.state.greetings.push(greeting);
            Ok(context)
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let contract = Contract::builder::<Greetings>()
        .handler(Add)
        // "pop" forwards to "pop_actual", which does the work
        .action("pop", |ctx| async move { ctx.delegate("pop_actual").await })
        .action_sync("pop_actual", |mut ctx| {
            ctx.state.greetings.pop();
            Ok(ctx)
        })
        .build()?;

    let stats = serve_stdio(&contract, &ServeConfig::default()).await?;
    eprintln!("handled {}, rejected {}", stats.handled, stats.rejected);

    Ok(())
}
