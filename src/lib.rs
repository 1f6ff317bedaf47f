//! # contract-weaver
//!
//! Name-routed action handlers compiled into a validating state-transition
//! dispatcher.
//!
//! An author registers named handlers against a state type, builds them into a
//! [`Dispatcher`] and hands it one request at a time. Every request is
//! validated, routed by its function name and run exactly once.
//!
//! ## Architecture
//!
//! - **Builder**: collects `(name, handler)` registrations, rejects duplicates
//! - **Chain**: immutable map of name-gated [`HandlerProxy`] values
//! - **Dispatcher**: validates a context, resolves its function, runs the handler
//! - **Boundary**: JSON `handle(state, action)` and a line-delimited stdio loop
//!
//! ## Example
//!
//! ```
//! use contract_weaver::{Contract, Context, Action};
//! use serde_json::Value;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), contract_weaver::ContractError> {
//! let contract = Contract::builder::<Vec<String>>()
//!     .action("add", |mut ctx| async move {
//!         let item: String = ctx.payload_as()?;
//!         ctx.state.push(item);
//!         Ok(ctx)
//!     })
//!     .build()?;
//!
//! let ctx = contract
//!     .dispatch(Context::new(vec![], Action::new("add", Value::from("x"))))
//!     .await?;
//!
//! assert_eq!(ctx.state, vec!["x".to_string()]);
//! # Ok(())
//! # }
//! ```

pub mod boundary;
pub mod error;
pub mod handler;
pub mod validate;

mod builder;
mod contract;

pub use builder::{ActionHandler, ContractBuilder};
pub use contract::{Contract, Dispatcher};
pub use error::{ContractError, RegistrationError};
pub use handler::{Action, Context, Handler, HandlerProxy, Input};
