//! Handler module - action handlers and their routing.
//!
//! Provides:
//! - [`Context`] - the value threaded through every handler call
//! - [`Handler`] - the self-describing handler capability
//! - [`HandlerProxy`] - gates a handler on its function name
//! - [`Chain`] - the name-indexed set of proxies
//!
//! # Example
//!
//! ```ignore
//! use contract_weaver::handler::{callback, Context, HandlerProxy};
//!
//! let proxy = HandlerProxy::new("add", callback(|mut ctx: Context<Vec<String>>| async move {
//!     let item: String = ctx.payload_as()?;
//!     ctx.state.push(item);
//!     Ok(ctx)
//! }));
//! ```

mod callback;
mod chain;
mod context;
mod proxy;

pub(crate) use callback::described_callback;
pub use callback::{callback, sync_callback, BoxFuture, Callback, Handler, HandlerResult};
pub use chain::Chain;
pub use context::{Action, Context, ContractMembers, Input};
pub use proxy::HandlerProxy;
