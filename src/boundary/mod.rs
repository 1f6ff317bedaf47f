//! Process boundary - JSON in, JSON out.
//!
//! State crosses the process boundary as JSON. This module provides:
//! - [`handle`] - the `handle(state, action)` entry point a host calls,
//!   returning `{"state": ...}`
//! - [`serve`] / [`serve_stdio`] - a line-delimited JSON loop over any reader
//!   and writer, one `{"state":..,"action":..}` request per line
//!
//! # Important
//!
//! - **stdout**: one JSON response per line
//! - **stderr**: logs (`tracing`), never parsed by the host
//!
//! # Example
//!
//! ```ignore
//! use contract_weaver::boundary::{serve_stdio, ServeConfig};
//!
//! let contract = build_contract()?;
//! serve_stdio(&contract, &ServeConfig::default()).await?;
//! ```

mod interaction;
mod stdio;

pub use interaction::{handle, handle_line};
pub use stdio::{serve, serve_stdio, write_line, ServeConfig, ServeStats, DEFAULT_MAX_LINE_BYTES};
