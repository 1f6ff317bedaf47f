//! Immutable name-indexed collection of handler proxies.

use std::collections::HashMap;

use super::HandlerProxy;

/// Registered handlers keyed by function name.
///
/// Built once by the contract builder; lookup ignores registration order.
pub struct Chain<S> {
    proxies: HashMap<String, HandlerProxy<S>>,
}

impl<S> Chain<S> {
    /// Build a chain from proxies. Later proxies replace earlier ones with the
    /// same name; the builder rejects duplicates before getting here.
    pub(crate) fn from_proxies(proxies: impl IntoIterator<Item = HandlerProxy<S>>) -> Self {
        Self {
            proxies: proxies
                .into_iter()
                .map(|p| (p.function_name().to_string(), p))
                .collect(),
        }
    }

    /// Get the proxy for a function name.
    pub fn get(&self, function: &str) -> Option<&HandlerProxy<S>> {
        self.proxies.get(function)
    }

    /// Check whether a function name is registered.
    pub fn contains(&self, function: &str) -> bool {
        self.proxies.contains_key(function)
    }

    /// Registered function names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.proxies.keys().map(String::as_str)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Check if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}
