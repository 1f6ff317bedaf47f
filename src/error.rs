//! Error types for contract-weaver.

use thiserror::Error;

/// Boxed error raised by user handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while registering actions on a builder.
///
/// These are recorded by the builder and returned from `build()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A handler was already registered under this function name.
    #[error("Duplicate action name \"{0}\" provided in `.action(...)` call")]
    DuplicateAction(String),

    /// A named registration arrived without a callback.
    #[error("Cannot create an interaction handler without a handler function (action \"{0}\")")]
    MissingHandler(String),

    /// A handler did not describe itself properly.
    #[error("Handler is missing '{0}' property")]
    MalformedHandler(&'static str),
}

/// Main error type for building and dispatching contracts.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Chain construction failed.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// No context was supplied.
    #[error("Unexpected missing `context` object")]
    MissingContext,

    /// The context is not an object.
    #[error("Argument `context` in `contract.handle(context)` should be an object")]
    InvalidContextType,

    /// `context.state` is absent or falsy.
    #[error("Field `context.state` is required")]
    MissingState,

    /// `context.action` is absent or not an object.
    #[error("Field 'context.action' should be an object")]
    InvalidAction,

    /// `context.action.input` is absent or not an object.
    #[error("Field 'context.action.input' should be an object")]
    InvalidInput,

    /// `context.action.input.function` is absent, empty or not a string.
    #[error("Field 'context.action.input.function' should be a string")]
    InvalidFunction,

    /// The contract was built without any actions.
    #[error("Contract does not have functions defined")]
    NoFunctionsDefined,

    /// The requested function is not registered.
    #[error("Unknown function '{0}' provided")]
    UnknownFunction(String),

    /// `context.state` did not match the contract's state type.
    #[error("Field `context.state` does not match the contract state: {0}")]
    StateDecode(#[source] serde_json::Error),

    /// `context.action.input.payload` did not match the requested type.
    #[error("Field 'context.action.input.payload' is invalid: {0}")]
    PayloadDecode(#[source] serde_json::Error),

    /// JSON serialization/deserialization error at the process boundary.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A boundary request line exceeded the configured limit.
    #[error("Request of {size} bytes exceeds the {limit} byte limit")]
    RequestTooLarge {
        /// Size of the rejected line.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A boundary request line was not valid UTF-8.
    #[error("Request line is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// I/O error at the process boundary.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by a handler, passed through untouched.
    #[error(transparent)]
    Handler(BoxError),
}

impl ContractError {
    /// Wrap an error raised inside a handler.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }

    /// True for errors raised before any handler ran.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingContext
                | Self::InvalidContextType
                | Self::MissingState
                | Self::InvalidAction
                | Self::InvalidInput
                | Self::InvalidFunction
                | Self::NoFunctionsDefined
                | Self::UnknownFunction(_)
                | Self::StateDecode(_)
        )
    }
}

/// Result type alias using ContractError.
pub type Result<T> = std::result::Result<T, ContractError>;
