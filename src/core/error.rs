//! Custom error types for the application.
//!
//! Provides structured error handling for each domain:
//!
//! - [`ConnectorError`] - the only failures the wallet connector propagates
//! - [`ProviderError`] - individual calls into the injected provider
//! - [`AbiError`] - contract interface descriptor parsing

use thiserror::Error;

use crate::config::USER_REJECTED_CODE;

/// Failures surfaced by [`ErcConnector`](crate::core::ErcConnector).
///
/// Everything else a provider can do wrong is handled inside the connector
/// by falling back to the next strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectorError {
    /// No injected wallet was handed to the connector.
    #[error("No ERC provider was found on window.EthereumChain.")]
    NoProvider,
    /// The user denied the wallet's permission prompt.
    #[error("The user rejected the request.")]
    UserRejectedRequest,
}

impl ConnectorError {
    /// Error class name exposed to JavaScript callers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoProvider => "NoErcProviderError",
            Self::UserRejectedRequest => "UserRejectedRequestError",
        }
    }
}

/// A single provider call that did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider rejected the call with an EIP-1193 style error code.
    #[error("provider error {code}: {message}")]
    Rpc { code: i64, message: String },
    /// The call threw or rejected without a numeric code.
    #[error("provider call failed: {0}")]
    Failed(String),
    /// The provider does not expose the requested method or call shape.
    #[error("provider does not support `{0}`")]
    Unsupported(String),
    /// The provider answered with something that could not be decoded.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Build an error carrying a provider error code.
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// The error a wallet returns when the user denies a prompt.
    pub fn user_rejected() -> Self {
        Self::rpc(USER_REJECTED_CODE, "User rejected the request.")
    }

    /// Numeric error code, if the provider supplied one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether this is the user explicitly denying a permission prompt.
    pub fn is_user_rejection(&self) -> bool {
        self.code() == Some(USER_REJECTED_CODE)
    }
}

/// Contract interface descriptor errors.
#[derive(Debug, Error)]
pub enum AbiError {
    /// The descriptor is not valid ABI JSON.
    #[error("invalid ABI JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// The descriptor has no function with this name.
    #[error("ABI has no function named `{0}`")]
    UnknownFunction(String),
}
