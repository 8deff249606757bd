//! Injected wallet provider capability.
//!
//! Wallets inject objects that disagree on call shapes: some answer
//! `send(method)` with a promise, older ones answer `send({ method })`
//! synchronously, some only know `enable()`, and responses come back either
//! bare or wrapped in a `{ result }` envelope. [`Provider`] is the surface the
//! connector probes; values cross it as [`serde_json::Value`].

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::error::ProviderError;

/// Shared handle to a provider owned by the host page.
pub type ProviderHandle = Rc<dyn Provider>;

/// Callback invoked with the payload of a provider event.
pub type Listener = Rc<dyn Fn(Value)>;

/// Identifies one listener registration on a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Events the connector subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderEvent {
    ChainChanged,
    AccountsChanged,
    Close,
    NetworkChanged,
}

impl ProviderEvent {
    /// Registration order used by the connector.
    pub const ALL: [Self; 4] = [
        Self::ChainChanged,
        Self::AccountsChanged,
        Self::Close,
        Self::NetworkChanged,
    ];

    /// Event name as emitted by the provider.
    pub fn name(self) -> &'static str {
        match self {
            Self::ChainChanged => "chainChanged",
            Self::AccountsChanged => "accountsChanged",
            Self::Close => "close",
            Self::NetworkChanged => "networkChanged",
        }
    }
}

impl fmt::Display for ProviderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capabilities of an injected wallet, probed defensively.
#[async_trait(?Send)]
pub trait Provider {
    /// Promise-returning `send(method)`.
    async fn send(&self, method: &str) -> Result<Value, ProviderError>;

    /// Legacy synchronous `send({ method })`.
    fn send_legacy(&self, method: &str) -> Result<Value, ProviderError>;

    /// Legacy `enable()` permission request.
    async fn enable(&self) -> Result<Value, ProviderError>;

    /// Whether the provider exposes `on`.
    fn supports_events(&self) -> bool;

    /// Whether the provider exposes `removeListener`.
    fn supports_listener_removal(&self) -> bool;

    fn on(&self, event: ProviderEvent, listener: Listener) -> Result<ListenerId, ProviderError>;

    fn remove_listener(&self, event: ProviderEvent, id: ListenerId) -> Result<(), ProviderError>;

    /// Read a plain property, `None` when absent or undecodable.
    fn property(&self, name: &str) -> Option<Value>;

    fn set_property(&self, name: &str, value: Value) -> Result<(), ProviderError>;

    /// Read a vendor flag such as `isMetaMask`.
    fn flag(&self, name: &str) -> bool {
        self.property(name).is_some_and(|value| !is_empty_value(&value))
    }
}

/// Unwrap a `{ result }` envelope, leaving bare responses untouched.
pub fn parse_send_return(value: Value) -> Value {
    match value {
        Value::Object(mut envelope) if envelope.contains_key("result") => {
            envelope.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Whether a value counts as "nothing came back".
///
/// Mirrors the falsy values wallets use for missing data: `null`, `false`,
/// `0` and the empty string.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// First account of an accounts response, in either envelope shape.
pub fn first_account(response: Value) -> Option<String> {
    match parse_send_return(response) {
        Value::Array(accounts) => accounts
            .into_iter()
            .next()
            .and_then(|account| account.as_str().map(str::to_string))
            .filter(|account| !account.is_empty()),
        _ => None,
    }
}
