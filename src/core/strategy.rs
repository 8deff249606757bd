//! Ordered fallback strategies over inconsistent provider APIs.
//!
//! Each strategy is one way of asking a wallet for a value. Strategies run
//! strictly in order and the first one that yields a non-empty value wins;
//! failures are logged and swallowed.

use std::fmt;

use serde_json::Value;

use crate::config::STATIC_CHAIN_ID_PROPERTIES;
use crate::core::error::ProviderError;
use crate::core::provider::{Provider, first_account, is_empty_value, parse_send_return};
use crate::models::ChainIdValue;
use crate::utils::log::log_warn;

/// One way of obtaining a value from a provider.
pub(crate) trait Strategy: Copy + fmt::Display {
    type Output;

    /// `Ok(None)` means the call worked but returned nothing useful.
    async fn attempt(self, provider: &dyn Provider) -> Result<Option<Self::Output>, ProviderError>;
}

/// Run `strategies` in order, returning the first non-empty result.
pub(crate) async fn first_success<S: Strategy>(
    strategies: &[S],
    provider: &dyn Provider,
) -> Option<S::Output> {
    for (index, strategy) in strategies.iter().copied().enumerate() {
        let reason = match strategy.attempt(provider).await {
            Ok(Some(output)) => return Some(output),
            Ok(None) => "returned nothing".to_string(),
            Err(err) => err.to_string(),
        };
        match strategies.get(index + 1) {
            Some(next) => log_warn!("{} was unsuccessful ({}), falling back to {}", strategy, reason, next),
            None => log_warn!("{} was unsuccessful ({})", strategy, reason),
        }
    }
    None
}

// ============================================================================
// Chain ID
// ============================================================================

/// Ways of reading the current network from a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ChainIdStrategy {
    /// `send("eth_chainId")`
    ChainIdQuery,
    /// `send("net_version")`
    NetVersion,
    /// Legacy `send({ method: "net_version" })`
    LegacyNetVersion,
    /// Cached vendor results or static properties on the provider object
    StaticProperties,
}

impl ChainIdStrategy {
    pub const ORDER: [Self; 4] = [
        Self::ChainIdQuery,
        Self::NetVersion,
        Self::LegacyNetVersion,
        Self::StaticProperties,
    ];
}

impl fmt::Display for ChainIdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ChainIdQuery => "eth_chainId",
            Self::NetVersion => "net_version",
            Self::LegacyNetVersion => "net_version v2",
            Self::StaticProperties => "static properties",
        })
    }
}

impl Strategy for ChainIdStrategy {
    type Output = ChainIdValue;

    async fn attempt(self, provider: &dyn Provider) -> Result<Option<ChainIdValue>, ProviderError> {
        let value = match self {
            Self::ChainIdQuery => provider.send("eth_chainId").await?,
            Self::NetVersion => provider.send("net_version").await?,
            Self::LegacyNetVersion => provider.send_legacy("net_version")?,
            Self::StaticProperties => static_chain_id(provider),
        };
        Ok(ChainIdValue::from_json(&parse_send_return(value)))
    }
}

/// Dapper keeps RPC answers in `cachedResults`; other wallets expose the id
/// under one of several property names.
fn static_chain_id(provider: &dyn Provider) -> Value {
    if provider.flag("isDapper") {
        return provider
            .property("cachedResults")
            .and_then(|cached| cached.get("net_version").cloned())
            .unwrap_or(Value::Null);
    }

    STATIC_CHAIN_ID_PROPERTIES
        .iter()
        .filter_map(|name| provider.property(name))
        .find(|value| !is_empty_value(value))
        .unwrap_or(Value::Null)
}

// ============================================================================
// Accounts
// ============================================================================

/// Ways of reading the connected account without prompting twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AccountStrategy {
    /// `send("eth_accounts")`
    AccountsQuery,
    /// Legacy `enable()`
    Enable,
    /// Legacy `send({ method: "eth_accounts" })`
    LegacyAccounts,
}

impl AccountStrategy {
    pub const ORDER: [Self; 3] = [Self::AccountsQuery, Self::Enable, Self::LegacyAccounts];
}

impl fmt::Display for AccountStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AccountsQuery => "eth_accounts",
            Self::Enable => "enable",
            Self::LegacyAccounts => "eth_accounts v2",
        })
    }
}

impl Strategy for AccountStrategy {
    type Output = String;

    async fn attempt(self, provider: &dyn Provider) -> Result<Option<String>, ProviderError> {
        let response = match self {
            Self::AccountsQuery => provider.send("eth_accounts").await?,
            Self::Enable => provider.enable().await?,
            Self::LegacyAccounts => provider.send_legacy("eth_accounts")?,
        };
        Ok(first_account(response))
    }
}
