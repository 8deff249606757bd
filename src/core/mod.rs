//! Core logic for the exchange frontend.
//!
//! This module provides:
//! - [`ErcConnector`] wallet lifecycle over any [`Provider`]
//! - `InjectedProvider` for the wallet injected into the page (wasm32 only)
//! - [`ContractInterface`] parsing of contract ABI descriptors

pub mod abi;
mod connector;
pub mod error;
#[cfg(target_arch = "wasm32")]
mod injected;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod provider;
mod strategy;

pub use abi::{AbiFunction, ContractInterface, multicall_abi};
pub use connector::{ConnectorArguments, Detector, ErcConnector, EventSink, translate_event};
pub use error::{AbiError, ConnectorError, ProviderError};
#[cfg(target_arch = "wasm32")]
pub use injected::InjectedProvider;
pub use provider::{Provider, ProviderEvent, ProviderHandle, parse_send_return};
