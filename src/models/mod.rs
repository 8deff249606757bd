//! Data models and types for the application.
//!
//! Contains domain types for:
//! - [`MenuEntry`], [`MenuStatus`] - Navigation menu tree
//! - [`ChainId`], [`ChainIdValue`] - Deployment networks and wallet-reported chain ids
//! - [`ConnectorUpdate`], [`ConnectorEvent`] - Wallet connector notifications

mod chain;
mod connector;
mod menu;

pub use chain::{ChainId, ChainIdValue};
pub use connector::{ConnectorEvent, ConnectorUpdate};
pub use menu::{MenuEntry, MenuStatus};
