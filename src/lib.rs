//! Frontend core for the EasyBake exchange.
//!
//! - [`config`] - navigation menu, Multicall deployments and wallet constants
//! - [`core`] - the injected-wallet [`ErcConnector`](core::ErcConnector) and ABI parsing
//! - [`models`] - menu, chain and connector notification types
//!
//! On `wasm32` the crate also exports a JS surface (see `bindings`).

#[cfg(target_arch = "wasm32")]
mod bindings;
pub mod config;
pub mod core;
pub mod models;
pub mod utils;
