//! Utility modules for web interop, logging and link handling.
//!
//! Provides:
//! - [`classify_link`], [`validate_link`] - Navigation link checks
//! - `log_warn!` - Non-fatal warnings routed to the console or `tracing`

#[cfg(target_arch = "wasm32")]
pub mod dom;
pub(crate) mod log;
mod url;

pub use url::{LinkTarget, LinkValidationError, classify_link, validate_link};
