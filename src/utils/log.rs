//! Warning output for non-fatal provider failures.
//!
//! In the browser warnings go to the devtools console; natively (tests and
//! the CLI) they go through `tracing`.

/// Emit a warning line.
pub fn console_warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&message.into());

    #[cfg(not(target_arch = "wasm32"))]
    tracing::warn!(target: "easybake::connector", "{}", message);
}

macro_rules! log_warn {
    ($($t:tt)*) => {
        $crate::utils::log::console_warn(&format!($($t)*))
    };
}

pub(crate) use log_warn;
