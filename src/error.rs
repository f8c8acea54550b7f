//! Startup errors.
//!
//! Nothing here ever reaches the host page: [`crate::start`] logs these and
//! leaves the page untouched.

use rowglyph_core::{ConfigError, ProviderError};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Error)]
pub enum StartError {
    /// Not running inside a page (worker, detached frame)
    #[error("browser window or document not available")]
    NoDocument,
    /// Embedded provider or icon data is malformed
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Page-level observation could not be set up
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Render a thrown JavaScript value for an error message.
pub fn js_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}
