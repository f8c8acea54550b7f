//! Browser content script: overlays file-type icons on repository listings.
//!
//! The synchronization engine lives in `rowglyph-core`; this crate wires it
//! to the live DOM through a catalog-driven [`providers::SelectorProvider`].

mod config;
mod error;
pub mod logging;
pub mod providers;
mod utils;

use std::rc::Rc;

use rowglyph_core::config::ObserveOptions;
use rowglyph_core::{IconTable, ProviderConfig, Session, Synchronizer};
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

pub use error::StartError;
pub use providers::SelectorProvider;
use utils::dom;

/// Module entry point, run once per page load.
///
/// Never throws: any failure is logged and the page is left as it was.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logging::init(config::LOG_DIRECTIVE);

    if let Err(err) = run() {
        warn!(error = %err, "rowglyph disabled on this page");
    }
}

fn run() -> Result<(), StartError> {
    let window = dom::window().ok_or(StartError::NoDocument)?;
    let document = window.document().ok_or(StartError::NoDocument)?;
    let hostname = dom::hostname().unwrap_or_default();

    let catalog = providers::catalog()?;
    let Some(provider_config) = providers::for_hostname(&catalog, &hostname) else {
        debug!(%hostname, "no provider for host");
        return Ok(());
    };

    info!(provider = %provider_config.name, %hostname, "provider selected");
    attach(provider_config.clone(), window, document)?;
    Ok(())
}

/// Run the engine for one provider on `document`.
///
/// The returned synchronizer is also kept alive for the page session, so
/// dropping the handle does not stop observation.
pub fn attach(
    provider_config: ProviderConfig,
    window: Window,
    document: Document,
) -> Result<Rc<Synchronizer<SelectorProvider, IconTable>>, StartError> {
    let base = dom::extension_base_url();
    let icons = IconTable::bundled()?
        .with_asset_url(move |path| dom::asset_url(base.as_deref(), path));

    let row_selector = provider_config.selectors.row.clone();
    let body = document.body();
    let provider = SelectorProvider::new(provider_config, window, document.clone());
    let sync = Synchronizer::new(provider, icons, document, Rc::new(Session::new()));

    // Observers only hold weak handles.
    std::mem::forget(Rc::clone(&sync));

    let report = sync.synchronize();
    info!(
        located = report.located,
        injected = report.injected,
        skipped = report.skipped.len(),
        theme = %report.theme,
        "initial pass"
    );

    // Rows rendered after load (client-side navigation, lazy lists). Changes
    // inside rows are left to the row observers.
    if let Some(body) = body {
        let options = ObserveOptions {
            attributes: config::body_observer::ATTRIBUTES,
            child_list: config::body_observer::CHILD_LIST,
            subtree: config::body_observer::SUBTREE,
        };
        providers::observer::observe(&body, options, Some(&row_selector), sync.resync())?
            .forget();
    }

    Ok(sync)
}
