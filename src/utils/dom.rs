//! DOM and Web API utility functions.
//!
//! Provides safe, consistent access to browser APIs with proper error handling.

use js_sys::{Function, Object, Reflect};
use rowglyph_core::{ProviderError, ProviderResult};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, NodeList, Window};

use crate::error::js_message;

/// Get the browser window object.
#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Hostname of the current page (e.g. "dev.azure.com").
pub fn hostname() -> Option<String> {
    window()?.location().hostname().ok()
}

/// Collect the elements of a `NodeList`, in document order.
pub fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// First descendant of `scope` matching `selector`.
///
/// An invalid selector is treated like a miss.
pub fn find(scope: &Element, selector: &str) -> Option<Element> {
    scope.query_selector(selector).ok().flatten()
}

/// Computed value of a CSS property on the document body.
pub fn body_style(window: &Window, document: &Document, property: &str) -> Option<String> {
    let body = document.body()?;
    let style = window.get_computed_style(&body).ok()??;
    style.get_property_value(property).ok()
}

// =============================================================================
// Stylesheet
// =============================================================================

/// Append a `<style>` element carrying `rule`.
///
/// Skipped when an element with `id` already exists, e.g. when the content
/// script was injected twice into the same page.
pub fn insert_style_rule(document: &Document, id: &str, rule: &str) -> ProviderResult<()> {
    if document.get_element_by_id(id).is_some() {
        return Ok(());
    }

    let style = document
        .create_element("style")
        .map_err(|e| ProviderError::StyleInsertion(js_message(&e)))?;
    style.set_id(id);
    style.set_text_content(Some(rule));

    let parent: Element = match document.head() {
        Some(head) => head.into(),
        None => document
            .document_element()
            .ok_or(ProviderError::MissingDocument)?,
    };
    parent
        .append_child(&style)
        .map_err(|e| ProviderError::StyleInsertion(js_message(&e)))?;
    Ok(())
}

// =============================================================================
// Extension Runtime
// =============================================================================

/// Base URL of the extension's packaged files (e.g. `chrome-extension://<id>/`).
///
/// Looks up `browser.runtime.getURL`, then `chrome.runtime.getURL`. Returns
/// `None` outside an extension context.
pub fn extension_base_url() -> Option<String> {
    let global = js_sys::global();

    ["browser", "chrome"].iter().find_map(|namespace| {
        let runtime = Reflect::get(&global, &(*namespace).into())
            .ok()
            .and_then(|ns| ns.dyn_into::<Object>().ok())
            .and_then(|ns| Reflect::get(&ns, &"runtime".into()).ok())
            .and_then(|rt| rt.dyn_into::<Object>().ok())?;

        let get_url = Reflect::get(&runtime, &"getURL".into())
            .ok()?
            .dyn_into::<Function>()
            .ok()?;

        get_url
            .call1(&runtime, &JsValue::from_str(""))
            .ok()?
            .as_string()
    })
}

/// Join an extension base URL and a packaged asset path.
pub fn asset_url(base: Option<&str>, path: &str) -> String {
    match base {
        Some(base) if !base.is_empty() => {
            format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
        }
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_url_with_base() {
        assert_eq!(
            asset_url(Some("chrome-extension://abc/"), "icons/rust.svg"),
            "chrome-extension://abc/icons/rust.svg"
        );
        assert_eq!(
            asset_url(Some("moz-extension://abc"), "/icons/rust.svg"),
            "moz-extension://abc/icons/rust.svg"
        );
    }

    #[test]
    fn test_asset_url_without_base() {
        assert_eq!(asset_url(None, "icons/rust.svg"), "icons/rust.svg");
        assert_eq!(asset_url(Some(""), "icons/rust.svg"), "icons/rust.svg");
    }
}
