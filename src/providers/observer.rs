//! MutationObserver plumbing.
//!
//! Translates browser mutation records into [`ChangeRecord`]s and hands each
//! batch to a [`Resync`] handle, which decides whether a pass is due.

use rowglyph_core::config::ObserveOptions;
use rowglyph_core::{ChangeKind, ChangeRecord, ProviderError, ProviderResult, Resync};
use tracing::trace;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MutationObserver, MutationObserverInit, MutationRecord, Node};

use crate::error::js_message;

/// Callback type shared by every observer.
type Callback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

/// A live MutationObserver together with the closure it calls.
///
/// Dropping it disconnects the observer.
pub struct Observation {
    observer: MutationObserver,
    _callback: Callback,
}

impl Observation {
    /// Keep observing for the rest of the page session.
    pub fn forget(self) {
        std::mem::forget(self);
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Start observing `target`.
///
/// Records whose target lies inside an element matching `skip_within` are
/// dropped; a batch left empty is not delivered.
pub fn observe(
    target: &Node,
    options: ObserveOptions,
    skip_within: Option<&str>,
    resync: Resync,
) -> ProviderResult<Observation> {
    let skip_within = skip_within.map(str::to_string);
    let handler = move |records: js_sys::Array, _: MutationObserver| {
        let batch: Vec<ChangeRecord> = records
            .iter()
            .filter_map(|value| value.dyn_into::<MutationRecord>().ok())
            .filter(|record| match (&skip_within, record.target()) {
                (Some(selector), Some(node)) => !is_within(&node, selector),
                _ => true,
            })
            .filter_map(|record| to_change_record(&record))
            .collect();
        if batch.is_empty() {
            return;
        }
        trace!(records = batch.len(), "mutation batch");
        resync.notify(&batch);
    };
    let callback: Callback =
        Closure::wrap(Box::new(handler) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
        .map_err(|e| ProviderError::DomRejected(js_message(&e)))?;

    let init = MutationObserverInit::new();
    init.set_attributes(options.attributes);
    init.set_child_list(options.child_list);
    init.set_subtree(options.subtree);

    observer
        .observe_with_options(target, &init)
        .map_err(|e| ProviderError::DomRejected(js_message(&e)))?;

    Ok(Observation {
        observer,
        _callback: callback,
    })
}

/// Whether `node`, or the element holding it, is inside an element matching `selector`.
pub fn is_within(node: &Node, selector: &str) -> bool {
    let element = match node.dyn_ref::<Element>() {
        Some(element) => Some(element.clone()),
        None => node.parent_element(),
    };
    element.is_some_and(|element| element.closest(selector).ok().flatten().is_some())
}

/// Convert one browser record. Unknown record types are dropped.
pub fn to_change_record(record: &MutationRecord) -> Option<ChangeRecord> {
    let kind = change_kind(&record.type_(), record.attribute_name())?;
    let added = node_names(&record.added_nodes());
    let removed = record.removed_nodes().length() as usize;

    Some(ChangeRecord {
        kind,
        added,
        removed,
    })
}

/// Map a `MutationRecord.type` string onto a [`ChangeKind`].
pub fn change_kind(type_: &str, attribute_name: Option<String>) -> Option<ChangeKind> {
    match type_ {
        "childList" => Some(ChangeKind::ChildList),
        "attributes" => Some(ChangeKind::Attributes {
            name: attribute_name,
        }),
        "characterData" => Some(ChangeKind::CharacterData),
        _ => None,
    }
}

fn node_names(list: &web_sys::NodeList) -> Vec<String> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .map(|node| node.node_name())
        .collect()
}
