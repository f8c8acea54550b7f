//! The contract every site adapter satisfies, and domain-based selection.

use tracing::debug;

use crate::error::ProviderResult;
use crate::model::{Classification, IconHandle, Theme};
use crate::sync::Resync;

/// Node name of injected icon elements unless a provider says otherwise.
pub const DEFAULT_ICON_NODE: &str = "IMG";

/// Site-specific adapter.
///
/// A provider holds no cross-row state of its own; everything that must live
/// for the page session is kept on the [`Session`](crate::Session) reachable
/// through the [`Resync`] handle.
pub trait Provider {
    /// Scope rows are located under (a document or container element).
    type Root;
    /// Handle to one listing row. Equality is node identity.
    type Row: Clone + PartialEq;

    /// Host domain this provider serves (e.g. "dev.azure.com").
    fn domain(&self) -> &str;

    /// Query the live DOM for candidate rows, in document order.
    fn locate_rows(&self, root: &Self::Root) -> ProviderResult<Vec<Self::Row>>;

    /// Display name of the entry, or `None` for a malformed row.
    fn filename(&self, row: &Self::Row) -> Option<String>;

    /// Read the classification predicates off the row's type indicator.
    ///
    /// Must not mutate the DOM. A missing indicator yields all-false.
    fn classify(&self, row: &Self::Row) -> Classification;

    /// Current page theme. Called once per pass.
    fn detect_theme(&self) -> Theme;

    /// Whether the row already shows `icon` with the host icon hidden.
    ///
    /// Both halves of an injection count: the icon URL and the hide marker.
    /// A host re-render that drops either makes the row stale again.
    fn is_rendered(&self, _row: &Self::Row, _icon: &IconHandle) -> bool {
        false
    }

    /// Overlay `icon` onto the row.
    fn inject_icon(&self, row: &Self::Row, icon: &IconHandle) -> ProviderResult<()>;

    /// First sighting of a row: start observing it and make sure the
    /// one-time style rule exists.
    fn on_row_observed(&self, row: &Self::Row, resync: &Resync) -> ProviderResult<()>;

    /// A previously observed row is no longer located: stop observing it.
    fn on_row_released(&self, _row: &Self::Row) {}

    /// Node name of injected icon elements, as mutation records report it.
    fn icon_node_name(&self) -> &str {
        DEFAULT_ICON_NODE
    }
}

/// Whether `hostname` is `domain` or one of its subdomains.
pub fn domain_matches(hostname: &str, domain: &str) -> bool {
    let host = hostname.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();

    if domain.is_empty() {
        return false;
    }

    host == domain || host.ends_with(&format!(".{}", domain))
}

/// Pick the single item whose domain matches `hostname`.
///
/// Returns `None` when nothing matches or when the match is ambiguous.
pub fn select_by_domain<'a, T>(
    hostname: &str,
    items: &'a [T],
    domain_of: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    let mut matches = items
        .iter()
        .filter(|item| domain_matches(hostname, domain_of(item)));

    let first = matches.next()?;
    if matches.next().is_some() {
        debug!(hostname, "more than one provider matches, staying inert");
        return None;
    }
    Some(first)
}

/// Pick the provider serving `hostname`.
pub fn select_provider<'a, P: Provider>(hostname: &str, providers: &'a [P]) -> Option<&'a P> {
    select_by_domain(hostname, providers, |p| p.domain())
}
