//! Extension configuration.
//!
//! Centralizes the constants used by the browser adapter.
//! Data assets are loaded at compile time using `include_str!`.

// =============================================================================
// Data Assets (loaded at compile time)
// =============================================================================

/// Provider catalog: selectors and class names per host site.
pub const PROVIDER_CATALOG: &str = include_str!("../assets/providers.toml");

// =============================================================================
// Logging
// =============================================================================

/// `tracing` filter directive applied to console output.
pub const LOG_DIRECTIVE: &str = "rowglyph=info,rowglyph_core=info";

/// Directive used when [`LOG_DIRECTIVE`] fails to parse.
pub const FALLBACK_LOG_DIRECTIVE: &str = "warn";

// =============================================================================
// DOM Markers
// =============================================================================

/// Attribute carrying the icon name on injected `<img>` elements.
pub const ICON_ATTR: &str = "data-rowglyph-icon";

/// Id of the `<style>` element holding the one-time hide rule.
pub const STYLE_ELEMENT_ID: &str = "rowglyph-style";

/// Computed style property used as the theme proxy.
pub const THEME_PROPERTY: &str = "color";

// =============================================================================
// Page-Level Observation
// =============================================================================

/// Watch the whole body for rows being inserted or removed.
///
/// Row-level observers (set up per row by the provider) add attribute
/// tracking; this one only needs structure.
pub mod body_observer {
    pub const ATTRIBUTES: bool = false;
    pub const CHILD_LIST: bool = true;
    pub const SUBTREE: bool = true;
}
