//! Browser API helpers.
//!
//! Provides:
//! - [`dom::window`], [`dom::hostname`] - page access
//! - [`dom::insert_style_rule`] - idempotent `<style>` insertion
//! - [`dom::extension_base_url`] - packaged asset lookup via `runtime.getURL`

pub mod dom;
