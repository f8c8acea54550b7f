//! DOM-agnostic engine for overlaying file-type icons on repository listings.
//!
//! Provides:
//! - [`Provider`] - the contract each host-site adapter implements
//! - [`Synchronizer`] - scans rows, classifies them and injects icons, and
//!   re-runs when the host page mutates
//! - [`Session`], [`MutationGate`], [`StyleOnce`] - per-page-session state that
//!   breaks the observer feedback loop and keeps one-time CSS single
//! - [`IconResolver`], [`IconTable`] - icon lookup by name, kind and theme
//! - [`ProviderCatalog`] - declarative per-site selector data

pub mod config;
pub mod error;
pub mod gate;
pub mod icons;
mod model;
pub mod provider;
mod session;
mod style;
pub mod sync;
pub mod theme;

pub use config::{ProviderCatalog, ProviderConfig};
pub use error::{ConfigError, ProviderError, ProviderResult};
pub use gate::{ChangeKind, ChangeRecord, GateState, MutationGate, is_self_caused};
pub use icons::{IconResolver, IconTable};
pub use model::{Classification, IconHandle, RowKind, Theme};
pub use provider::{Provider, domain_matches, select_by_domain, select_provider};
pub use session::Session;
pub use style::StyleOnce;
pub use sync::{PassReport, Resync, SkipReason, SkippedRow, Synchronizer};
pub use theme::theme_from_text_color;
