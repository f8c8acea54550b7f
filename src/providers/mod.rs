//! Site adapters.
//!
//! Every supported host is described by an entry in the embedded provider
//! catalog and served by the same [`SelectorProvider`].

pub mod observer;
mod selector;

pub use selector::SelectorProvider;

use rowglyph_core::{ConfigError, ProviderCatalog, ProviderConfig, select_by_domain};

use crate::config::PROVIDER_CATALOG;

/// Parse the embedded provider catalog.
pub fn catalog() -> Result<ProviderCatalog, ConfigError> {
    ProviderCatalog::from_toml(PROVIDER_CATALOG)
}

/// The single catalog entry serving `hostname`, if any.
pub fn for_hostname<'a>(catalog: &'a ProviderCatalog, hostname: &str) -> Option<&'a ProviderConfig> {
    select_by_domain(hostname, &catalog.providers, |config| config.domain.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_parses() {
        let catalog = catalog().unwrap();
        assert!(!catalog.providers.is_empty());
    }

    #[test]
    fn test_azure_devops_selected() {
        let catalog = catalog().unwrap();
        let config = for_hostname(&catalog, "dev.azure.com").unwrap();
        assert_eq!(config.hide_class, "hide-pseudo");
        assert_eq!(config.theme.light_text_color.as_deref(), Some("rgba(0, 0, 0, 0.9)"));
        assert!(config.observe.attributes && config.observe.child_list && config.observe.subtree);
    }

    #[test]
    fn test_unknown_host_is_inert() {
        let catalog = catalog().unwrap();
        assert!(for_hostname(&catalog, "example.org").is_none());
        assert!(for_hostname(&catalog, "azure.com").is_none());
    }
}
