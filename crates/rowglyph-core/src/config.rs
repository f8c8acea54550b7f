//! Declarative provider data.
//!
//! Everything site-specific that is plain data (selectors, class names, the
//! light-theme text color) lives in a TOML catalog with one `[[provider]]`
//! table per host. Browser adapters are built from these descriptions.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::Classification;

/// Default marker class that suppresses the host's `::before` icon.
pub const DEFAULT_HIDE_CLASS: &str = "hide-pseudo";

// =============================================================================
// Catalog
// =============================================================================

/// All known providers.
#[derive(Clone, Debug, Deserialize)]
pub struct ProviderCatalog {
    #[serde(rename = "provider", default)]
    pub providers: Vec<ProviderConfig>,
}

impl ProviderCatalog {
    /// Parse and validate a catalog.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let catalog: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (i, provider) in self.providers.iter().enumerate() {
            provider.validate()?;

            let duplicate = self.providers[..i]
                .iter()
                .any(|other| other.domain.eq_ignore_ascii_case(&provider.domain));
            if duplicate {
                return Err(ConfigError::Invalid(format!(
                    "duplicate provider domain '{}'",
                    provider.domain
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Provider Description
// =============================================================================

/// One host site.
#[derive(Clone, Debug, Deserialize)]
pub struct ProviderConfig {
    /// Human-readable name for logs
    pub name: String,
    /// Host domain (subdomains match too)
    pub domain: String,
    pub selectors: Selectors,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub classes: ClassRules,
    /// Class added to the host icon element to hide its pseudo-element icon
    #[serde(default = "default_hide_class")]
    pub hide_class: String,
    /// CSS length applied to the injected icon's width and height
    #[serde(default = "default_icon_size")]
    pub icon_size: String,
    #[serde(default)]
    pub observe: ObserveOptions,
}

fn default_hide_class() -> String {
    DEFAULT_HIDE_CLASS.to_string()
}

fn default_icon_size() -> String {
    "1rem".to_string()
}

impl ProviderConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |what: &str| {
            Err(ConfigError::Invalid(format!(
                "provider '{}': {}",
                self.name, what
            )))
        };

        if self.domain.trim().is_empty() {
            return invalid("empty domain");
        }
        for (field, value) in [
            ("selectors.row", &self.selectors.row),
            ("selectors.filename", &self.selectors.filename),
            ("selectors.icon", &self.selectors.icon),
        ] {
            if value.trim().is_empty() {
                return invalid(&format!("empty {}", field));
            }
        }
        if !is_css_identifier(&self.hide_class) {
            return invalid("hide_class is not a CSS identifier");
        }
        Ok(())
    }

    /// The one-time global rule hiding the host's pseudo-element icon.
    pub fn hide_rule(&self) -> String {
        format!(".{}::before {{ display: none !important }}", self.hide_class)
    }
}

/// Selectors for locating row parts.
///
/// `row` is evaluated against the root; `filename` and `icon` are evaluated
/// within each row.
#[derive(Clone, Debug, Deserialize)]
pub struct Selectors {
    pub row: String,
    pub filename: String,
    pub icon: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ThemeConfig {
    /// Exact computed body text color of the light theme
    pub light_text_color: Option<String>,
}

/// Classification predicates expressed as "icon element has any of these classes".
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClassRules {
    #[serde(default)]
    pub directory: Vec<String>,
    #[serde(default)]
    pub submodule: Vec<String>,
    #[serde(default)]
    pub symlink: Vec<String>,
}

impl ClassRules {
    /// Evaluate the predicates against a class membership test.
    pub fn classify(&self, has_class: impl Fn(&str) -> bool) -> Classification {
        let any = |classes: &[String]| classes.iter().any(|c| has_class(c.as_str()));
        Classification {
            is_directory: any(&self.directory),
            is_submodule: any(&self.submodule),
            is_symlink: any(&self.symlink),
        }
    }
}

/// Mutation observation scope for each row.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ObserveOptions {
    #[serde(default = "enabled")]
    pub attributes: bool,
    #[serde(default = "enabled")]
    pub child_list: bool,
    #[serde(default = "enabled")]
    pub subtree: bool,
}

fn enabled() -> bool {
    true
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            attributes: true,
            child_list: true,
            subtree: true,
        }
    }
}

/// Letters, digits, `-` and `_`, not starting with a digit.
fn is_css_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '-' || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
        [[provider]]
        name = "Azure DevOps"
        domain = "dev.azure.com"
        classes.directory = ["repos-folder-icon"]
        classes.symlink = ["ms-Icon--PageArrowRight"]

        [provider.selectors]
        row = "table.bolt-table tbody > a"
        filename = "td[aria-colindex=\"1\"] span.text-ellipsis"
        icon = "td[aria-colindex=\"1\"] span.icon-margin"

        [provider.theme]
        light_text_color = "rgba(0, 0, 0, 0.9)"
    "#;

    #[test]
    fn test_parse_catalog() {
        let catalog = ProviderCatalog::from_toml(CATALOG).unwrap();
        assert_eq!(catalog.providers.len(), 1);

        let azure = &catalog.providers[0];
        assert_eq!(azure.domain, "dev.azure.com");
        assert_eq!(azure.hide_class, DEFAULT_HIDE_CLASS);
        assert_eq!(azure.icon_size, "1rem");
        assert!(azure.classes.submodule.is_empty());
        assert!(azure.observe.attributes && azure.observe.child_list && azure.observe.subtree);
        assert_eq!(
            azure.theme.light_text_color.as_deref(),
            Some("rgba(0, 0, 0, 0.9)")
        );
    }

    #[test]
    fn test_hide_rule() {
        let catalog = ProviderCatalog::from_toml(CATALOG).unwrap();
        assert_eq!(
            catalog.providers[0].hide_rule(),
            ".hide-pseudo::before { display: none !important }"
        );
    }

    #[test]
    fn test_class_rules() {
        let catalog = ProviderCatalog::from_toml(CATALOG).unwrap();
        let rules = &catalog.providers[0].classes;

        let folder = rules.classify(|c| c == "repos-folder-icon");
        assert!(folder.is_directory && !folder.is_symlink);

        let link = rules.classify(|c| c == "ms-Icon--PageArrowRight");
        assert!(link.is_symlink && !link.is_directory);

        assert_eq!(rules.classify(|_| false), Classification::default());
    }

    #[test]
    fn test_rejects_duplicate_domain() {
        let doubled = format!("{}\n{}", CATALOG, CATALOG);
        assert!(matches!(
            ProviderCatalog::from_toml(&doubled),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_empty_selector() {
        let broken = CATALOG.replace("row = \"table.bolt-table tbody > a\"", "row = \"\"");
        assert!(matches!(
            ProviderCatalog::from_toml(&broken),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_bad_hide_class() {
        let broken = CATALOG.replace(
            "name = \"Azure DevOps\"",
            "name = \"Azure DevOps\"\n        hide_class = \"a b\"",
        );
        assert!(matches!(
            ProviderCatalog::from_toml(&broken),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_missing_selectors() {
        assert!(matches!(
            ProviderCatalog::from_toml("[[provider]]\nname = \"x\"\ndomain = \"x.com\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_css_identifier() {
        assert!(is_css_identifier("hide-pseudo"));
        assert!(is_css_identifier("_x1"));
        assert!(!is_css_identifier(""));
        assert!(!is_css_identifier("1abc"));
        assert!(!is_css_identifier("a.b"));
    }
}
