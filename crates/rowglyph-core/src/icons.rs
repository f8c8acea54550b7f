//! Icon resolution.
//!
//! [`IconResolver`] is the seam the synchronizer consumes. [`IconTable`] is the
//! bundled implementation: a lookup table (embedded JSON) from file names,
//! extensions and folder names to icon identifiers.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::{IconHandle, RowKind, Theme};

/// Bundled icon table.
pub const DEFAULT_ICON_TABLE: &str = include_str!("../assets/icons.json");

/// Directory holding the icon assets, relative to the extension root.
pub const ICON_ASSET_DIR: &str = "icons";

/// Suffix of light-theme icon variants.
const LIGHT_SUFFIX: &str = "_light";

/// Maps a row to the icon it should display.
///
/// Must be total: unknown names resolve to a default icon.
pub trait IconResolver {
    fn resolve(&self, filename: &str, kind: RowKind, theme: Theme) -> IconHandle;
}

// =============================================================================
// Table Data
// =============================================================================

/// Fallback icons per row kind.
#[derive(Clone, Debug, Deserialize)]
pub struct DefaultIcons {
    pub file: String,
    pub folder: String,
    pub symlink: String,
    pub submodule: String,
}

/// Raw table as stored in `icons.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct IconTableData {
    pub defaults: DefaultIcons,
    /// Icons that ship a `_light` variant
    #[serde(default)]
    pub light_variants: Vec<String>,
    /// Exact file name (lowercase) -> icon
    #[serde(default)]
    pub file_names: HashMap<String, String>,
    /// Extension without leading dot (lowercase, may be compound like "tar.gz") -> icon
    #[serde(default)]
    pub file_extensions: HashMap<String, String>,
    /// Exact folder name (lowercase) -> icon
    #[serde(default)]
    pub folder_names: HashMap<String, String>,
}

// =============================================================================
// IconTable
// =============================================================================

/// Table-driven [`IconResolver`].
///
/// Lookup order for files: exact name, then the longest matching extension,
/// then the file default. Folders: exact name, then the folder default.
pub struct IconTable {
    data: IconTableData,
    light_variants: HashSet<String>,
    asset_url: Box<dyn Fn(&str) -> String>,
}

impl IconTable {
    /// Parse a table from JSON. Asset paths are used as URLs unchanged.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let data: IconTableData =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_data(data)
    }

    /// The bundled table.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_json(DEFAULT_ICON_TABLE)
    }

    pub fn from_data(data: IconTableData) -> Result<Self, ConfigError> {
        let defaults = &data.defaults;
        for (kind, name) in [
            ("file", &defaults.file),
            ("folder", &defaults.folder),
            ("symlink", &defaults.symlink),
            ("submodule", &defaults.submodule),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("empty default {} icon", kind)));
            }
        }

        let light_variants = data.light_variants.iter().cloned().collect();
        Ok(Self {
            data,
            light_variants,
            asset_url: Box::new(|path: &str| path.to_string()),
        })
    }

    /// Turn asset paths (e.g. `icons/rust.svg`) into loadable URLs.
    pub fn with_asset_url(mut self, asset_url: impl Fn(&str) -> String + 'static) -> Self {
        self.asset_url = Box::new(asset_url);
        self
    }

    /// Icon identifier for a row, ignoring theme.
    pub fn icon_name(&self, filename: &str, kind: RowKind) -> &str {
        let lower = filename.to_lowercase();
        let defaults = &self.data.defaults;

        match kind {
            RowKind::Directory => self
                .data
                .folder_names
                .get(&lower)
                .unwrap_or(&defaults.folder),
            RowKind::Submodule => &defaults.submodule,
            RowKind::Symlink => &defaults.symlink,
            RowKind::File => self
                .data
                .file_names
                .get(&lower)
                .or_else(|| self.by_extension(&lower))
                .unwrap_or(&defaults.file),
        }
    }

    /// Longest extension match: "archive.tar.gz" tries "tar.gz" before "gz".
    fn by_extension(&self, lower: &str) -> Option<&String> {
        // Leading dot belongs to the name (".gitignore" has no extension).
        let name = lower.strip_prefix('.').unwrap_or(lower);
        name.match_indices('.')
            .map(|(i, _)| &name[i + 1..])
            .find_map(|ext| self.data.file_extensions.get(ext))
    }

    fn asset_path(&self, name: &str, theme: Theme) -> String {
        if theme == Theme::Light && self.light_variants.contains(name) {
            format!("{}/{}{}.svg", ICON_ASSET_DIR, name, LIGHT_SUFFIX)
        } else {
            format!("{}/{}.svg", ICON_ASSET_DIR, name)
        }
    }
}

impl IconResolver for IconTable {
    fn resolve(&self, filename: &str, kind: RowKind, theme: Theme) -> IconHandle {
        let name = self.icon_name(filename, kind);
        let url = (self.asset_url)(&self.asset_path(name, theme));
        IconHandle::new(name, url)
    }
}

impl fmt::Debug for IconTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IconTable")
            .field("file_names", &self.data.file_names.len())
            .field("file_extensions", &self.data.file_extensions.len())
            .field("folder_names", &self.data.folder_names.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> IconTable {
        IconTable::bundled().expect("bundled table parses")
    }

    #[test]
    fn test_exact_name_beats_extension() {
        let table = table();
        assert_eq!(table.icon_name("Cargo.toml", RowKind::File), "cargo");
        assert_eq!(table.icon_name("other.toml", RowKind::File), "toml");
    }

    #[test]
    fn test_longest_extension_wins() {
        let table = table();
        assert_eq!(table.icon_name("bundle.tar.gz", RowKind::File), "zip");
        assert_eq!(table.icon_name("types.d.ts", RowKind::File), "typescript-def");
        assert_eq!(table.icon_name("main.ts", RowKind::File), "typescript");
    }

    #[test]
    fn test_dotfile_without_extension() {
        let table = table();
        assert_eq!(table.icon_name(".gitignore", RowKind::File), "git");
        assert_eq!(table.icon_name(".unknownrc", RowKind::File), "file");
    }

    #[test]
    fn test_unknown_falls_back() {
        let table = table();
        assert_eq!(table.icon_name("mystery.qqq", RowKind::File), "file");
        assert_eq!(table.icon_name("Makefile2", RowKind::File), "file");
        assert_eq!(table.icon_name("stuff", RowKind::Directory), "folder");
    }

    #[test]
    fn test_kind_specific_icons() {
        let table = table();
        assert_eq!(table.icon_name("src", RowKind::Directory), "folder-src");
        assert_eq!(table.icon_name("main.rs", RowKind::Symlink), "file-symlink");
        assert_eq!(table.icon_name("vendor", RowKind::Submodule), "folder-git");
        // Folder names do not leak into file lookup.
        assert_eq!(table.icon_name("src", RowKind::File), "file");
    }

    #[test]
    fn test_theme_selects_variant() {
        let table = table();
        let dark = table.resolve("README.md", RowKind::File, Theme::Dark);
        let light = table.resolve("README.md", RowKind::File, Theme::Light);
        assert_eq!(dark.name, light.name);
        assert_eq!(dark.url, "icons/readme.svg");
        assert_eq!(light.url, "icons/readme_light.svg");
    }

    #[test]
    fn test_theme_without_variant() {
        let table = table();
        let dark = table.resolve("lib.rs", RowKind::File, Theme::Dark);
        let light = table.resolve("lib.rs", RowKind::File, Theme::Light);
        assert_eq!(dark.url, light.url);
    }

    #[test]
    fn test_asset_url_mapper() {
        let table = table().with_asset_url(|path| format!("chrome-extension://abc/{}", path));
        let icon = table.resolve("lib.rs", RowKind::File, Theme::Dark);
        assert_eq!(icon.url, "chrome-extension://abc/icons/rust.svg");
    }

    #[test]
    fn test_rejects_empty_default() {
        let json = r#"{"defaults": {"file": "", "folder": "folder", "symlink": "s", "submodule": "g"}}"#;
        assert!(matches!(
            IconTable::from_json(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            IconTable::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
