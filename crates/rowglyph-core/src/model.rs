//! Domain types shared by providers, the icon resolver and the synchronizer.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Row Classification
// =============================================================================

/// What a listing row points at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// Regular file (the fallback when nothing else matches)
    #[default]
    File,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
    /// Git submodule
    Submodule,
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
            Self::Symlink => write!(f, "symlink"),
            Self::Submodule => write!(f, "submodule"),
        }
    }
}

/// Raw predicate results read from a row's type-indicator element.
///
/// More than one flag may be set when a host page decorates its icons
/// ambiguously; [`Classification::kind`] resolves that.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub is_directory: bool,
    pub is_submodule: bool,
    pub is_symlink: bool,
}

impl Classification {
    /// Collapse the flags into a single kind.
    ///
    /// Precedence: Directory > Submodule > Symlink > File.
    pub fn kind(&self) -> RowKind {
        if self.is_directory {
            RowKind::Directory
        } else if self.is_submodule {
            RowKind::Submodule
        } else if self.is_symlink {
            RowKind::Symlink
        } else {
            RowKind::File
        }
    }
}

// =============================================================================
// Theme
// =============================================================================

/// Color theme of the host page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background
    Light,
    /// Dark background (default when detection fails)
    #[default]
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

// =============================================================================
// Icon Handle
// =============================================================================

/// A resolved icon: its identifier plus the asset URL to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconHandle {
    /// Icon identifier from the icon table (e.g. "rust", "folder")
    pub name: String,
    /// URL of the image asset for the active theme
    pub url: String,
}

impl IconHandle {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
