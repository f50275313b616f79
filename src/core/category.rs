//! Source file category definitions.

use std::path::Path;

use crate::config::BuildConfig;

/// Kind of page, determines render strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// Markup file (.html, .htm) - passed through
    Markup,
    /// Markdown file (.md, .markdown) - converted with pulldown-cmark
    Markdown,
}

impl PageKind {
    /// Detect page kind from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(Self::Markup),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Detect page kind from file path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Display name for this page kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Markup => "markup",
            Self::Markdown => "markdown",
        }
    }

    /// Check if a path is a page.
    #[inline]
    pub fn is_page(path: &Path) -> bool {
        Self::from_path(path).is_some()
    }
}

/// Role of a source file, determines rebuild strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Template under the layouts subtree
    Layout,
    /// Reusable fragment under the snippets subtree
    Snippet,
    /// Content unit that is rendered (and wrapped in a layout)
    Page(PageKind),
    /// Content unit copied byte-for-byte
    Asset,
}

impl EntityKind {
    /// Classify a path under the source tree.
    pub fn of(path: &Path, build: &BuildConfig) -> Self {
        if path.starts_with(build.layouts_dir()) {
            Self::Layout
        } else if path.starts_with(build.snippets_dir()) {
            Self::Snippet
        } else {
            PageKind::from_path(path).map_or(Self::Asset, Self::Page)
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Snippet => "snippet",
            Self::Page(kind) => kind.name(),
            Self::Asset => "asset",
        }
    }
}
