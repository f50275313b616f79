//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "src"               # Source tree root
//! output = "dist"              # Destination tree root
//! layouts = "layouts"          # Layout subtree (relative to source)
//! snippets = "snippets"        # Snippet subtree (relative to source, optional on disk)
//! pages = "pages"              # Leading segment stripped from destination paths
//! default_layout = "Default"   # Layout used when a page declares none
//! placeholder = "__CONTENT__"  # Token replaced by the page body
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// Build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Source tree root. Absolute after config loading.
    pub source: PathBuf,

    /// Destination tree root. Absolute after config loading.
    pub output: PathBuf,

    /// Layout subtree, relative to `source`.
    pub layouts: PathBuf,

    /// Snippet subtree, relative to `source`.
    pub snippets: PathBuf,

    /// Leading path segment stripped when mapping sources to destinations.
    pub pages: String,

    /// Name of the layout used when a page declares none.
    pub default_layout: String,

    /// Literal token inside a layout replaced by the rendered body.
    pub placeholder: String,

    /// Remove the destination tree before building (CLI only).
    #[serde(skip)]
    pub clean: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: "src".into(),
            output: "dist".into(),
            layouts: "layouts".into(),
            snippets: "snippets".into(),
            pages: "pages".into(),
            default_layout: "Default".into(),
            placeholder: "__CONTENT__".into(),
            clean: false,
        }
    }
}

impl BuildConfig {
    /// Absolute layout subtree.
    pub fn layouts_dir(&self) -> PathBuf {
        self.source.join(&self.layouts)
    }

    /// Absolute snippet subtree.
    pub fn snippets_dir(&self) -> PathBuf {
        self.source.join(&self.snippets)
    }

    pub(crate) fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.placeholder.is_empty() {
            diag.error("build.placeholder", "placeholder token must not be empty");
        }
        if self.default_layout.trim().is_empty() {
            diag.error("build.default_layout", "default layout name must not be empty");
        }
        if self.layouts == self.snippets {
            diag.error_with_hint(
                "build.snippets",
                "layouts and snippets must be different subtrees",
                "use the defaults: layouts = \"layouts\", snippets = \"snippets\"",
            );
        }
        if self.output == self.source {
            diag.error_with_hint(
                "build.output",
                "output directory must differ from the source tree",
                "place it next to the source tree, e.g. output = \"dist\"",
            );
        }
        if self.layouts.is_absolute() || self.snippets.is_absolute() {
            diag.error("build.layouts", "reserved subtrees must be relative to `source`");
        }
    }
}
