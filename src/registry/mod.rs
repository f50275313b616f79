//! Source registry: layouts, snippets and the dependency graph.
//!
//! # Module Structure
//!
//! ```text
//! registry/
//! ├── scan.rs    # Layout/Snippet discovery
//! ├── graph.rs   # DependencyGraph + full-tree dependency scan
//! └── mod.rs     # Registry snapshot, SiteState (this file)
//! ```
//!
//! A [`Registry`] is an immutable snapshot. [`SiteState`] holds the current
//! snapshot behind an `ArcSwap`: readers load it without locking, the rebuild
//! actor is the only writer and replaces it with a single `store`.

mod graph;
mod scan;

pub use graph::{DependencyGraph, build_dependency_graph};
pub use scan::{
    ContentTree, Layout, LayoutTable, Snippet, SnippetTable, scan_content, scan_layouts,
    scan_snippets,
};

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::config::BuildConfig;
use crate::render::FrontMatter;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("layouts directory `{0}` does not exist")]
    MissingLayouts(PathBuf),

    #[error("default layout `{name}` not found in `{dir}`")]
    MissingDefaultLayout { name: String, dir: PathBuf },
}

/// Immutable view of layouts, snippets and the graph built from them.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub layouts: Arc<LayoutTable>,
    pub snippets: Arc<SnippetTable>,
    pub graph: Arc<DependencyGraph>,
    default_layout: String,
}

impl Registry {
    /// Scan layouts and snippets, then build the graph.
    pub fn load(build: &BuildConfig) -> Result<Self, RegistryError> {
        let layouts = scan_layouts(&build.layouts_dir())?;
        let snippets = scan_snippets(&build.snippets_dir());
        let graph = build_dependency_graph(build, &layouts, &snippets);

        Ok(Self {
            layouts: Arc::new(layouts),
            snippets: Arc::new(snippets),
            graph: Arc::new(graph),
            default_layout: build.default_layout.clone(),
        })
    }

    /// The configured default layout, if it exists.
    pub fn default_layout(&self) -> Option<&Layout> {
        self.layouts.get(&self.default_layout)
    }

    /// Fail unless the default layout exists.
    pub fn require_default_layout(&self, build: &BuildConfig) -> Result<(), RegistryError> {
        match self.default_layout() {
            Some(_) => Ok(()),
            None => Err(RegistryError::MissingDefaultLayout {
                name: self.default_layout.clone(),
                dir: build.layouts_dir(),
            }),
        }
    }

    /// Effective layout of a page: the declared one when known, else default.
    pub fn resolve_layout(&self, meta: &FrontMatter) -> Option<&Layout> {
        meta.layout_name()
            .and_then(|name| self.layouts.get(name))
            .or_else(|| self.default_layout())
    }
}

/// Process-wide registry handle.
pub struct SiteState {
    build: BuildConfig,
    current: ArcSwap<Registry>,
}

impl SiteState {
    pub fn new(build: BuildConfig) -> Result<Self, RegistryError> {
        let registry = Registry::load(&build)?;
        Ok(Self {
            build,
            current: ArcSwap::from_pointee(registry),
        })
    }

    #[inline]
    pub fn build(&self) -> &BuildConfig {
        &self.build
    }

    /// Current snapshot. Stays valid while later refreshes swap in new ones.
    #[inline]
    pub fn snapshot(&self) -> Arc<Registry> {
        self.current.load_full()
    }

    /// Rescan the layouts subtree. The graph is left as is.
    pub fn refresh_layouts(&self) -> Result<(), RegistryError> {
        let layouts = scan_layouts(&self.build.layouts_dir())?;
        let next = Registry {
            layouts: Arc::new(layouts),
            ..(*self.snapshot()).clone()
        };
        self.current.store(Arc::new(next));
        Ok(())
    }

    /// Rescan the snippets subtree. The graph is left as is.
    pub fn refresh_snippets(&self) {
        let snippets = scan_snippets(&self.build.snippets_dir());
        let next = Registry {
            snippets: Arc::new(snippets),
            ..(*self.snapshot()).clone()
        };
        self.current.store(Arc::new(next));
    }

    /// Recompute the graph from the current tables.
    pub fn rebuild_graph(&self) {
        let current = self.snapshot();
        let graph = build_dependency_graph(&self.build, &current.layouts, &current.snippets);
        let next = Registry {
            graph: Arc::new(graph),
            ..(*current).clone()
        };
        self.current.store(Arc::new(next));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_site_config;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn site() -> (TempDir, BuildConfig) {
        let dir = TempDir::new().unwrap();
        let build = test_site_config(dir.path()).build;
        write(&build.source, "layouts/Default.html", "<html><body>__CONTENT__</body></html>");
        write(&build.source, "layouts/Blog.html", "<main>__CONTENT__</main>");
        write(&build.source, "snippets/Footer.html", "<footer>©</footer>");
        (dir, build)
    }

    #[test]
    fn test_layout_edges_are_total() {
        let (_dir, build) = site();
        let a = write(&build.source, "pages/index.md", "# Hi");
        let b = write(&build.source, "pages/post.md", "---\nlayout: Blog\n---\ntext");
        let c = write(&build.source, "pages/lost.md", "---\nlayout: Missing\n---\ntext");
        write(&build.source, "css/site.css", "body {}");

        let registry = Registry::load(&build).unwrap();
        let default = build.layouts_dir().join("Default.html");
        let blog = build.layouts_dir().join("Blog.html");

        assert_eq!(registry.graph.used_by(&default), vec![a, c]);
        assert_eq!(registry.graph.used_by(&blog), vec![b]);
        assert_eq!(registry.graph.page_count(), 3);
    }

    #[test]
    fn test_snippet_edges_are_partial() {
        let (_dir, build) = site();
        let with = write(&build.source, "pages/a.html", "<p>x</p><Footer></Footer><Footer></Footer>");
        write(&build.source, "pages/b.html", "<p>no footer</p>");

        let registry = Registry::load(&build).unwrap();
        let footer = build.snippets_dir().join("Footer.html");
        assert_eq!(registry.graph.used_by(&footer), vec![with]);
    }

    #[test]
    fn test_reserved_subtrees_and_output_skipped() {
        let (_dir, mut build) = site();
        build.output = build.source.join("dist");
        write(&build.output, "index.html", "<Footer></Footer>");
        let registry = Registry::load(&build).unwrap();
        assert_eq!(registry.graph.page_count(), 0);
    }

    #[test]
    fn test_missing_default_layout() {
        let (_dir, mut build) = site();
        build.default_layout = "Base".into();
        let registry = Registry::load(&build).unwrap();
        assert!(matches!(
            registry.require_default_layout(&build),
            Err(RegistryError::MissingDefaultLayout { .. })
        ));
    }

    #[test]
    fn test_refresh_swaps_snapshot() {
        let (_dir, build) = site();
        let page = write(&build.source, "pages/a.html", "<Header></Header>");
        let state = SiteState::new(build.clone()).unwrap();

        let before = state.snapshot();
        let header = write(&build.source, "snippets/Header.html", "<header/>");
        state.refresh_snippets();
        state.rebuild_graph();

        assert!(before.graph.used_by(&header).is_empty());
        assert!(!before.snippets.contains_key("Header"));
        let after = state.snapshot();
        assert_eq!(after.graph.used_by(&header), vec![page]);
    }

    #[test]
    fn test_refresh_layouts_requires_subtree() {
        let (_dir, build) = site();
        let state = SiteState::new(build.clone()).unwrap();
        fs::remove_dir_all(build.layouts_dir()).unwrap();

        assert!(state.refresh_layouts().is_err());
        assert_eq!(state.snapshot().layouts.len(), 2);
    }
}
