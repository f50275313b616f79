//! Dependency graph between producers (layouts, snippets) and pages.
//!
//! Bidirectional mapping:
//! - forward: page → producers it uses
//! - reverse: producer → pages that use it
//!
//! # Invariants
//! - Forward and reverse mappings are always consistent
//! - Each (producer, page) pair appears once (set semantics)
//! - Every page has exactly one layout edge when a layout resolves
//!
//! The graph is never patched after construction. Any change to layouts,
//! snippets or the page set builds a new graph from scratch.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use super::scan::{LayoutTable, SnippetTable, scan_content};
use crate::config::BuildConfig;
use crate::core::PageKind;
use crate::render::frontmatter;

type PathSet = FxHashSet<PathBuf>;
type PathSetMap = FxHashMap<PathBuf, PathSet>;

#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Forward: page → its producers
    forward: PathSetMap,
    /// Reverse: producer → pages that use it
    reverse: PathSetMap,
}

impl DependencyGraph {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the producers of a page, replacing earlier ones.
    pub fn record(&mut self, page: &Path, producers: &[PathBuf]) {
        self.remove_page(page);

        let deps: PathSet = producers
            .iter()
            .filter(|p| p.as_path() != page)
            .cloned()
            .collect();

        for dep in &deps {
            self.reverse
                .entry(dep.clone())
                .or_default()
                .insert(page.to_path_buf());
        }

        self.forward.insert(page.to_path_buf(), deps);
    }

    /// Pages that depend on `producer`, sorted.
    pub fn used_by(&self, producer: &Path) -> Vec<PathBuf> {
        let mut pages: Vec<_> = self
            .reverse
            .get(producer)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        pages.sort();
        pages
    }

    /// Whether `page` was seen by the last scan.
    #[inline]
    pub fn contains_page(&self, page: &Path) -> bool {
        self.forward.contains_key(page)
    }

    /// Tracked pages at or below `dir`, sorted.
    pub fn pages_within(&self, dir: &Path) -> Vec<PathBuf> {
        let mut pages: Vec<_> = self
            .forward
            .keys()
            .filter(|page| page.starts_with(dir))
            .cloned()
            .collect();
        pages.sort();
        pages
    }

    /// Number of pages tracked.
    #[inline]
    pub fn page_count(&self) -> usize {
        self.forward.len()
    }

    /// Number of (producer, page) pairs.
    pub fn edge_count(&self) -> usize {
        self.reverse.values().map(FxHashSet::len).sum()
    }

    fn remove_page(&mut self, page: &Path) {
        let Some(old_deps) = self.forward.remove(page) else {
            return;
        };

        for dep in old_deps {
            if let Some(dependents) = self.reverse.get_mut(&dep) {
                dependents.remove(page);
                if dependents.is_empty() {
                    self.reverse.remove(&dep);
                }
            }
        }
    }
}

/// Walk the source tree once and compute every page's producers.
///
/// Reserved subtrees and the output directory are skipped. A page whose
/// declared layout is unknown falls back to the default layout. Unreadable
/// pages are left out of the graph.
pub fn build_dependency_graph(
    build: &BuildConfig,
    layouts: &LayoutTable,
    snippets: &SnippetTable,
) -> DependencyGraph {
    let pages = collect_pages(build);

    let entries: Vec<(PathBuf, Vec<PathBuf>)> = pages
        .into_par_iter()
        .filter_map(|page| {
            let raw = match std::fs::read(&page) {
                Ok(raw) => raw,
                Err(e) => {
                    crate::debug!("registry"; "skipping {}: {}", page.display(), e);
                    return None;
                }
            };
            let producers = page_producers(&raw, build, layouts, snippets);
            Some((page, producers))
        })
        .collect();

    let mut graph = DependencyGraph::new();
    for (page, producers) in entries {
        graph.record(&page, &producers);
    }

    crate::debug!("registry"; "graph: {} pages, {} edges", graph.page_count(), graph.edge_count());
    graph
}

/// Producers referenced by a page's raw bytes.
fn page_producers(
    raw: &[u8],
    build: &BuildConfig,
    layouts: &LayoutTable,
    snippets: &SnippetTable,
) -> Vec<PathBuf> {
    let content = String::from_utf8_lossy(raw);
    let (meta, _) = frontmatter::split(&content);

    let layout = meta
        .layout_name()
        .and_then(|name| layouts.get(name))
        .or_else(|| layouts.get(&build.default_layout));

    layout
        .map(|l| l.path.clone())
        .into_iter()
        .chain(
            snippets
                .values()
                .filter(|s| content.contains(&s.marker))
                .map(|s| s.path.clone()),
        )
        .collect()
}

/// Page-eligible files under the source tree, outside reserved subtrees.
fn collect_pages(build: &BuildConfig) -> Vec<PathBuf> {
    scan_content(build, &build.source)
        .files
        .into_iter()
        .filter(|path| PageKind::is_page(path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    mod dependency_graph {
        use super::*;

        #[test]
        fn new_graph_is_empty() {
            let graph = DependencyGraph::new();
            assert!(graph.used_by(&path("/any.html")).is_empty());
            assert_eq!(graph.edge_count(), 0);
        }

        #[test]
        fn self_reference_excluded() {
            let mut graph = DependencyGraph::new();
            let page = path("/src/index.html");
            let layout = path("/src/layouts/Default.html");

            graph.record(&page, &[page.clone(), layout.clone()]);

            assert!(graph.used_by(&page).is_empty());
            assert_eq!(graph.used_by(&layout), vec![page]);
        }

        #[test]
        fn duplicate_producers_collapse() {
            let mut graph = DependencyGraph::new();
            let page = path("/src/index.html");
            let snippet = path("/src/snippets/Footer.html");

            graph.record(&page, &[snippet.clone(), snippet.clone()]);
            graph.record(&page, std::slice::from_ref(&snippet));

            assert_eq!(graph.used_by(&snippet), vec![page]);
            assert_eq!(graph.edge_count(), 1);
        }

        #[test]
        fn update_replaces_old_dependencies() {
            let mut graph = DependencyGraph::new();
            let page = path("/src/index.html");
            let old = path("/src/layouts/Old.html");
            let new = path("/src/layouts/New.html");

            graph.record(&page, std::slice::from_ref(&old));
            graph.record(&page, std::slice::from_ref(&new));

            assert!(graph.used_by(&old).is_empty());
            assert_eq!(graph.used_by(&new), vec![page]);
        }

        #[test]
        fn used_by_is_sorted() {
            let mut graph = DependencyGraph::new();
            let shared = path("/src/layouts/Default.html");
            for name in ["/src/c.html", "/src/a.html", "/src/b.html"] {
                graph.record(&path(name), std::slice::from_ref(&shared));
            }

            assert_eq!(
                graph.used_by(&shared),
                vec![path("/src/a.html"), path("/src/b.html"), path("/src/c.html")]
            );
        }
    }
}
