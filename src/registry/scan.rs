//! Layout and snippet discovery.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;

use super::RegistryError;
use crate::config::BuildConfig;
use crate::utils::path::{is_temp_file, is_within};

/// A named template with one placeholder for a page body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// File stem, e.g. `Default` for `layouts/Default.html`.
    pub name: String,
    pub path: PathBuf,
}

/// A named fragment inserted verbatim at `<Name></Name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub name: String,
    pub path: PathBuf,
    /// Inline marker, `<Name></Name>`.
    pub marker: String,
}

impl Snippet {
    pub fn new(name: String, path: PathBuf) -> Self {
        let marker = format!("<{name}></{name}>");
        Self { name, path, marker }
    }
}

/// Layouts keyed by name, iterated in name order.
pub type LayoutTable = BTreeMap<String, Layout>;

/// Snippets keyed by name, iterated in name order.
pub type SnippetTable = BTreeMap<String, Snippet>;

/// Walk the layouts subtree.
///
/// The subtree is required: without it no page can be wrapped.
pub fn scan_layouts(dir: &Path) -> Result<LayoutTable, RegistryError> {
    if !dir.is_dir() {
        return Err(RegistryError::MissingLayouts(dir.to_path_buf()));
    }

    let mut table = LayoutTable::new();
    for (name, path) in named_files(dir) {
        if let Some(previous) = table.insert(name.clone(), Layout { name, path }) {
            crate::debug!("registry"; "layout `{}` shadowed by a later file", previous.name);
        }
    }
    Ok(table)
}

/// Walk the snippets subtree. A missing subtree yields an empty table.
pub fn scan_snippets(dir: &Path) -> SnippetTable {
    let mut table = SnippetTable::new();
    if !dir.is_dir() {
        return table;
    }

    for (name, path) in named_files(dir) {
        if let Some(previous) = table.insert(name.clone(), Snippet::new(name, path)) {
            crate::debug!("registry"; "snippet `{}` shadowed by a later file", previous.name);
        }
    }
    table
}

/// Directories and content units found under one subtree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContentTree {
    pub dirs: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// Walk `dir` for content units, skipping reserved subtrees, the output
/// directory and editor artifacts.
pub fn scan_content(build: &BuildConfig, dir: &Path) -> ContentTree {
    let layouts_dir = build.layouts_dir();
    let snippets_dir = build.snippets_dir();
    let output = build.output.clone();

    let mut tree = ContentTree::default();
    let walk = WalkDir::new(dir)
        .sort(true)
        .process_read_dir(move |_, _, _, children| {
            children.retain(|entry| {
                entry.as_ref().is_ok_and(|e| {
                    let path = e.path();
                    !is_within(&path, &layouts_dir)
                        && !is_within(&path, &snippets_dir)
                        && !is_within(&path, &output)
                        && !is_temp_file(&path)
                })
            });
        });

    for entry in walk.into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if entry.file_type().is_dir() {
            if path != build.source {
                tree.dirs.push(path);
            }
        } else if entry.file_type().is_file() {
            tree.files.push(path);
        }
    }
    tree
}

/// Files under `dir` in walk order, paired with their stem.
fn named_files(dir: &Path) -> Vec<(String, PathBuf)> {
    WalkDir::new(dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|path| !is_temp_file(path))
        .filter_map(|path| {
            let name = path.file_stem()?.to_str()?.to_string();
            Some((name, path))
        })
        .collect()
}
