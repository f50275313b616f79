//! Source → destination path mapping.
//!
//! ```text
//! src/pages/index.md        → dist/index.html
//! src/pages/blog/post.html  → dist/blog/post.html
//! src/css/site.css          → dist/css/site.css
//! ```

use std::path::{Component, Path, PathBuf};

use crate::config::BuildConfig;
use crate::core::PageKind;

/// Destination path of a content unit (or directory) under the source tree.
///
/// Returns `None` for paths outside the source root.
pub fn destination_for(build: &BuildConfig, source: &Path) -> Option<PathBuf> {
    let relative = source.strip_prefix(&build.source).ok()?;

    let mut components = relative.components().peekable();
    if let Some(Component::Normal(first)) = components.peek()
        && !build.pages.is_empty()
        && *first == build.pages.as_str()
    {
        components.next();
    }

    let mut destination = build.output.clone();
    destination.extend(components);

    if PageKind::from_path(source) == Some(PageKind::Markdown) {
        destination.set_extension("html");
    }
    Some(destination)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> BuildConfig {
        BuildConfig {
            source: PathBuf::from("/site/src"),
            output: PathBuf::from("/site/dist"),
            ..BuildConfig::default()
        }
    }

    fn dest(path: &str) -> Option<PathBuf> {
        destination_for(&build(), Path::new(path))
    }

    #[test]
    fn test_pages_segment_stripped() {
        assert_eq!(
            dest("/site/src/pages/index.html"),
            Some(PathBuf::from("/site/dist/index.html"))
        );
        assert_eq!(
            dest("/site/src/pages/blog/post.md"),
            Some(PathBuf::from("/site/dist/blog/post.html"))
        );
    }

    #[test]
    fn test_only_leading_pages_segment() {
        assert_eq!(
            dest("/site/src/docs/pages/a.html"),
            Some(PathBuf::from("/site/dist/docs/pages/a.html"))
        );
        assert_eq!(
            dest("/site/src/pagesextra/a.html"),
            Some(PathBuf::from("/site/dist/pagesextra/a.html"))
        );
    }

    #[test]
    fn test_assets_and_markdown_extensions() {
        assert_eq!(
            dest("/site/src/css/site.css"),
            Some(PathBuf::from("/site/dist/css/site.css"))
        );
        assert_eq!(
            dest("/site/src/notes.markdown"),
            Some(PathBuf::from("/site/dist/notes.html"))
        );
    }

    #[test]
    fn test_directories_and_outside_paths() {
        assert_eq!(dest("/site/src/pages"), Some(PathBuf::from("/site/dist")));
        assert_eq!(dest("/site/src/img"), Some(PathBuf::from("/site/dist/img")));
        assert_eq!(dest("/elsewhere/index.html"), None);
    }
}
