//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Resolve a request URL to a file under `serve_root`.
///
/// A trailing `/` or a directory resolves to its `index.html`. Anything that
/// would leave `serve_root` resolves to `None`.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url)?;

    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let local = serve_root.join(&clean);

    // Symlinks and encoded separators are checked after canonicalization.
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        return index.is_file().then_some(index);
    }
    canonical.is_file().then_some(canonical)
}

/// Strip query and fragment, percent-decode, trim slashes.
///
/// `None` for paths that are not valid UTF-8 once decoded.
fn normalize_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    Some(decoded.trim_matches('/').replace('\\', "/"))
}

/// Request path without query string.
pub fn request_path(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
