//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `is_within` - subtree membership on normalized paths
//! - `is_temp_file` - editor swap/backup files and dotfiles

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
///
/// Deleted files cannot be canonicalized, so the fallback canonicalizes the
/// closest existing ancestor and re-appends the missing tail. This keeps a
/// removed path comparable with the paths recorded while it still existed.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    let mut tail = Vec::new();
    let mut cursor = absolute.as_path();
    while let Some(parent) = cursor.parent() {
        if let Some(name) = cursor.file_name() {
            tail.push(name.to_os_string());
        }
        if let Ok(base) = parent.canonicalize() {
            let mut rebuilt = base;
            rebuilt.extend(tail.iter().rev());
            return rebuilt;
        }
        cursor = parent;
    }

    absolute
}

/// Check whether `path` lies inside `dir` (or is `dir` itself).
#[inline]
pub fn is_within(path: &Path, dir: &Path) -> bool {
    path.starts_with(dir)
}

/// Editor lock, swap and backup files.
///
/// Plain dotfiles such as `.htaccess` are content, not artifacts.
///
/// Never part of the site and never worth a rebuild.
pub fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "swx" | "tmp")
        || name.ends_with('~')
        || name.starts_with(".#")
        || name == "4913"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_deleted_file_matches_existing_parent() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = normalize_path(temp.path());
        let missing = temp.path().join("gone.md");

        assert_eq!(normalize_path(&missing), dir.join("gone.md"));
    }

    #[test]
    fn test_is_within() {
        assert!(is_within(Path::new("/site/src/layouts/a.html"), Path::new("/site/src/layouts")));
        assert!(is_within(Path::new("/site/src"), Path::new("/site/src")));
        assert!(!is_within(Path::new("/site/srcx/a.html"), Path::new("/site/src")));
    }

    #[test]
    fn test_is_temp_file() {
        assert!(is_temp_file(Path::new("/site/src/.index.md.swp")));
        assert!(is_temp_file(Path::new("/site/src/index.md~")));
        assert!(is_temp_file(Path::new("/site/src/.#index.md")));
        assert!(is_temp_file(Path::new("/site/src/4913")));
        assert!(is_temp_file(Path::new("/site/src/post.bak")));
        assert!(!is_temp_file(Path::new("/site/src/index.md")));
        assert!(!is_temp_file(Path::new("/site/src/img/logo.png")));
        assert!(!is_temp_file(Path::new("/site/src/.htaccess")));
        assert!(!is_temp_file(Path::new("/site/src/.well-known/security.txt")));
    }
}
