use std::path::Path;

use super::types::{ChangeKind, FsEvent, RawChanges};
use crate::config::BuildConfig;
use crate::utils::path::{is_temp_file, is_within};

/// Turns debounced raw changes into the events worth dispatching.
///
/// Pipeline: correct_by_existence → filter_actionable
pub(super) struct EventClassifier;

impl EventClassifier {
    /// Main classification pipeline. Arrival order is kept.
    pub(super) fn classify(raw: RawChanges, build: &BuildConfig) -> Vec<FsEvent> {
        let mut changes = raw;

        Self::correct_by_existence(&mut changes);
        Self::filter_actionable(&mut changes, build);

        changes
            .into_iter()
            .map(|(path, kind)| FsEvent::new(path, kind))
            .collect()
    }

    /// Reconcile event kinds with actual filesystem state.
    ///
    /// The watcher may report stale events (e.g., Created for a file that's already
    /// been deleted, or Removed for a file that still exists after an atomic save).
    pub(super) fn correct_by_existence(changes: &mut RawChanges) {
        changes.retain_mut(|(path, kind)| {
            let exists = path.exists();
            match *kind {
                ChangeKind::Created if !exists => {
                    crate::debug!("watch"; "discard created (gone): {}", path.display());
                    return false;
                }
                ChangeKind::Modified if !exists => {
                    crate::debug!("watch"; "upgrade modified->removed: {}", path.display());
                    *kind = ChangeKind::Removed;
                }
                ChangeKind::Removed if exists => {
                    crate::debug!("watch"; "downgrade removed->modified: {}", path.display());
                    *kind = ChangeKind::Modified;
                }
                _ => {}
            }
            true
        });
    }

    /// Drop paths the build never reads.
    fn filter_actionable(changes: &mut RawChanges, build: &BuildConfig) {
        changes.retain(|(path, _)| {
            let keep = is_actionable(path, build);
            if !keep {
                crate::debug!("watch"; "ignore: {}", path.display());
            }
            keep
        });
    }
}

/// Inside the source root, outside the destination tree, and not an editor
/// artifact. Dotfiles are content like any other file.
pub(super) fn is_actionable(path: &Path, build: &BuildConfig) -> bool {
    is_within(path, &build.source)
        && path != build.source
        && !is_within(path, &build.output)
        && !is_temp_file(path)
}
