//! Event → action classification.
//!
//! Every dispatched event is a (change kind × entity kind) pair. This module
//! maps the pair to the one action the dispatcher performs for it.

use std::path::{Path, PathBuf};

use crate::actor::fs::{ChangeKind, FsEvent};
use crate::config::BuildConfig;
use crate::core::EntityKind;
use crate::registry::Registry;
use crate::utils::path::is_within;

/// Layouts or snippets, the two tables a producer change refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Producer {
    Layout,
    Snippet,
}

impl Producer {
    pub(super) fn name(self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Snippet => "snippet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Action {
    /// Nothing to do (directory metadata noise)
    Ignore,
    /// New directory: mirror it, render what was moved in
    DirCreated(PathBuf),
    AssetChanged(PathBuf),
    AssetRemoved(PathBuf),
    ProducerChanged(Producer, PathBuf),
    ProducerRemoved(Producer, PathBuf),
    PageChanged(PathBuf),
    PageRemoved(PathBuf),
}

impl Action {
    pub(super) fn classify(event: &FsEvent, build: &BuildConfig) -> Self {
        let path = event.path.clone();
        let is_dir = path.is_dir();

        let entity = EntityKind::of(&path, build);
        crate::debug!("rebuild"; "{} {}: {}", event.kind.label(), entity.name(), path.display());
        let producer = match entity {
            EntityKind::Layout => Some(Producer::Layout),
            EntityKind::Snippet => Some(Producer::Snippet),
            _ => None,
        };

        match (event.kind, producer) {
            (ChangeKind::Removed, Some(p)) => Self::ProducerRemoved(p, path),
            (_, Some(p)) => Self::ProducerChanged(p, path),
            (ChangeKind::Created, None) if is_dir => Self::DirCreated(path),
            (ChangeKind::Modified, None) if is_dir => Self::Ignore,
            (ChangeKind::Removed, None) if matches!(entity, EntityKind::Page(_)) => {
                Self::PageRemoved(path)
            }
            (ChangeKind::Removed, None) => Self::AssetRemoved(path),
            (_, None) if matches!(entity, EntityKind::Page(_)) => Self::PageChanged(path),
            (_, None) => Self::AssetChanged(path),
        }
    }

    pub(super) fn name(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::DirCreated(_) => "directory created",
            Self::AssetChanged(_) => "asset changed",
            Self::AssetRemoved(_) => "asset removed",
            Self::ProducerChanged(Producer::Layout, _) => "layout changed",
            Self::ProducerChanged(Producer::Snippet, _) => "snippet changed",
            Self::ProducerRemoved(Producer::Layout, _) => "layout removed",
            Self::ProducerRemoved(Producer::Snippet, _) => "snippet removed",
            Self::PageChanged(_) => "page changed",
            Self::PageRemoved(_) => "page removed",
        }
    }
}

/// Pages listed under every producer at or below `path`.
///
/// `path` is usually one producer file; a producer directory collects the
/// edges of everything it contains.
pub(super) fn dependents(registry: &Registry, producer: Producer, path: &Path) -> Vec<PathBuf> {
    let producers: Vec<&Path> = match producer {
        Producer::Layout => registry
            .layouts
            .values()
            .map(|l| l.path.as_path())
            .filter(|p| is_within(p, path))
            .collect(),
        Producer::Snippet => registry
            .snippets
            .values()
            .map(|s| s.path.as_path())
            .filter(|p| is_within(p, path))
            .collect(),
    };

    let mut pages: Vec<PathBuf> = producers
        .into_iter()
        .flat_map(|p| registry.graph.used_by(p))
        .collect();
    pages.sort();
    pages.dedup();
    pages
}
