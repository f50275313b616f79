//! Rebuild Actor - the event dispatcher
//!
//! Consumes one [`FsEvent`] at a time, in arrival order. Each event is one
//! batch:
//!
//! ```text
//! classify ──► refresh registry ──► resolve targets ──► render (rayon) ──► join ──► reload
//! ```
//!
//! The registry snapshot taken before the refresh is kept for producer
//! deletes, whose edges only exist in the old graph.

mod plan;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tokio::sync::mpsc;

use super::fs::FsEvent;
use super::messages::RebuildMsg;
use crate::core::PageKind;
use crate::logger::{status_error, status_success};
use crate::registry::{Registry, SiteState, scan_content};
use crate::reload::{ReloadHub, ReloadMessage};
use crate::render::{self, RenderOutcome};

use plan::{Action, Producer, dependents};

/// What one batch did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Content units rendered, changed or not
    pub rendered: usize,
    /// Renders that actually wrote new bytes
    pub written: usize,
    /// Destinations removed
    pub removed: usize,
    pub errors: Vec<String>,
}

impl BatchReport {
    /// Whether the batch rendered or removed anything.
    pub fn did_work(&self) -> bool {
        self.rendered > 0 || self.removed > 0
    }
}

pub struct RebuildActor {
    rx: mpsc::Receiver<RebuildMsg>,
    state: Arc<SiteState>,
    hub: Arc<ReloadHub>,
}

impl RebuildActor {
    pub fn new(rx: mpsc::Receiver<RebuildMsg>, state: Arc<SiteState>, hub: Arc<ReloadHub>) -> Self {
        Self { rx, state, hub }
    }

    /// Main event loop. Each event is fully processed before the next.
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                RebuildMsg::Event(event) => {
                    self.dispatch(event).await;
                }
                RebuildMsg::Shutdown => {
                    crate::debug!("rebuild"; "shutting down");
                    break;
                }
            }
        }
    }

    /// Process one event and broadcast a reload if it did any work.
    pub async fn dispatch(&self, event: FsEvent) -> BatchReport {
        let build = self.state.build();
        let action = Action::classify(&event, build);
        let label = relative(build, &event.path);
        crate::debug!("rebuild"; "{}: {}", action.name(), label);

        let report = self.execute(action.clone()).await;

        if !report.errors.is_empty() {
            let detail = report.errors.join("\n");
            status_error(&format!("{}: {}", action.name(), label), &detail);
        } else if report.did_work() {
            status_success(&format!(
                "{}: {} ({} rendered, {} written, {} removed)",
                action.name(),
                label,
                report.rendered,
                report.written,
                report.removed
            ));
        }

        if report.did_work() {
            self.hub.broadcast(&ReloadMessage::new(label));
        }
        report
    }

    async fn execute(&self, action: Action) -> BatchReport {
        let state = &self.state;
        let build = state.build();
        let before = state.snapshot();
        let mut report = BatchReport::default();

        let targets = match action {
            Action::Ignore => return report,

            Action::DirCreated(dir) => {
                let tree = scan_content(build, &dir);
                // The walk yields `dir` itself first.
                for sub in &tree.dirs {
                    if let Err(e) = render::mirror_dir(build, sub) {
                        report.errors.push(format!("{e:#}"));
                    }
                }
                if tree.files.iter().any(|f| PageKind::is_page(f)) {
                    self.rebuild_graph().await;
                }
                tree.files
            }

            Action::AssetChanged(path) => vec![path],

            Action::AssetRemoved(path) => {
                let destination = render::destination_for(build, &path);
                let was_dir = destination.as_ref().is_some_and(|d| d.is_dir());
                if destination.as_ref() == Some(&build.output) {
                    // The pages root maps onto the output root: drop only
                    // the outputs of the pages it held.
                    for page in before.graph.pages_within(&path) {
                        self.remove(&page, &mut report);
                    }
                } else {
                    self.remove(&path, &mut report);
                }
                if was_dir {
                    self.rebuild_graph().await;
                }
                return report;
            }

            Action::ProducerChanged(producer, path) => {
                if let Err(e) = self.refresh(producer).await {
                    report.errors.push(e);
                    return report;
                }
                self.rebuild_graph().await;
                dependents(&state.snapshot(), producer, &path)
            }

            Action::ProducerRemoved(producer, path) => {
                if let Err(e) = self.refresh(producer).await {
                    report.errors.push(e);
                    return report;
                }
                self.rebuild_graph().await;
                dependents(&before, producer, &path)
            }

            Action::PageChanged(path) => {
                self.rebuild_graph().await;
                let mut targets = state.snapshot().graph.used_by(&path);
                targets.insert(0, path);
                targets
            }

            Action::PageRemoved(path) => {
                self.rebuild_graph().await;
                self.remove(&path, &mut report);
                return report;
            }
        };

        let registry = state.snapshot();
        let results = render_batch(Arc::clone(state), registry, targets).await;
        for result in results {
            report.rendered += 1;
            match result {
                Ok(outcome) if outcome.changed => report.written += 1,
                Ok(_) => {}
                Err(e) => report.errors.push(e),
            }
        }
        report
    }

    async fn refresh(&self, producer: Producer) -> Result<(), String> {
        let state = Arc::clone(&self.state);
        let result = tokio::task::spawn_blocking(move || match producer {
            Producer::Layout => state.refresh_layouts(),
            Producer::Snippet => {
                state.refresh_snippets();
                Ok(())
            }
        })
        .await;

        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("{} refresh failed: {e}", producer.name())),
            Err(e) => Err(format!("{} refresh panicked: {e}", producer.name())),
        }
    }

    async fn rebuild_graph(&self) {
        let state = Arc::clone(&self.state);
        if let Err(e) = tokio::task::spawn_blocking(move || state.rebuild_graph()).await {
            crate::log!("rebuild"; "graph rebuild panicked: {}", e);
        }
    }

    fn remove(&self, path: &Path, report: &mut BatchReport) {
        match render::remove_output(self.state.build(), path) {
            Ok(true) => report.removed += 1,
            Ok(false) => crate::debug!("rebuild"; "nothing to remove for {}", path.display()),
            Err(e) => report.errors.push(format!("{e:#}")),
        }
    }
}

/// Render every target concurrently and wait for all of them.
///
/// One failing render never stops its siblings.
async fn render_batch(
    state: Arc<SiteState>,
    registry: Arc<Registry>,
    targets: Vec<PathBuf>,
) -> Vec<Result<RenderOutcome, String>> {
    if targets.is_empty() {
        return Vec::new();
    }

    let count = targets.len();
    let result = tokio::task::spawn_blocking(move || {
        targets
            .par_iter()
            .map(|path| {
                render::render_to_disk(state.build(), &registry, path).map_err(|e| {
                    crate::log!("render"; "{}: {:#}", path.display(), e);
                    format!("{e:#}")
                })
            })
            .collect::<Vec<_>>()
    })
    .await;

    match result {
        Ok(results) => results,
        Err(e) => {
            crate::log!("rebuild"; "render batch of {} panicked: {}", count, e);
            vec![Err(format!("render batch panicked: {e}"))]
        }
    }
}

fn relative(build: &crate::config::BuildConfig, path: &Path) -> String {
    path.strip_prefix(&build.source)
        .unwrap_or(path)
        .display()
        .to_string()
}
