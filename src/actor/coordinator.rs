//! Actor Coordinator - wires up the watch pipeline
//!
//! ```text
//! FsActor ──RebuildMsg──► RebuildActor ──► ReloadHub
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::RebuildMsg;
use super::rebuild::RebuildActor;
use crate::registry::SiteState;
use crate::reload::ReloadHub;

const CHANNEL_BUFFER: usize = 32;

pub struct Coordinator {
    state: Arc<SiteState>,
    hub: Arc<ReloadHub>,
    debounce_ms: u64,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(state: Arc<SiteState>, hub: Arc<ReloadHub>, debounce_ms: u64) -> Self {
        Self {
            state,
            hub,
            debounce_ms,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Attach the watcher. Call before the initial build so its writes
    /// are not missed.
    pub fn attach(self) -> Result<Attached> {
        let (rebuild_tx, rebuild_rx) = mpsc::channel::<RebuildMsg>(CHANNEL_BUFFER);
        let root = self.state.build().source.clone();

        let fs = FsActor::new(root, self.debounce_ms, rebuild_tx.clone(), Arc::clone(&self.state))
            .context("failed to start file watcher")?;
        let rebuild = RebuildActor::new(rebuild_rx, self.state, self.hub);

        Ok(Attached {
            fs,
            rebuild,
            rebuild_tx,
            shutdown_rx: self.shutdown_rx,
        })
    }
}

/// Actors with the watcher running, ready to [`Attached::run`].
pub struct Attached {
    fs: FsActor,
    rebuild: RebuildActor,
    rebuild_tx: mpsc::Sender<RebuildMsg>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Attached {
    /// Run both actors until shutdown.
    pub async fn run(self) -> Result<()> {
        let fs_handle = tokio::spawn(self.fs.run());
        let mut rebuild_handle = tokio::spawn(self.rebuild.run());
        crate::debug!("actor"; "start");

        let finished = if let Some(rx) = self.shutdown_rx {
            loop {
                if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                    crate::debug!("actor"; "shutdown signal received");
                    break false;
                }
                tokio::select! {
                    _ = &mut rebuild_handle => break true,
                    _ = tokio::time::sleep(Duration::from_millis(100)) => {}
                }
            }
        } else {
            let _ = (&mut rebuild_handle).await;
            true
        };

        fs_handle.abort();
        if !finished {
            let _ = self.rebuild_tx.send(RebuildMsg::Shutdown).await;
            // Let the batch in flight finish its writes.
            let _ = tokio::time::timeout(Duration::from_millis(500), rebuild_handle).await;
        }

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
