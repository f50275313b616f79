//! FileSystem Actor
//!
//! Watches the source tree and sends debounced events to the RebuildActor.
//! Implements the "Watcher-First" pattern: the watcher is attached before the
//! initial build, so nothing written during that build is lost.
//!
//! Architecture:
//! ```text
//! Watcher → Debouncer (pure timing) → Classifier (ignore rules) → RebuildMsg
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::messages::RebuildMsg;
use crate::registry::SiteState;

// Ignore rules and existence correction.
mod classifier;
// Pure timing and deduplication.
mod debouncer;
// Shared fs event types.
mod types;


use classifier::EventClassifier;
use debouncer::Debouncer;
pub use types::{ChangeKind, FsEvent};

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    /// Channel to send messages to RebuildActor
    rebuild_tx: mpsc::Sender<RebuildMsg>,
    debouncer: Debouncer,
    state: Arc<SiteState>,
}

impl FsActor {
    /// Create a new FsActor with the watcher already running.
    ///
    /// Events buffer in the notify channel until [`FsActor::run`] starts.
    pub fn new(
        root: PathBuf,
        debounce_ms: u64,
        rebuild_tx: mpsc::Sender<RebuildMsg>,
        state: Arc<SiteState>,
    ) -> notify::Result<Self> {
        // notify has no async API
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;
        // Recursive: directories created later are covered without re-attaching.
        watcher.watch(&root, RecursiveMode::Recursive)?;
        crate::debug!("watch"; "watching {}", root.display());

        Ok(Self {
            notify_rx,
            watcher,
            rebuild_tx,
            debouncer: Debouncer::new(debounce_ms),
            state,
        })
    }

    /// Run the actor event loop until the RebuildActor goes away.
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let rebuild_tx = self.rebuild_tx;
        let state = self.state;
        let mut debouncer = self.debouncer;
        let _watcher = self.watcher;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Bridge thread: blocking notify receiver → async channel
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    if process_changes(&mut debouncer, &rebuild_tx, &state).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Classify ready changes and forward them one event at a time.
///
/// Returns `Err(())` if the RebuildActor shut down.
async fn process_changes(
    debouncer: &mut Debouncer,
    rebuild_tx: &mpsc::Sender<RebuildMsg>,
    state: &SiteState,
) -> Result<(), ()> {
    if crate::core::is_shutdown() {
        return Err(());
    }

    let Some(raw) = debouncer.take_if_ready() else {
        return Ok(());
    };

    for event in EventClassifier::classify(raw, state.build()) {
        rebuild_tx
            .send(RebuildMsg::Event(event))
            .await
            .map_err(|_| ())?;
    }
    Ok(())
}
