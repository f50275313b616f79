//! Process-wide server state for serve mode.
//!
//! Two pieces of state:
//! - `SHUTDOWN`: Has shutdown been requested? (Ctrl+C received)
//! - `RUNTIME`: Server, actor shutdown sender and reload hub, registered once
//!   the dev server is bound so the Ctrl+C handler can tear them down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tiny_http::Server;

use crate::reload::ReloadHub;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Handles needed for a graceful shutdown.
struct Runtime {
    server: Arc<Server>,
    shutdown_tx: crossbeam::channel::Sender<()>,
    hub: Arc<ReloadHub>,
}

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// The handler behavior depends on whether a server has been registered:
/// - Before `register_server()`: exit immediately (nothing to tear down)
/// - After `register_server()`: unblock server, notify actors, close clients
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        let Some(runtime) = RUNTIME.get() else {
            std::process::exit(0);
        };

        crate::log!("serve"; "shutting down...");
        crate::debug!("serve"; "closing {} reload streams", runtime.hub.len());
        let _ = runtime.shutdown_tx.send(());
        runtime.hub.close_all();
        runtime.server.unblock();
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown
///
/// Call this after binding the server, before entering the request loop
pub fn register_server(
    server: Arc<Server>,
    shutdown_tx: crossbeam::channel::Sender<()>,
    hub: Arc<ReloadHub>,
) {
    let _ = RUNTIME.set(Runtime {
        server,
        shutdown_tx,
        hub,
    });
}

/// Check if shutdown has been requested
///
/// Relaxed is enough: worst case a few more requests are served before stopping
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_shutdown_by_default() {
        assert!(!is_shutdown());
        assert!(RUNTIME.get().is_none());
    }
}
