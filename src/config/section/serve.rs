//! `[serve]` section configuration.
//!
//! Contains development server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"         # Network interface (127.0.0.1 = localhost only)
//! port = 8080                     # HTTP port number
//! watch = true                    # Rebuild on file changes
//! debounce_ms = 300               # Coalescing window for raw watcher events
//! reload_path = "/__kiln/reload"  # Server-sent events endpoint
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Enable file watcher for live reload.
    pub watch: bool,

    /// Quiet period before coalesced watcher events are dispatched.
    pub debounce_ms: u64,

    /// URL path of the reload event stream.
    pub reload_path: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8080,
            watch: true,
            debounce_ms: 300,
            reload_path: "/__kiln/reload".into(),
        }
    }
}

impl ServeConfig {
    pub(crate) fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.reload_path.starts_with('/') || self.reload_path.len() < 2 {
            diag.error_with_hint(
                "serve.reload_path",
                format!("`{}` is not an absolute URL path", self.reload_path),
                "use something like \"/__kiln/reload\"",
            );
        }
    }
}
