//! Reload message protocol.
//!
//! The browser side is an `EventSource`; every message reloads the page, so
//! the wire frame is always the same literal `data: reload`. The reason only
//! shows up in server logs.

/// Comment frame written when no message arrived for a while. Writing it
/// is what detects a client that went away.
pub const KEEP_ALIVE_FRAME: &[u8] = b": keep-alive\n\n";

/// First frame of a stream: reconnect delay for the browser.
pub const RETRY_FRAME: &[u8] = b"retry: 1000\n\n";

/// Signal that a rebuild batch completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadMessage {
    pub reason: String,
}

impl ReloadMessage {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Server-sent-events frame for this message.
    pub fn sse_frame(&self) -> &'static [u8] {
        b"data: reload\n\n"
    }
}
