//! Actor Message Definitions
//!
//! ```text
//! FsActor --Event--> RebuildActor --broadcast--> ReloadHub
//! ```

use super::fs::FsEvent;

/// Messages to Rebuild Actor
#[derive(Debug)]
pub enum RebuildMsg {
    /// One coalesced filesystem change, processed as one batch
    Event(FsEvent),
    /// Stop after the batch in flight
    Shutdown,
}
