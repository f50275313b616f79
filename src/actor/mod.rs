//! Actor system for watch mode.
//!
//! ```text
//! ┌─────────┐  RebuildMsg  ┌──────────────┐  ReloadMessage  ┌───────────┐
//! │ FsActor │ ───────────► │ RebuildActor │ ──────────────► │ ReloadHub │
//! └─────────┘              └──────────────┘                 └───────────┘
//!   notify                   registry refresh,                SSE clients
//!   debounce                 rayon render batch
//! ```
//!
//! Events are dispatched strictly one at a time; the reload for an event is
//! only broadcast once all of its renders have been joined.

mod coordinator;
pub mod fs;
pub mod messages;
pub mod rebuild;

pub use coordinator::{Attached, Coordinator};
