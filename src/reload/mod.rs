//! Live reload over server-sent events.
//!
//! # Architecture
//!
//! ```text
//! RebuildActor --[batch done]--> ReloadHub --[per-client queue]--> stream --> EventSource
//! ```
//!
//! # Modules
//!
//! - `hub` - client registry and broadcast
//! - `message` - reload message and SSE frames
//! - `stream` - long-lived HTTP response per client

mod hub;
mod message;
mod stream;

pub use hub::ReloadHub;
pub use message::ReloadMessage;
pub use stream::serve_event_stream;
