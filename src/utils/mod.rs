//! Utility modules shared across the build engine.

pub mod mime;
pub mod path;
