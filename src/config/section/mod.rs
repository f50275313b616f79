//! Configuration section definitions.
//!
//! Each module corresponds to a section in `kiln.toml`:
//!
//! | Module  | TOML Section | Purpose                                |
//! |---------|--------------|----------------------------------------|
//! | `build` | `[build]`    | Source/output trees, reserved subtrees |
//! | `serve` | `[serve]`    | Development server and watcher         |

mod build;
mod serve;

pub use build::BuildConfig;
pub use serve::ServeConfig;
