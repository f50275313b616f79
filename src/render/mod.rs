//! Render pipeline: one content unit in, one output file out.
//!
//! # Module Structure
//!
//! ```text
//! render/
//! ├── route.rs        # Source → destination path mapping
//! ├── frontmatter.rs  # `---`/`+++` metadata split
//! ├── markdown.rs     # pulldown-cmark conversion
//! ├── snippet.rs      # `<Name></Name>` substitution
//! ├── layout.rs       # Placeholder wrapping
//! └── mod.rs          # render / render_to_disk (this file)
//! ```
//!
//! # Steps
//!
//! ```text
//! source ──► route ──► page? ──no──► bytes unchanged
//!                        │
//!                       yes
//!                        ▼
//!            front matter split ──► markdown? ──► snippets ──► layout
//! ```
//!
//! Rendering only reads the registry snapshot it is handed. Failures to read
//! a layout or snippet become warnings and the output degrades instead of
//! failing.

pub mod frontmatter;
mod layout;
mod markdown;
mod route;
mod snippet;

pub use frontmatter::FrontMatter;
pub use route::destination_for;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::config::BuildConfig;
use crate::core::PageKind;
use crate::registry::Registry;
use markdown::MarkdownOptions;

/// Output of a single render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub destination: PathBuf,
    pub bytes: Vec<u8>,
    /// Layout/snippet problems that degraded the output.
    pub warnings: Vec<String>,
}

/// Result of writing a render to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub destination: PathBuf,
    /// `false` when the destination already held identical bytes.
    pub changed: bool,
}

/// Render `raw` (the bytes of `source`) against a registry snapshot.
pub fn render(
    build: &BuildConfig,
    registry: &Registry,
    source: &Path,
    raw: Vec<u8>,
) -> Result<Rendered> {
    let destination = destination_for(build, source)
        .ok_or_else(|| anyhow!("{} is outside the source tree", source.display()))?;

    let Some(kind) = PageKind::from_path(source) else {
        return Ok(Rendered {
            destination,
            bytes: raw,
            warnings: Vec::new(),
        });
    };

    let mut warnings = Vec::new();
    let content = String::from_utf8_lossy(&raw);
    let (meta, body) = frontmatter::split(&content);

    let converted = match kind {
        PageKind::Markdown => markdown::to_html(body, &MarkdownOptions::all()),
        PageKind::Markup => body.to_string(),
    };
    let body = snippet::substitute(&converted, &registry.snippets, &mut warnings);
    let html = layout::wrap(
        &body,
        registry.resolve_layout(&meta),
        &build.placeholder,
        &mut warnings,
    );

    Ok(Rendered {
        destination,
        bytes: html.into_bytes(),
        warnings,
    })
}

/// Read, render and write one content unit.
///
/// The destination is only written when its bytes change.
pub fn render_to_disk(
    build: &BuildConfig,
    registry: &Registry,
    source: &Path,
) -> Result<RenderOutcome> {
    let raw = fs::read(source).with_context(|| format!("failed to read {}", source.display()))?;
    let rendered = render(build, registry, source, raw)?;

    for warning in &rendered.warnings {
        crate::log!("render"; "{}: {}", relative(build, source).display(), warning);
    }

    let destination = rendered.destination;
    if fs::read(&destination).is_ok_and(|existing| existing == rendered.bytes) {
        return Ok(RenderOutcome {
            destination,
            changed: false,
        });
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&destination, &rendered.bytes)
        .with_context(|| format!("failed to write {}", destination.display()))?;

    crate::debug!("render"; "{} -> {}", relative(build, source).display(), destination.display());
    Ok(RenderOutcome {
        destination,
        changed: true,
    })
}

/// Remove the destination of a deleted source (file or directory).
///
/// Returns `false` when there was nothing to remove.
pub fn remove_output(build: &BuildConfig, source: &Path) -> Result<bool> {
    let Some(destination) = destination_for(build, source) else {
        return Ok(false);
    };
    if destination == build.output {
        return Ok(false);
    }

    let result = if destination.is_dir() {
        fs::remove_dir_all(&destination)
    } else {
        fs::remove_file(&destination)
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("failed to remove {}", destination.display())),
    }
}

/// Create the destination directory of a source directory.
pub fn mirror_dir(build: &BuildConfig, dir: &Path) -> Result<PathBuf> {
    let destination = destination_for(build, dir)
        .ok_or_else(|| anyhow!("{} is outside the source tree", dir.display()))?;
    fs::create_dir_all(&destination)
        .with_context(|| format!("failed to create {}", destination.display()))?;
    Ok(destination)
}

fn relative<'a>(build: &BuildConfig, path: &'a Path) -> &'a Path {
    path.strip_prefix(&build.source).unwrap_or(path)
}
