//! Full site build.
//!
//! Build phases:
//! - **Init** - Optional clean, registry load, default layout check
//! - **Collect** - Walk the source tree for directories and content units
//! - **Render** - Mirror directories, then render every unit in parallel
//! - **Finalize** - Summary logging

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;

use crate::config::BuildConfig;
use crate::core::PageKind;
use crate::logger::ProgressLine;
use crate::registry::{ContentTree, Registry, scan_content};
use crate::render;

/// Counts of one full render.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub pages: usize,
    pub assets: usize,
    /// Units whose output bytes changed
    pub written: usize,
    pub failed: usize,
}

/// Build the entire site.
///
/// Fatal when the layouts subtree or the default layout is missing.
pub fn build_site(build: &BuildConfig, quiet: bool) -> Result<(Registry, BuildStats)> {
    prepare_output(build)?;
    let registry = load_registry(build)?;
    let stats = render_site(build, &registry, quiet)?;
    Ok((registry, stats))
}

/// Clean (with `--clean`) and create the output directory.
pub fn prepare_output(build: &BuildConfig) -> Result<()> {
    if build.output == build.source {
        bail!("output directory must differ from the source directory");
    }

    if build.clean && build.output.exists() {
        fs::remove_dir_all(&build.output).with_context(|| {
            format!("failed to clean output directory {}", build.output.display())
        })?;
        crate::debug!("build"; "cleaned {}", build.output.display());
    }

    fs::create_dir_all(&build.output)
        .with_context(|| format!("failed to create output directory {}", build.output.display()))
}

/// Scan layouts, snippets and the graph, and require the default layout.
fn load_registry(build: &BuildConfig) -> Result<Registry> {
    let registry = Registry::load(build)?;
    registry.require_default_layout(build)?;
    crate::debug!(
        "build";
        "{} layouts, {} snippets",
        registry.layouts.len(),
        registry.snippets.len()
    );
    Ok(registry)
}

/// Mirror every directory and render every content unit.
///
/// Render failures are logged per file and counted; the build goes on.
pub fn render_site(build: &BuildConfig, registry: &Registry, quiet: bool) -> Result<BuildStats> {
    let ContentTree { dirs, files } = scan_content(build, &build.source);

    for dir in &dirs {
        render::mirror_dir(build, dir)?;
    }

    let pages = files.iter().filter(|f| PageKind::is_page(f)).count();
    let mut stats = BuildStats {
        pages,
        assets: files.len() - pages,
        ..BuildStats::default()
    };

    let progress = (!quiet).then(|| ProgressLine::new(&[("pages", pages), ("assets", stats.assets)]));
    let written = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    files.par_iter().for_each(|path| {
        match render::render_to_disk(build, registry, path) {
            Ok(outcome) if outcome.changed => {
                written.fetch_add(1, Ordering::Relaxed);
            }
            Ok(_) => {}
            Err(e) => {
                failed.fetch_add(1, Ordering::Relaxed);
                crate::log!("error"; "{}: {:#}", relative(build, path).display(), e);
            }
        }
        if let Some(p) = &progress {
            p.inc(if PageKind::is_page(path) { "pages" } else { "assets" });
        }
    });

    if let Some(p) = progress {
        p.finish();
    }

    stats.written = written.into_inner();
    stats.failed = failed.into_inner();

    if !quiet {
        crate::log!(
            "build";
            "{} pages, {} assets -> {} ({} written{})",
            stats.pages,
            stats.assets,
            build.output.display(),
            stats.written,
            if stats.failed > 0 { format!(", {} failed", stats.failed) } else { String::new() }
        );
    }
    Ok(stats)
}

fn relative<'a>(build: &BuildConfig, path: &'a Path) -> &'a Path {
    path.strip_prefix(&build.source).unwrap_or(path)
}
