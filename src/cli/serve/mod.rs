//! Development server with live reload support.
//!
//! ```text
//! bind ──► load registry ──► attach watcher ──► full render ──► actors + request loop
//! ```
//!
//! Ordinary requests run on a small rayon pool. Every reload stream gets its
//! own thread, since it stays open for the life of the page.

mod content;
mod lifecycle;
mod path;
mod response;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Request, Server};

use crate::actor::Coordinator;
use crate::cli::build::{prepare_output, render_site};
use crate::config::SiteConfig;
use crate::core::{is_shutdown, register_server};
use crate::registry::SiteState;
use crate::reload::{ReloadHub, serve_event_stream};
use crate::{debug, log};

/// Worker threads for ordinary requests.
const REQUEST_THREADS: usize = 4;

/// Immutable per-server request context.
struct ServeContext {
    output: PathBuf,
    /// `Some` when watching: reload endpoint and the script that uses it
    reload: Option<ReloadEndpoint>,
    hub: Arc<ReloadHub>,
}

struct ReloadEndpoint {
    path: String,
    script: String,
}

/// Build once, then serve the destination tree until Ctrl+C.
pub fn serve_site(config: &SiteConfig) -> Result<()> {
    let build = config.build.clone();
    let serve = &config.serve;

    let (server, addr) = lifecycle::bind_with_retry(serve.interface, serve.port)?;
    let server = Arc::new(server);
    let hub = Arc::new(ReloadHub::new());

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_server(Arc::clone(&server), shutdown_tx, Arc::clone(&hub));

    prepare_output(&build)?;
    let state = Arc::new(SiteState::new(build.clone())?);
    state.snapshot().require_default_layout(&build)?;

    // Watcher first: changes made during the initial render are queued.
    let attached = if serve.watch {
        let attached = Coordinator::new(Arc::clone(&state), Arc::clone(&hub), serve.debounce_ms)
            .with_shutdown_signal(shutdown_rx)
            .attach()?;
        Some(attached)
    } else {
        None
    };

    render_site(&build, &state.snapshot(), false)?;
    log_address(addr, serve.watch);

    let actor_handle = attached.map(lifecycle::spawn_actors);

    let ctx = Arc::new(ServeContext {
        output: build.output.clone(),
        reload: serve.watch.then(|| ReloadEndpoint {
            path: serve.reload_path.clone(),
            script: content::reload_script(&serve.reload_path),
        }),
        hub,
    });
    run_request_loop(&server, ctx)?;

    lifecycle::wait_for_shutdown(actor_handle);
    Ok(())
}

fn log_address(addr: SocketAddr, watch: bool) {
    log!("serve"; "http://{}", addr);
    if watch {
        debug!("serve"; "watching for changes");
    }
}

fn run_request_loop(server: &Server, ctx: Arc<ServeContext>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .thread_name(|i| format!("kiln-http-{i}"))
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let ctx = Arc::clone(&ctx);

        if !is_shutdown() && is_reload_request(&request, &ctx) {
            thread::spawn(move || serve_event_stream(request, &ctx.hub));
            continue;
        }

        pool.spawn(move || {
            if let Err(e) = handle_request(request, &ctx) {
                debug!("serve"; "request error: {e:#}");
            }
        });
    }
    Ok(())
}

fn is_reload_request(request: &Request, ctx: &ServeContext) -> bool {
    ctx.reload
        .as_ref()
        .is_some_and(|r| path::request_path(request.url()) == r.path)
}

/// Handle a single ordinary HTTP request.
fn handle_request(request: Request, ctx: &ServeContext) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    let script = ctx.reload.as_ref().map(|r| r.script.as_str());
    match path::resolve_path(request.url(), &ctx.output) {
        Some(file) => response::respond_file(request, &file, script),
        None => response::respond_not_found(request),
    }
}
