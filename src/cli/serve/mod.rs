//! Preview server with hot update support.
//!
//! ```text
//! browser ──HTTP──► tiny_http (rayon pool) ──► serve.root files, client.js, welcome page
//!    ▲
//!    └──WebSocket── WsActor ◄── HotUpdateActor ◄── FsActor (notify)
//! ```

mod lifecycle;
mod path;
mod response;

use crate::{
    config::{ProjectConfig, cfg},
    debug,
    embed::serve::CLIENT_PATH,
    log,
};
use anyhow::{Context, Result};
use crossbeam::channel;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use tiny_http::{Request, Server};

/// Worker threads answering HTTP requests.
const REQUEST_THREADS: usize = 4;

/// WebSocket port the client script connects to.
///
/// Starts at the configured port and is updated once the hot update
/// server binds, which may pick a later port when the first is taken.
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(0);

/// Record the port the WebSocket server actually bound.
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

fn actual_ws_port() -> u16 {
    ACTUAL_WS_PORT.load(Ordering::Relaxed)
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    ws_port: Option<u16>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server without starting the request loop.
pub fn bind_server(config: &ProjectConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let ws_port = config.serve.watch.then(|| config.serve.ws_port());
    if let Some(port) = ws_port {
        set_actual_ws_port(port);
        debug!("ws"; "requested ws port {}", port);
    }

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        ws_port,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start the actors and the request loop (blocking).
    pub fn run(self) -> Result<()> {
        let actor_handle = lifecycle::spawn_actors(self.ws_port, self.shutdown_rx);
        crate::core::set_serving();
        let result = run_request_loop(&self.server, self.ws_port.is_some());
        lifecycle::wait_for_shutdown(actor_handle);
        result
    }
}

/// Entry point for `modkit serve`.
pub fn run() -> Result<()> {
    let config = cfg();
    if !config.serve.root.is_dir() {
        log!(
            "serve";
            "preview root {} does not exist yet",
            config.root_relative(&config.serve.root).display()
        );
    }
    bind_server(&config)?.run()
}

fn run_request_loop(server: &Server, hot_update: bool) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("Failed to create request thread pool")?;

    for request in server.incoming_requests() {
        pool.spawn(move || {
            let config = cfg();
            let ws_port = hot_update.then(actual_ws_port);
            if let Err(e) = handle_request(request, &config, ws_port) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &ProjectConfig, ws_port: Option<u16>) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    if let Some(port) = ws_port
        && path::strip_query(request.url()) == CLIENT_PATH
    {
        return response::respond_client_js(request, port);
    }

    let root = &config.serve.root;
    if let Some(file) = path::resolve_path(request.url(), root) {
        return response::respond_file(request, &file, ws_port.is_some());
    }

    if path::is_root_url(request.url()) {
        let shown = config.root_relative(root);
        return response::respond_welcome(request, &shown.display().to_string(), ws_port.is_some());
    }

    response::respond_not_found(request, root, ws_port.is_some())
}
