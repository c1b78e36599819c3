use std::fs;
use std::path::Path;

use notify::{recommended_watcher, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use unitsync_sync::{PassReport, Reconciler};

use crate::config::DaemonConfig;
use crate::error::{io_err, DaemonError};
use crate::scheduler;

/// Receiving end of a directory watcher.
pub type WatchEvents = mpsc::UnboundedReceiver<notify::Result<Event>>;

/// Start the daemon and block the current thread until it exits.
pub fn start_blocking(config: DaemonConfig) -> Result<(), DaemonError> {
    init_tracing(config.log_json);
    build_runtime()?.block_on(run(config))
}

/// Run the daemon: watch `config.src` and reconcile until shutdown.
pub async fn run(config: DaemonConfig) -> Result<(), DaemonError> {
    if !config.src.exists() {
        fs::create_dir_all(&config.src).map_err(|e| io_err(&config.src, e))?;
    }

    let (watcher, events) = watch_directory(&config.src)?;
    tracing::info!(
        src = %config.src.display(),
        dest = %config.dest.display(),
        resync = ?config.resync,
        retry = ?config.retry,
        timeout = ?config.timeout,
        "watching unit directory",
    );

    let mut reconciler = Reconciler::new(&config.src, &config.dest, config.manager());
    let result =
        scheduler::run_loop(events, &mut reconciler, config.intervals(), shutdown_signal()).await;

    // Dropping the watcher tears down its backend thread and closes the channel.
    drop(watcher);
    result
}

/// Watch `dir` (non-recursively). Events are delivered until the returned
/// watcher is dropped.
pub fn watch_directory(dir: &Path) -> Result<(RecommendedWatcher, WatchEvents), DaemonError> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher: RecommendedWatcher = recommended_watcher(move |event| {
        let _ = event_tx.send(event);
    })?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    tracing::debug!(path = %dir.display(), "watching directory");
    Ok((watcher, event_rx))
}

/// Run a single reconciliation pass without watching.
pub async fn sync_once(config: &DaemonConfig) -> PassReport {
    let mut reconciler = Reconciler::new(&config.src, &config.dest, config.manager());
    reconciler.run_pass().await
}

/// Blocking wrapper around [`sync_once`] for the CLI.
pub fn sync_once_blocking(config: &DaemonConfig) -> Result<PassReport, DaemonError> {
    init_tracing(config.log_json);
    Ok(build_runtime()?.block_on(sync_once(config)))
}

fn build_runtime() -> Result<tokio::runtime::Runtime, DaemonError> {
    // Passes are serialized; a single thread is all the loop ever uses.
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))
}

async fn shutdown_signal() {
    tokio::select! {
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => tracing::info!("received ctrl-c, shutting down"),
            Err(err) => {
                tracing::warn!(error = %err, "ctrl-c handler failed");
                std::future::pending::<()>().await;
            }
        },
        () = terminate() => tracing::info!("received SIGTERM, shutting down"),
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(err) => {
            tracing::warn!(error = %err, "SIGTERM handler failed");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
