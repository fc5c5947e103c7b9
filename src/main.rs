//! borderwm
//!
//! A minimal reparenting X11 window manager: every application window gets a
//! bordered container that can be moved with button 1 and resized with
//! button 3.

mod config;
mod shared;
mod wm;
mod x11_async;

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::wm::display::X11Conn;
use crate::wm::events::WmEvent;
use crate::wm::{Flow, WindowManager, WmError};
use crate::x11_async::X11EventStream;

/// Feed server events and the shutdown request through one queue until
/// either a shutdown or a fatal error.
async fn run(
    wm: &mut WindowManager<X11Conn>,
    stream: &X11EventStream,
    shutdown_rx: &mut mpsc::Receiver<()>,
) -> Result<(), WmError> {
    use crate::wm::conn::XConn;

    let mut queue: VecDeque<WmEvent> = VecDeque::new();

    loop {
        // Flush at the top of each iteration so requests issued while
        // handling a batch go out together.
        wm.conn().flush()?;

        if let Some(event) = queue.pop_front() {
            if wm.handle_event(event)? == Flow::Shutdown {
                return Ok(());
            }
            continue;
        }

        while let Some(event) = stream.poll_next_event()? {
            queue.push_back(event);
        }
        if !queue.is_empty() {
            continue;
        }

        tokio::select! {
            () = stream.wait_readable() => {}
            _ = shutdown_rx.recv() => queue.push_back(WmEvent::Shutdown),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "borderwm=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting borderwm");

    let config = Config::load().context("Failed to load configuration")?;

    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
                _ = sigint.recv() => info!("Received SIGINT, shutting down gracefully"),
            }
            let _ = shutdown_tx.send(()).await;
        });
    }

    let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X server")?;
    let conn = Arc::new(conn);
    info!("Connected to X server (screen {})", screen_num);

    let display = X11Conn::new(conn.clone(), screen_num)?;
    let mut wm = WindowManager::new(display, &config.window_manager)
        .context("Failed to initialize window manager")?;
    let stream = X11EventStream::new(conn)?;

    let result = match wm.scan_windows() {
        Ok(_) => {
            info!("Managing {} windows", wm.registry().len());
            if let Some(target) = wm.focused() {
                debug!("Focus starts on 0x{:x}", target);
            }
            run(&mut wm, &stream, &mut shutdown_rx).await
        }
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        error!("Window manager stopped: {}", e);
    }

    if let Err(e) = wm.teardown() {
        error!("Teardown failed: {}", e);
    }
    info!("borderwm exited");

    result.context("X11 connection lost")
}
