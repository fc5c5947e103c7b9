//! X11 Async Event Stream
//!
//! Non-blocking X11 event polling: a mio thread watches the connection's
//! socket and wakes the main loop, which then drains the events x11rb has
//! buffered.

use anyhow::{Context, Result};
use std::os::unix::io::AsRawFd;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, oneshot};
use x11rb::connection::Connection;
use x11rb::rust_connection::RustConnection;

use crate::wm::events::WmEvent;
use crate::wm::WmError;

/// X11 event stream with async polling support
pub struct X11EventStream {
    conn: Arc<RustConnection>,
    notify: Arc<Notify>,
    _task_guard: oneshot::Receiver<()>,
}

impl X11EventStream {
    /// Register the X11 socket with mio and start the polling thread. The
    /// thread exits once the stream is dropped.
    pub fn new(conn: Arc<RustConnection>) -> Result<Self> {
        let fd = conn.stream().as_raw_fd();
        let notify = Arc::new(Notify::new());
        let task_notify = notify.clone();

        let (guard, task_guard) = oneshot::channel::<()>();
        let mut poll = mio::Poll::new().context("Failed to create mio Poll")?;
        let mut events = mio::Events::with_capacity(1);

        poll.registry()
            .register(
                &mut mio::unix::SourceFd(&fd),
                mio::Token(0),
                mio::Interest::READABLE,
            )
            .context("Failed to register X11 FD with mio")?;

        let timeout = Duration::from_millis(100);
        tokio::task::spawn_blocking(move || loop {
            if guard.is_closed() {
                tracing::debug!("X11 socket polling thread shutting down");
                return;
            }

            if let Err(err) = poll.poll(&mut events, Some(timeout)) {
                tracing::warn!("X11 socket poll failed: {:?}", err);
                continue;
            }

            events
                .iter()
                .filter(|event| event.token() == mio::Token(0))
                .for_each(|_| task_notify.notify_one());
        });

        Ok(Self {
            conn,
            notify,
            _task_guard: task_guard,
        })
    }

    /// Next buffered event the window manager consumes, skipping the kinds it
    /// has no use for. `None` once the buffer is empty.
    pub fn poll_next_event(&self) -> Result<Option<WmEvent>, WmError> {
        while let Some(event) = self.conn.poll_for_event()? {
            if let Some(event) = WmEvent::from_x11(event) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    /// Wait until the X11 socket becomes readable.
    pub async fn wait_readable(&self) {
        self.notify.notified().await;
    }
}
