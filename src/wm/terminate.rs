//! Terminate Module
//!
//! Undoing every adoption when the manager exits, so clients survive it
//! undecorated at the place they were last shown.

use tracing::{info, warn};

use crate::wm::client::ManagedWindow;
use crate::wm::conn::{Result, XConn};
use crate::wm::WindowManager;

impl<C: XConn> WindowManager<C> {
    /// Put every managed target back on the root window at its container's
    /// position and destroy the containers. Failures are logged and the
    /// remaining windows still released.
    pub fn teardown(&mut self) -> Result<()> {
        if self.registry.is_empty() {
            info!("Teardown: no managed windows");
            return self.conn.flush();
        }

        let windows = self.registry.drain();
        info!("Teardown: releasing {} windows", windows.len());

        let mut failed = 0;
        for window in &windows {
            self.focus.forget(window.target);
            if let Err(e) = self.release(window) {
                warn!("Teardown: failed to release 0x{:x}: {}", window.target, e);
                failed += 1;
            }
        }

        if failed > 0 {
            warn!("Teardown: {} of {} windows not fully released", failed, windows.len());
        }
        self.conn.flush()
    }

    fn release(&self, window: &ManagedWindow) -> Result<()> {
        let geometry = self.container_geometry(window)?;
        // A container still holding its target is left for the server: on
        // disconnect save-set members go back to the root before it is
        // destroyed.
        self.conn
            .reparent_window(window.target, self.conn.root(), geometry.x, geometry.y)?;
        self.conn.remove_from_save_set(window.target)?;
        self.conn.destroy_window(window.container)
    }
}
