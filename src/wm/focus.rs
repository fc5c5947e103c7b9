//! Focus Module
//!
//! Click-to-focus and stacking. At most one managed window is focused; its
//! container wears the active border color, every other container the
//! inactive one.

use tracing::debug;
use x11rb::protocol::xproto::{Timestamp, Window};

use crate::wm::conn::{Result, WindowChanges, XConn};
use crate::wm::decorations::ContainerStyle;
use crate::wm::registry::Registry;

/// Focus manager
#[derive(Debug, Default)]
pub struct FocusManager {
    /// Target id of the focused window
    focused: Option<Window>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<Window> {
        self.focused
    }

    /// Give input focus to the managed window owning `id` (target or
    /// container) and repaint the old and new borders.
    pub fn set_focus<C: XConn>(
        &mut self,
        conn: &C,
        registry: &Registry,
        style: &ContainerStyle,
        id: Window,
        time: Timestamp,
    ) -> Result<()> {
        let Some(window) = registry.lookup(id) else {
            debug!("Focus: window 0x{:x} is not managed, ignoring", id);
            return Ok(());
        };
        let (target, container) = (window.target, window.container);

        if let Some(previous) = self.focused.filter(|&w| w != target) {
            self.paint(conn, registry, style, previous, false)?;
        }

        conn.set_input_focus(target, time)?;
        conn.set_border_color(container, style.border_color(true))?;
        self.focused = Some(target);
        debug!("Focus: 0x{:x} (container 0x{:x})", target, container);
        Ok(())
    }

    /// Drop focus from whatever managed window holds it and hand input focus
    /// back to the root window.
    pub fn clear_focus<C: XConn>(
        &mut self,
        conn: &C,
        registry: &Registry,
        style: &ContainerStyle,
        time: Timestamp,
    ) -> Result<()> {
        let Some(previous) = self.focused.take() else {
            return Ok(());
        };

        self.paint(conn, registry, style, previous, false)?;
        conn.set_input_focus(conn.root(), time)?;
        debug!("Focus: cleared (was 0x{:x})", previous);
        Ok(())
    }

    /// Forget `target` if it holds focus. Its container is already gone, so
    /// nothing is repainted.
    pub fn forget(&mut self, target: Window) -> bool {
        if self.focused == Some(target) {
            self.focused = None;
            true
        } else {
            false
        }
    }

    /// Move a container to the top of the stacking order.
    pub fn raise<C: XConn>(&self, conn: &C, container: Window) -> Result<()> {
        conn.configure_window(container, &WindowChanges::new().raise())
    }

    fn paint<C: XConn>(
        &self,
        conn: &C,
        registry: &Registry,
        style: &ContainerStyle,
        target: Window,
        focused: bool,
    ) -> Result<()> {
        match registry.by_target(target) {
            Some(window) => conn.set_border_color(window.container, style.border_color(focused)),
            None => Ok(()),
        }
    }
}
