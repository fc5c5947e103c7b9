//! Window Manager Module
//!
//! The window management core: adoption of top-level windows into bordered
//! containers, pointer driven move/resize/focus, and the dispatcher that
//! drives both from the server's event stream. Everything talks to the
//! server through [`XConn`], and a single owner mutates the state.

pub mod adoption;
pub mod client;
pub mod conn;
pub mod decorations;
pub mod display;
pub mod error;
pub mod events;
pub mod ewmh;
pub mod focus;
pub mod hints;
pub mod moveresize;
pub mod registry;
pub mod terminate;

#[cfg(test)]
pub mod testing;

use tracing::{debug, info, trace, warn};
use x11rb::protocol::xproto::Window;

use crate::config::{BehaviorConfig, WindowManagerConfig};
use crate::shared::Geometry;
use crate::wm::client::ManagedWindow;
use crate::wm::conn::{GrabRelease, Result, WindowChanges, XConn};
use crate::wm::decorations::ContainerStyle;
use crate::wm::events::{ButtonEvent, WmEvent};
use crate::wm::focus::FocusManager;
use crate::wm::registry::Registry;

pub use adoption::Adoption;
pub use error::WmError;

/// Whether the main loop keeps going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Shutdown,
}

pub struct WindowManager<C: XConn> {
    conn: C,
    registry: Registry,
    focus: FocusManager,
    style: ContainerStyle,
    behavior: BehaviorConfig,
}

impl<C: XConn> WindowManager<C> {
    /// Take over the root window: select the events the core consumes and
    /// advertise the supported hints.
    pub fn new(conn: C, config: &WindowManagerConfig) -> Result<Self> {
        info!("Initializing window manager (root=0x{:x})", conn.root());

        conn.select_root_events()?;
        conn.advertise_supported()?;
        conn.flush()?;

        Ok(Self {
            conn,
            registry: Registry::new(),
            focus: FocusManager::new(),
            style: ContainerStyle::from(&config.border),
            behavior: config.behavior.clone(),
        })
    }

    pub fn conn(&self) -> &C {
        &self.conn
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn focused(&self) -> Option<Window> {
        self.focus.focused()
    }

    /// Adopt the top-level windows that were already mapped before the
    /// manager started, then pick up the server's current input focus.
    pub fn scan_windows(&mut self) -> Result<usize> {
        if !self.behavior.adopt_existing {
            debug!("Startup scan disabled");
            return Ok(0);
        }

        let children = self.conn.query_tree(self.conn.root())?;
        debug!("Startup scan: {} top-level windows", children.len());

        let mut adopted = 0;
        for child in children {
            let viewable = match self.conn.get_window_attributes(child) {
                Ok(attrs) => attrs.viewable,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    debug!("Startup scan: skipping 0x{:x}: {}", child, e);
                    continue;
                }
            };
            if !viewable {
                continue;
            }
            if let Adoption::Adopted { .. } = self.try_adopt(child)? {
                adopted += 1;
            }
        }

        self.sync_focus()?;
        self.conn.flush()?;
        info!("Startup scan adopted {} windows", adopted);
        Ok(adopted)
    }

    /// Process one event. Only transport failures come back as errors;
    /// anything else is logged and the event dropped.
    pub fn handle_event(&mut self, event: WmEvent) -> Result<Flow> {
        match self.dispatch(event) {
            Err(WmError::UnknownWindow(window)) => {
                trace!("Pointer event for unmanaged window 0x{:x}", window);
                Ok(Flow::Continue)
            }
            Err(e) if !e.is_fatal() => {
                warn!("Event handling failed: {}", e);
                Ok(Flow::Continue)
            }
            other => other,
        }
    }

    fn dispatch(&mut self, event: WmEvent) -> Result<Flow> {
        match event {
            WmEvent::ButtonPress(e) => self.on_button_press(&e)?,
            WmEvent::ButtonRelease(e) => self.end_gesture(e.window, e.button, e.time)?,
            WmEvent::Motion(e) => self.update_gesture(e.window, e.root)?,
            WmEvent::MapNotify { event, window } => {
                debug!("MapNotify: 0x{:x} (event 0x{:x})", window, event);
                self.try_adopt(window)?;
            }
            WmEvent::DestroyNotify { event, window } => {
                debug!("DestroyNotify: 0x{:x} (event 0x{:x})", window, event);
                self.try_disown(window, None)?;
            }
            WmEvent::ConfigureNotify {
                event,
                window,
                geometry,
            } => self.keep_in_container(event, window, geometry)?,
            WmEvent::UnmapNotify { event, window } => {
                debug!("UnmapNotify: 0x{:x} (event 0x{:x})", window, event);
            }
            WmEvent::CreateNotify {
                parent,
                window,
                geometry,
                override_redirect,
            } => {
                debug!(
                    "CreateNotify: 0x{:x} in 0x{:x} at {:?} (override_redirect={})",
                    window, parent, geometry, override_redirect
                );
            }
            WmEvent::ReparentNotify { window, parent } => {
                debug!("ReparentNotify: 0x{:x} -> 0x{:x}", window, parent);
            }
            WmEvent::FocusIn { window } => debug!("FocusIn: 0x{:x}", window),
            WmEvent::FocusOut { window } => debug!("FocusOut: 0x{:x}", window),
            WmEvent::ClientMessage {
                window,
                message_type,
            } => {
                let name = match self.conn.atom_name(message_type) {
                    Ok(name) => name,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(_) => format!("atom {}", message_type),
                };
                debug!("ClientMessage: {} for 0x{:x}", name, window);
            }
            WmEvent::XError { request, detail } => {
                warn!("X11 error for {}: {}", request, detail);
            }
            WmEvent::Shutdown => {
                info!("Shutdown requested");
                return Ok(Flow::Shutdown);
            }
        }
        Ok(Flow::Continue)
    }

    fn on_button_press(&mut self, event: &ButtonEvent) -> Result<()> {
        let Some(window) = self.registry.lookup(event.window) else {
            debug!("ButtonPress on unmanaged window 0x{:x}, clearing focus", event.window);
            let result = self.focus.clear_focus(&self.conn, &self.registry, &self.style, event.time);
            return self.release_grab(event, GrabRelease::Replay).and(result);
        };
        let container = window.container;

        // A press on client content only raises and focuses; the client
        // still gets the click.
        let on_content = event.child != x11rb::NONE && event.child != container;
        let (result, release) = if on_content {
            (self.raise_and_focus(container, event.time), GrabRelease::Replay)
        } else {
            (self.begin_gesture(container, event.button, event.root), GrabRelease::Consume)
        };

        // The pointer stays frozen until the grab is released, so release it
        // even when handling failed.
        self.release_grab(event, release)?;
        result
    }

    fn release_grab(&self, event: &ButtonEvent, release: GrabRelease) -> Result<()> {
        if event.button == 1 {
            self.conn.allow_events(release, event.time)?;
        }
        Ok(())
    }

    fn raise_and_focus(&mut self, container: Window, time: u32) -> Result<()> {
        self.focus.raise(&self.conn, container)?;
        self.focus
            .set_focus(&self.conn, &self.registry, &self.style, container, time)
    }

    /// Clients may try to move themselves inside their container; put them
    /// back at the origin.
    fn keep_in_container(&mut self, event: Window, window: Window, geometry: Geometry) -> Result<()> {
        let drifted = self
            .registry
            .lookup(window)
            .is_some_and(|w| w.target == window && w.container == event)
            && (geometry.x, geometry.y) != (0, 0);

        if drifted {
            debug!(
                "Target 0x{:x} drifted to ({}, {}) inside its container, resetting",
                window, geometry.x, geometry.y
            );
            self.conn
                .configure_window(window, &WindowChanges::new().position(0, 0))?;
        }
        Ok(())
    }

    /// Pick up the input focus the server reports if it is a managed target.
    fn sync_focus(&mut self) -> Result<()> {
        let focus = match self.conn.get_input_focus() {
            Ok(focus) => focus,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                debug!("Could not read input focus: {}", e);
                return Ok(());
            }
        };

        if self.registry.by_target(focus).is_some() {
            self.focus.set_focus(
                &self.conn,
                &self.registry,
                &self.style,
                focus,
                x11rb::CURRENT_TIME,
            )?;
        }
        Ok(())
    }

    /// Current container geometry, falling back to the cached one when the
    /// server cannot be asked.
    fn container_geometry(&self, window: &ManagedWindow) -> Result<Geometry> {
        match self.conn.get_geometry(window.container) {
            Ok(geometry) => Ok(geometry),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                debug!(
                    "Using cached geometry for container 0x{:x}: {}",
                    window.container, e
                );
                Ok(window.geometry)
            }
        }
    }
}

/// Log a failed request that the caller can live without. Transport
/// failures still propagate.
fn recover(result: Result<()>, what: &str, window: Window) -> Result<()> {
    match result {
        Err(e) if !e.is_fatal() => {
            warn!("Failed to {} for 0x{:x}: {}", what, window, e);
            Ok(())
        }
        other => other,
    }
}
