//! Protocol client abstraction
//!
//! Everything the window management core needs from the X server, expressed
//! as blocking request/reply calls. [`display::X11Conn`](super::display::X11Conn)
//! implements it over x11rb; tests use an in-memory fake.

use x11rb::protocol::xproto::{Atom, Timestamp, Window};

use crate::shared::Geometry;
use crate::wm::decorations::ContainerStyle;
use crate::wm::error::WmError;
use crate::wm::ewmh::WindowType;
use crate::wm::hints::WmClass;

pub type Result<T> = std::result::Result<T, WmError>;

/// The subset of window attributes adoption looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowAttributes {
    pub override_redirect: bool,
    pub viewable: bool,
}

/// Requested changes for a configure request. Unset fields are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowChanges {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub raise: bool,
}

impl WindowChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, x: i32, y: i32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn raise(mut self) -> Self {
        self.raise = true;
        self
    }
}

/// How a frozen synchronous pointer grab is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabRelease {
    /// Forward the press to the client as if the grab never happened.
    Replay,
    /// Keep the press for the manager and thaw the pointer.
    Consume,
}

/// Blocking X11 protocol client used by the window manager.
pub trait XConn {
    fn root(&self) -> Window;

    // Queries
    fn get_geometry(&self, window: Window) -> Result<Geometry>;
    fn get_window_attributes(&self, window: Window) -> Result<WindowAttributes>;
    fn query_tree(&self, window: Window) -> Result<Vec<Window>>;
    fn get_input_focus(&self) -> Result<Window>;

    // Window lifecycle
    /// Create a top-level container window owned by the manager.
    fn create_container(&self, geometry: Geometry, style: &ContainerStyle) -> Result<Window>;
    fn destroy_window(&self, window: Window) -> Result<()>;
    fn map_window(&self, window: Window) -> Result<()>;
    fn reparent_window(&self, window: Window, parent: Window, x: i32, y: i32) -> Result<()>;
    fn configure_window(&self, window: Window, changes: &WindowChanges) -> Result<()>;
    fn set_border_color(&self, window: Window, color: u32) -> Result<()>;
    fn add_to_save_set(&self, window: Window) -> Result<()>;
    fn remove_from_save_set(&self, window: Window) -> Result<()>;

    // Input
    /// Install a passive synchronous grab for `button` on `window`.
    fn grab_button(&self, window: Window, button: u8) -> Result<()>;
    fn allow_events(&self, release: GrabRelease, time: Timestamp) -> Result<()>;
    fn set_input_focus(&self, window: Window, time: Timestamp) -> Result<()>;

    // Properties
    /// `WM_CLASS`, or `None` when the window does not set a usable one.
    fn window_class(&self, window: Window) -> Result<Option<WmClass>>;
    /// `_NET_WM_WINDOW_TYPE`; a window without the property reports `[Normal]`.
    fn window_types(&self, window: Window) -> Result<Vec<WindowType>>;
    fn transient_for(&self, window: Window) -> Result<Option<Window>>;
    fn window_group(&self, window: Window) -> Result<Option<Window>>;
    fn window_name(&self, window: Window) -> Result<String>;
    fn atom_name(&self, atom: Atom) -> Result<String>;

    // Root setup
    /// Publish `_NET_SUPPORTED` on the root window.
    fn advertise_supported(&self) -> Result<()>;
    fn select_root_events(&self) -> Result<()>;

    fn flush(&self) -> Result<()>;
}
