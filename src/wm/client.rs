use x11rb::protocol::xproto::Window;

use crate::shared::{Geometry, Point};

/// An in-progress button 1 move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    /// Set once the pointer actually moved; a release without it is a click.
    pub moved: bool,
    /// Pointer position of the previous motion event (root coordinates).
    pub anchor: Point,
    /// Container position when the gesture started.
    pub origin: Point,
}

/// An in-progress button 3 resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeState {
    /// Pointer position at the press (root coordinates).
    pub anchor: Point,
    pub start_width: u32,
    pub start_height: u32,
}

/// Pointer gesture a window is currently part of. Move and resize never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(DragState),
    Resizing(ResizeState),
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}

/// A client window the manager has adopted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedWindow {
    /// The client's own toplevel window
    pub target: Window,

    /// Manager-owned window carrying the border; parent of `target`
    pub container: Window,

    /// Last known container geometry. The manager is the only one moving
    /// containers, so this is kept current without asking the server.
    pub geometry: Geometry,

    pub gesture: Gesture,
}

impl ManagedWindow {
    pub fn new(target: Window, container: Window, geometry: Geometry) -> Self {
        Self {
            target,
            container,
            geometry,
            gesture: Gesture::Idle,
        }
    }

    pub fn last_position(&self) -> Point {
        self.geometry.position()
    }
}
