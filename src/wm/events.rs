//! Events Module
//!
//! The event kinds the window manager consumes, decoupled from x11rb's
//! `Event` so the dispatcher can match exhaustively and tests can build
//! events directly. `Shutdown` never comes from the server: the signal
//! handler injects it into the same queue.

use x11rb::protocol::xproto::{Atom, Timestamp, Window};
use x11rb::protocol::Event;

use crate::shared::{Geometry, Point};

/// Button press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    /// Window the event was reported on
    pub window: Window,
    /// Child of `window` containing the pointer, or `NONE`
    pub child: Window,
    pub button: u8,
    /// Pointer position in root coordinates
    pub root: Point,
    pub time: Timestamp,
}

/// Pointer motion with a button held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionEvent {
    pub window: Window,
    pub root: Point,
    pub time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WmEvent {
    ButtonPress(ButtonEvent),
    ButtonRelease(ButtonEvent),
    Motion(MotionEvent),
    MapNotify {
        event: Window,
        window: Window,
    },
    UnmapNotify {
        event: Window,
        window: Window,
    },
    CreateNotify {
        parent: Window,
        window: Window,
        geometry: Geometry,
        override_redirect: bool,
    },
    DestroyNotify {
        event: Window,
        window: Window,
    },
    ConfigureNotify {
        event: Window,
        window: Window,
        geometry: Geometry,
    },
    ReparentNotify {
        window: Window,
        parent: Window,
    },
    FocusIn {
        window: Window,
    },
    FocusOut {
        window: Window,
    },
    ClientMessage {
        window: Window,
        message_type: Atom,
    },
    /// An error for a request sent without waiting for its reply
    XError {
        request: &'static str,
        detail: String,
    },
    /// Termination requested by a signal
    Shutdown,
}

impl WmEvent {
    /// Translate a server event. Kinds the manager has no use for map to `None`.
    pub fn from_x11(event: Event) -> Option<Self> {
        let event = match event {
            Event::ButtonPress(e) => WmEvent::ButtonPress(ButtonEvent {
                window: e.event,
                child: e.child,
                button: e.detail,
                root: Point::new(e.root_x.into(), e.root_y.into()),
                time: e.time,
            }),
            Event::ButtonRelease(e) => WmEvent::ButtonRelease(ButtonEvent {
                window: e.event,
                child: e.child,
                button: e.detail,
                root: Point::new(e.root_x.into(), e.root_y.into()),
                time: e.time,
            }),
            Event::MotionNotify(e) => WmEvent::Motion(MotionEvent {
                window: e.event,
                root: Point::new(e.root_x.into(), e.root_y.into()),
                time: e.time,
            }),
            Event::MapNotify(e) => WmEvent::MapNotify {
                event: e.event,
                window: e.window,
            },
            Event::UnmapNotify(e) => WmEvent::UnmapNotify {
                event: e.event,
                window: e.window,
            },
            Event::CreateNotify(e) => WmEvent::CreateNotify {
                parent: e.parent,
                window: e.window,
                geometry: Geometry::new(e.x.into(), e.y.into(), e.width.into(), e.height.into()),
                override_redirect: e.override_redirect,
            },
            Event::DestroyNotify(e) => WmEvent::DestroyNotify {
                event: e.event,
                window: e.window,
            },
            Event::ConfigureNotify(e) => WmEvent::ConfigureNotify {
                event: e.event,
                window: e.window,
                geometry: Geometry::new(e.x.into(), e.y.into(), e.width.into(), e.height.into()),
            },
            Event::ReparentNotify(e) => WmEvent::ReparentNotify {
                window: e.window,
                parent: e.parent,
            },
            Event::FocusIn(e) => WmEvent::FocusIn { window: e.event },
            Event::FocusOut(e) => WmEvent::FocusOut { window: e.event },
            Event::ClientMessage(e) => WmEvent::ClientMessage {
                window: e.window,
                message_type: e.type_,
            },
            Event::Error(e) => WmEvent::XError {
                request: e.request_name.unwrap_or("unknown"),
                detail: format!("{:?} (bad value {:#x})", e.error_kind, e.bad_value),
            },
            _ => return None,
        };
        Some(event)
    }
}
