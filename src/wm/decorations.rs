//! Container decoration: a single colored border around the client.

use x11rb::protocol::xproto::EventMask;

use crate::config::BorderConfig;

/// Events selected on every container window.
pub fn container_event_mask() -> EventMask {
    EventMask::BUTTON_PRESS
        | EventMask::BUTTON_RELEASE
        | EventMask::BUTTON1_MOTION
        | EventMask::BUTTON3_MOTION
        | EventMask::STRUCTURE_NOTIFY
        | EventMask::SUBSTRUCTURE_NOTIFY
        | EventMask::FOCUS_CHANGE
}

/// Events reported while the passive button grab on a container is active.
pub fn grab_event_mask() -> EventMask {
    EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::BUTTON1_MOTION
}

/// Events selected on the root window.
pub fn root_event_mask() -> EventMask {
    EventMask::SUBSTRUCTURE_NOTIFY
        | EventMask::BUTTON_PRESS
        | EventMask::BUTTON_RELEASE
        | EventMask::POINTER_MOTION
        | EventMask::FOCUS_CHANGE
        | EventMask::ENTER_WINDOW
        | EventMask::LEAVE_WINDOW
}

/// Border look of a container window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerStyle {
    pub border_width: u16,
    pub border_color: u32,
    pub active_border_color: u32,
}

impl ContainerStyle {
    pub fn border_color(&self, focused: bool) -> u32 {
        if focused {
            self.active_border_color
        } else {
            self.border_color
        }
    }
}

impl Default for ContainerStyle {
    fn default() -> Self {
        Self::from(&BorderConfig::default())
    }
}

impl From<&BorderConfig> for ContainerStyle {
    fn from(config: &BorderConfig) -> Self {
        Self {
            border_width: config.width,
            border_color: config.color,
            active_border_color: config.active_color,
        }
    }
}
