//! EWMH (Extended Window Manager Hints) atoms and window types
//!
//! The manager only advertises `_NET_WM_NAME` and `_NET_WM_WINDOW_TYPE`; the
//! window type atoms are needed to recognise menus and dialogs.

use anyhow::Result;
use std::fmt;
use x11rb::connection::Connection;
use x11rb::errors::ConnectionError;
use x11rb::protocol::xproto::*;
use x11rb::wrapper::ConnectionExt as _;

/// `_NET_WM_WINDOW_TYPE_*` values. A window without the property is `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowType {
    Desktop,
    Dock,
    Toolbar,
    Menu,
    Utility,
    Splash,
    Dialog,
    DropdownMenu,
    PopupMenu,
    Tooltip,
    Notification,
    Combo,
    Dnd,
    Normal,
}

impl WindowType {
    /// Types that position themselves and must never be reparented.
    pub const SELF_POSITIONED: [WindowType; 3] =
        [WindowType::PopupMenu, WindowType::Dialog, WindowType::DropdownMenu];

    pub fn is_self_positioned(self) -> bool {
        Self::SELF_POSITIONED.contains(&self)
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WindowType::Desktop => "Desktop",
            WindowType::Dock => "Dock",
            WindowType::Toolbar => "Toolbar",
            WindowType::Menu => "Menu",
            WindowType::Utility => "Utility",
            WindowType::Splash => "Splash",
            WindowType::Dialog => "Dialog",
            WindowType::DropdownMenu => "DropdownMenu",
            WindowType::PopupMenu => "PopupMenu",
            WindowType::Tooltip => "Tooltip",
            WindowType::Notification => "Notification",
            WindowType::Combo => "Combo",
            WindowType::Dnd => "Dnd",
            WindowType::Normal => "Normal",
        };
        f.write_str(name)
    }
}

/// Holds all interned atoms
#[derive(Debug, Clone)]
pub struct Atoms {
    pub net_supported: Atom,
    pub net_wm_name: Atom,
    pub net_wm_window_type: Atom,
    pub utf8_string: Atom,
    window_types: [(Atom, WindowType); 14],
}

impl Atoms {
    /// Intern all required atoms
    pub fn new<C: Connection>(conn: &C) -> Result<Self> {
        let intern = |name: &str| -> Result<Atom> {
            Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
        };

        Ok(Self {
            net_supported: intern("_NET_SUPPORTED")?,
            net_wm_name: intern("_NET_WM_NAME")?,
            net_wm_window_type: intern("_NET_WM_WINDOW_TYPE")?,
            utf8_string: intern("UTF8_STRING")?,
            window_types: [
                (intern("_NET_WM_WINDOW_TYPE_DESKTOP")?, WindowType::Desktop),
                (intern("_NET_WM_WINDOW_TYPE_DOCK")?, WindowType::Dock),
                (intern("_NET_WM_WINDOW_TYPE_TOOLBAR")?, WindowType::Toolbar),
                (intern("_NET_WM_WINDOW_TYPE_MENU")?, WindowType::Menu),
                (intern("_NET_WM_WINDOW_TYPE_UTILITY")?, WindowType::Utility),
                (intern("_NET_WM_WINDOW_TYPE_SPLASH")?, WindowType::Splash),
                (intern("_NET_WM_WINDOW_TYPE_DIALOG")?, WindowType::Dialog),
                (intern("_NET_WM_WINDOW_TYPE_DROPDOWN_MENU")?, WindowType::DropdownMenu),
                (intern("_NET_WM_WINDOW_TYPE_POPUP_MENU")?, WindowType::PopupMenu),
                (intern("_NET_WM_WINDOW_TYPE_TOOLTIP")?, WindowType::Tooltip),
                (intern("_NET_WM_WINDOW_TYPE_NOTIFICATION")?, WindowType::Notification),
                (intern("_NET_WM_WINDOW_TYPE_COMBO")?, WindowType::Combo),
                (intern("_NET_WM_WINDOW_TYPE_DND")?, WindowType::Dnd),
                (intern("_NET_WM_WINDOW_TYPE_NORMAL")?, WindowType::Normal),
            ],
        })
    }

    /// Map a `_NET_WM_WINDOW_TYPE` atom to its type, if it is one we know.
    pub fn window_type(&self, atom: Atom) -> Option<WindowType> {
        self.window_types
            .iter()
            .find(|(a, _)| *a == atom)
            .map(|(_, t)| *t)
    }

    /// Set up _NET_SUPPORTED on root window
    pub fn setup_supported<C: Connection>(
        &self,
        conn: &C,
        root: Window,
    ) -> Result<(), ConnectionError> {
        let supported = [self.net_wm_name, self.net_wm_window_type];

        conn.change_property32(
            PropMode::REPLACE,
            root,
            self.net_supported,
            AtomEnum::ATOM,
            &supported,
        )?;

        Ok(())
    }
}
