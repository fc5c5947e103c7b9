//! Display Module
//!
//! The X11 connection as the window manager sees it: an x11rb
//! `RustConnection` plus the screen parameters and atoms needed to serve
//! [`XConn`] requests.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::shared::Geometry;
use crate::wm::conn::{self, GrabRelease, WindowAttributes, WindowChanges, XConn};
use crate::wm::decorations::{self, ContainerStyle};
use crate::wm::ewmh::{Atoms, WindowType};
use crate::wm::hints::{self, WmClass};

/// Longest property value read, in 32-bit units
const PROPERTY_LENGTH: u32 = 1024;

pub struct X11Conn {
    conn: Arc<RustConnection>,
    root: Window,
    root_depth: u8,
    root_visual: Visualid,
    atoms: Atoms,
}

impl X11Conn {
    pub fn new(conn: Arc<RustConnection>, screen_num: usize) -> Result<Self> {
        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .with_context(|| format!("Screen {} does not exist", screen_num))?;
        let root = screen.root;
        let root_depth = screen.root_depth;
        let root_visual = screen.root_visual;

        let atoms = Atoms::new(conn.as_ref()).context("Failed to intern atoms")?;
        debug!("Display: root=0x{:x} depth={} visual=0x{:x}", root, root_depth, root_visual);

        Ok(Self {
            conn,
            root,
            root_depth,
            root_visual,
            atoms,
        })
    }

    fn get_property(
        &self,
        window: Window,
        property: impl Into<Atom>,
        type_: impl Into<Atom>,
        length: u32,
    ) -> conn::Result<GetPropertyReply> {
        Ok(self
            .conn
            .get_property(false, window, property, type_, 0, length)?
            .reply()?)
    }
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN.into(), i16::MAX.into()) as i16
}

fn clamp_u16(value: u32) -> u16 {
    value.clamp(1, u16::MAX.into()) as u16
}

impl XConn for X11Conn {
    fn root(&self) -> Window {
        self.root
    }

    fn get_geometry(&self, window: Window) -> conn::Result<Geometry> {
        let reply = self.conn.get_geometry(window)?.reply()?;
        Ok(Geometry::new(
            reply.x.into(),
            reply.y.into(),
            reply.width.into(),
            reply.height.into(),
        ))
    }

    fn get_window_attributes(&self, window: Window) -> conn::Result<WindowAttributes> {
        let reply = self.conn.get_window_attributes(window)?.reply()?;
        Ok(WindowAttributes {
            override_redirect: reply.override_redirect,
            viewable: reply.map_state == MapState::VIEWABLE,
        })
    }

    fn query_tree(&self, window: Window) -> conn::Result<Vec<Window>> {
        Ok(self.conn.query_tree(window)?.reply()?.children)
    }

    fn get_input_focus(&self) -> conn::Result<Window> {
        Ok(self.conn.get_input_focus()?.reply()?.focus)
    }

    fn create_container(&self, geometry: Geometry, style: &ContainerStyle) -> conn::Result<Window> {
        let container = self.conn.generate_id()?;
        self.conn
            .create_window(
                self.root_depth,
                container,
                self.root,
                clamp_i16(geometry.x),
                clamp_i16(geometry.y),
                clamp_u16(geometry.width),
                clamp_u16(geometry.height),
                style.border_width,
                WindowClass::INPUT_OUTPUT,
                self.root_visual,
                &CreateWindowAux::new()
                    .border_pixel(style.border_color)
                    .event_mask(decorations::container_event_mask()),
            )?
            .check()?;
        Ok(container)
    }

    fn destroy_window(&self, window: Window) -> conn::Result<()> {
        self.conn.destroy_window(window)?.check()?;
        Ok(())
    }

    fn map_window(&self, window: Window) -> conn::Result<()> {
        self.conn.map_window(window)?.check()?;
        Ok(())
    }

    fn reparent_window(&self, window: Window, parent: Window, x: i32, y: i32) -> conn::Result<()> {
        self.conn
            .reparent_window(window, parent, clamp_i16(x), clamp_i16(y))?
            .check()?;
        Ok(())
    }

    fn configure_window(&self, window: Window, changes: &WindowChanges) -> conn::Result<()> {
        let mut aux = ConfigureWindowAux::new();
        if let Some(x) = changes.x {
            aux = aux.x(i32::from(clamp_i16(x)));
        }
        if let Some(y) = changes.y {
            aux = aux.y(i32::from(clamp_i16(y)));
        }
        if let Some(width) = changes.width {
            aux = aux.width(u32::from(clamp_u16(width)));
        }
        if let Some(height) = changes.height {
            aux = aux.height(u32::from(clamp_u16(height)));
        }
        if changes.raise {
            aux = aux.stack_mode(StackMode::ABOVE);
        }
        // Sent unchecked: this runs on every motion event, errors come back as events.
        self.conn.configure_window(window, &aux)?;
        Ok(())
    }

    fn set_border_color(&self, window: Window, color: u32) -> conn::Result<()> {
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().border_pixel(color),
        )?;
        Ok(())
    }

    fn add_to_save_set(&self, window: Window) -> conn::Result<()> {
        self.conn.change_save_set(SetMode::INSERT, window)?.check()?;
        Ok(())
    }

    fn remove_from_save_set(&self, window: Window) -> conn::Result<()> {
        self.conn.change_save_set(SetMode::DELETE, window)?;
        Ok(())
    }

    fn grab_button(&self, window: Window, button: u8) -> conn::Result<()> {
        let button = match button {
            1 => ButtonIndex::M1,
            2 => ButtonIndex::M2,
            3 => ButtonIndex::M3,
            4 => ButtonIndex::M4,
            5 => ButtonIndex::M5,
            _ => ButtonIndex::ANY,
        };
        self.conn
            .grab_button(
                false,
                window,
                decorations::grab_event_mask(),
                GrabMode::SYNC,
                GrabMode::ASYNC,
                x11rb::NONE,
                x11rb::NONE,
                button,
                ModMask::ANY,
            )?
            .check()?;
        Ok(())
    }

    fn allow_events(&self, release: GrabRelease, time: Timestamp) -> conn::Result<()> {
        let mode = match release {
            GrabRelease::Replay => Allow::REPLAY_POINTER,
            GrabRelease::Consume => Allow::ASYNC_POINTER,
        };
        self.conn.allow_events(mode, time)?;
        Ok(())
    }

    fn set_input_focus(&self, window: Window, time: Timestamp) -> conn::Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, window, time)?;
        Ok(())
    }

    fn window_class(&self, window: Window) -> conn::Result<Option<WmClass>> {
        let reply = self.get_property(window, AtomEnum::WM_CLASS, AtomEnum::STRING, PROPERTY_LENGTH)?;
        Ok(WmClass::parse(&reply.value))
    }

    fn window_types(&self, window: Window) -> conn::Result<Vec<WindowType>> {
        let reply = self.get_property(
            window,
            self.atoms.net_wm_window_type,
            AtomEnum::ATOM,
            PROPERTY_LENGTH,
        )?;
        let types: Vec<WindowType> = reply
            .value32()
            .map(|atoms| atoms.filter_map(|a| self.atoms.window_type(a)).collect())
            .unwrap_or_default();

        if types.is_empty() {
            Ok(vec![WindowType::Normal])
        } else {
            Ok(types)
        }
    }

    fn transient_for(&self, window: Window) -> conn::Result<Option<Window>> {
        let reply = self.get_property(window, AtomEnum::WM_TRANSIENT_FOR, AtomEnum::WINDOW, 1)?;
        let values: Vec<u32> = reply.value32().map(|v| v.collect()).unwrap_or_default();
        Ok(hints::parse_transient_for(&values))
    }

    fn window_group(&self, window: Window) -> conn::Result<Option<Window>> {
        let reply = self.get_property(window, AtomEnum::WM_HINTS, AtomEnum::WM_HINTS, 9)?;
        let values: Vec<u32> = reply.value32().map(|v| v.collect()).unwrap_or_default();
        Ok(hints::parse_window_group(&values))
    }

    fn window_name(&self, window: Window) -> conn::Result<String> {
        let reply = self.get_property(
            window,
            self.atoms.net_wm_name,
            self.atoms.utf8_string,
            PROPERTY_LENGTH,
        )?;
        if !reply.value.is_empty() {
            return Ok(hints::parse_name(&reply.value));
        }

        let reply = self.get_property(window, AtomEnum::WM_NAME, AtomEnum::ANY, PROPERTY_LENGTH)?;
        Ok(hints::parse_name(&reply.value))
    }

    fn atom_name(&self, atom: Atom) -> conn::Result<String> {
        let reply = self.conn.get_atom_name(atom)?.reply()?;
        Ok(String::from_utf8_lossy(&reply.name).into_owned())
    }

    fn advertise_supported(&self) -> conn::Result<()> {
        self.atoms.setup_supported(self.conn.as_ref(), self.root)?;
        Ok(())
    }

    fn select_root_events(&self) -> conn::Result<()> {
        self.conn
            .change_window_attributes(
                self.root,
                &ChangeWindowAttributesAux::new().event_mask(decorations::root_event_mask()),
            )?
            .check()?;
        Ok(())
    }

    fn flush(&self) -> conn::Result<()> {
        self.conn.flush()?;
        Ok(())
    }
}
