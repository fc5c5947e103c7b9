//! In-memory X server for exercising the core without a display.
//!
//! Models window parentage, geometry and the properties adoption reads, and
//! records every request that changes server state. Queries are not
//! recorded. Requests the real connection sends unchecked never fail here
//! unless a failure is injected.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

use x11rb::errors::ConnectionError;
use x11rb::protocol::xproto::{Atom, Timestamp, Window};

use crate::shared::Geometry;
use crate::wm::conn::{GrabRelease, Result, WindowAttributes, WindowChanges, XConn};
use crate::wm::decorations::ContainerStyle;
use crate::wm::error::WmError;
use crate::wm::ewmh::WindowType;
use crate::wm::hints::WmClass;

pub const ROOT: Window = 1;

/// A state-changing request as the fake received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CreateContainer(Window),
    DestroyWindow(Window),
    MapWindow(Window),
    ReparentWindow {
        window: Window,
        parent: Window,
        x: i32,
        y: i32,
    },
    ConfigureWindow(Window, WindowChanges),
    SetBorderColor(Window, u32),
    AddToSaveSet(Window),
    RemoveFromSaveSet(Window),
    GrabButton(Window, u8),
    AllowEvents(GrabRelease),
    SetInputFocus(Window),
    AdvertiseSupported,
    SelectRootEvents,
}

#[derive(Debug, Clone)]
pub struct FakeWindow {
    pub parent: Window,
    pub geometry: Geometry,
    pub mapped: bool,
    pub override_redirect: bool,
    pub class: Option<WmClass>,
    pub types: Vec<WindowType>,
    pub transient_for: Option<Window>,
    pub group: Option<Window>,
    pub name: String,
}

impl FakeWindow {
    fn client(geometry: Geometry) -> Self {
        Self {
            parent: ROOT,
            geometry,
            mapped: true,
            override_redirect: false,
            class: Some(WmClass {
                instance: "xterm".into(),
                class: "XTerm".into(),
            }),
            types: Vec::new(),
            transient_for: None,
            group: None,
            name: "xterm".into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Failure {
    Protocol,
    Transport,
}

#[derive(Debug, Default)]
struct State {
    windows: BTreeMap<Window, FakeWindow>,
    borders: HashMap<Window, u32>,
    save_set: HashSet<Window>,
    grabs: HashSet<(Window, u8)>,
    focus: Window,
    atom_names: HashMap<Atom, String>,
    failures: HashMap<&'static str, Failure>,
    requests: Vec<Request>,
    next_id: Window,
}

pub struct FakeX {
    state: RefCell<State>,
}

impl FakeX {
    pub fn new() -> Self {
        let state = State {
            focus: ROOT,
            next_id: 0x0100_0000,
            ..State::default()
        };
        Self {
            state: RefCell::new(state),
        }
    }

    /// Add a mapped top-level client window with a valid class.
    pub fn add_client(&self, id: Window, geometry: Geometry) {
        self.state
            .borrow_mut()
            .windows
            .insert(id, FakeWindow::client(geometry));
    }

    /// Change a window's server-side state.
    pub fn update(&self, id: Window, f: impl FnOnce(&mut FakeWindow)) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&id) {
            f(window);
        }
    }

    /// Make every `request` of this kind fail with a protocol error.
    pub fn fail(&self, request: &'static str) {
        self.state.borrow_mut().failures.insert(request, Failure::Protocol);
    }

    /// Make every `request` of this kind fail as if the connection broke.
    pub fn break_on(&self, request: &'static str) {
        self.state.borrow_mut().failures.insert(request, Failure::Transport);
    }

    pub fn name_atom(&self, atom: Atom, name: &str) {
        self.state.borrow_mut().atom_names.insert(atom, name.into());
    }

    pub fn set_input_focus_to(&self, window: Window) {
        self.state.borrow_mut().focus = window;
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.borrow().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state.borrow_mut().requests.clear();
    }

    pub fn exists(&self, id: Window) -> bool {
        self.state.borrow().windows.contains_key(&id)
    }

    pub fn parent(&self, id: Window) -> Option<Window> {
        self.state.borrow().windows.get(&id).map(|w| w.parent)
    }

    pub fn geometry(&self, id: Window) -> Option<Geometry> {
        self.state.borrow().windows.get(&id).map(|w| w.geometry)
    }

    pub fn is_mapped(&self, id: Window) -> bool {
        self.state.borrow().windows.get(&id).is_some_and(|w| w.mapped)
    }

    pub fn border_color(&self, id: Window) -> Option<u32> {
        self.state.borrow().borders.get(&id).copied()
    }

    pub fn in_save_set(&self, id: Window) -> bool {
        self.state.borrow().save_set.contains(&id)
    }

    pub fn has_grab(&self, id: Window, button: u8) -> bool {
        self.state.borrow().grabs.contains(&(id, button))
    }

    fn check(&self, request: &'static str) -> Result<()> {
        match self.state.borrow().failures.get(request) {
            None => Ok(()),
            Some(Failure::Protocol) => Err(WmError::protocol(request, "injected failure")),
            Some(Failure::Transport) => Err(WmError::Transport(ConnectionError::UnknownError)),
        }
    }

    fn record(&self, request: Request) {
        self.state.borrow_mut().requests.push(request);
    }

    fn with_window<T>(
        &self,
        request: &'static str,
        id: Window,
        f: impl FnOnce(&FakeWindow) -> T,
    ) -> Result<T> {
        self.check(request)?;
        self.state
            .borrow()
            .windows
            .get(&id)
            .map(f)
            .ok_or_else(|| WmError::protocol(request, format!("BadWindow {:#x}", id)))
    }
}

impl XConn for FakeX {
    fn root(&self) -> Window {
        ROOT
    }

    fn get_geometry(&self, window: Window) -> Result<Geometry> {
        if window == ROOT {
            self.check("GetGeometry")?;
            return Ok(Geometry::new(0, 0, 1920, 1080));
        }
        self.with_window("GetGeometry", window, |w| w.geometry)
    }

    fn get_window_attributes(&self, window: Window) -> Result<WindowAttributes> {
        self.with_window("GetWindowAttributes", window, |w| WindowAttributes {
            override_redirect: w.override_redirect,
            viewable: w.mapped,
        })
    }

    fn query_tree(&self, window: Window) -> Result<Vec<Window>> {
        self.check("QueryTree")?;
        Ok(self
            .state
            .borrow()
            .windows
            .iter()
            .filter(|(_, w)| w.parent == window)
            .map(|(id, _)| *id)
            .collect())
    }

    fn get_input_focus(&self) -> Result<Window> {
        self.check("GetInputFocus")?;
        Ok(self.state.borrow().focus)
    }

    fn create_container(&self, geometry: Geometry, style: &ContainerStyle) -> Result<Window> {
        self.check("CreateWindow")?;
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.windows.insert(
            id,
            FakeWindow {
                parent: ROOT,
                geometry,
                mapped: false,
                override_redirect: false,
                class: None,
                types: Vec::new(),
                transient_for: None,
                group: None,
                name: String::new(),
            },
        );
        state.borders.insert(id, style.border_color);
        state.requests.push(Request::CreateContainer(id));
        Ok(id)
    }

    fn destroy_window(&self, window: Window) -> Result<()> {
        self.with_window("DestroyWindow", window, |_| ())?;
        let mut state = self.state.borrow_mut();
        // Destroying a window destroys its whole subtree.
        let mut doomed = vec![window];
        while let Some(id) = doomed.pop() {
            state.windows.remove(&id);
            state.borders.remove(&id);
            doomed.extend(
                state
                    .windows
                    .iter()
                    .filter(|(_, w)| w.parent == id)
                    .map(|(child, _)| *child),
            );
        }
        state.requests.push(Request::DestroyWindow(window));
        Ok(())
    }

    fn map_window(&self, window: Window) -> Result<()> {
        self.with_window("MapWindow", window, |_| ())?;
        self.update(window, |w| w.mapped = true);
        self.record(Request::MapWindow(window));
        Ok(())
    }

    fn reparent_window(&self, window: Window, parent: Window, x: i32, y: i32) -> Result<()> {
        self.with_window("ReparentWindow", window, |_| ())?;
        if parent != ROOT {
            self.with_window("ReparentWindow", parent, |_| ())?;
        }
        self.update(window, |w| {
            w.parent = parent;
            w.geometry.x = x;
            w.geometry.y = y;
        });
        self.record(Request::ReparentWindow {
            window,
            parent,
            x,
            y,
        });
        Ok(())
    }

    fn configure_window(&self, window: Window, changes: &WindowChanges) -> Result<()> {
        self.check("ConfigureWindow")?;
        self.update(window, |w| {
            w.geometry.x = changes.x.unwrap_or(w.geometry.x);
            w.geometry.y = changes.y.unwrap_or(w.geometry.y);
            w.geometry.width = changes.width.unwrap_or(w.geometry.width);
            w.geometry.height = changes.height.unwrap_or(w.geometry.height);
        });
        self.record(Request::ConfigureWindow(window, *changes));
        Ok(())
    }

    fn set_border_color(&self, window: Window, color: u32) -> Result<()> {
        self.check("ChangeWindowAttributes")?;
        self.state.borrow_mut().borders.insert(window, color);
        self.record(Request::SetBorderColor(window, color));
        Ok(())
    }

    fn add_to_save_set(&self, window: Window) -> Result<()> {
        self.with_window("ChangeSaveSet", window, |_| ())?;
        self.state.borrow_mut().save_set.insert(window);
        self.record(Request::AddToSaveSet(window));
        Ok(())
    }

    fn remove_from_save_set(&self, window: Window) -> Result<()> {
        self.check("ChangeSaveSet")?;
        self.state.borrow_mut().save_set.remove(&window);
        self.record(Request::RemoveFromSaveSet(window));
        Ok(())
    }

    fn grab_button(&self, window: Window, button: u8) -> Result<()> {
        self.with_window("GrabButton", window, |_| ())?;
        self.state.borrow_mut().grabs.insert((window, button));
        self.record(Request::GrabButton(window, button));
        Ok(())
    }

    fn allow_events(&self, release: GrabRelease, _time: Timestamp) -> Result<()> {
        self.check("AllowEvents")?;
        self.record(Request::AllowEvents(release));
        Ok(())
    }

    fn set_input_focus(&self, window: Window, _time: Timestamp) -> Result<()> {
        self.check("SetInputFocus")?;
        self.state.borrow_mut().focus = window;
        self.record(Request::SetInputFocus(window));
        Ok(())
    }

    fn window_class(&self, window: Window) -> Result<Option<WmClass>> {
        self.with_window("GetProperty", window, |w| w.class.clone())
    }

    fn window_types(&self, window: Window) -> Result<Vec<WindowType>> {
        self.with_window("GetProperty", window, |w| {
            if w.types.is_empty() {
                vec![WindowType::Normal]
            } else {
                w.types.clone()
            }
        })
    }

    fn transient_for(&self, window: Window) -> Result<Option<Window>> {
        self.with_window("GetProperty", window, |w| w.transient_for)
    }

    fn window_group(&self, window: Window) -> Result<Option<Window>> {
        self.with_window("GetProperty", window, |w| w.group)
    }

    fn window_name(&self, window: Window) -> Result<String> {
        self.with_window("GetProperty", window, |w| w.name.clone())
    }

    fn atom_name(&self, atom: Atom) -> Result<String> {
        self.check("GetAtomName")?;
        self.state
            .borrow()
            .atom_names
            .get(&atom)
            .cloned()
            .ok_or_else(|| WmError::protocol("GetAtomName", format!("BadAtom {}", atom)))
    }

    fn advertise_supported(&self) -> Result<()> {
        self.check("ChangeProperty")?;
        self.record(Request::AdvertiseSupported);
        Ok(())
    }

    fn select_root_events(&self) -> Result<()> {
        self.check("ChangeWindowAttributes")?;
        self.record(Request::SelectRootEvents);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.check("Flush")
    }
}
