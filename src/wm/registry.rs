//! Registry of managed windows
//!
//! One record per adopted client, reachable through either of its two ids:
//! pointer events name the container, structural events usually the target.

use std::collections::HashMap;

use x11rb::protocol::xproto::Window;

use crate::wm::client::ManagedWindow;
use crate::wm::error::WmError;

#[derive(Debug, Default)]
pub struct Registry {
    /// Records keyed by target id
    windows: HashMap<Window, ManagedWindow>,
    /// container id -> target id
    containers: HashMap<Window, Window>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Fails if either of its ids is already known, in either role.
    pub fn insert(&mut self, window: ManagedWindow) -> Result<(), WmError> {
        for id in [window.target, window.container] {
            if self.contains(id) {
                return Err(WmError::DuplicateWindow(id));
            }
        }

        self.containers.insert(window.container, window.target);
        self.windows.insert(window.target, window);
        Ok(())
    }

    /// Find the record owning `id`, whether `id` is a target or a container.
    pub fn lookup(&self, id: Window) -> Option<&ManagedWindow> {
        let target = self.resolve(id)?;
        self.windows.get(&target)
    }

    pub fn lookup_mut(&mut self, id: Window) -> Option<&mut ManagedWindow> {
        let target = self.resolve(id)?;
        self.windows.get_mut(&target)
    }

    /// Find a record by its target id only.
    pub fn by_target(&self, target: Window) -> Option<&ManagedWindow> {
        self.windows.get(&target)
    }

    pub fn contains(&self, id: Window) -> bool {
        self.windows.contains_key(&id) || self.containers.contains_key(&id)
    }

    /// Remove the record for `target`. Unknown ids are ignored.
    pub fn remove(&mut self, target: Window) -> Option<ManagedWindow> {
        let window = self.windows.remove(&target)?;
        self.containers.remove(&window.container);
        Some(window)
    }

    /// Empty the registry, handing back every record.
    pub fn drain(&mut self) -> Vec<ManagedWindow> {
        self.containers.clear();
        self.windows.drain().map(|(_, w)| w).collect()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    fn resolve(&self, id: Window) -> Option<Window> {
        if self.windows.contains_key(&id) {
            Some(id)
        } else {
            self.containers.get(&id).copied()
        }
    }
}
