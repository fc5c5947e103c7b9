//! Adoption Module
//!
//! Taking ownership of a top-level window by reparenting it into a bordered
//! container, and giving it back.

use std::fmt;

use tracing::{debug, info, warn};
use x11rb::protocol::xproto::Window;

use crate::config::TransientPolicy;
use crate::shared::Point;
use crate::wm::client::ManagedWindow;
use crate::wm::conn::{Result, XConn};
use crate::wm::error::{AdoptStep, WmError};
use crate::wm::ewmh::WindowType;
use crate::wm::{recover, WindowManager};

/// Why a window was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Already a managed target or container
    AlreadyManaged,
    OverrideRedirect,
    /// No usable `WM_CLASS`
    NoClass,
    /// Declares `WM_TRANSIENT_FOR` this window
    Transient(Window),
    /// A menu or dialog that positions itself
    SelfPositioned(WindowType),
    /// The window disappeared while its properties were read
    Vanished,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::AlreadyManaged => f.write_str("already managed"),
            RejectReason::OverrideRedirect => f.write_str("override-redirect"),
            RejectReason::NoClass => f.write_str("no WM_CLASS"),
            RejectReason::Transient(owner) => write!(f, "transient for 0x{:x}", owner),
            RejectReason::SelfPositioned(kind) => write!(f, "{} window places itself", kind),
            RejectReason::Vanished => f.write_str("window vanished"),
        }
    }
}

/// Result of [`WindowManager::try_adopt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adoption {
    Adopted { container: Window },
    Rejected(RejectReason),
    /// A protocol request failed part way; everything created was rolled back.
    Failed(AdoptStep),
}

impl<C: XConn> WindowManager<C> {
    /// Adopt `window` if it is an application toplevel.
    ///
    /// Rejections and recoverable failures are reported in the returned
    /// [`Adoption`]; only a broken connection is an `Err`.
    pub fn try_adopt(&mut self, window: Window) -> Result<Adoption> {
        match self.check_eligible(window) {
            Ok(None) => {}
            Ok(Some(reason)) => {
                debug!("Not adopting 0x{:x}: {}", window, reason);
                return Ok(Adoption::Rejected(reason));
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                debug!("Not adopting 0x{:x}, it probably disappeared: {}", window, e);
                return Ok(Adoption::Rejected(RejectReason::Vanished));
            }
        }

        self.describe(window)?;

        match self.adopt(window) {
            Ok(container) => {
                info!("Adopted 0x{:x} into container 0x{:x}", window, container);
                Ok(Adoption::Adopted { container })
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!("{}", e);
                let step = match e {
                    WmError::AdoptionFailed { step, .. } => step,
                    _ => AdoptStep::Register,
                };
                Ok(Adoption::Failed(step))
            }
        }
    }

    /// Release `target` from its container. With `remap` the target goes
    /// back to the root window at that position; without it the target is
    /// assumed gone. Returns `false` if `target` was not managed.
    pub fn try_disown(&mut self, target: Window, remap: Option<Point>) -> Result<bool> {
        let Some(window) = self.registry.remove(target) else {
            debug!("Disown: 0x{:x} is not a managed target", target);
            return Ok(false);
        };

        if let Some(position) = remap {
            let root = self.conn.root();
            recover(
                self.conn.reparent_window(target, root, position.x, position.y),
                "reparent to root",
                target,
            )?;
            recover(
                self.conn.remove_from_save_set(target),
                "remove from save-set",
                target,
            )?;
        }
        recover(
            self.conn.destroy_window(window.container),
            "destroy container",
            window.container,
        )?;

        if self.focus.forget(target) {
            debug!("Disown: 0x{:x} held focus", target);
        }
        info!("Disowned 0x{:x} (container 0x{:x})", target, window.container);
        Ok(true)
    }

    /// Run the eligibility filters. `Ok(None)` means adopt.
    fn check_eligible(&self, window: Window) -> Result<Option<RejectReason>> {
        if self.registry.contains(window) {
            return Ok(Some(RejectReason::AlreadyManaged));
        }

        if self.conn.get_window_attributes(window)?.override_redirect {
            return Ok(Some(RejectReason::OverrideRedirect));
        }

        if self.conn.window_class(window)?.is_none() {
            return Ok(Some(RejectReason::NoClass));
        }

        if self.behavior.transient_policy == TransientPolicy::Skip {
            if let Some(owner) = self.conn.transient_for(window)? {
                return Ok(Some(RejectReason::Transient(owner)));
            }
        }

        let types = self.conn.window_types(window)?;
        if let Some(kind) = types.into_iter().find(|t| t.is_self_positioned()) {
            return Ok(Some(RejectReason::SelfPositioned(kind)));
        }

        Ok(None)
    }

    /// Log what is about to be adopted.
    fn describe(&self, window: Window) -> Result<()> {
        let name = optional(self.conn.window_name(window))?.unwrap_or_default();
        let class = optional(self.conn.window_class(window))?
            .flatten()
            .map(|c| format!("{}/{}", c.instance, c.class))
            .unwrap_or_default();
        let group = optional(self.conn.window_group(window))?.flatten();

        info!(
            "Adopting 0x{:x}: name={:?} class={:?} group={:?}",
            window, name, class, group
        );
        Ok(())
    }

    fn adopt(&mut self, target: Window) -> Result<Window> {
        let failed = |step: AdoptStep, source: WmError| WmError::AdoptionFailed {
            window: target,
            step,
            source: Box::new(source),
        };

        let geometry = self
            .conn
            .get_geometry(target)
            .map_err(|e| failed(AdoptStep::QueryGeometry, e))?;

        let container = self
            .conn
            .create_container(geometry, &self.style)
            .map_err(|e| failed(AdoptStep::CreateContainer, e))?;
        debug!("Created container 0x{:x} at {:?}", container, geometry);

        if let Err(e) = self.conn.map_window(container) {
            self.discard_container(container);
            return Err(failed(AdoptStep::MapContainer, e));
        }

        if let Err(e) = self.conn.reparent_window(target, container, 0, 0) {
            self.discard_container(container);
            return Err(failed(AdoptStep::Reparent, e));
        }

        recover(self.conn.add_to_save_set(target), "add to save-set", target)?;
        // Without the grab clicks still reach the client, they just cannot
        // start a drag.
        recover(self.conn.grab_button(container, 1), "grab button 1", container)?;

        if let Err(e) = self
            .registry
            .insert(ManagedWindow::new(target, container, geometry))
        {
            recover(
                self.conn.reparent_window(target, self.conn.root(), geometry.x, geometry.y),
                "reparent to root",
                target,
            )?;
            self.discard_container(container);
            return Err(failed(AdoptStep::Register, e));
        }

        Ok(container)
    }

    fn discard_container(&self, container: Window) {
        if let Err(e) = self.conn.destroy_window(container) {
            warn!("Failed to destroy container 0x{:x}: {}", container, e);
        }
    }
}

/// A property read that is only nice to have.
fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_fatal() => Err(e),
        Err(_) => Ok(None),
    }
}
