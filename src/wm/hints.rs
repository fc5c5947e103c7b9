//! Hints Module
//!
//! Decoding of the ICCCM properties the adoption filters look at
//! (`WM_CLASS`, `WM_TRANSIENT_FOR`, `WM_HINTS`). Only raw property payloads
//! are handled here; fetching them is the protocol client's job.

use x11rb::protocol::xproto::Window;

/// `WM_HINTS` flag announcing a valid `window_group` field.
const WINDOW_GROUP_HINT: u32 = 1 << 6;

/// Index of `window_group` in the `WM_HINTS` 32-bit array.
const WINDOW_GROUP_INDEX: usize = 8;

/// `WM_CLASS` contents: instance name and class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmClass {
    pub instance: String,
    pub class: String,
}

impl WmClass {
    /// Parse a `WM_CLASS` payload (`"instance\0class\0"`).
    ///
    /// Both parts must be present; a window that only sets one of them is
    /// not treated as an application toplevel.
    pub fn parse(value: &[u8]) -> Option<Self> {
        let mut parts = value.split(|&b| b == 0);
        let instance = parts.next()?;
        let class = parts.next()?;
        if instance.is_empty() && class.is_empty() {
            return None;
        }

        Some(Self {
            instance: String::from_utf8_lossy(instance).into_owned(),
            class: String::from_utf8_lossy(class).into_owned(),
        })
    }
}

/// `WM_TRANSIENT_FOR` owner, ignoring the `None` window.
pub fn parse_transient_for(values: &[u32]) -> Option<Window> {
    values.first().copied().filter(|&w| w != x11rb::NONE)
}

/// `window_group` from a `WM_HINTS` payload, when the flag says it is valid.
pub fn parse_window_group(values: &[u32]) -> Option<Window> {
    let flags = *values.first()?;
    if flags & WINDOW_GROUP_HINT == 0 {
        return None;
    }
    values
        .get(WINDOW_GROUP_INDEX)
        .copied()
        .filter(|&w| w != x11rb::NONE)
}

/// Window title bytes, trimmed of the trailing NUL some clients send.
pub fn parse_name(value: &[u8]) -> String {
    let end = value.iter().position(|&b| b == 0).unwrap_or(value.len());
    String::from_utf8_lossy(&value[..end]).into_owned()
}
