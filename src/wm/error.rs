//! Error taxonomy for the window management core.

use std::fmt;

use x11rb::errors::{ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::protocol::xproto::Window;

/// Adoption step that failed, reported inside [`WmError::AdoptionFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdoptStep {
    QueryGeometry,
    CreateContainer,
    MapContainer,
    Reparent,
    Register,
}

impl fmt::Display for AdoptStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdoptStep::QueryGeometry => "query geometry",
            AdoptStep::CreateContainer => "create container",
            AdoptStep::MapContainer => "map container",
            AdoptStep::Reparent => "reparent",
            AdoptStep::Register => "register",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WmError {
    /// The connection to the X server is unusable. Always fatal.
    #[error("X11 transport failure: {0}")]
    Transport(#[from] ConnectionError),

    /// The server rejected a single request. The connection is still usable.
    #[error("X11 request {request} failed: {detail}")]
    Protocol {
        request: &'static str,
        detail: String,
    },

    #[error("window {0:#x} is already managed")]
    DuplicateWindow(Window),

    #[error("window {0:#x} is not managed")]
    UnknownWindow(Window),

    #[error("adopting window {window:#x} failed at {step}: {source}")]
    AdoptionFailed {
        window: Window,
        step: AdoptStep,
        #[source]
        source: Box<WmError>,
    },
}

impl WmError {
    /// Only a broken transport terminates the manager; everything else is
    /// recovered where it happens.
    pub fn is_fatal(&self) -> bool {
        match self {
            WmError::Transport(_) => true,
            WmError::AdoptionFailed { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    pub fn protocol(request: &'static str, detail: impl Into<String>) -> Self {
        WmError::Protocol {
            request,
            detail: detail.into(),
        }
    }
}

impl From<ReplyError> for WmError {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::ConnectionError(e) => WmError::Transport(e),
            ReplyError::X11Error(e) => WmError::Protocol {
                request: e.request_name.unwrap_or("unknown"),
                detail: format!("{:?} (bad value {:#x})", e.error_kind, e.bad_value),
            },
        }
    }
}

impl From<ReplyOrIdError> for WmError {
    fn from(err: ReplyOrIdError) -> Self {
        match err {
            ReplyOrIdError::ConnectionError(e) => WmError::Transport(e),
            ReplyOrIdError::X11Error(e) => WmError::Protocol {
                request: e.request_name.unwrap_or("unknown"),
                detail: format!("{:?} (bad value {:#x})", e.error_kind, e.bad_value),
            },
            ReplyOrIdError::IdsExhausted => WmError::protocol("GenerateId", "resource ids exhausted"),
        }
    }
}
