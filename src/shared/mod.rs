//! Types shared across modules.

pub mod window_state;

pub use window_state::{Geometry, Point};
