//! Window manager for hexdesk.
//!
//! Owns the set of open application windows: their geometry, stacking order,
//! and lifecycle. Opening is gated on a role permission check and on a fixed
//! cap on simultaneously open windows.

pub mod geometry;
pub mod manager;
pub mod registry;

pub use geometry::{Point, Side, Size};
pub use manager::{OpenOutcome, Props, SnapAssist, Window, WindowManager};
pub use registry::{AppMeta, AppRegistry, AppSpec, StaticAppRegistry};
