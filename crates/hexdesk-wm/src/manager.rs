//! Window lifecycle, stacking, and layout.
//!
//! Every transition replaces the window list copy-on-write (`Arc::make_mut`),
//! so a list handed out by [`WindowManager::windows`] is a stable snapshot
//! that a renderer can diff against the next one.

use std::sync::Arc;

use hexdesk_types::config::{DisplayConfig, WindowConfig};
use hexdesk_types::error::{HexError, Result};
use hexdesk_types::session::Role;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::{Point, Side, Size};
use crate::registry::AppRegistry;

/// App-specific payload attached to a window.
pub type Props = Map<String, Value>;

/// A live application window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub app_id: String,
    pub title: String,
    pub is_open: bool,
    pub is_minimized: bool,
    pub is_maximized: bool,
    pub position: Point,
    pub size: Size,
    /// Stacking key. The highest value is drawn on top.
    pub z_index: u64,
    pub props: Props,
}

/// Offer to fill the free half of the screen after a snap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapAssist {
    /// Window whose snap raised the offer.
    pub anchor: String,
    /// Half that is still free.
    pub side: Side,
}

/// What [`WindowManager::open_app`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A new window was created.
    Created,
    /// The app already had a window; it was restored and focused.
    Existing,
}

/// Owner of all open windows.
pub struct WindowManager {
    windows: Arc<Vec<Window>>,
    active: Option<String>,
    next_z: u64,
    /// Cascade slot for the next desktop window. Only grows while windows
    /// are open, so a close never hands out a slot that is still occupied.
    cascade_slot: i32,
    snap_assist: Option<SnapAssist>,
    viewport: Size,
    limits: WindowConfig,
    display: DisplayConfig,
    registry: Box<dyn AppRegistry>,
}

impl WindowManager {
    pub fn new(
        limits: WindowConfig,
        display: DisplayConfig,
        registry: Box<dyn AppRegistry>,
    ) -> Self {
        Self {
            windows: Arc::new(Vec::new()),
            active: None,
            next_z: 1,
            cascade_slot: 0,
            snap_assist: None,
            viewport: Size::new(display.width, display.height),
            limits,
            display,
            registry,
        }
    }

    // -- Read access --

    /// Snapshot of the live window list.
    pub fn windows(&self) -> Arc<Vec<Window>> {
        Arc::clone(&self.windows)
    }

    pub fn window(&self, app_id: &str) -> Option<&Window> {
        self.windows.iter().find(|w| w.app_id == app_id)
    }

    pub fn active_window(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn snap_assist(&self) -> Option<&SnapAssist> {
        self.snap_assist.as_ref()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Narrow viewports open every window full-screen.
    pub fn is_mobile(&self) -> bool {
        self.viewport.width < self.display.mobile_breakpoint
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        log::debug!("wm: viewport {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
    }

    // -- Transitions --

    /// Open `app_id`, or restore and focus its existing window.
    ///
    /// Fails with [`HexError::PermissionDenied`] when `role` may not open the
    /// app and [`HexError::ResourceExhausted`] when the window cap is
    /// reached. The window list is unchanged on failure.
    pub fn open_app(
        &mut self,
        app_id: &str,
        props: Option<Props>,
        role: Role,
    ) -> Result<OpenOutcome> {
        if self.window(app_id).is_some() {
            self.update(app_id, |w| {
                w.is_minimized = false;
                if let Some(props) = props {
                    w.props.extend(props);
                }
            });
            self.focus_window(app_id);
            return Ok(OpenOutcome::Existing);
        }

        if !self.registry.is_allowed(app_id, role) {
            log::warn!("wm: {role} may not open {app_id}");
            return Err(HexError::PermissionDenied {
                app: app_id.to_string(),
            });
        }

        if self.windows.len() >= self.limits.max_open {
            log::warn!("wm: refusing {app_id}, {} windows open", self.windows.len());
            return Err(HexError::ResourceExhausted {
                limit: self.limits.max_open,
            });
        }

        let meta = self.registry.metadata(app_id);
        let title = meta
            .as_ref()
            .map_or_else(|| app_id.to_string(), |m| m.display_name.clone());
        let mobile = self.is_mobile();
        let (position, size) = if mobile {
            (Point::new(0, 0), self.usable_area())
        } else {
            let size = meta.and_then(|m| m.default_size).unwrap_or(Size::new(
                self.limits.default_width,
                self.limits.default_height,
            ));
            (self.next_cascade(), size)
        };

        let z_index = self.bump_z();
        Arc::make_mut(&mut self.windows).push(Window {
            app_id: app_id.to_string(),
            title,
            is_open: true,
            is_minimized: false,
            is_maximized: mobile,
            position,
            size,
            z_index,
            props: props.unwrap_or_default(),
        });
        self.active = Some(app_id.to_string());
        log::debug!("wm: opened {app_id} at z={z_index}");
        Ok(OpenOutcome::Created)
    }

    /// Remove a window. Returns `false` if it was not open.
    pub fn close_window(&mut self, app_id: &str) -> bool {
        let Some(index) = self.index_of(app_id) else {
            return false;
        };
        Arc::make_mut(&mut self.windows).remove(index);
        if self.active.as_deref() == Some(app_id) {
            self.active = None;
        }
        if self.snap_assist.as_ref().is_some_and(|s| s.anchor == app_id) {
            self.snap_assist = None;
        }
        log::debug!("wm: closed {app_id}");
        true
    }

    pub fn toggle_minimize(&mut self, app_id: &str) -> bool {
        self.update(app_id, |w| w.is_minimized = !w.is_minimized)
    }

    /// Flip the maximized flag; a window that becomes maximized is focused.
    pub fn toggle_maximize(&mut self, app_id: &str) -> bool {
        let mut maximized = false;
        let found = self.update(app_id, |w| {
            w.is_maximized = !w.is_maximized;
            maximized = w.is_maximized;
        });
        if maximized {
            self.focus_window(app_id);
        }
        found
    }

    /// Raise `app_id` above every other window and make it active.
    pub fn focus_window(&mut self, app_id: &str) -> bool {
        if self.active.as_deref() == Some(app_id) {
            return true;
        }
        if self.index_of(app_id).is_none() {
            return false;
        }
        let z = self.bump_z();
        self.update(app_id, |w| w.z_index = z);
        self.active = Some(app_id.to_string());
        true
    }

    pub fn move_window(&mut self, app_id: &str, x: i32, y: i32) -> bool {
        self.update(app_id, |w| {
            w.position = Point::new(x, y);
            w.is_maximized = false;
        })
    }

    pub fn resize_window(&mut self, app_id: &str, width: i32, height: i32) -> bool {
        self.update(app_id, |w| {
            w.size = Size::new(width, height);
            w.is_maximized = false;
        })
    }

    /// Snap a window to one half of the screen and offer the other half.
    pub fn snap_window(&mut self, app_id: &str, side: Side) -> bool {
        if !self.place_in_half(app_id, side) {
            return false;
        }
        self.snap_assist = Some(SnapAssist {
            anchor: app_id.to_string(),
            side: side.opposite(),
        });
        true
    }

    /// Windows that may fill the half offered by the current snap assist.
    pub fn snap_assist_candidates(&self) -> Vec<&Window> {
        let Some(assist) = &self.snap_assist else {
            return Vec::new();
        };
        self.windows
            .iter()
            .filter(|w| w.app_id != assist.anchor && !w.is_minimized)
            .collect()
    }

    /// Fill the offered half with `app_id` and dismiss the offer.
    pub fn select_snap_assist(&mut self, app_id: &str) -> bool {
        let Some(assist) = self.snap_assist.clone() else {
            return false;
        };
        let eligible = self
            .window(app_id)
            .is_some_and(|w| w.app_id != assist.anchor && !w.is_minimized);
        if !eligible {
            return false;
        }
        self.place_in_half(app_id, assist.side);
        self.focus_window(app_id);
        self.snap_assist = None;
        true
    }

    pub fn cancel_snap_assist(&mut self) {
        self.snap_assist = None;
    }

    // -- Internals --

    fn place_in_half(&mut self, app_id: &str, side: Side) -> bool {
        let half = self.viewport.width / 2;
        let height = self.usable_area().height;
        let x = match side {
            Side::Left => 0,
            Side::Right => self.viewport.width - half,
        };
        self.update(app_id, |w| {
            w.position = Point::new(x, 0);
            w.size = Size::new(half, height);
            w.is_maximized = false;
        })
    }

    /// Offset each new window one step past the previous one. The cascade
    /// starts over on an empty desktop, or once it reaches the middle of the
    /// usable area.
    fn next_cascade(&mut self) -> Point {
        if self.windows.is_empty() {
            self.cascade_slot = 0;
        }
        let area = self.usable_area();
        let mut offset = self.limits.cascade_origin + self.cascade_slot * self.limits.cascade_step;
        if offset > area.width.min(area.height) / 2 {
            self.cascade_slot = 0;
            offset = self.limits.cascade_origin;
        }
        self.cascade_slot += 1;
        Point::new(offset, offset)
    }

    fn usable_area(&self) -> Size {
        Size::new(
            self.viewport.width,
            (self.viewport.height - self.display.taskbar_height).max(0),
        )
    }

    fn bump_z(&mut self) -> u64 {
        let z = self.next_z;
        self.next_z += 1;
        z
    }

    fn index_of(&self, app_id: &str) -> Option<usize> {
        self.windows.iter().position(|w| w.app_id == app_id)
    }

    /// Apply `f` to one window. Returns `false` (and copies nothing) when the
    /// window is not open.
    fn update(&mut self, app_id: &str, f: impl FnOnce(&mut Window)) -> bool {
        let Some(index) = self.index_of(app_id) else {
            return false;
        };
        f(&mut Arc::make_mut(&mut self.windows)[index]);
        true
    }
}
