//! # Canvas Interaction
//!
//! Pointer and keyboard state machine for the custom canvas. It is driven by
//! plain event values so it works with any windowing layer, and with
//! synthetic events in tests.
//!
//! ```text
//! idle ──down on selected item's handle──▶ resizing ──up/leave──▶ idle
//!  │                                          │ move: width ± dx
//!  ├──down inside an item─────────────────▶ dragging ──up/leave──▶ idle
//!  │                                          │ move: center + delta
//!  └──down on empty space──▶ idle (selection cleared)
//! ```
//!
//! Every pointer position is converted from screen space into the
//! 1920×1080 output space through a [`Viewport`] before any comparison.

use tracing::debug;

use crate::raster::{OUTPUT_HEIGHT, OUTPUT_WIDTH};
use crate::state::{Bounds, CompositionState, MIN_ITEM_WIDTH};

/// Pointer distance (output units) within which a handle is grabbed.
pub const HANDLE_HIT_RADIUS: f32 = 15.0;

/// Drawn radius of a resize handle.
pub const HANDLE_RADIUS: f32 = 8.0;

/// Arrow-key nudge, and with shift held.
pub const NUDGE: f32 = 1.0;
pub const NUDGE_LARGE: f32 = 10.0;

/// Mapping from screen coordinates to output coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Displayed pixels per output unit.
    pub scale: f32,
    /// Screen position of the output's top-left corner.
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl Viewport {
    /// Viewport for an output displayed `display_width` pixels wide.
    pub fn fit_width(display_width: f32) -> Self {
        let scale = if display_width > 0.0 {
            display_width / OUTPUT_WIDTH as f32
        } else {
            1.0
        };
        Self {
            scale,
            ..Self::default()
        }
    }

    pub fn to_output(&self, screen_x: f32, screen_y: f32) -> (f32, f32) {
        (
            (screen_x - self.offset_x) / self.scale,
            (screen_y - self.offset_y) / self.scale,
        )
    }

    /// Displayed size of the output.
    pub fn display_size(&self) -> (f32, f32) {
        (OUTPUT_WIDTH as f32 * self.scale, OUTPUT_HEIGHT as f32 * self.scale)
    }
}

/// The eight resize handles, clockwise from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::TopLeft,
        Handle::Top,
        Handle::TopRight,
        Handle::Right,
        Handle::BottomRight,
        Handle::Bottom,
        Handle::BottomLeft,
        Handle::Left,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|h| *h == self).unwrap_or(0)
    }

    pub fn is_left(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::Left | Handle::BottomLeft)
    }

    pub fn is_right(self) -> bool {
        matches!(self, Handle::TopRight | Handle::Right | Handle::BottomRight)
    }

    /// Position of this handle on `bounds`.
    pub fn point(self, b: &Bounds) -> (f32, f32) {
        let (l, c, r) = (b.x, b.x + b.width / 2.0, b.x + b.width);
        let (t, m, bo) = (b.y, b.y + b.height / 2.0, b.y + b.height);
        match self {
            Handle::TopLeft => (l, t),
            Handle::Top => (c, t),
            Handle::TopRight => (r, t),
            Handle::Right => (r, m),
            Handle::BottomRight => (r, bo),
            Handle::Bottom => (c, bo),
            Handle::BottomLeft => (l, bo),
            Handle::Left => (l, m),
        }
    }

    /// CSS-style cursor name.
    pub fn cursor_name(self) -> &'static str {
        match self {
            Handle::TopLeft | Handle::BottomRight => "nwse-resize",
            Handle::TopRight | Handle::BottomLeft => "nesw-resize",
            Handle::Top | Handle::Bottom => "ns-resize",
            Handle::Left | Handle::Right => "ew-resize",
        }
    }
}

/// All handle positions on `bounds`.
pub fn handle_points(bounds: &Bounds) -> [(Handle, (f32, f32)); 8] {
    Handle::ALL.map(|h| (h, h.point(bounds)))
}

/// Current gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    Resizing {
        item: u64,
        handle: Handle,
        start: (f32, f32),
        start_width: f32,
        start_center_x: f32,
    },
    Dragging {
        item: u64,
        start: (f32, f32),
        start_center: (f32, f32),
    },
}

/// Pointer input in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Delete,
    Backspace,
    Other,
}

impl Key {
    /// Map a DOM-style key name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => Key::Left,
            "ArrowRight" => Key::Right,
            "ArrowUp" => Key::Up,
            "ArrowDown" => Key::Down,
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            _ => Key::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// Any modifier held (large nudge).
    pub shift: bool,
}

/// Cursor to show for a hover position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Move,
    Resize(Handle),
}

impl Cursor {
    pub fn name(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Move => "move",
            Cursor::Resize(h) => h.cursor_name(),
        }
    }
}

/// Topmost item under an output-space point.
pub fn hit_test(state: &CompositionState, x: f32, y: f32) -> Option<u64> {
    state
        .custom_items()
        .iter()
        .rev()
        .find(|item| item.bounds().contains(x, y))
        .map(|item| item.id)
}

/// Handle of the selected item within grabbing distance of a point.
pub fn handle_at(state: &CompositionState, x: f32, y: f32) -> Option<Handle> {
    let bounds = state.selected_item()?.bounds();
    handle_points(&bounds)
        .into_iter()
        .find(|(_, (hx, hy))| (x - hx).hypot(y - hy) <= HANDLE_HIT_RADIUS)
        .map(|(h, _)| h)
}

/// The interaction state machine. Methods return `true` when the
/// composition changed and needs a redraw.
#[derive(Debug, Clone)]
pub struct Interaction {
    gesture: Gesture,
    viewport: Viewport,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl Interaction {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            gesture: Gesture::Idle,
            viewport,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Update the display scale (window resize).
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn handle_pointer(&mut self, state: &mut CompositionState, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down { x, y } => self.pointer_down(state, x, y),
            PointerEvent::Move { x, y } => self.pointer_move(state, x, y),
            PointerEvent::Up | PointerEvent::Leave => {
                self.end_gesture();
                false
            }
        }
    }

    pub fn pointer_down(&mut self, state: &mut CompositionState, sx: f32, sy: f32) -> bool {
        if !state.is_custom() {
            return false;
        }
        let (x, y) = self.viewport.to_output(sx, sy);

        if let (Some(handle), Some(item)) = (handle_at(state, x, y), state.selected_item()) {
            debug!(item = item.id, ?handle, "resize start");
            self.gesture = Gesture::Resizing {
                item: item.id,
                handle,
                start: (x, y),
                start_width: item.width,
                start_center_x: item.center_x,
            };
            return false;
        }

        let previous = state.selected_item_id();
        match hit_test(state, x, y).and_then(|id| state.item(id)) {
            Some(item) => {
                let (id, start_center) = (item.id, (item.center_x, item.center_y));
                debug!(item = id, "drag start");
                self.gesture = Gesture::Dragging {
                    item: id,
                    start: (x, y),
                    start_center,
                };
                state.select_item(Some(id)).is_ok() && previous != Some(id)
            }
            None => {
                self.gesture = Gesture::Idle;
                state.select_item(None).is_ok() && previous.is_some()
            }
        }
    }

    pub fn pointer_move(&mut self, state: &mut CompositionState, sx: f32, sy: f32) -> bool {
        let (x, y) = self.viewport.to_output(sx, sy);
        match self.gesture {
            Gesture::Idle => false,
            Gesture::Dragging {
                item,
                start,
                start_center,
            } => {
                let Some(item) = state.item_mut(item) else {
                    self.end_gesture();
                    return false;
                };
                item.center_x = start_center.0 + (x - start.0);
                item.center_y = start_center.1 + (y - start.1);
                true
            }
            Gesture::Resizing {
                item,
                handle,
                start,
                start_width,
                start_center_x,
            } => {
                let Some(item) = state.item_mut(item) else {
                    self.end_gesture();
                    return false;
                };
                let dx = x - start.0;
                let width = if handle.is_right() {
                    start_width + dx
                } else if handle.is_left() {
                    start_width - dx
                } else {
                    start_width
                };
                let width = width.max(MIN_ITEM_WIDTH);
                item.width = width;
                if handle.is_left() {
                    // Keep the right edge where it was
                    item.center_x = start_center_x + (start_width - width) / 2.0;
                }
                true
            }
        }
    }

    fn end_gesture(&mut self) {
        if self.gesture != Gesture::Idle {
            debug!("gesture end");
        }
        self.gesture = Gesture::Idle;
    }

    /// Keyboard input; only acts when an item is selected.
    pub fn key(&mut self, state: &mut CompositionState, event: KeyEvent) -> bool {
        let Some(id) = state.selected_item_id() else {
            return false;
        };
        let step = if event.shift { NUDGE_LARGE } else { NUDGE };
        let (dx, dy) = match event.key {
            Key::Left => (-step, 0.0),
            Key::Right => (step, 0.0),
            Key::Up => (0.0, -step),
            Key::Down => (0.0, step),
            Key::Delete | Key::Backspace => {
                self.end_gesture();
                return state.remove_custom_item(id).is_ok();
            }
            Key::Other => return false,
        };
        match state.item_mut(id) {
            Some(item) => {
                item.center_x += dx;
                item.center_y += dy;
                true
            }
            None => false,
        }
    }

    /// Cursor for a hover position in screen coordinates.
    pub fn cursor_at(&self, state: &CompositionState, sx: f32, sy: f32) -> Cursor {
        if !state.is_custom() {
            return Cursor::Default;
        }
        match self.gesture {
            Gesture::Resizing { handle, .. } => return Cursor::Resize(handle),
            Gesture::Dragging { .. } => return Cursor::Move,
            Gesture::Idle => {}
        }
        let (x, y) = self.viewport.to_output(sx, sy);
        if let Some(handle) = handle_at(state, x, y) {
            Cursor::Resize(handle)
        } else if hit_test(state, x, y).is_some() {
            Cursor::Move
        } else {
            Cursor::Default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::fixtures::image;
    use crate::source::{CaptureKind, DeviceClass};
    use pretty_assertions::assert_eq;

    fn canvas() -> (CompositionState, u64) {
        let mut state = CompositionState::new("custom").unwrap();
        let id = state
            .add_custom_item(image("d", DeviceClass::Desktop, CaptureKind::Viewport))
            .unwrap();
        (state, id)
    }

    fn key(key: Key, shift: bool) -> KeyEvent {
        KeyEvent { key, shift }
    }

    #[test]
    fn test_drag_moves_center_by_delta() {
        let (mut state, id) = canvas();
        let mut ix = Interaction::default();
        ix.handle_pointer(&mut state, PointerEvent::Down { x: 900.0, y: 500.0 });
        assert!(matches!(ix.gesture(), Gesture::Dragging { .. }));
        assert!(ix.handle_pointer(&mut state, PointerEvent::Move { x: 950.0, y: 470.0 }));
        ix.handle_pointer(&mut state, PointerEvent::Up);

        let item = state.item(id).unwrap();
        assert_eq!((item.center_x, item.center_y, item.width), (1010.0, 510.0, 800.0));
        assert_eq!(ix.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_drag_uses_delta_from_start_not_last_move() {
        let (mut state, id) = canvas();
        let mut ix = Interaction::default();
        ix.pointer_down(&mut state, 960.0, 540.0);
        ix.pointer_move(&mut state, 1000.0, 540.0);
        ix.pointer_move(&mut state, 970.0, 550.0);
        let item = state.item(id).unwrap();
        assert_eq!((item.center_x, item.center_y), (970.0, 550.0));
    }

    #[test]
    fn test_right_handle_grows_width() {
        let (mut state, id) = canvas();
        let b = state.item(id).unwrap().bounds();
        let (hx, hy) = Handle::Right.point(&b);
        let mut ix = Interaction::default();
        ix.pointer_down(&mut state, hx + 5.0, hy);
        assert!(matches!(ix.gesture(), Gesture::Resizing { handle: Handle::Right, .. }));
        ix.pointer_move(&mut state, hx + 105.0, hy + 40.0);
        let item = state.item(id).unwrap();
        assert_eq!((item.width, item.center_x), (900.0, 960.0));
    }

    #[test]
    fn test_left_handle_keeps_right_edge() {
        let (mut state, id) = canvas();
        let right_edge = |s: &CompositionState| {
            let i = s.item(id).unwrap();
            i.center_x + i.width / 2.0
        };
        let before = right_edge(&state);
        let b = state.item(id).unwrap().bounds();
        let (hx, hy) = Handle::BottomLeft.point(&b);

        let mut ix = Interaction::default();
        ix.pointer_down(&mut state, hx, hy);
        for dx in [37.0, -120.0, 250.5, 750.0] {
            ix.pointer_move(&mut state, hx + dx, hy);
            assert!((right_edge(&state) - before).abs() < 1e-3, "moved by {}", dx);
        }
        // Clamped at the minimum but still anchored
        assert_eq!(state.item(id).unwrap().width, MIN_ITEM_WIDTH);
    }

    #[test]
    fn test_resize_never_below_minimum() {
        let (mut state, id) = canvas();
        let b = state.item(id).unwrap().bounds();
        let (hx, hy) = Handle::TopRight.point(&b);
        let mut ix = Interaction::default();
        ix.pointer_down(&mut state, hx, hy);
        ix.pointer_move(&mut state, hx - 5000.0, hy);
        assert_eq!(state.item(id).unwrap().width, MIN_ITEM_WIDTH);
    }

    #[test]
    fn test_vertical_handles_keep_width() {
        let (mut state, id) = canvas();
        let b = state.item(id).unwrap().bounds();
        let (hx, hy) = Handle::Bottom.point(&b);
        let mut ix = Interaction::default();
        ix.pointer_down(&mut state, hx, hy);
        ix.pointer_move(&mut state, hx + 80.0, hy + 80.0);
        assert_eq!(state.item(id).unwrap().width, 800.0);
    }

    #[test]
    fn test_topmost_item_wins_hit_test() {
        let mut state = CompositionState::new("custom").unwrap();
        let back = state
            .add_custom_item(image("a", DeviceClass::Desktop, CaptureKind::Viewport))
            .unwrap();
        let front = state
            .add_custom_item(image("b", DeviceClass::Desktop, CaptureKind::Viewport))
            .unwrap();
        assert_eq!(hit_test(&state, 960.0, 540.0), Some(front));
        state.reorder_to_front(back).unwrap();
        assert_eq!(hit_test(&state, 960.0, 540.0), Some(back));
    }

    #[test]
    fn test_pointer_down_selects_and_empty_space_clears() {
        let (mut state, id) = canvas();
        state.select_item(None).unwrap();
        let mut ix = Interaction::default();
        assert!(ix.pointer_down(&mut state, 960.0, 540.0));
        assert_eq!(state.selected_item_id(), Some(id));
        ix.handle_pointer(&mut state, PointerEvent::Leave);

        assert!(ix.pointer_down(&mut state, 10.0, 10.0));
        assert_eq!(state.selected_item_id(), None);
        assert_eq!(ix.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_pointer_converted_through_display_scale() {
        let (mut state, id) = canvas();
        // Output shown at half size
        let mut ix = Interaction::new(Viewport::fit_width(960.0));
        ix.pointer_down(&mut state, 480.0, 270.0);
        assert!(matches!(ix.gesture(), Gesture::Dragging { .. }));
        ix.pointer_move(&mut state, 505.0, 255.0);
        let item = state.item(id).unwrap();
        assert_eq!((item.center_x, item.center_y), (1010.0, 510.0));
    }

    #[test]
    fn test_move_without_gesture_is_ignored() {
        let (mut state, id) = canvas();
        let mut ix = Interaction::default();
        assert!(!ix.pointer_move(&mut state, 100.0, 100.0));
        assert_eq!(state.item(id).unwrap().center_x, 960.0);
    }

    #[test]
    fn test_arrow_keys_nudge() {
        let (mut state, id) = canvas();
        let mut ix = Interaction::default();
        assert!(ix.key(&mut state, key(Key::Right, false)));
        assert!(ix.key(&mut state, key(Key::Up, true)));
        let item = state.item(id).unwrap();
        assert_eq!((item.center_x, item.center_y), (961.0, 530.0));
        assert!(!ix.key(&mut state, key(Key::Other, false)));
    }

    #[test]
    fn test_delete_removes_selected() {
        let (mut state, id) = canvas();
        let mut ix = Interaction::default();
        assert!(ix.key(&mut state, key(Key::Backspace, false)));
        assert!(state.item(id).is_none());
        // Nothing selected any more
        assert!(!ix.key(&mut state, key(Key::Delete, false)));
    }

    #[test]
    fn test_ignored_outside_custom_mode() {
        let mut state = CompositionState::new("grid").unwrap();
        let mut ix = Interaction::default();
        assert!(!ix.pointer_down(&mut state, 960.0, 540.0));
        assert_eq!(ix.cursor_at(&state, 960.0, 540.0), Cursor::Default);
    }

    #[test]
    fn test_cursor_at() {
        let (state, id) = canvas();
        let ix = Interaction::default();
        let b = state.item(id).unwrap().bounds();
        let (hx, hy) = Handle::TopLeft.point(&b);
        assert_eq!(ix.cursor_at(&state, hx, hy), Cursor::Resize(Handle::TopLeft));
        assert_eq!(ix.cursor_at(&state, 960.0, 540.0), Cursor::Move);
        assert_eq!(ix.cursor_at(&state, 5.0, 5.0).name(), "default");
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("ArrowDown"), Key::Down);
        assert_eq!(Key::from_name("Backspace"), Key::Backspace);
        assert_eq!(Key::from_name("a"), Key::Other);
    }

    #[test]
    fn test_handle_points_cover_bounds() {
        let b = Bounds {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
        };
        let pts = handle_points(&b);
        assert_eq!(pts[0], (Handle::TopLeft, (10.0, 20.0)));
        assert_eq!(pts[4], (Handle::BottomRight, (110.0, 70.0)));
        assert_eq!(pts[7], (Handle::Left, (10.0, 45.0)));
        assert_eq!(Handle::Bottom.index(), 5);
    }
}
