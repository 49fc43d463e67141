use crate::geometry::{CanvasSize, ImageSize, Point};
use crate::viewport::{ViewId, ViewMode, ViewportStore};

/// Zoom factor applied per wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    Leave,
}

/// Turns raw pointer events into drag deltas in screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragTracker {
    last: Option<Point>,
}

impl DragTracker {
    pub const fn new() -> Self {
        Self { last: None }
    }

    pub const fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    /// Returns the movement since the previous event of an active drag.
    pub fn handle(&mut self, event: PointerEvent) -> Option<Point> {
        match event {
            PointerEvent::Down(position) => {
                self.last = Some(position);
                None
            }
            PointerEvent::Move(position) => {
                let previous = self.last?;
                self.last = Some(position);
                let delta = Point::new(position.x - previous.x, position.y - previous.y);
                (delta.x != 0.0 || delta.y != 0.0).then_some(delta)
            }
            PointerEvent::Up(position) => {
                let previous = self.last.take()?;
                let delta = Point::new(position.x - previous.x, position.y - previous.y);
                (delta.x != 0.0 || delta.y != 0.0).then_some(delta)
            }
            PointerEvent::Leave => {
                self.last = None;
                None
            }
        }
    }
}

/// Pans `view` by a drag delta in whichever mode the store is in.
pub fn apply_drag(
    store: &mut ViewportStore,
    view: ViewId,
    delta: Point,
    image: ImageSize,
    canvas: CanvasSize,
) {
    match store.mode() {
        ViewMode::Standard => store.pan_by_screen_delta(view, delta, image),
        ViewMode::Pinpoint => store.pan_pinpoint(view, delta, image, canvas),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelTarget {
    /// Standard scale, or the shared pinpoint scale.
    View,
    /// Only this view's pinpoint scale.
    Individual,
}

/// Zooms by `notches` wheel steps; positive values zoom in. Returns the new scale.
pub fn apply_wheel(
    store: &mut ViewportStore,
    view: ViewId,
    notches: f64,
    cursor: Point,
    target: WheelTarget,
    image: ImageSize,
    canvas: CanvasSize,
) -> f64 {
    let factor = ZOOM_STEP.powf(notches);
    match (store.mode(), target) {
        (ViewMode::Standard, _) => store.zoom_at(view, factor, cursor, image, canvas),
        (ViewMode::Pinpoint, WheelTarget::View) => store.zoom_global(factor),
        (ViewMode::Pinpoint, WheelTarget::Individual) => store.zoom_individual(view, factor),
    }
}
