use std::collections::BTreeMap;

use crate::geometry::{CanvasSize, ImageSize, NormalizedPoint, Point};
use crate::transform::{
    compute_pinpoint_transform, compute_standard_transform, sanitize_scale, PinpointPlacement,
    Transform,
};

use super::{normalize_rotation, PinpointSnapshot, PinpointView, ViewId, ViewMode, Viewport};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ViewEntry {
    viewport: Viewport,
    pinpoint: PinpointView,
}

/// Mutable viewport state for one comparison group.
///
/// Every setter is total: out-of-range scales are clamped, rotations are
/// normalized, and non-finite coordinates leave the stored value untouched.
/// Views are created on first write; reads of unknown views return defaults.
#[derive(Debug, Clone, Default)]
pub struct ViewportStore {
    mode: ViewMode,
    views: BTreeMap<ViewId, ViewEntry>,
    snapshot: PinpointSnapshot,
    shared_ref_screen: Option<Point>,
}

impl ViewportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.mode != mode {
            tracing::debug!(from = ?self.mode, to = ?mode, "switch view mode");
        }
        self.mode = mode;
    }

    pub fn view_ids(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.views.keys().copied()
    }

    pub fn reset_view(&mut self, view: ViewId) {
        let entry = self.fresh_entry();
        self.views.insert(view, entry);
    }

    pub fn remove_view(&mut self, view: ViewId) {
        self.views.remove(&view);
    }

    fn fresh_entry(&self) -> ViewEntry {
        ViewEntry {
            viewport: Viewport {
                ref_screen: self.shared_ref_screen,
                ..Viewport::default()
            },
            pinpoint: PinpointView::default(),
        }
    }

    fn entry(&self, view: ViewId) -> ViewEntry {
        self.views
            .get(&view)
            .copied()
            .unwrap_or_else(|| self.fresh_entry())
    }

    fn entry_mut(&mut self, view: ViewId) -> &mut ViewEntry {
        let fresh = self.fresh_entry();
        self.views.entry(view).or_insert(fresh)
    }

    pub fn viewport(&self, view: ViewId) -> Viewport {
        self.entry(view).viewport
    }

    pub fn pinpoint_view(&self, view: ViewId) -> PinpointView {
        self.entry(view).pinpoint
    }

    pub const fn snapshot(&self) -> PinpointSnapshot {
        self.snapshot
    }

    pub fn scale(&self, view: ViewId) -> f64 {
        self.entry(view).viewport.scale
    }

    /// Stores the clamped scale and returns it.
    pub fn set_scale(&mut self, view: ViewId, scale: f64) -> f64 {
        let stored = sanitize_scale(scale);
        if stored != scale {
            tracing::debug!(%view, requested = scale, stored, "clamped standard scale");
        }
        self.entry_mut(view).viewport.scale = stored;
        stored
    }

    pub fn center(&self, view: ViewId) -> NormalizedPoint {
        self.entry(view).viewport.center
    }

    pub fn set_center(&mut self, view: ViewId, center: NormalizedPoint) {
        if !(center.x.is_finite() && center.y.is_finite()) {
            tracing::warn!(%view, ?center, "ignoring non-finite viewport center");
            return;
        }
        self.entry_mut(view).viewport.center = center;
    }

    pub fn ref_screen(&self, view: ViewId) -> Option<Point> {
        self.entry(view).viewport.ref_screen
    }

    /// `None` anchors the view at the canvas center.
    pub fn set_ref_screen(&mut self, view: ViewId, anchor: Option<Point>) {
        if !anchor.is_none_or(|point| point.x.is_finite() && point.y.is_finite()) {
            tracing::warn!(%view, ?anchor, "ignoring non-finite screen anchor");
            return;
        }
        self.entry_mut(view).viewport.ref_screen = anchor;
    }

    /// Applies one anchor to every view of the group, including views added later.
    pub fn set_shared_ref_screen(&mut self, anchor: Option<Point>) {
        if !anchor.is_none_or(|point| point.x.is_finite() && point.y.is_finite()) {
            tracing::warn!(?anchor, "ignoring non-finite shared screen anchor");
            return;
        }
        self.shared_ref_screen = anchor;
        for entry in self.views.values_mut() {
            entry.viewport.ref_screen = anchor;
        }
    }

    pub fn pinpoint_rotation(&self, view: ViewId) -> f64 {
        self.entry(view).pinpoint.rotation_deg
    }

    /// Stores the normalized rotation and returns it.
    pub fn set_pinpoint_rotation(&mut self, view: ViewId, degrees: f64) -> f64 {
        if !degrees.is_finite() {
            tracing::warn!(%view, degrees, "ignoring non-finite rotation");
            return self.pinpoint_rotation(view);
        }
        let stored = normalize_rotation(degrees);
        self.entry_mut(view).pinpoint.rotation_deg = stored;
        stored
    }

    pub fn rotate_by(&mut self, view: ViewId, delta_degrees: f64) -> f64 {
        let current = self.pinpoint_rotation(view);
        self.set_pinpoint_rotation(view, current + delta_degrees)
    }

    pub fn pinpoint_scale(&self, view: ViewId) -> f64 {
        self.entry(view).pinpoint.individual_scale
    }

    pub fn set_pinpoint_scale(&mut self, view: ViewId, scale: f64) -> f64 {
        let stored = sanitize_scale(scale);
        self.entry_mut(view).pinpoint.individual_scale = stored;
        stored
    }

    pub const fn global_scale(&self) -> f64 {
        self.snapshot.global_scale
    }

    pub fn set_global_scale(&mut self, scale: f64) -> f64 {
        let stored = sanitize_scale(scale);
        self.snapshot.global_scale = stored;
        stored
    }

    pub const fn group_rotation(&self) -> f64 {
        self.snapshot.group_rotation_deg
    }

    pub fn set_group_rotation(&mut self, degrees: f64) -> f64 {
        if !degrees.is_finite() {
            tracing::warn!(degrees, "ignoring non-finite group rotation");
            return self.snapshot.group_rotation_deg;
        }
        self.snapshot.group_rotation_deg = normalize_rotation(degrees);
        self.snapshot.group_rotation_deg
    }

    pub fn ref_point(&self, view: ViewId) -> NormalizedPoint {
        self.entry(view).pinpoint.ref_point
    }

    pub fn set_ref_point(&mut self, view: ViewId, point: NormalizedPoint) {
        if !(point.x.is_finite() && point.y.is_finite()) {
            tracing::warn!(%view, ?point, "ignoring non-finite reference point");
            return;
        }
        self.entry_mut(view).pinpoint.ref_point = point;
    }

    /// Transform for the current mode, or `None` when there is nothing to draw.
    pub fn transform_for(
        &self,
        view: ViewId,
        image: ImageSize,
        canvas: CanvasSize,
    ) -> Option<Transform> {
        self.transform_in_mode(self.mode, view, image, canvas)
    }

    fn transform_in_mode(
        &self,
        mode: ViewMode,
        view: ViewId,
        image: ImageSize,
        canvas: CanvasSize,
    ) -> Option<Transform> {
        if !image.is_drawable() || !canvas.is_drawable() {
            return None;
        }
        let entry = self.entry(view);
        let transform = match mode {
            ViewMode::Standard => compute_standard_transform(
                image,
                &entry.viewport,
                entry.viewport.scale,
                0.0,
                canvas,
            ),
            ViewMode::Pinpoint => compute_pinpoint_transform(
                image,
                &entry.viewport,
                PinpointPlacement {
                    individual_scale: entry.pinpoint.individual_scale,
                    global_scale: self.snapshot.global_scale,
                    ref_point: entry.pinpoint.ref_point,
                    total_angle_deg: self.snapshot.total_rotation_deg(&entry.pinpoint),
                },
                canvas,
            ),
        };
        Some(transform)
    }

    /// Standard-mode drag: the image follows the pointer by `delta` screen pixels.
    pub fn pan_by_screen_delta(&mut self, view: ViewId, delta: Point, image: ImageSize) {
        if !image.is_drawable() {
            return;
        }
        let viewport = self.viewport(view);
        let center = NormalizedPoint::new(
            viewport.center.x - delta.x / (viewport.scale * image.width),
            viewport.center.y - delta.y / (viewport.scale * image.height),
        );
        self.set_center(view, center);
    }

    /// Standard-mode zoom that keeps the image point under `cursor` in place.
    pub fn zoom_at(
        &mut self,
        view: ViewId,
        factor: f64,
        cursor: Point,
        image: ImageSize,
        canvas: CanvasSize,
    ) -> f64 {
        if !factor.is_finite() || factor <= 0.0 {
            tracing::warn!(%view, factor, "ignoring invalid zoom factor");
            return self.scale(view);
        }
        let viewport = self.viewport(view);
        let Some(before) = self.transform_in_mode(ViewMode::Standard, view, image, canvas) else {
            return self.set_scale(view, viewport.scale * factor);
        };
        let focus = before.screen_to_image(cursor);
        let scale = self.set_scale(view, viewport.scale * factor);
        let center = NormalizedPoint::new(
            (focus.x - (cursor.x - canvas.width / 2.0) / scale) / image.width,
            (focus.y - (cursor.y - canvas.height / 2.0) / scale) / image.height,
        );
        self.set_center(view, center);
        scale
    }

    /// Pinpoint-mode drag: moves this view's reference point so the content
    /// under the pointer follows it, whatever the view rotation is.
    pub fn pan_pinpoint(
        &mut self,
        view: ViewId,
        delta: Point,
        image: ImageSize,
        canvas: CanvasSize,
    ) {
        let Some(transform) = self.transform_in_mode(ViewMode::Pinpoint, view, image, canvas) else {
            return;
        };
        let anchor = self.ref_screen(view).unwrap_or_else(|| canvas.center());
        let target = Point::new(anchor.x - delta.x, anchor.y - delta.y);
        if let Some(point) = NormalizedPoint::from_image(transform.screen_to_image(target), image)
        {
            self.set_ref_point(view, point);
        }
    }

    /// Makes the image point currently drawn at `screen` the view's reference point.
    pub fn set_ref_point_from_screen(
        &mut self,
        view: ViewId,
        screen: Point,
        image: ImageSize,
        canvas: CanvasSize,
    ) -> Option<NormalizedPoint> {
        let transform = self.transform_for(view, image, canvas)?;
        let point = NormalizedPoint::from_image(transform.screen_to_image(screen), image)?;
        tracing::debug!(%view, ?point, "reference point picked from screen");
        self.set_ref_point(view, point);
        Some(point)
    }

    pub fn zoom_global(&mut self, factor: f64) -> f64 {
        if !factor.is_finite() || factor <= 0.0 {
            return self.global_scale();
        }
        self.set_global_scale(self.global_scale() * factor)
    }

    pub fn zoom_individual(&mut self, view: ViewId, factor: f64) -> f64 {
        if !factor.is_finite() || factor <= 0.0 {
            return self.pinpoint_scale(view);
        }
        self.set_pinpoint_scale(view, self.pinpoint_scale(view) * factor)
    }
}
