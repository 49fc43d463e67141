//! Per-view viewport state for standard and pinpoint comparison modes.

mod store;

use crate::geometry::{NormalizedPoint, Point};

pub use store::ViewportStore;

/// Identifies one view inside a comparison group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(pub usize);

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Standard,
    Pinpoint,
}

/// Standard-mode placement plus the pinpoint screen anchor of one view.
///
/// `center` is the normalized image point drawn at the canvas center and is
/// intentionally not clamped, so panning past the image edges is allowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub center: NormalizedPoint,
    pub ref_screen: Option<Point>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            center: NormalizedPoint::CENTER,
            ref_screen: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinpointView {
    pub individual_scale: f64,
    pub rotation_deg: f64,
    pub ref_point: NormalizedPoint,
}

impl Default for PinpointView {
    fn default() -> Self {
        Self {
            individual_scale: 1.0,
            rotation_deg: 0.0,
            ref_point: NormalizedPoint::CENTER,
        }
    }
}

/// Group-wide pinpoint values read by every view during one render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinpointSnapshot {
    pub global_scale: f64,
    pub group_rotation_deg: f64,
}

impl Default for PinpointSnapshot {
    fn default() -> Self {
        Self {
            global_scale: 1.0,
            group_rotation_deg: 0.0,
        }
    }
}

impl PinpointSnapshot {
    pub fn total_scale(&self, view: &PinpointView) -> f64 {
        view.individual_scale * self.global_scale
    }

    pub fn total_rotation_deg(&self, view: &PinpointView) -> f64 {
        normalize_rotation(view.rotation_deg + self.group_rotation_deg)
    }
}

/// Wraps an angle into `[0, 360)` and snaps it to 0.1° steps.
pub fn normalize_rotation(degrees: f64) -> f64 {
    let wrapped = ((degrees % 360.0) + 360.0) % 360.0;
    let rounded = (wrapped * 10.0).round() / 10.0;
    if rounded >= 360.0 {
        0.0
    } else {
        rounded
    }
}

/// Display form used by rotation inputs, e.g. `"12.3°"`.
pub fn format_rotation(degrees: f64) -> String {
    format!("{:.1}°", normalize_rotation(degrees))
}
