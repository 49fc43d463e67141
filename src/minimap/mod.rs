//! Scaled-down overview of a view with the visible region outlined.

mod raster;

use image::{imageops, RgbaImage};

use crate::geometry::{CanvasSize, Color, Point};
use crate::transform::Transform;

pub const MIN_MINIMAP_WIDTH: u32 = 60;
pub const MAX_MINIMAP_WIDTH: u32 = 400;
pub const DEFAULT_MINIMAP_WIDTH: u32 = 180;

const DEFAULT_OVERLAY_COLOR: Color = Color::new(255, 82, 82, 255);
const OVERLAY_FILL_ALPHA: u8 = 56;

pub fn clamp_minimap_width(width: u32) -> u32 {
    width.clamp(MIN_MINIMAP_WIDTH, MAX_MINIMAP_WIDTH)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimapStyle {
    pub stroke: Color,
    pub fill: Color,
}

impl MinimapStyle {
    pub const fn from_color(color: Color) -> Self {
        Self {
            stroke: color,
            fill: color.with_alpha(OVERLAY_FILL_ALPHA),
        }
    }
}

impl Default for MinimapStyle {
    fn default() -> Self {
        Self::from_color(DEFAULT_OVERLAY_COLOR)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MinimapOverlay {
    /// Unrotated view, clamped to the minimap bounds.
    Rectangle(OverlayRect),
    /// Canvas corners in minimap pixels, in top-left, top-right,
    /// bottom-right, bottom-left order.
    Polygon([Point; 4]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapLayout {
    pub width: u32,
    pub height: u32,
    /// Rotation applied to the whole minimap drawing, in radians.
    pub theta: f64,
    pub overlay: MinimapOverlay,
}

impl MinimapLayout {
    pub fn is_rotated(&self) -> bool {
        matches!(self.overlay, MinimapOverlay::Polygon(_))
    }
}

/// Minimap geometry for a `bitmap_width x bitmap_height` image drawn with
/// `transform` on a canvas of `canvas` size. `None` when any size is degenerate.
pub fn compute_minimap_layout(
    bitmap_width: u32,
    bitmap_height: u32,
    requested_width: u32,
    transform: &Transform,
    canvas: CanvasSize,
) -> Option<MinimapLayout> {
    if bitmap_width == 0 || bitmap_height == 0 || !canvas.is_drawable() {
        return None;
    }

    let width = clamp_minimap_width(requested_width);
    let exact_height = f64::from(width) * f64::from(bitmap_height) / f64::from(bitmap_width);
    let height = (exact_height.round() as u32).max(1);
    let minimap_w = f64::from(width);
    let minimap_h = f64::from(height);
    let bitmap_w = f64::from(bitmap_width);
    let bitmap_h = f64::from(bitmap_height);

    let corners = canvas.corners().map(|corner| {
        let image = transform.screen_to_image(corner);
        Point::new(
            image.x / bitmap_w * minimap_w,
            image.y / bitmap_h * minimap_h,
        )
    });

    let overlay = if transform.is_rotated() {
        MinimapOverlay::Polygon(corners)
    } else {
        MinimapOverlay::Rectangle(clamped_bounds(&corners, minimap_w, minimap_h))
    };

    Some(MinimapLayout {
        width,
        height,
        theta: if transform.is_rotated() {
            transform.theta
        } else {
            0.0
        },
        overlay,
    })
}

fn clamped_bounds(corners: &[Point; 4], max_x: f64, max_y: f64) -> OverlayRect {
    let (min, max) = corners.iter().fold(
        (
            Point::new(f64::INFINITY, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ),
        |(min, max), corner| {
            (
                Point::new(min.x.min(corner.x), min.y.min(corner.y)),
                Point::new(max.x.max(corner.x), max.y.max(corner.y)),
            )
        },
    );
    let left = min.x.clamp(0.0, max_x);
    let top = min.y.clamp(0.0, max_y);
    let right = max.x.clamp(0.0, max_x);
    let bottom = max.y.clamp(0.0, max_y);
    OverlayRect {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapRenderer {
    width: u32,
    style: MinimapStyle,
}

impl Default for MinimapRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_MINIMAP_WIDTH, MinimapStyle::default())
    }
}

impl MinimapRenderer {
    pub fn new(width: u32, style: MinimapStyle) -> Self {
        Self {
            width: clamp_minimap_width(width),
            style,
        }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn style(&self) -> MinimapStyle {
        self.style
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = clamp_minimap_width(width);
    }

    /// Renders the minimap, or nothing when the bitmap, transform or canvas is missing.
    pub fn render(
        &self,
        bitmap: Option<&RgbaImage>,
        transform: Option<&Transform>,
        canvas: Option<CanvasSize>,
    ) -> Option<RgbaImage> {
        let (bitmap, transform, canvas) = (bitmap?, transform?, canvas?);
        let layout =
            compute_minimap_layout(bitmap.width(), bitmap.height(), self.width, transform, canvas)?;

        let mut drawing = imageops::resize(
            bitmap,
            layout.width,
            layout.height,
            imageops::FilterType::Triangle,
        );
        match layout.overlay {
            MinimapOverlay::Rectangle(rect) => {
                raster::draw_rectangle(&mut drawing, rect, self.style);
            }
            MinimapOverlay::Polygon(points) => {
                raster::draw_polygon(&mut drawing, &points, self.style);
            }
        }

        if layout.theta == 0.0 {
            return Some(drawing);
        }
        Some(raster::rotate_about_center(&drawing, layout.theta))
    }
}
