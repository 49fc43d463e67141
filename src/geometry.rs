/// Shared geometric primitives used by the transform, viewport and minimap modules.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Point in normalized image space, where `(0,0)` is the top-left corner and
/// `(1,1)` the bottom-right one. Values outside `[0,1]` are allowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub const CENTER: Self = Self::new(0.5, 0.5);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_image(self, image: ImageSize) -> Point {
        Point::new(self.x * image.width, self.y * image.height)
    }

    /// Normalizes an image-pixel position, or `None` for a degenerate image.
    pub fn from_image(point: Point, image: ImageSize) -> Option<Self> {
        if !image.is_drawable() {
            return None;
        }
        Some(Self::new(point.x / image.width, point.y / image.height))
    }
}

impl Default for NormalizedPoint {
    fn default() -> Self {
        Self::CENTER
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl ImageSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(f64::from(width), f64::from(height))
    }

    pub fn is_drawable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn corners(self) -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(self.width, 0.0),
            Point::new(self.width, self.height),
            Point::new(0.0, self.height),
        ]
    }

    pub fn is_drawable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub const fn rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |index: usize| u8::from_str_radix(hex.get(index..index + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_point_round_trips_through_image_space() {
        let image = ImageSize::new(400.0, 200.0);
        let point = NormalizedPoint::new(0.25, 0.75).to_image(image);
        assert_eq!(point, Point::new(100.0, 150.0));
        assert_eq!(
            NormalizedPoint::from_image(point, image),
            Some(NormalizedPoint::new(0.25, 0.75))
        );
    }

    #[test]
    fn normalizing_against_empty_image_is_rejected() {
        assert_eq!(
            NormalizedPoint::from_image(Point::new(1.0, 1.0), ImageSize::new(0.0, 10.0)),
            None
        );
    }

    #[test]
    fn color_from_hex_accepts_rgb_and_rgba() {
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::new(255, 128, 0, 255)));
        assert_eq!(Color::from_hex("#00000080"), Some(Color::new(0, 0, 0, 128)));
        assert_eq!(Color::from_hex("ff8000"), None);
        assert_eq!(Color::from_hex("#ff80"), None);
    }

    #[test]
    fn canvas_corners_run_clockwise_from_origin() {
        let corners = CanvasSize::new(10.0, 20.0).corners();
        assert_eq!(corners[0], Point::new(0.0, 0.0));
        assert_eq!(corners[2], Point::new(10.0, 20.0));
    }
}
