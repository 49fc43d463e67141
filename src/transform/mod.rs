//! Affine placement of an image bitmap on a canvas.
//!
//! A [`Transform`] is derived fresh for every draw call from the viewport state,
//! so nothing here holds onto mutable state. Forward mapping scales the image
//! into draw space, offsets it by `(draw_x, draw_y)`, then rotates by `theta`
//! around the image's own center `(center_x, center_y)` in screen space.

use crate::geometry::{CanvasSize, ImageSize, NormalizedPoint, Point};
use crate::viewport::Viewport;

/// Smallest value any single stored scale factor may take.
pub const MIN_SCALE: f64 = 0.01;

/// Rotation below this magnitude (radians) is treated as none.
const ROTATION_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub draw_x: f64,
    pub draw_y: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub scale: f64,
    pub theta: f64,
    pub image_w: f64,
    pub image_h: f64,
}

/// Per-view pinpoint inputs, combined with the group snapshot by the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinpointPlacement {
    pub individual_scale: f64,
    pub global_scale: f64,
    pub ref_point: NormalizedPoint,
    pub total_angle_deg: f64,
}

impl Transform {
    pub fn image_to_screen(&self, image: Point) -> Point {
        let unrotated_x = self.draw_x + image.x * self.scale;
        let unrotated_y = self.draw_y + image.y * self.scale;
        let (sin, cos) = self.theta.sin_cos();
        let dx = unrotated_x - self.center_x;
        let dy = unrotated_y - self.center_y;
        Point::new(
            self.center_x + cos * dx - sin * dy,
            self.center_y + sin * dx + cos * dy,
        )
    }

    pub fn screen_to_image(&self, screen: Point) -> Point {
        let (sin, cos) = (-self.theta).sin_cos();
        let dx = screen.x - self.center_x;
        let dy = screen.y - self.center_y;
        let unrotated_x = self.center_x + cos * dx - sin * dy;
        let unrotated_y = self.center_y + sin * dx + cos * dy;
        Point::new(
            (unrotated_x - self.draw_x) / self.scale,
            (unrotated_y - self.draw_y) / self.scale,
        )
    }

    pub fn draw_width(&self) -> f64 {
        self.image_w * self.scale
    }

    pub fn draw_height(&self) -> f64 {
        self.image_h * self.scale
    }

    pub fn is_rotated(&self) -> bool {
        let wrapped = self.theta.rem_euclid(std::f64::consts::TAU);
        wrapped > ROTATION_EPSILON && std::f64::consts::TAU - wrapped > ROTATION_EPSILON
    }
}

/// Clamps a requested scale to a finite value no smaller than [`MIN_SCALE`].
/// Non-finite input collapses to the minimum as well.
pub fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale >= MIN_SCALE {
        scale
    } else {
        MIN_SCALE
    }
}

pub fn compute_standard_transform(
    image: ImageSize,
    viewport: &Viewport,
    scale: f64,
    angle_deg: f64,
    canvas: CanvasSize,
) -> Transform {
    let scale = sanitize_scale(scale);
    let draw_w = image.width * scale;
    let draw_h = image.height * scale;
    let focus = viewport.center.to_image(image);
    let draw_x = canvas.width / 2.0 - focus.x * scale;
    let draw_y = canvas.height / 2.0 - focus.y * scale;

    Transform {
        draw_x,
        draw_y,
        center_x: draw_x + draw_w / 2.0,
        center_y: draw_y + draw_h / 2.0,
        scale,
        theta: angle_deg.to_radians(),
        image_w: image.width,
        image_h: image.height,
    }
}

pub fn compute_pinpoint_transform(
    image: ImageSize,
    viewport: &Viewport,
    placement: PinpointPlacement,
    canvas: CanvasSize,
) -> Transform {
    // Each factor has its own floor; the product is not clamped again.
    let scale = sanitize_scale(placement.individual_scale) * sanitize_scale(placement.global_scale);
    let half_w = image.width * scale / 2.0;
    let half_h = image.height * scale / 2.0;
    let reference = placement.ref_point.to_image(image);
    let ux = reference.x * scale;
    let uy = reference.y * scale;

    let theta = placement.total_angle_deg.to_radians();
    let (sin, cos) = theta.sin_cos();
    let anchor = viewport.ref_screen.unwrap_or_else(|| canvas.center());
    let draw_x = anchor.x - half_w - (cos * (ux - half_w) - sin * (uy - half_h));
    let draw_y = anchor.y - half_h - (sin * (ux - half_w) + cos * (uy - half_h));

    Transform {
        draw_x,
        draw_y,
        center_x: draw_x + half_w,
        center_y: draw_y + half_h,
        scale,
        theta,
        image_w: image.width,
        image_h: image.height,
    }
}

pub fn screen_to_image(screen_x: f64, screen_y: f64, transform: &Transform) -> Point {
    transform.screen_to_image(Point::new(screen_x, screen_y))
}

pub fn image_to_screen(image_x: f64, image_y: f64, transform: &Transform) -> Point {
    transform.image_to_screen(Point::new(image_x, image_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn assert_point_near(actual: Point, expected: Point) {
        assert!(
            (actual.x - expected.x).abs() <= TOLERANCE && (actual.y - expected.y).abs() <= TOLERANCE,
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn viewport_centered_at(x: f64, y: f64) -> Viewport {
        Viewport {
            center: NormalizedPoint::new(x, y),
            ..Viewport::default()
        }
    }

    #[test]
    fn default_standard_transform_centers_unrotated_image() {
        let transform = compute_standard_transform(
            ImageSize::new(200.0, 100.0),
            &Viewport::default(),
            1.0,
            0.0,
            CanvasSize::new(400.0, 300.0),
        );

        assert_eq!(transform.draw_x, 100.0);
        assert_eq!(transform.draw_y, 100.0);
        assert_eq!(transform.center_x, 200.0);
        assert_eq!(transform.center_y, 150.0);
        assert_eq!(transform.theta, 0.0);
        assert!(!transform.is_rotated());
    }

    #[test]
    fn standard_transform_puts_focus_point_at_canvas_center() {
        let image = ImageSize::new(640.0, 480.0);
        let transform = compute_standard_transform(
            image,
            &viewport_centered_at(0.1, 0.9),
            2.5,
            0.0,
            CanvasSize::new(800.0, 600.0),
        );
        let focus = NormalizedPoint::new(0.1, 0.9).to_image(image);
        assert_point_near(transform.image_to_screen(focus), Point::new(400.0, 300.0));
    }

    #[test]
    fn pinpoint_transform_pins_ref_point_to_anchor_for_any_rotation() {
        let image = ImageSize::new(1024.0, 768.0);
        let canvas = CanvasSize::new(900.0, 700.0);
        let ref_point = NormalizedPoint::new(0.3, 0.8);
        let viewport = Viewport {
            ref_screen: Some(Point::new(120.0, 540.0)),
            ..Viewport::default()
        };

        for angle in [0.0, 0.1, 33.3, 90.0, 180.0, 271.5, 359.9] {
            for (individual, global) in [(1.0, 1.0), (0.25, 3.0), (4.0, 0.5)] {
                let transform = compute_pinpoint_transform(
                    image,
                    &viewport,
                    PinpointPlacement {
                        individual_scale: individual,
                        global_scale: global,
                        ref_point,
                        total_angle_deg: angle,
                    },
                    canvas,
                );
                assert_point_near(
                    transform.image_to_screen(ref_point.to_image(image)),
                    Point::new(120.0, 540.0),
                );
            }
        }
    }

    #[test]
    fn pinpoint_anchor_defaults_to_canvas_center() {
        let image = ImageSize::new(300.0, 300.0);
        let ref_point = NormalizedPoint::new(0.9, 0.1);
        let transform = compute_pinpoint_transform(
            image,
            &Viewport::default(),
            PinpointPlacement {
                individual_scale: 1.5,
                global_scale: 2.0,
                ref_point,
                total_angle_deg: 45.0,
            },
            CanvasSize::new(500.0, 400.0),
        );
        assert_eq!(transform.scale, 3.0);
        assert_point_near(
            transform.image_to_screen(ref_point.to_image(image)),
            Point::new(250.0, 200.0),
        );
    }

    #[test]
    fn screen_to_image_inverts_forward_mapping() {
        let image = ImageSize::new(1920.0, 1080.0);
        let canvas = CanvasSize::new(1280.0, 720.0);
        let samples = [
            Point::new(0.0, 0.0),
            Point::new(1280.0, 720.0),
            Point::new(-350.5, 42.25),
            Point::new(1.0e6, -1.0e6),
        ];

        for angle in [0.0, 12.5, 90.0, 200.0, 359.9] {
            for scale in [0.01, 0.5, 1.0, 7.0] {
                let transforms = [
                    compute_standard_transform(
                        image,
                        &viewport_centered_at(0.3, 0.6),
                        scale,
                        angle,
                        canvas,
                    ),
                    compute_pinpoint_transform(
                        image,
                        &Viewport::default(),
                        PinpointPlacement {
                            individual_scale: scale,
                            global_scale: 1.3,
                            ref_point: NormalizedPoint::new(0.7, 0.2),
                            total_angle_deg: angle,
                        },
                        canvas,
                    ),
                ];
                for transform in transforms {
                    for sample in samples {
                        let image_point = screen_to_image(sample.x, sample.y, &transform);
                        let back = image_to_screen(image_point.x, image_point.y, &transform);
                        assert_point_near(back, sample);
                    }
                }
            }
        }
    }

    #[test]
    fn transform_computation_is_idempotent() {
        let image = ImageSize::new(10.0, 20.0);
        let canvas = CanvasSize::new(30.0, 40.0);
        let placement = PinpointPlacement {
            individual_scale: 2.0,
            global_scale: 0.5,
            ref_point: NormalizedPoint::new(0.2, 0.4),
            total_angle_deg: 77.0,
        };
        let first = compute_pinpoint_transform(image, &Viewport::default(), placement, canvas);
        let second = compute_pinpoint_transform(image, &Viewport::default(), placement, canvas);
        assert_eq!(first, second);
    }

    #[test]
    fn sanitize_scale_rejects_non_positive_and_nan() {
        assert_eq!(sanitize_scale(-5.0), MIN_SCALE);
        assert_eq!(sanitize_scale(0.0), MIN_SCALE);
        assert_eq!(sanitize_scale(f64::NAN), MIN_SCALE);
        assert_eq!(sanitize_scale(2.0), 2.0);
    }

    #[test]
    fn pinpoint_scale_is_the_plain_product_of_both_factors() {
        let image = ImageSize::new(1000.0, 800.0);
        let canvas = CanvasSize::new(400.0, 300.0);
        let placement = PinpointPlacement {
            individual_scale: 0.05,
            global_scale: 0.1,
            ref_point: NormalizedPoint::CENTER,
            total_angle_deg: 0.0,
        };
        let small = compute_pinpoint_transform(image, &Viewport::default(), placement, canvas);
        assert_eq!(small.scale, 0.05 * 0.1);
        assert!(small.scale < MIN_SCALE);

        let smaller = compute_pinpoint_transform(
            image,
            &Viewport::default(),
            PinpointPlacement {
                global_scale: 0.05,
                ..placement
            },
            canvas,
        );
        assert!(smaller.scale < small.scale);
    }

    #[test]
    fn full_turn_counts_as_unrotated() {
        let transform = compute_standard_transform(
            ImageSize::new(1.0, 1.0),
            &Viewport::default(),
            1.0,
            360.0,
            CanvasSize::new(1.0, 1.0),
        );
        assert!(!transform.is_rotated());
    }
}
