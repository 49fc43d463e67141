use image::{Rgba, RgbaImage};

use crate::geometry::{Color, Point};

use super::{MinimapStyle, OverlayRect};

fn blend(pixel: &mut Rgba<u8>, color: Color) {
    if color.a == 0 {
        return;
    }
    let alpha = f32::from(color.a) / 255.0;
    let source = color.rgba();
    let [r, g, b, a] = pixel.0;
    let mix = |src: u8, dst: u8| {
        (f32::from(src) * alpha + f32::from(dst) * (1.0 - alpha))
            .round()
            .clamp(0.0, 255.0) as u8
    };
    let out_alpha = (f32::from(color.a) + f32::from(a) * (1.0 - alpha))
        .round()
        .clamp(0.0, 255.0) as u8;
    pixel.0 = [
        mix(source[0], r),
        mix(source[1], g),
        mix(source[2], b),
        out_alpha,
    ];
}

/// Plots the pixel under `(x, y)`. Points sitting exactly on the far edge land
/// on the last row/column so full-size outlines stay visible.
fn plot(image: &mut RgbaImage, x: f64, y: f64, color: Color) {
    let width = f64::from(image.width());
    let height = f64::from(image.height());
    if !(0.0..=width).contains(&x) || !(0.0..=height).contains(&y) {
        return;
    }
    let px = (x.floor() as u32).min(image.width().saturating_sub(1));
    let py = (y.floor() as u32).min(image.height().saturating_sub(1));
    blend(image.get_pixel_mut(px, py), color);
}

fn draw_segment(image: &mut RgbaImage, from: Point, to: Point, color: Color) {
    let steps = (from.distance_to(to) * 2.0).ceil().max(1.0) as u32;
    let mut last = None;
    for step in 0..=steps {
        let t = f64::from(step) / f64::from(steps);
        let x = from.x + (to.x - from.x) * t;
        let y = from.y + (to.y - from.y) * t;
        let cell = (x.floor() as i64, y.floor() as i64);
        if last == Some(cell) {
            continue;
        }
        last = Some(cell);
        plot(image, x, y, color);
    }
}

fn contains(points: &[Point; 4], x: f64, y: f64) -> bool {
    let mut inside = false;
    let mut previous = points[points.len() - 1];
    for &current in points {
        if (current.y > y) != (previous.y > y) {
            let crossing =
                (previous.x - current.x) * (y - current.y) / (previous.y - current.y) + current.x;
            if x < crossing {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

pub(super) fn draw_rectangle(image: &mut RgbaImage, rect: OverlayRect, style: MinimapStyle) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return;
    }
    let right = rect.x + rect.width;
    let bottom = rect.y + rect.height;
    let corners = [
        Point::new(rect.x, rect.y),
        Point::new(right, rect.y),
        Point::new(right, bottom),
        Point::new(rect.x, bottom),
    ];
    draw_polygon(image, &corners, style);
}

pub(super) fn draw_polygon(image: &mut RgbaImage, points: &[Point; 4], style: MinimapStyle) {
    if style.fill.a > 0 {
        let (width, height) = image.dimensions();
        for y in 0..height {
            for x in 0..width {
                let (cx, cy) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
                if contains(points, cx, cy) {
                    blend(image.get_pixel_mut(x, y), style.fill);
                }
            }
        }
    }
    for index in 0..points.len() {
        let next = points[(index + 1) % points.len()];
        draw_segment(image, points[index], next, style.stroke);
    }
}

/// Rotates the drawing by `theta` about its center, keeping the same size.
/// Areas uncovered by the rotated content stay transparent.
pub(super) fn rotate_about_center(source: &RgbaImage, theta: f64) -> RgbaImage {
    let (width, height) = source.dimensions();
    let center_x = f64::from(width) / 2.0;
    let center_y = f64::from(height) / 2.0;
    let (sin, cos) = (-theta).sin_cos();
    let mut rotated = RgbaImage::new(width, height);

    for (x, y, pixel) in rotated.enumerate_pixels_mut() {
        let dx = f64::from(x) + 0.5 - center_x;
        let dy = f64::from(y) + 0.5 - center_y;
        let sx = (center_x + cos * dx - sin * dy).floor();
        let sy = (center_y + sin * dx + cos * dy).floor();
        if sx >= 0.0 && sy >= 0.0 && sx < f64::from(width) && sy < f64::from(height) {
            *pixel = *source.get_pixel(sx as u32, sy as u32);
        }
    }
    rotated
}
