use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};

use crate::models::{Point, Rect};

/// Draw an unfilled rectangle whose outer edge passes through both corners
/// (inclusive). Thicker strokes grow inward.
pub fn draw_rect_outline(canvas: &mut RgbImage, rect: &Rect, color: Rgb<u8>, width: u32) {
    let (a, b) = rect.corners();
    let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
    let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));

    for i in 0..width.max(1) as i32 {
        let (left, top, right, bottom) = (x0 + i, y0 + i, x1 - i, y1 - i);
        if left > right || top > bottom {
            break;
        }
        let ring = imageproc::rect::Rect::at(left, top)
            .of_size((right - left + 1) as u32, (bottom - top + 1) as u32);
        draw_hollow_rect_mut(canvas, ring, color);
    }
}

/// Edges of a closed outline: each vertex to the next, then the last back to the first.
pub fn polygon_outline(points: &[Point]) -> Vec<(Point, Point)> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }
    (0..n).map(|i| (points[i], points[(i + 1) % n])).collect()
}

/// Draw a closed polygon outline in the supplied vertex order.
pub fn draw_polygon_outline(canvas: &mut RgbImage, points: &[Point], color: Rgb<u8>, width: u32) {
    let width = width.max(1) as i32;
    let lo = -(width - 1) / 2;
    let hi = lo + width - 1;

    for (start, end) in polygon_outline(points) {
        // Square brush: one offset copy of the segment per brush pixel.
        for dy in lo..=hi {
            for dx in lo..=hi {
                draw_line_segment_mut(
                    canvas,
                    ((start.x + dx) as f32, (start.y + dy) as f32),
                    ((end.x + dx) as f32, (end.y + dy) as f32),
                    color,
                );
            }
        }
    }
}
