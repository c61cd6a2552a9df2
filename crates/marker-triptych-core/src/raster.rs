//! Integer raster primitives: scanline polygon fill and segment strokes.
//!
//! All routines draw through a [`PanelViewMut`] and clip to it.

use nalgebra::Point2;

use crate::image::{Bgr, PanelViewMut};

/// Convert a sub-pixel point to pixel coordinates by truncation toward zero.
#[inline]
pub fn truncate_point(p: Point2<f32>) -> [i32; 2] {
    [p.x as i32, p.y as i32]
}

/// Convert a sub-pixel point to the nearest pixel (ties to even).
#[inline]
pub fn round_point(p: Point2<f32>) -> [i32; 2] {
    [p.x.round_ties_even() as i32, p.y.round_ties_even() as i32]
}

/// Fill a closed polygon, boundary included.
///
/// Interior spans come from even-odd scanline crossings over half-open edge
/// ranges; the outline is then traced so boundary rows and vertices are
/// always covered. Polygons with fewer than 3 vertices are ignored.
pub fn fill_polygon(panel: &mut PanelViewMut<'_>, pts: &[[i32; 2]], color: Bgr) {
    let n = pts.len();
    if n < 3 || panel.width() == 0 || panel.height() == 0 {
        return;
    }

    let y_min = pts.iter().map(|p| p[1]).min().unwrap_or(0).max(0);
    let y_max = pts
        .iter()
        .map(|p| p[1])
        .max()
        .unwrap_or(0)
        .min(panel.height() as i32 - 1);

    let mut xs: Vec<f64> = Vec::with_capacity(n);
    for y in y_min..=y_max {
        xs.clear();
        for i in 0..n {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            if a[1] == b[1] {
                continue;
            }
            let (lo, hi) = if a[1] < b[1] { (a, b) } else { (b, a) };
            if y < lo[1] || y >= hi[1] {
                continue;
            }
            let t = (y as f64 - lo[1] as f64) / (hi[1] as f64 - lo[1] as f64);
            xs.push(lo[0] as f64 + t * (hi[0] as f64 - lo[0] as f64));
        }
        xs.sort_by(f64::total_cmp);
        for pair in xs.chunks_exact(2) {
            panel.fill_span(y, pair[0].ceil() as i32, pair[1].floor() as i32, color);
        }
    }

    for i in 0..n {
        draw_line(panel, pts[i], pts[(i + 1) % n], color);
    }
}

/// One-pixel 8-connected line (Bresenham), endpoints included.
///
/// Segments leaving the panel are clipped to it first, so far-off endpoints
/// cost no more than the visible part.
pub fn draw_line(panel: &mut PanelViewMut<'_>, a: [i32; 2], b: [i32; 2], color: Bgr) {
    let Some((a, b)) = clip_segment(a, b, panel.width(), panel.height()) else {
        return;
    };
    let [mut x, mut y] = a;
    let dx = (b[0] - x).abs();
    let dy = -(b[1] - y).abs();
    let sx = if x < b[0] { 1 } else { -1 };
    let sy = if y < b[1] { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        panel.put_pixel(x, y, color);
        if x == b[0] && y == b[1] {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Stroke a segment with the given width and round caps.
///
/// Endpoints are rounded to pixels first. A pixel is covered when its center
/// lies within `width / 2` of the segment; widths of 0 or 1 fall back to a
/// single-pixel line.
pub fn stroke_segment(
    panel: &mut PanelViewMut<'_>,
    a: Point2<f32>,
    b: Point2<f32>,
    width: u32,
    color: Bgr,
) {
    let pa = round_point(a);
    let pb = round_point(b);
    if width <= 1 {
        draw_line(panel, pa, pb, color);
        return;
    }

    let r = width as f32 / 2.0;
    let r2 = r * r;
    let (ax, ay) = (pa[0] as f32, pa[1] as f32);
    let (bx, by) = (pb[0] as f32, pb[1] as f32);

    let reach = r.ceil() as i32;
    let x0 = pa[0].min(pb[0]).saturating_sub(reach).max(0);
    let x1 = pa[0]
        .max(pb[0])
        .saturating_add(reach)
        .min(panel.width() as i32 - 1);
    let y0 = pa[1].min(pb[1]).saturating_sub(reach).max(0);
    let y1 = pa[1]
        .max(pb[1])
        .saturating_add(reach)
        .min(panel.height() as i32 - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            if dist2_to_segment(x as f32, y as f32, ax, ay, bx, by) <= r2 {
                panel.put_pixel(x, y, color);
            }
        }
    }
}

/// Stroke a closed polyline: edge `j -> (j + 1) mod n` for every vertex.
pub fn stroke_closed(panel: &mut PanelViewMut<'_>, pts: &[Point2<f32>], width: u32, color: Bgr) {
    let n = pts.len();
    for j in 0..n {
        stroke_segment(panel, pts[j], pts[(j + 1) % n], width, color);
    }
}

/// Liang-Barsky clip of `a -> b` to the pixel grid `[0, w) x [0, h)`.
///
/// Segments already inside are returned unchanged; clipped endpoints are
/// rounded back onto the grid.
fn clip_segment(a: [i32; 2], b: [i32; 2], w: usize, h: usize) -> Option<([i32; 2], [i32; 2])> {
    if w == 0 || h == 0 {
        return None;
    }
    let inside = |p: [i32; 2]| p[0] >= 0 && p[1] >= 0 && (p[0] as usize) < w && (p[1] as usize) < h;
    if inside(a) && inside(b) {
        return Some((a, b));
    }

    let (x0, y0) = (a[0] as f64, a[1] as f64);
    let (dx, dy) = (b[0] as f64 - x0, b[1] as f64 - y0);
    let (xmax, ymax) = ((w - 1) as f64, (h - 1) as f64);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [(-dx, x0), (dx, xmax - x0), (-dy, y0), (dy, ymax - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| {
        [
            (x0 + t * dx).round().clamp(0.0, xmax) as i32,
            (y0 + t * dy).round().clamp(0.0, ymax) as i32,
        ]
    };
    Some((at(t0), at(t1)))
}

/// One-pixel axis-aligned rectangle outline between two inclusive corners.
pub fn draw_rect(panel: &mut PanelViewMut<'_>, tl: [i32; 2], br: [i32; 2], color: Bgr) {
    let tr = [br[0], tl[1]];
    let bl = [tl[0], br[1]];
    draw_line(panel, tl, tr, color);
    draw_line(panel, tr, br, color);
    draw_line(panel, br, bl, color);
    draw_line(panel, bl, tl, color);
}

#[inline]
fn dist2_to_segment(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let (vx, vy) = (bx - ax, by - ay);
    let (wx, wy) = (px - ax, py - ay);
    let len2 = vx * vx + vy * vy;
    let t = if len2 > 0.0 {
        ((wx * vx + wy * vy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (dx, dy) = (wx - t * vx, wy - t * vy);
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ColorImage;

    fn count(img: &ColorImage, color: Bgr) -> usize {
        (0..img.height)
            .flat_map(|y| (0..img.width).map(move |x| (x, y)))
            .filter(|&(x, y)| img.pixel(x, y) == Some(color))
            .count()
    }

    #[test]
    fn truncation_differs_from_rounding() {
        let p = Point2::new(10.9_f32, -3.7);
        assert_eq!(truncate_point(p), [10, -3]);
        assert_eq!(round_point(p), [11, -4]);
        assert_eq!(round_point(Point2::new(2.5, 3.5)), [2, 4]);
    }

    #[test]
    fn axis_aligned_square_fill_includes_boundary() {
        let mut img = ColorImage::new(20, 20);
        fill_polygon(
            &mut img.view_mut(),
            &[[2, 3], [9, 3], [9, 8], [2, 8]],
            Bgr::BLUE,
        );
        assert_eq!(count(&img, Bgr::BLUE), 8 * 6);
        assert_eq!(img.pixel(2, 3), Some(Bgr::BLUE));
        assert_eq!(img.pixel(9, 8), Some(Bgr::BLUE));
        assert_eq!(img.pixel(10, 8), Some(Bgr::BLACK));
        assert_eq!(img.pixel(5, 9), Some(Bgr::BLACK));
    }

    #[test]
    fn diamond_fill_is_symmetric_and_bounded() {
        let mut img = ColorImage::new(21, 21);
        fill_polygon(
            &mut img.view_mut(),
            &[[10, 2], [18, 10], [10, 18], [2, 10]],
            Bgr::BLUE,
        );
        assert_eq!(img.pixel(10, 10), Some(Bgr::BLUE));
        assert_eq!(img.pixel(10, 2), Some(Bgr::BLUE));
        assert_eq!(img.pixel(10, 18), Some(Bgr::BLUE));
        assert_eq!(img.pixel(3, 3), Some(Bgr::BLACK));
        assert_eq!(img.pixel(17, 17), Some(Bgr::BLACK));
        for y in 0..21 {
            let row: Vec<bool> = (0..21)
                .map(|x| img.pixel(x, y) == Some(Bgr::BLUE))
                .collect();
            let mirrored: Vec<bool> = row.iter().rev().copied().collect();
            assert_eq!(row, mirrored, "row {y} is not symmetric");
        }
    }

    #[test]
    fn degenerate_polygons_draw_nothing() {
        let mut img = ColorImage::new(8, 8);
        fill_polygon(&mut img.view_mut(), &[[1, 1], [5, 5]], Bgr::BLUE);
        fill_polygon(&mut img.view_mut(), &[], Bgr::BLUE);
        assert_eq!(count(&img, Bgr::BLUE), 0);
    }

    #[test]
    fn polygon_partly_outside_is_clipped() {
        let mut img = ColorImage::new(10, 10);
        fill_polygon(
            &mut img.view_mut(),
            &[[-5, -5], [4, -5], [4, 4], [-5, 4]],
            Bgr::BLUE,
        );
        assert_eq!(count(&img, Bgr::BLUE), 25);
    }

    #[test]
    fn thick_stroke_covers_half_width_on_each_side() {
        let mut img = ColorImage::new(40, 20);
        stroke_segment(
            &mut img.view_mut(),
            Point2::new(10.0, 10.0),
            Point2::new(30.0, 10.0),
            5,
            Bgr::GREEN,
        );
        for y in 8..=12 {
            assert_eq!(img.pixel(20, y), Some(Bgr::GREEN), "y={y}");
        }
        assert_eq!(img.pixel(20, 7), Some(Bgr::BLACK));
        assert_eq!(img.pixel(20, 13), Some(Bgr::BLACK));
        // round caps reach past the endpoints
        assert_eq!(img.pixel(32, 10), Some(Bgr::GREEN));
        assert_eq!(img.pixel(33, 10), Some(Bgr::BLACK));
    }

    #[test]
    fn far_off_vertices_are_clipped() {
        let mut img = ColorImage::new(50, 50);
        fill_polygon(
            &mut img.view_mut(),
            &[[10, 10], [i32::MAX, 10], [40, 40], [10, 40]],
            Bgr::BLUE,
        );
        assert_eq!(img.pixel(20, 30), Some(Bgr::BLUE));
        assert_eq!(img.pixel(49, 10), Some(Bgr::BLUE));
        assert_eq!(img.pixel(5, 30), Some(Bgr::BLACK));

        let mut img = ColorImage::new(20, 20);
        fill_polygon(
            &mut img.view_mut(),
            &[[i32::MIN, i32::MIN], [i32::MAX, i32::MIN], [i32::MAX, i32::MAX], [i32::MIN, i32::MAX]],
            Bgr::BLUE,
        );
        assert_eq!(count(&img, Bgr::BLUE), 400);
    }

    #[test]
    fn lines_crossing_the_panel_keep_their_visible_part() {
        let mut img = ColorImage::new(10, 10);
        draw_line(&mut img.view_mut(), [-100, 5], [100, 5], Bgr::RED);
        assert_eq!(count(&img, Bgr::RED), 10);

        let mut img = ColorImage::new(10, 10);
        draw_line(&mut img.view_mut(), [i32::MIN, 0], [i32::MAX, 0], Bgr::RED);
        assert_eq!(count(&img, Bgr::RED), 10);

        let mut img = ColorImage::new(10, 10);
        draw_line(&mut img.view_mut(), [-20, -3], [30, -3], Bgr::RED);
        assert_eq!(count(&img, Bgr::RED), 0);
    }

    #[test]
    fn huge_stroke_width_floods_the_panel() {
        let mut img = ColorImage::new(12, 8);
        stroke_segment(
            &mut img.view_mut(),
            Point2::new(3.0, 3.0),
            Point2::new(6.0, 3.0),
            u32::MAX,
            Bgr::GREEN,
        );
        assert_eq!(count(&img, Bgr::GREEN), 12 * 8);
    }

    #[test]
    fn bresenham_hits_both_endpoints() {
        let mut img = ColorImage::new(10, 10);
        draw_line(&mut img.view_mut(), [1, 8], [7, 2], Bgr::RED);
        assert_eq!(img.pixel(1, 8), Some(Bgr::RED));
        assert_eq!(img.pixel(7, 2), Some(Bgr::RED));
        assert_eq!(count(&img, Bgr::RED), 7);
    }
}
