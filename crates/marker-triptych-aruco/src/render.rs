//! Drawing markers into frames, for synthetic input and tests.

use marker_triptych_core::{Bgr, ColorImage, GrayImage, PanelViewMut};
use nalgebra::Point2;

/// Pixel layout of a drawn marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkerLayout {
    /// Inner bits per side.
    pub bits: usize,
    pub cell_px: usize,
    /// White margin around the black border.
    pub quiet_px: usize,
}

impl MarkerLayout {
    /// Cells per side including the one-cell black border.
    pub fn cells(&self) -> usize {
        self.bits + 2
    }

    pub fn marker_px(&self) -> usize {
        self.cells() * self.cell_px
    }

    /// Marker plus quiet zone.
    pub fn total_px(&self) -> usize {
        self.marker_px() + 2 * self.quiet_px
    }
}

/// Draw `code` with its quiet zone at `origin` (top-left of the quiet zone).
///
/// Returns the outer corners of the black border, clockwise from the drawn
/// top-left, with pixel `i` spanning `[i, i + 1)`.
pub fn paint_marker(
    panel: &mut PanelViewMut<'_>,
    code: u64,
    layout: MarkerLayout,
    origin: [i32; 2],
) -> [Point2<f32>; 4] {
    let total = layout.total_px() as i32;
    fill_rect(panel, origin, [total, total], Bgr::WHITE);

    let q = layout.quiet_px as i32;
    let c = layout.cell_px as i32;
    let cells = layout.cells();
    for cy in 0..cells {
        for cx in 0..cells {
            let border = cx == 0 || cy == 0 || cx + 1 == cells || cy + 1 == cells;
            let black = border || (code >> ((cy - 1) * layout.bits + (cx - 1))) & 1 == 1;
            if black {
                let x = origin[0] + q + cx as i32 * c;
                let y = origin[1] + q + cy as i32 * c;
                fill_rect(panel, [x, y], [c, c], Bgr::BLACK);
            }
        }
    }

    let x0 = (origin[0] + q) as f32;
    let y0 = (origin[1] + q) as f32;
    let s = layout.marker_px() as f32;
    [
        Point2::new(x0, y0),
        Point2::new(x0 + s, y0),
        Point2::new(x0 + s, y0 + s),
        Point2::new(x0, y0 + s),
    ]
}

fn fill_rect(panel: &mut PanelViewMut<'_>, tl: [i32; 2], size: [i32; 2], color: Bgr) {
    for y in tl[1]..tl[1] + size[1] {
        panel.fill_span(y, tl[0], tl[0] + size[0] - 1, color);
    }
}

/// A lone marker on a white background as a grayscale image.
pub fn marker_gray(code: u64, bits: usize, cell_px: usize, quiet_px: usize) -> GrayImage {
    let layout = MarkerLayout {
        bits,
        cell_px,
        quiet_px,
    };
    let side = layout.total_px();
    let mut img = ColorImage::filled(side, side, Bgr::WHITE);
    paint_marker(&mut img.view_mut(), code, layout, [0, 0]);
    img.to_gray()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_sizes() {
        let l = MarkerLayout {
            bits: 4,
            cell_px: 12,
            quiet_px: 12,
        };
        assert_eq!(l.marker_px(), 72);
        assert_eq!(l.total_px(), 96);
    }

    #[test]
    fn border_and_bits_are_painted() {
        // only inner cell (0, 0) black
        let img = marker_gray(1, 4, 4, 2);
        let at = |x: usize, y: usize| img.data[y * img.width + x];
        assert_eq!(img.width, 28);
        assert_eq!(at(0, 0), 255);
        assert_eq!(at(2, 2), 0);
        assert_eq!(at(7, 7), 0); // inner (0,0)
        assert_eq!(at(11, 7), 255); // inner (1,0)
        assert_eq!(at(25, 25), 0);
        assert_eq!(at(26, 26), 255);
    }
}
