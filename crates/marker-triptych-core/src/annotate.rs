use crate::config::PreviewConfig;
use crate::detection::MarkerDetection;
use crate::error::PreviewError;
use crate::image::{Bgr, PanelViewMut};
use crate::preview::MarkerAnnotator;
use crate::raster::{fill_polygon, stroke_closed};

/// Opaque quadrilateral overlay: a filled interior with stroked edges on top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CustomAnnotator {
    pub fill: Bgr,
    pub edge: Bgr,
    pub stroke_width: u32,
}

impl Default for CustomAnnotator {
    fn default() -> Self {
        Self {
            fill: Bgr::BLUE,
            edge: Bgr::GREEN,
            stroke_width: 5,
        }
    }
}

impl CustomAnnotator {
    pub fn from_config(config: &PreviewConfig) -> Self {
        Self {
            fill: config.fill_color,
            edge: config.edge_color,
            stroke_width: config.stroke_width,
        }
    }

    /// Draw every detection into `panel`.
    ///
    /// Corners are truncated to whole pixels for the fill. Edges are stroked
    /// after the fill so they stay visible on the boundary.
    pub fn draw(&self, panel: &mut PanelViewMut<'_>, detections: &[MarkerDetection]) {
        for det in detections {
            if det.is_degenerate() {
                log::debug!(
                    "skipping marker {} with {} corner(s)",
                    det.id,
                    det.corners.len()
                );
                continue;
            }
            if !det.has_finite_corners() {
                log::debug!("skipping marker {} with non-finite corners", det.id);
                continue;
            }
            fill_polygon(panel, &det.pixel_corners(), self.fill);
            stroke_closed(panel, &det.corners, self.stroke_width, self.edge);
        }
    }
}

impl MarkerAnnotator for CustomAnnotator {
    fn annotate(
        &mut self,
        panel: &mut PanelViewMut<'_>,
        detections: &[MarkerDetection],
    ) -> Result<(), PreviewError> {
        self.draw(panel, detections);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ColorImage;
    use nalgebra::Point2;

    fn square(id: i32, x0: f32, y0: f32, side: f32) -> MarkerDetection {
        MarkerDetection::new(
            id,
            [
                Point2::new(x0, y0),
                Point2::new(x0 + side, y0),
                Point2::new(x0 + side, y0 + side),
                Point2::new(x0, y0 + side),
            ],
        )
    }

    #[test]
    fn interior_is_filled_and_edges_are_stroked() {
        let mut img = ColorImage::filled(100, 100, Bgr::WHITE);
        CustomAnnotator::default().draw(&mut img.view_mut(), &[square(0, 20.0, 20.0, 40.0)]);

        assert_eq!(img.pixel(40, 40), Some(Bgr::BLUE));
        assert_eq!(img.pixel(25, 40), Some(Bgr::BLUE));
        // stroke straddles the edge by half its width
        for x in 18..=22 {
            assert_eq!(img.pixel(x, 40), Some(Bgr::GREEN), "x={x}");
        }
        assert_eq!(img.pixel(23, 40), Some(Bgr::BLUE));
        assert_eq!(img.pixel(17, 40), Some(Bgr::WHITE));
        assert_eq!(img.pixel(60, 60), Some(Bgr::GREEN));
        assert_eq!(img.pixel(5, 5), Some(Bgr::WHITE));
        assert_eq!(img.pixel(80, 40), Some(Bgr::WHITE));
    }

    #[test]
    fn each_detection_gets_its_own_overlay() {
        let mut img = ColorImage::filled(120, 60, Bgr::WHITE);
        let dets = [square(1, 10.0, 10.0, 30.0), square(1, 70.0, 10.0, 30.0)];
        CustomAnnotator::default().draw(&mut img.view_mut(), &dets);
        assert_eq!(img.pixel(25, 25), Some(Bgr::BLUE));
        assert_eq!(img.pixel(85, 25), Some(Bgr::BLUE));
        assert_eq!(img.pixel(55, 25), Some(Bgr::WHITE));
    }

    #[test]
    fn degenerate_detections_are_skipped() {
        let mut img = ColorImage::filled(32, 32, Bgr::WHITE);
        let det = MarkerDetection::from_corners(
            9,
            vec![Point2::new(2.0, 2.0), Point2::new(20.0, 20.0)],
        );
        CustomAnnotator::default().draw(&mut img.view_mut(), &[det]);
        assert_eq!(img, ColorImage::filled(32, 32, Bgr::WHITE));
    }

    #[test]
    fn triangles_are_drawn() {
        let mut img = ColorImage::filled(64, 64, Bgr::WHITE);
        let det = MarkerDetection::from_corners(
            4,
            vec![
                Point2::new(10.0, 10.0),
                Point2::new(50.0, 10.0),
                Point2::new(10.0, 50.0),
            ],
        );
        CustomAnnotator::default().draw(&mut img.view_mut(), &[det]);
        assert_eq!(img.pixel(20, 20), Some(Bgr::BLUE));
        assert_eq!(img.pixel(45, 45), Some(Bgr::WHITE));
    }

    #[test]
    fn overlay_is_clipped_to_the_panel() {
        let mut img = ColorImage::filled(30, 30, Bgr::WHITE);
        CustomAnnotator::default().draw(&mut img.view_mut(), &[square(2, -10.0, -10.0, 25.0)]);
        assert_eq!(img.pixel(0, 0), Some(Bgr::BLUE));
        assert_eq!(img.pixel(15, 5), Some(Bgr::GREEN));
        assert_eq!(img.pixel(25, 25), Some(Bgr::WHITE));
    }

    #[test]
    fn far_off_corner_is_clipped() {
        let mut img = ColorImage::filled(64, 64, Bgr::WHITE);
        let det = MarkerDetection::new(
            6,
            [
                Point2::new(10.0, 10.0),
                Point2::new(3.0e9, 10.0),
                Point2::new(40.0, 40.0),
                Point2::new(10.0, 40.0),
            ],
        );
        CustomAnnotator::default().draw(&mut img.view_mut(), &[det]);
        assert_eq!(img.pixel(20, 30), Some(Bgr::BLUE));
        assert_eq!(img.pixel(10, 25), Some(Bgr::GREEN));
        assert_eq!(img.pixel(3, 30), Some(Bgr::WHITE));
    }

    #[test]
    fn non_finite_corners_are_skipped() {
        let mut img = ColorImage::filled(32, 32, Bgr::WHITE);
        let det = MarkerDetection::new(
            8,
            [
                Point2::new(4.0, 4.0),
                Point2::new(f32::INFINITY, 4.0),
                Point2::new(20.0, 20.0),
                Point2::new(4.0, f32::NAN),
            ],
        );
        CustomAnnotator::default().draw(&mut img.view_mut(), &[det, square(1, 8.0, 8.0, 10.0)]);
        assert_eq!(img.pixel(13, 13), Some(Bgr::BLUE));
        assert_eq!(img.pixel(28, 28), Some(Bgr::WHITE));
        assert_eq!(img.pixel(1, 1), Some(Bgr::WHITE));
    }

    #[test]
    fn huge_stroke_width_does_not_overflow() {
        let mut img = ColorImage::filled(24, 24, Bgr::WHITE);
        let annotator = CustomAnnotator {
            stroke_width: u32::MAX,
            ..CustomAnnotator::default()
        };
        annotator.draw(&mut img.view_mut(), &[square(0, 5.0, 5.0, 10.0)]);
        assert_eq!(img, ColorImage::filled(24, 24, Bgr::GREEN));
    }

    /// Every pixel strictly inside a rotated, sub-pixel quad reads as fill or
    /// edge, and nothing else changes color.
    #[test]
    fn rotated_subpixel_quads_have_no_holes() {
        for k in 0..48 {
            let kf = k as f64;
            let (cx, cy) = (60.0 + 0.137 * kf, 58.5 + 0.291 * kf);
            let half = 12.0 + (k % 7) as f64 * 4.3 + 0.41;
            let (sin, cos) = (0.19 * kf).sin_cos();
            let quad: Vec<(f64, f64)> = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
                .iter()
                .map(|&(u, v)| {
                    let (x, y) = (u * half, v * half);
                    (cx + x * cos - y * sin, cy + x * sin + y * cos)
                })
                .collect();
            let det = MarkerDetection::from_corners(
                k,
                quad.iter()
                    .map(|&(x, y)| Point2::new(x as f32, y as f32))
                    .collect(),
            );

            let mut img = ColorImage::filled(128, 128, Bgr::WHITE);
            CustomAnnotator::default().draw(&mut img.view_mut(), &[det]);

            for y in 0..128 {
                for x in 0..128 {
                    let px = img.pixel(x, y);
                    assert!(
                        matches!(px, Some(Bgr::WHITE) | Some(Bgr::BLUE) | Some(Bgr::GREEN)),
                        "quad {k}: stray color at ({x}, {y})"
                    );
                    let (fx, fy) = (x as f64, y as f64);
                    let strictly_inside = (0..4).all(|j| {
                        let (ax, ay) = quad[j];
                        let (bx, by) = quad[(j + 1) % 4];
                        (bx - ax) * (fy - ay) - (by - ay) * (fx - ax) > 0.0
                    });
                    if strictly_inside {
                        assert_ne!(px, Some(Bgr::WHITE), "quad {k}: hole at ({x}, {y})");
                    }
                }
            }
        }
    }

    #[test]
    fn colors_come_from_config() {
        let cfg = PreviewConfig {
            fill_color: Bgr::RED,
            edge_color: Bgr::BLACK,
            stroke_width: 1,
            ..PreviewConfig::default()
        };
        let mut img = ColorImage::filled(40, 40, Bgr::WHITE);
        CustomAnnotator::from_config(&cfg).draw(&mut img.view_mut(), &[square(0, 10.0, 10.0, 20.0)]);
        assert_eq!(img.pixel(20, 20), Some(Bgr::RED));
        assert_eq!(img.pixel(10, 20), Some(Bgr::BLACK));
        assert_eq!(img.pixel(9, 20), Some(Bgr::WHITE));
    }
}
