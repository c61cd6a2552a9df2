use crate::caption::{CaptionStyle, Captioner};
use crate::detection::MarkerDetection;
use crate::error::PreviewError;
use crate::image::{Bgr, PanelViewMut};
use crate::preview::MarkerAnnotator;
use crate::raster::{draw_line, draw_rect, round_point};

/// Half side of the square marking corner 0.
const CORNER_HALF: i32 = 3;

/// Backend-independent stand-in for a detection library's marker drawing:
/// thin outline, a small square on the first corner and the id at the center.
pub struct OutlineAnnotator {
    pub border: Bgr,
    captioner: Option<Box<dyn Captioner>>,
}

impl OutlineAnnotator {
    pub fn new(border: Bgr) -> Self {
        Self {
            border,
            captioner: None,
        }
    }

    pub fn with_captioner(mut self, captioner: Box<dyn Captioner>) -> Self {
        self.captioner = Some(captioner);
        self
    }

    /// Corner square color: the border with green and red swapped.
    pub fn corner_color(&self) -> Bgr {
        let [b, g, r] = self.border.0;
        Bgr([b, r, g])
    }

    fn id_style(&self) -> CaptionStyle {
        let [b, g, r] = self.border.0;
        CaptionStyle {
            offset: 0,
            color: Bgr([g, b, r]),
            scale: 0.5,
            thickness: 2,
        }
    }
}

impl Default for OutlineAnnotator {
    fn default() -> Self {
        Self::new(Bgr::GREEN)
    }
}

impl MarkerAnnotator for OutlineAnnotator {
    fn annotate(
        &mut self,
        panel: &mut PanelViewMut<'_>,
        detections: &[MarkerDetection],
    ) -> Result<(), PreviewError> {
        let corner_color = self.corner_color();
        let style = self.id_style();
        for det in detections {
            if det.is_degenerate() || !det.has_finite_corners() {
                continue;
            }
            let pts: Vec<[i32; 2]> = det.corners.iter().copied().map(round_point).collect();
            for j in 0..pts.len() {
                draw_line(panel, pts[j], pts[(j + 1) % pts.len()], self.border);
            }
            let [cx, cy] = pts[0];
            draw_rect(
                panel,
                [cx.saturating_sub(CORNER_HALF), cy.saturating_sub(CORNER_HALF)],
                [cx.saturating_add(CORNER_HALF), cy.saturating_add(CORNER_HALF)],
                corner_color,
            );

            if let (Some(captioner), Some(center)) = (self.captioner.as_mut(), det.center()) {
                let origin = round_point(center);
                captioner.caption(panel, &format!("id={}", det.id), origin, &style)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ColorImage;
    use nalgebra::Point2;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<(String, [i32; 2])>>>);

    impl Captioner for Recorder {
        fn caption(
            &mut self,
            _panel: &mut PanelViewMut<'_>,
            text: &str,
            origin: [i32; 2],
            _style: &CaptionStyle,
        ) -> Result<(), PreviewError> {
            self.0.borrow_mut().push((text.to_string(), origin));
            Ok(())
        }
    }

    fn det() -> MarkerDetection {
        MarkerDetection::new(
            12,
            [
                Point2::new(10.0, 10.0),
                Point2::new(30.0, 10.0),
                Point2::new(30.0, 30.0),
                Point2::new(10.0, 30.0),
            ],
        )
    }

    #[test]
    fn outline_and_corner_square() {
        let mut img = ColorImage::filled(40, 40, Bgr::WHITE);
        OutlineAnnotator::default()
            .annotate(&mut img.view_mut(), &[det()])
            .expect("annotate");
        assert_eq!(img.pixel(20, 10), Some(Bgr::GREEN));
        assert_eq!(img.pixel(30, 20), Some(Bgr::GREEN));
        assert_eq!(img.pixel(20, 20), Some(Bgr::WHITE));
        // corner square is drawn last and is red for a green border
        assert_eq!(img.pixel(7, 7), Some(Bgr::RED));
        assert_eq!(img.pixel(13, 10), Some(Bgr::RED));
        assert_eq!(img.pixel(10, 10), Some(Bgr::GREEN));
    }

    #[test]
    fn far_off_corners_do_not_overflow() {
        let mut img = ColorImage::filled(40, 40, Bgr::WHITE);
        let det = MarkerDetection::new(
            2,
            [
                Point2::new(3.0e9, -3.0e9),
                Point2::new(30.0, 10.0),
                Point2::new(30.0, 30.0),
                Point2::new(10.0, 30.0),
            ],
        );
        OutlineAnnotator::default()
            .annotate(&mut img.view_mut(), &[det])
            .expect("annotate");
        assert_eq!(img.pixel(20, 30), Some(Bgr::GREEN));
    }

    #[test]
    fn ids_go_through_the_captioner() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut img = ColorImage::filled(40, 40, Bgr::WHITE);
        let mut annotator =
            OutlineAnnotator::default().with_captioner(Box::new(Recorder(calls.clone())));
        annotator
            .annotate(&mut img.view_mut(), &[det()])
            .expect("annotate");
        assert_eq!(*calls.borrow(), vec![("id=12".to_string(), [20, 20])]);
    }
}
