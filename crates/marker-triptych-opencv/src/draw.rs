use marker_triptych_core::{
    Bgr, CaptionStyle, Captioner, MarkerAnnotator, MarkerDetection, PanelViewMut, PreviewError,
    Stage,
};
use opencv::core::{Point, Point2f, Scalar, Vector};
use opencv::imgproc;
use opencv::objdetect;

use crate::mat::with_panel_mat;

fn scalar(color: Bgr) -> Scalar {
    let [b, g, r] = color.0;
    Scalar::new(b as f64, g as f64, r as f64, 0.0)
}

/// `cv::aruco::drawDetectedMarkers` into the panel.
pub struct CvReferenceAnnotator {
    pub border: Bgr,
}

impl Default for CvReferenceAnnotator {
    fn default() -> Self {
        Self { border: Bgr::GREEN }
    }
}

impl MarkerAnnotator for CvReferenceAnnotator {
    fn annotate(
        &mut self,
        panel: &mut PanelViewMut<'_>,
        detections: &[MarkerDetection],
    ) -> Result<(), PreviewError> {
        if detections.is_empty() {
            return Ok(());
        }
        let corners: Vector<Vector<Point2f>> = detections
            .iter()
            .map(|d| {
                d.corners
                    .iter()
                    .map(|p| Point2f::new(p.x, p.y))
                    .collect::<Vector<Point2f>>()
            })
            .collect();
        let ids: Vector<i32> = detections.iter().map(|d| d.id).collect();
        let border = scalar(self.border);

        with_panel_mat(panel, |mat| {
            objdetect::draw_detected_markers(mat, &corners, &ids, border)
        })
        .map_err(|e| e.at(Stage::Annotate))
    }
}

/// `cv::putText` with the Hershey duplex face.
#[derive(Clone, Copy, Debug, Default)]
pub struct CvCaptioner;

impl Captioner for CvCaptioner {
    fn caption(
        &mut self,
        panel: &mut PanelViewMut<'_>,
        text: &str,
        origin: [i32; 2],
        style: &CaptionStyle,
    ) -> Result<(), PreviewError> {
        with_panel_mat(panel, |mat| {
            imgproc::put_text(
                mat,
                text,
                Point::new(origin[0], origin[1]),
                imgproc::FONT_HERSHEY_DUPLEX,
                style.scale as f64,
                scalar(style.color),
                style.thickness,
                imgproc::LINE_8,
                false,
            )
        })
        .map_err(|e| e.at(Stage::Caption))
    }
}
