#[cfg(feature = "tracing")]
use tracing::instrument;

use marker_triptych_core::{
    ColorImage, DictionaryKind, MarkerDetection, MarkerDetector, PreviewError, Stage,
};
use nalgebra::Point2;
use opencv::core::{Point2f, Vector};
use opencv::objdetect::{self, ArucoDetector, PredefinedDictionaryType};
use opencv::prelude::*;

use crate::mat::mat_from_image;
use crate::CvBackendError;

fn predefined(kind: DictionaryKind) -> PredefinedDictionaryType {
    match kind {
        DictionaryKind::Dict4x4_50 => PredefinedDictionaryType::DICT_4X4_50,
        DictionaryKind::Dict4x4_100 => PredefinedDictionaryType::DICT_4X4_100,
    }
}

/// `cv::aruco::ArucoDetector` with a predefined dictionary and default
/// parameters.
pub struct CvArucoDetector {
    detector: ArucoDetector,
    corners: Vector<Vector<Point2f>>,
    ids: Vector<i32>,
    rejected: Vector<Vector<Point2f>>,
}

impl CvArucoDetector {
    pub fn new(kind: DictionaryKind) -> Result<Self, CvBackendError> {
        let dictionary = objdetect::get_predefined_dictionary(predefined(kind))?;
        let params = objdetect::DetectorParameters::default()?;
        let refine = objdetect::RefineParameters::new_def()?;
        let detector = ArucoDetector::new(&dictionary, &params, refine)?;
        Ok(Self {
            detector,
            corners: Vector::new(),
            ids: Vector::new(),
            rejected: Vector::new(),
        })
    }

    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    fn run(&mut self, frame: &ColorImage) -> Result<Vec<MarkerDetection>, CvBackendError> {
        let mat = mat_from_image(frame)?;
        self.corners.clear();
        self.ids.clear();
        self.rejected.clear();
        self.detector
            .detect_markers(&mat, &mut self.corners, &mut self.ids, &mut self.rejected)?;

        let mut out = Vec::with_capacity(self.ids.len());
        for (id, quad) in self.ids.iter().zip(self.corners.iter()) {
            let corners = quad.iter().map(|p| Point2::new(p.x, p.y)).collect();
            out.push(MarkerDetection::from_corners(id, corners));
        }
        Ok(out)
    }
}

impl MarkerDetector for CvArucoDetector {
    fn detect(&mut self, frame: &ColorImage) -> Result<Vec<MarkerDetection>, PreviewError> {
        self.run(frame).map_err(|e| e.at(Stage::Detect))
    }
}
