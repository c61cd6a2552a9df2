//! OpenCV collaborators for the marker triptych preview.
//!
//! Requires a system OpenCV (4.7 or newer for the `ArucoDetector` API) and is
//! therefore not a default workspace member.

mod capture;
mod detect;
mod display;
mod draw;
mod mat;

pub use capture::CvCapture;
pub use detect::CvArucoDetector;
pub use display::HighGuiDisplay;
pub use draw::{CvCaptioner, CvReferenceAnnotator};
pub use mat::{mat_from_image, mat_to_image, with_panel_mat};

use marker_triptych_core::{ImageError, PreviewError, Stage};

#[derive(thiserror::Error, Debug)]
pub enum CvBackendError {
    #[error(transparent)]
    Cv(#[from] opencv::Error),
    #[error("expected an 8-bit 3-channel matrix, got type {typ}")]
    UnexpectedMatType { typ: i32 },
    #[error(transparent)]
    Image(#[from] ImageError),
}

impl CvBackendError {
    pub(crate) fn at(self, stage: Stage) -> PreviewError {
        PreviewError::backend(stage, self)
    }
}

/// `"OpenCV version: 4.x.y"`.
pub fn opencv_version() -> Result<String, CvBackendError> {
    Ok(format!(
        "OpenCV version: {}",
        opencv::core::get_version_string()?
    ))
}
