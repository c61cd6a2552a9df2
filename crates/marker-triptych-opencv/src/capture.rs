use std::path::Path;

use marker_triptych_core::{ColorImage, FrameSource, PreviewError, SourceSpec, Stage};
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use crate::mat::mat_to_image;
use crate::CvBackendError;

/// Device or video file read through `VideoCapture`.
pub struct CvCapture {
    cap: VideoCapture,
    frame: Mat,
}

impl CvCapture {
    pub fn open_device(index: i32) -> Result<Self, PreviewError> {
        let cap = VideoCapture::new(index, videoio::CAP_ANY)
            .map_err(|e| PreviewError::source_open(index, e))?;
        Self::checked(cap, &index.to_string())
    }

    pub fn open_file(path: &Path) -> Result<Self, PreviewError> {
        let name = path.display().to_string();
        let cap = VideoCapture::from_file(&name, videoio::CAP_ANY)
            .map_err(|e| PreviewError::source_open(&name, e))?;
        Self::checked(cap, &name)
    }

    pub fn open(spec: &SourceSpec) -> Result<Self, PreviewError> {
        match spec {
            SourceSpec::Device(index) => Self::open_device(*index),
            SourceSpec::Path(path) => Self::open_file(path),
            SourceSpec::Synthetic { .. } => Err(PreviewError::source_open(
                spec,
                "synthetic frames are not a capture device",
            )),
        }
    }

    fn checked(cap: VideoCapture, name: &str) -> Result<Self, PreviewError> {
        let opened = cap
            .is_opened()
            .map_err(|e| PreviewError::source_open(name, e))?;
        if !opened {
            return Err(PreviewError::source_open(name, "capture is not opened"));
        }
        Ok(Self {
            cap,
            frame: Mat::default(),
        })
    }

    fn read(&mut self) -> Result<Option<ColorImage>, CvBackendError> {
        if !self.cap.grab()? {
            return Ok(None);
        }
        if !self.cap.retrieve(&mut self.frame, 0)? || self.frame.empty() {
            return Ok(None);
        }
        mat_to_image(&self.frame).map(Some)
    }
}

impl FrameSource for CvCapture {
    fn next_frame(&mut self) -> Result<Option<ColorImage>, PreviewError> {
        self.read().map_err(|e| e.at(Stage::Capture))
    }
}
