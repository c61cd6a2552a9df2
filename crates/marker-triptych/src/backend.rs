//! Collaborator wiring for the command-line preview.

use std::path::PathBuf;

use marker_triptych_aruco::{builtins, QuadDetector, QuadDetectorParams, SyntheticSource};
use marker_triptych_core::{
    Captioner, DetectorBackend, DictionaryKind, DisplaySink, FrameSource, GlyphCaptioner,
    MarkerAnnotator, MarkerDetector, NoCaptions, PreviewBackend, PreviewConfig, PreviewError,
    SourceSpec, Stage, WindowConfig,
};
#[cfg(not(feature = "opencv"))]
use marker_triptych_core::OutlineAnnotator;

use crate::io::{ImageSequenceSource, PngSequenceSink};

#[derive(Clone, Debug, Default)]
pub struct BackendOptions {
    /// Write canvases here instead of opening a window.
    pub output_dir: Option<PathBuf>,
    pub detector: DetectorBackend,
    pub dictionary: DictionaryKind,
    /// TrueType font for native captions.
    pub font_path: Option<PathBuf>,
}

impl BackendOptions {
    pub fn from_config(config: &PreviewConfig, output_dir: Option<PathBuf>) -> Self {
        Self {
            output_dir,
            detector: config.detector,
            dictionary: config.dictionary,
            font_path: config.font_path.clone(),
        }
    }
}

/// Native collaborators, with OpenCV ones when the `opencv` feature is on.
#[derive(Clone, Debug)]
pub struct AppBackend {
    opts: BackendOptions,
}

impl AppBackend {
    pub fn new(opts: BackendOptions) -> Self {
        Self { opts }
    }

    /// Detector backend after resolving `Auto`.
    pub fn detector_backend(&self) -> DetectorBackend {
        match self.opts.detector {
            DetectorBackend::Auto if cfg!(feature = "opencv") => DetectorBackend::OpenCv,
            DetectorBackend::Auto => DetectorBackend::Native,
            other => other,
        }
    }

    #[cfg_attr(feature = "opencv", allow(dead_code))]
    fn native_captioner(&self) -> Result<Box<dyn Captioner>, PreviewError> {
        match &self.opts.font_path {
            Some(path) => {
                let glyphs =
                    GlyphCaptioner::open(path).map_err(|e| PreviewError::backend(Stage::Caption, e))?;
                Ok(Box::new(glyphs))
            }
            None => {
                log::info!("no caption font configured, panels are left unlabeled");
                Ok(Box::new(NoCaptions))
            }
        }
    }
}

impl PreviewBackend for AppBackend {
    fn describe(&self) -> String {
        #[cfg(feature = "opencv")]
        {
            match marker_triptych_opencv::opencv_version() {
                Ok(version) => return version,
                Err(err) => log::warn!("could not query the OpenCV version: {err}"),
            }
        }
        format!("native backend {}", env!("CARGO_PKG_VERSION"))
    }

    fn open_source(&mut self, spec: &SourceSpec) -> Result<Box<dyn FrameSource>, PreviewError> {
        match spec {
            SourceSpec::Synthetic { frames } => {
                let dict = builtins::dictionary(self.opts.dictionary);
                Ok(Box::new(SyntheticSource::with_frames(dict, *frames)))
            }
            SourceSpec::Path(path) if path.is_dir() => ImageSequenceSource::open(path)
                .map(|s| Box::new(s) as Box<dyn FrameSource>)
                .map_err(|e| PreviewError::source_open(spec, e)),
            #[cfg(feature = "opencv")]
            _ => Ok(Box::new(marker_triptych_opencv::CvCapture::open(spec)?)),
            #[cfg(not(feature = "opencv"))]
            _ => Err(PreviewError::source_open(
                spec,
                "video capture needs the `opencv` feature",
            )),
        }
    }

    fn open_display(&mut self, window: &WindowConfig) -> Result<Box<dyn DisplaySink>, PreviewError> {
        if let Some(dir) = &self.opts.output_dir {
            let sink =
                PngSequenceSink::create(dir).map_err(|e| PreviewError::DisplayOpen(e.to_string()))?;
            log::info!("writing frames to {}", dir.display());
            return Ok(Box::new(sink));
        }
        #[cfg(feature = "opencv")]
        {
            Ok(Box::new(marker_triptych_opencv::HighGuiDisplay::open(window)?))
        }
        #[cfg(not(feature = "opencv"))]
        {
            let _ = window;
            Err(PreviewError::unsupported(
                "an interactive display (use --output-dir)",
            ))
        }
    }

    fn detector(
        &mut self,
        dictionary: DictionaryKind,
    ) -> Result<Box<dyn MarkerDetector>, PreviewError> {
        match self.detector_backend() {
            #[cfg(feature = "opencv")]
            DetectorBackend::OpenCv => {
                let det = marker_triptych_opencv::CvArucoDetector::new(dictionary)
                    .map_err(|e| PreviewError::backend(Stage::Detect, e))?;
                Ok(Box::new(det))
            }
            #[cfg(not(feature = "opencv"))]
            DetectorBackend::OpenCv => Err(PreviewError::unsupported("the OpenCV detector")),
            _ => {
                let dict = builtins::dictionary(dictionary);
                let det = QuadDetector::new(dict, QuadDetectorParams::default()).ok_or_else(|| {
                    PreviewError::unsupported(format!("decoding {}", dict.name))
                })?;
                Ok(Box::new(det))
            }
        }
    }

    fn reference_annotator(&mut self) -> Result<Box<dyn MarkerAnnotator>, PreviewError> {
        #[cfg(feature = "opencv")]
        {
            Ok(Box::new(marker_triptych_opencv::CvReferenceAnnotator::default()))
        }
        #[cfg(not(feature = "opencv"))]
        {
            let mut outline = OutlineAnnotator::default();
            if self.opts.font_path.is_some() {
                outline = outline.with_captioner(self.native_captioner()?);
            }
            Ok(Box::new(outline))
        }
    }

    fn captioner(&mut self) -> Result<Box<dyn Captioner>, PreviewError> {
        #[cfg(feature = "opencv")]
        {
            Ok(Box::new(marker_triptych_opencv::CvCaptioner))
        }
        #[cfg(not(feature = "opencv"))]
        {
            self.native_captioner()
        }
    }
}
