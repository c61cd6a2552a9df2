//! Capture → detect → annotate → display loop and its collaborator traits.

#[cfg(feature = "tracing")]
use tracing::instrument;

use serde::Serialize;

use crate::annotate::CustomAnnotator;
use crate::caption::Captioner;
use crate::config::{DictionaryKind, PreviewConfig, SourceSpec, WindowConfig};
use crate::detection::MarkerDetection;
use crate::error::PreviewError;
use crate::image::{ColorImage, PanelViewMut};
use crate::triptych::{Panel, Triptych};

/// Produces frames one at a time. `Ok(None)` means end of stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<ColorImage>, PreviewError>;
}

/// Finds markers in a frame.
pub trait MarkerDetector {
    fn detect(&mut self, frame: &ColorImage) -> Result<Vec<MarkerDetection>, PreviewError>;
}

/// Draws detections into a panel in place.
pub trait MarkerAnnotator {
    fn annotate(
        &mut self,
        panel: &mut PanelViewMut<'_>,
        detections: &[MarkerDetection],
    ) -> Result<(), PreviewError>;
}

/// Presents composited canvases and reports key presses.
pub trait DisplaySink {
    fn show(&mut self, canvas: &ColorImage) -> Result<(), PreviewError>;

    /// Wait up to `timeout_ms` for a key. `None` when nothing was pressed.
    fn poll_key(&mut self, timeout_ms: u32) -> Result<Option<i32>, PreviewError>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn next_frame(&mut self) -> Result<Option<ColorImage>, PreviewError> {
        (**self).next_frame()
    }
}

impl<T: MarkerDetector + ?Sized> MarkerDetector for Box<T> {
    fn detect(&mut self, frame: &ColorImage) -> Result<Vec<MarkerDetection>, PreviewError> {
        (**self).detect(frame)
    }
}

impl<T: MarkerAnnotator + ?Sized> MarkerAnnotator for Box<T> {
    fn annotate(
        &mut self,
        panel: &mut PanelViewMut<'_>,
        detections: &[MarkerDetection],
    ) -> Result<(), PreviewError> {
        (**self).annotate(panel, detections)
    }
}

impl<T: Captioner + ?Sized> Captioner for Box<T> {
    fn caption(
        &mut self,
        panel: &mut PanelViewMut<'_>,
        text: &str,
        origin: [i32; 2],
        style: &crate::caption::CaptionStyle,
    ) -> Result<(), PreviewError> {
        (**self).caption(panel, text, origin, style)
    }
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn show(&mut self, canvas: &ColorImage) -> Result<(), PreviewError> {
        (**self).show(canvas)
    }

    fn poll_key(&mut self, timeout_ms: u32) -> Result<Option<i32>, PreviewError> {
        (**self).poll_key(timeout_ms)
    }
}

/// Factory for every collaborator of a preview session.
pub trait PreviewBackend {
    /// Human-readable backend name and version, logged at startup.
    fn describe(&self) -> String;

    fn open_source(&mut self, spec: &SourceSpec) -> Result<Box<dyn FrameSource>, PreviewError>;

    fn open_display(&mut self, window: &WindowConfig) -> Result<Box<dyn DisplaySink>, PreviewError>;

    fn detector(&mut self, dictionary: DictionaryKind)
        -> Result<Box<dyn MarkerDetector>, PreviewError>;

    /// Annotator used for the middle panel.
    fn reference_annotator(&mut self) -> Result<Box<dyn MarkerAnnotator>, PreviewError>;

    fn captioner(&mut self) -> Result<Box<dyn Captioner>, PreviewError>;
}

/// Why a preview run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    ExitKey,
    EndOfStream,
    CaptureFailed,
    FrameLimit,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub frames: u64,
    /// Total detections over all frames.
    pub markers: u64,
    pub stop: StopReason,
}

/// One composited frame and the detections drawn into it.
#[derive(Clone, Debug)]
pub struct RenderedFrame {
    pub triptych: Triptych,
    pub detections: Vec<MarkerDetection>,
}

/// Single-threaded preview pipeline.
pub struct Preview<D, R, C> {
    config: PreviewConfig,
    detector: D,
    reference: R,
    custom: CustomAnnotator,
    captioner: C,
}

impl<D, R, C> Preview<D, R, C>
where
    D: MarkerDetector,
    R: MarkerAnnotator,
    C: Captioner,
{
    pub fn new(config: PreviewConfig, detector: D, reference: R, captioner: C) -> Self {
        let custom = CustomAnnotator::from_config(&config);
        Self {
            config,
            detector,
            reference,
            custom,
            captioner,
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Compose, caption and annotate one frame.
    ///
    /// Detection runs on the untouched input, so captions never reach the
    /// detector.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(width = frame.width, height = frame.height))
    )]
    pub fn render(&mut self, frame: &ColorImage) -> Result<RenderedFrame, PreviewError> {
        let mut triptych = Triptych::compose(frame)?;
        triptych.label(
            &mut self.captioner,
            &self.config.captions,
            &self.config.caption_style,
        )?;

        let detections = self.detector.detect(frame)?;
        log::debug!("detected {} marker(s)", detections.len());

        self.reference
            .annotate(&mut triptych.panel_mut(Panel::Mid), &detections)?;
        self.custom
            .annotate(&mut triptych.panel_mut(Panel::Right), &detections)?;

        Ok(RenderedFrame {
            triptych,
            detections,
        })
    }

    /// Run until the exit key, end of stream, a capture failure or the frame
    /// limit.
    ///
    /// A capture error after the source was opened ends the run normally with
    /// [`StopReason::CaptureFailed`]. Errors from every other stage are
    /// returned.
    pub fn run<S, K>(&mut self, source: &mut S, display: &mut K) -> Result<RunSummary, PreviewError>
    where
        S: FrameSource + ?Sized,
        K: DisplaySink + ?Sized,
    {
        let mut frames = 0u64;
        let mut markers = 0u64;

        let stop = loop {
            if self.config.max_frames.is_some_and(|limit| frames >= limit) {
                break StopReason::FrameLimit;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break StopReason::EndOfStream,
                Err(err) => {
                    log::warn!("frame capture failed, stopping: {err}");
                    break StopReason::CaptureFailed;
                }
            };

            let rendered = self.render(&frame)?;
            frames += 1;
            markers += rendered.detections.len() as u64;
            display.show(rendered.triptych.canvas())?;

            if display.poll_key(self.config.key_poll_ms)? == Some(self.config.exit_key) {
                break StopReason::ExitKey;
            }
        };

        log::info!("preview stopped after {frames} frame(s): {stop:?}");
        Ok(RunSummary {
            frames,
            markers,
            stop,
        })
    }
}

/// Open every collaborator through `backend` and run the preview.
///
/// The source is opened first; if that fails the display is never created.
pub fn run_preview(
    backend: &mut dyn PreviewBackend,
    source: &SourceSpec,
    config: PreviewConfig,
) -> Result<RunSummary, PreviewError> {
    log::info!("Using {}", backend.describe());

    let mut frames = backend.open_source(source)?;
    log::info!("opened input source {source}");

    let detector = backend.detector(config.dictionary)?;
    let reference = backend.reference_annotator()?;
    let captioner = backend.captioner()?;
    let mut display = backend.open_display(&config.window)?;

    let mut preview = Preview::new(config, detector, reference, captioner);
    preview.run(&mut frames, &mut display)
}
