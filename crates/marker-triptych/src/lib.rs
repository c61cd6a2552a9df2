//! Side-by-side ArUco marker preview.
//!
//! Re-exports the pipeline from [`marker_triptych_core`] and the native
//! detector from [`marker_triptych_aruco`], and adds file-backed sources and
//! sinks plus the [`AppBackend`] used by the `marker-triptych` binary.
//! Enable the `opencv` feature for camera/video capture, the OpenCV ArUco
//! detector and a HighGUI window.

pub mod backend;
pub mod io;

pub use backend::{AppBackend, BackendOptions};
pub use io::{
    color_image_from_rgb, color_image_to_rgb, load_color_image, ImageSequenceSource,
    PngSequenceSink, SourceError,
};

pub use marker_triptych_aruco as aruco;
pub use marker_triptych_core as core;
#[cfg(feature = "opencv")]
pub use marker_triptych_opencv as opencv;

pub use marker_triptych_core::{
    run_preview, Bgr, ColorImage, DetectorBackend, DictionaryKind, MarkerDetection, Panel,
    Preview, PreviewBackend, PreviewConfig, PreviewError, RunSummary, SourceSpec, StopReason,
    Triptych,
};
