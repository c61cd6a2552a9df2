//! Core of the marker triptych preview.
//!
//! A frame is copied into three side-by-side panels: the raw frame, the frame
//! with a backend's reference marker drawing, and the frame with a filled and
//! stroked overlay over every detected marker. This crate owns the pixel
//! buffers, the compositor, the overlay raster and the preview loop. Marker
//! detection, capture and display are reached through the traits in
//! [`preview`] and live in backend crates.
//!
//! ```
//! use marker_triptych_core::{Bgr, ColorImage, Panel, Triptych};
//!
//! let frame = ColorImage::filled(64, 48, Bgr::WHITE);
//! let triptych = Triptych::compose(&frame).unwrap();
//! assert_eq!(triptych.canvas().width, 3 * 64);
//! assert_eq!(triptych.panel_image(Panel::Right), frame);
//! ```

mod annotate;
mod caption;
mod config;
mod detection;
mod error;
mod homography;
mod image;
mod logger;
pub mod preview;
mod raster;
mod reference;
mod triptych;

pub use annotate::CustomAnnotator;
#[cfg(feature = "text")]
pub use caption::{FontLoadError, GlyphCaptioner};
pub use caption::{CaptionStyle, Captioner, NoCaptions};
pub use config::{
    ConfigError, DetectorBackend, DictionaryKind, PanelCaptions, PreviewConfig, SourceSpec,
    WindowConfig,
};
pub use detection::MarkerDetection;
pub use error::{BoxError, PreviewError, Stage};
pub use homography::{homography_from_4pt, Homography};
pub use image::{
    Bgr, ColorImage, ColorImageView, GrayImage, GrayImageView, ImageError, PanelViewMut, CHANNELS,
};
pub use preview::{
    run_preview, DisplaySink, FrameSource, MarkerAnnotator, MarkerDetector, Preview,
    PreviewBackend, RenderedFrame, RunSummary, StopReason,
};
pub use raster::{draw_line, draw_rect, fill_polygon, round_point, stroke_closed, truncate_point};
pub use reference::OutlineAnnotator;
pub use triptych::{Panel, PanelRect, Triptych, TriptychError};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
