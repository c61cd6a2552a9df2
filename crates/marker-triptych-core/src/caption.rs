//! Panel caption rendering.

use serde::{Deserialize, Serialize};

use crate::error::PreviewError;
use crate::image::{Bgr, PanelViewMut};

/// Caption placement and appearance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    /// Baseline-left origin at `(offset, offset)` inside each panel.
    pub offset: i32,
    pub color: Bgr,
    pub scale: f32,
    pub thickness: i32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            offset: 50,
            color: Bgr::BLACK,
            scale: 1.0,
            thickness: 2,
        }
    }
}

/// Draws a text line into a panel.
pub trait Captioner {
    /// `origin` is the baseline-left point of the text, in panel pixels.
    fn caption(
        &mut self,
        panel: &mut PanelViewMut<'_>,
        text: &str,
        origin: [i32; 2],
        style: &CaptionStyle,
    ) -> Result<(), PreviewError>;
}

/// Captioner that draws nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCaptions;

impl Captioner for NoCaptions {
    fn caption(
        &mut self,
        _panel: &mut PanelViewMut<'_>,
        _text: &str,
        _origin: [i32; 2],
        _style: &CaptionStyle,
    ) -> Result<(), PreviewError> {
        Ok(())
    }
}

#[cfg(feature = "text")]
pub use glyph::{GlyphCaptioner, FontLoadError};

#[cfg(feature = "text")]
mod glyph {
    use std::path::{Path, PathBuf};

    use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
    use ::image::Rgb;

    use super::{CaptionStyle, Captioner};
    use crate::error::PreviewError;
    use crate::image::PanelViewMut;

    /// Pixel height of a scale-1.0 caption, close to Hershey duplex at 1.0.
    const BASE_PX: f32 = 30.0;

    /// Outline fonts have no stroke width; thickness `t` is approximated by
    /// `t - 1` extra passes shifted one pixel right each, capped at 8.
    pub(super) fn bold_passes(thickness: i32) -> i32 {
        (thickness - 1).clamp(0, 7) + 1
    }

    #[derive(thiserror::Error, Debug)]
    pub enum FontLoadError {
        #[error("failed to read font {}: {source}", path.display())]
        Io {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        #[error("invalid font data: {0}")]
        Invalid(#[from] ab_glyph::InvalidFont),
    }

    /// TrueType captions drawn with `imageproc`.
    #[derive(Clone)]
    pub struct GlyphCaptioner {
        font: FontArc,
    }

    impl std::fmt::Debug for GlyphCaptioner {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("GlyphCaptioner").finish_non_exhaustive()
        }
    }

    impl GlyphCaptioner {
        pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, FontLoadError> {
            Ok(Self {
                font: FontArc::try_from_vec(bytes)?,
            })
        }

        pub fn open(path: impl AsRef<Path>) -> Result<Self, FontLoadError> {
            let path = path.as_ref();
            let bytes = std::fs::read(path).map_err(|source| FontLoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_bytes(bytes)
        }
    }

    impl Captioner for GlyphCaptioner {
        fn caption(
            &mut self,
            panel: &mut PanelViewMut<'_>,
            text: &str,
            origin: [i32; 2],
            style: &CaptionStyle,
        ) -> Result<(), PreviewError> {
            let scale = PxScale::from(BASE_PX * style.scale.max(0.0));
            // draw_text_mut positions the glyph box top, not the baseline.
            let ascent = self.font.as_scaled(scale).ascent();
            let top = origin[1] - ascent.round() as i32;
            for dx in 0..bold_passes(style.thickness) {
                imageproc::drawing::draw_text_mut(
                    panel,
                    Rgb(style.color.0),
                    origin[0].saturating_add(dx),
                    top,
                    scale,
                    &self.font,
                    text,
                );
            }
            Ok(())
        }
    }
}
