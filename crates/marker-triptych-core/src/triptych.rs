//! Three-panel canvas built from one input frame.

use serde::{Deserialize, Serialize};

use crate::caption::{CaptionStyle, Captioner};
use crate::config::PanelCaptions;
use crate::error::PreviewError;
use crate::image::{ColorImage, PanelViewMut, CHANNELS};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TriptychError {
    #[error("cannot compose an empty frame ({width}x{height})")]
    EmptyFrame { width: usize, height: usize },
}

/// One of the three side-by-side regions of the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    /// Raw frame.
    Left,
    /// Frame with the backend's reference drawing.
    Mid,
    /// Frame with the custom overlay.
    Right,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::Left, Panel::Mid, Panel::Right];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Panel::Left => 0,
            Panel::Mid => 1,
            Panel::Right => 2,
        }
    }
}

/// Pixel rectangle of a panel inside the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Canvas of size `height × 3·width` holding three copies of a frame.
#[derive(Clone, Debug)]
pub struct Triptych {
    canvas: ColorImage,
    panel_width: usize,
    panel_height: usize,
}

impl Triptych {
    /// Copy `frame` into all three panels.
    ///
    /// Empty frames are rejected instead of yielding a degenerate canvas.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(frame), fields(width = frame.width, height = frame.height))
    )]
    pub fn compose(frame: &ColorImage) -> Result<Self, TriptychError> {
        if frame.is_empty() || frame.data.len() != frame.width * frame.height * CHANNELS {
            return Err(TriptychError::EmptyFrame {
                width: frame.width,
                height: frame.height,
            });
        }

        let (w, h) = (frame.width, frame.height);
        let mut canvas = ColorImage::new(3 * w, h);
        let row_bytes = w * CHANNELS;
        for (dst, src) in canvas
            .data
            .chunks_exact_mut(3 * row_bytes)
            .zip(frame.data.chunks_exact(row_bytes))
        {
            for slot in dst.chunks_exact_mut(row_bytes) {
                slot.copy_from_slice(src);
            }
        }

        Ok(Self {
            canvas,
            panel_width: w,
            panel_height: h,
        })
    }

    #[inline]
    pub fn panel_width(&self) -> usize {
        self.panel_width
    }

    #[inline]
    pub fn panel_height(&self) -> usize {
        self.panel_height
    }

    pub fn panel_rect(&self, panel: Panel) -> PanelRect {
        PanelRect {
            x: panel.index() * self.panel_width,
            y: 0,
            width: self.panel_width,
            height: self.panel_height,
        }
    }

    /// Live mutable alias of one panel; writes land in the canvas directly.
    pub fn panel_mut(&mut self, panel: Panel) -> PanelViewMut<'_> {
        let stride = self.canvas.stride();
        let row_bytes = self.panel_width * CHANNELS;
        let start = panel.index() * row_bytes;
        let end = start + (self.panel_height - 1) * stride + row_bytes;
        PanelViewMut::new(
            &mut self.canvas.data[start..end],
            self.panel_width,
            self.panel_height,
            stride,
        )
    }

    /// Panel contents as a standalone image.
    pub fn panel_image(&self, panel: Panel) -> ColorImage {
        let rect = self.panel_rect(panel);
        let row_bytes = rect.width * CHANNELS;
        let mut data = Vec::with_capacity(rect.height * row_bytes);
        for row in self.canvas.data.chunks_exact(self.canvas.stride()) {
            let start = rect.x * CHANNELS;
            data.extend_from_slice(&row[start..start + row_bytes]);
        }
        ColorImage {
            width: rect.width,
            height: rect.height,
            data,
        }
    }

    /// Write each panel's caption at `(offset, offset)`.
    pub fn label(
        &mut self,
        captioner: &mut dyn Captioner,
        captions: &PanelCaptions,
        style: &CaptionStyle,
    ) -> Result<(), PreviewError> {
        let origin = [style.offset, style.offset];
        for panel in Panel::ALL {
            let text = captions.get(panel);
            if text.is_empty() {
                continue;
            }
            captioner.caption(&mut self.panel_mut(panel), text, origin, style)?;
        }
        Ok(())
    }

    pub fn canvas(&self) -> &ColorImage {
        &self.canvas
    }

    pub fn into_canvas(self) -> ColorImage {
        self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption::NoCaptions;
    use crate::image::Bgr;

    fn gradient(w: usize, h: usize) -> ColorImage {
        let mut img = ColorImage::new(w, h);
        for y in 0..h {
            for x in 0..w {
                img.put_pixel(x, y, Bgr::new((x * 7) as u8, (y * 11) as u8, (x + y) as u8));
            }
        }
        img
    }

    #[test]
    fn canvas_is_three_frames_wide() {
        for (w, h) in [(1, 1), (17, 5), (64, 48)] {
            let t = Triptych::compose(&gradient(w, h)).expect("compose");
            assert_eq!(t.canvas().width, 3 * w);
            assert_eq!(t.canvas().height, h);
            assert_eq!(t.canvas().data.len(), 3 * w * h * CHANNELS);
        }
    }

    #[test]
    fn every_panel_is_a_pixel_exact_copy() {
        let frame = gradient(23, 9);
        let t = Triptych::compose(&frame).expect("compose");
        for panel in Panel::ALL {
            assert_eq!(t.panel_image(panel), frame, "{panel:?}");
        }
    }

    #[test]
    fn empty_frame_fails_fast() {
        let err = Triptych::compose(&ColorImage::new(0, 10)).unwrap_err();
        assert_eq!(
            err,
            TriptychError::EmptyFrame {
                width: 0,
                height: 10
            }
        );
        assert!(Triptych::compose(&ColorImage::new(10, 0)).is_err());
    }

    #[test]
    fn panel_writes_are_visible_and_isolated() {
        let frame = ColorImage::filled(8, 4, Bgr::WHITE);
        let mut t = Triptych::compose(&frame).expect("compose");
        t.panel_mut(Panel::Mid).fill(Bgr::RED);

        assert_eq!(t.panel_image(Panel::Left), frame);
        assert_eq!(t.panel_image(Panel::Right), frame);
        assert_eq!(
            t.panel_image(Panel::Mid),
            ColorImage::filled(8, 4, Bgr::RED)
        );
        let rect = t.panel_rect(Panel::Mid);
        assert_eq!(t.canvas().pixel(rect.x, 3), Some(Bgr::RED));
        assert_eq!(t.canvas().pixel(rect.x - 1, 3), Some(Bgr::WHITE));
        assert_eq!(t.canvas().pixel(rect.x + rect.width, 0), Some(Bgr::WHITE));
    }

    #[test]
    fn empty_captions_are_skipped() {
        let frame = gradient(12, 6);
        let mut t = Triptych::compose(&frame).expect("compose");
        let captions = PanelCaptions {
            left: String::new(),
            mid: String::new(),
            right: String::new(),
        };
        t.label(&mut NoCaptions, &captions, &CaptionStyle::default())
            .expect("label");
        assert_eq!(t.panel_image(Panel::Left), frame);
    }
}
