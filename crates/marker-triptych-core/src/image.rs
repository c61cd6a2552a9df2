//! Packed BGR8 frames, grayscale buffers and strided panel views.

use serde::{Deserialize, Serialize};

/// Number of interleaved channels in a [`ColorImage`].
pub const CHANNELS: usize = 3;

/// One 8-bit color in blue, green, red order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bgr(pub [u8; 3]);

impl Bgr {
    pub const BLACK: Bgr = Bgr([0, 0, 0]);
    pub const WHITE: Bgr = Bgr([255, 255, 255]);
    pub const BLUE: Bgr = Bgr([255, 0, 0]);
    pub const GREEN: Bgr = Bgr([0, 255, 0]);
    pub const RED: Bgr = Bgr([0, 0, 255]);

    #[inline]
    pub const fn new(b: u8, g: u8, r: u8) -> Self {
        Self([b, g, r])
    }

    #[inline]
    pub const fn gray(v: u8) -> Self {
        Self([v, v, v])
    }

    /// BT.601 luma in fixed point.
    #[inline]
    pub fn luma(self) -> u8 {
        let [b, g, r] = self.0;
        ((29 * b as u32 + 150 * g as u32 + 77 * r as u32 + 128) >> 8) as u8
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid BGR buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("image size mismatch ({src_width}x{src_height} into {dst_width}x{dst_height})")]
    SizeMismatch {
        src_width: usize,
        src_height: usize,
        dst_width: usize,
        dst_height: usize,
    },
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Owned BGR8 frame, row-major and tightly packed (`stride == width * 3`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl ColorImage {
    /// Black frame of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * CHANNELS],
        }
    }

    pub fn filled(width: usize, height: usize, color: Bgr) -> Self {
        let data = color
            .0
            .iter()
            .copied()
            .cycle()
            .take(width * height * CHANNELS)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap a raw BGR buffer, validating its dimensions and length.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions { width, height });
        }
        let Some(expected) = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(CHANNELS))
        else {
            return Err(ImageError::InvalidDimensions { width, height });
        };
        if data.len() != expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.width * CHANNELS
    }

    pub fn view(&self) -> ColorImageView<'_> {
        ColorImageView {
            width: self.width,
            height: self.height,
            stride: self.stride(),
            data: &self.data,
        }
    }

    /// The whole frame as a mutable view.
    pub fn view_mut(&mut self) -> PanelViewMut<'_> {
        let (width, height, stride) = (self.width, self.height, self.stride());
        PanelViewMut::new(&mut self.data, width, height, stride)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Bgr> {
        self.view().pixel(x, y)
    }

    pub fn put_pixel(&mut self, x: usize, y: usize, color: Bgr) {
        if x < self.width && y < self.height {
            let i = (y * self.width + x) * CHANNELS;
            self.data[i..i + CHANNELS].copy_from_slice(&color.0);
        }
    }

    pub fn to_gray(&self) -> GrayImage {
        GrayImage {
            width: self.width,
            height: self.height,
            data: self
                .data
                .chunks_exact(CHANNELS)
                .map(|px| Bgr([px[0], px[1], px[2]]).luma())
                .collect(),
        }
    }
}

/// Read-only strided BGR view.
#[derive(Clone, Copy, Debug)]
pub struct ColorImageView<'a> {
    pub width: usize,
    pub height: usize,
    /// Bytes between the starts of consecutive rows.
    pub stride: usize,
    pub data: &'a [u8],
}

impl<'a> ColorImageView<'a> {
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.data[start..start + self.width * CHANNELS]
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Bgr> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = y * self.stride + x * CHANNELS;
        Some(Bgr([self.data[i], self.data[i + 1], self.data[i + 2]]))
    }

    pub fn to_image(&self) -> ColorImage {
        let mut data = Vec::with_capacity(self.width * self.height * CHANNELS);
        for y in 0..self.height {
            data.extend_from_slice(self.row(y));
        }
        ColorImage {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Mutable window into a larger BGR buffer.
///
/// The view borrows `height` rows of `width` pixels spaced `stride` bytes
/// apart. Every write goes straight into the parent buffer and is clipped to
/// the view's own columns, so neighbouring panels of a canvas are never
/// touched.
#[derive(Debug)]
pub struct PanelViewMut<'a> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a mut [u8],
}

impl<'a> PanelViewMut<'a> {
    pub(crate) fn new(data: &'a mut [u8], width: usize, height: usize, stride: usize) -> Self {
        debug_assert!(width * CHANNELS <= stride || height <= 1);
        debug_assert!(height == 0 || data.len() >= (height - 1) * stride + width * CHANNELS);
        Self {
            width,
            height,
            stride,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Shorter-lived view over the same pixels.
    pub fn reborrow(&mut self) -> PanelViewMut<'_> {
        PanelViewMut {
            width: self.width,
            height: self.height,
            stride: self.stride,
            data: &mut *self.data,
        }
    }

    pub fn as_view(&self) -> ColorImageView<'_> {
        ColorImageView {
            width: self.width,
            height: self.height,
            stride: self.stride,
            data: &*self.data,
        }
    }

    /// Pointer to the first pixel, for building foreign matrix headers.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.as_mut_ptr()
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.stride;
        &mut self.data[start..start + self.width * CHANNELS]
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Bgr> {
        self.as_view().pixel(x, y)
    }

    /// Write one pixel; coordinates outside the view are ignored.
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Bgr) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let i = y as usize * self.stride + x as usize * CHANNELS;
        self.data[i..i + CHANNELS].copy_from_slice(&color.0);
    }

    /// Fill `x0..=x1` on row `y`, clipped to the view.
    pub fn fill_span(&mut self, y: i32, x0: i32, x1: i32, color: Bgr) {
        if y < 0 || y as usize >= self.height || self.width == 0 {
            return;
        }
        let lo = x0.max(0);
        let hi = x1.min(self.width as i32 - 1);
        if lo > hi {
            return;
        }
        let row = self.row_mut(y as usize);
        for px in row[lo as usize * CHANNELS..(hi as usize + 1) * CHANNELS].chunks_exact_mut(CHANNELS)
        {
            px.copy_from_slice(&color.0);
        }
    }

    pub fn fill(&mut self, color: Bgr) {
        for y in 0..self.height as i32 {
            self.fill_span(y, 0, self.width as i32 - 1, color);
        }
    }

    /// Copy a same-sized image into the view.
    pub fn copy_from(&mut self, src: &ColorImageView<'_>) -> Result<(), ImageError> {
        if src.width != self.width || src.height != self.height {
            return Err(ImageError::SizeMismatch {
                src_width: src.width,
                src_height: src.height,
                dst_width: self.width,
                dst_height: self.height,
            });
        }
        for y in 0..self.height {
            self.row_mut(y).copy_from_slice(src.row(y));
        }
        Ok(())
    }

    pub fn to_image(&self) -> ColorImage {
        self.as_view().to_image()
    }
}

#[cfg(feature = "text")]
impl imageproc::drawing::Canvas for PanelViewMut<'_> {
    // Channels stay in BGR order; glyph blending is channel-agnostic.
    type Pixel = ::image::Rgb<u8>;

    fn dimensions(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    fn get_pixel(&self, x: u32, y: u32) -> Self::Pixel {
        let px = self.pixel(x as usize, y as usize).unwrap_or(Bgr::BLACK);
        ::image::Rgb(px.0)
    }

    fn draw_pixel(&mut self, x: u32, y: u32, color: Self::Pixel) {
        self.put_pixel(x as i32, y as i32, Bgr(color.0));
    }
}
