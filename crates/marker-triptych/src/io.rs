//! Frame sources and sinks backed by image files.

use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::instrument;

use image::RgbImage;
use marker_triptych_core::{
    ColorImage, DisplaySink, FrameSource, PreviewError, Stage, CHANNELS,
};

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no images found in {}", path.display())]
    Empty { path: PathBuf },
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Reorder RGB pixels into a BGR frame.
pub fn color_image_from_rgb(rgb: &RgbImage) -> ColorImage {
    let (w, h) = rgb.dimensions();
    let mut data = rgb.as_raw().clone();
    for px in data.chunks_exact_mut(CHANNELS) {
        px.swap(0, 2);
    }
    ColorImage {
        width: w as usize,
        height: h as usize,
        data,
    }
}

/// Reorder a BGR frame into RGB pixels.
pub fn color_image_to_rgb(img: &ColorImage) -> Option<RgbImage> {
    let mut data = img.data.clone();
    for px in data.chunks_exact_mut(CHANNELS) {
        px.swap(0, 2);
    }
    RgbImage::from_raw(img.width as u32, img.height as u32, data)
}

/// Decode an image file into a BGR frame.
pub fn load_color_image(path: &Path) -> Result<ColorImage, SourceError> {
    let img = image::open(path).map_err(|source| SourceError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(color_image_from_rgb(&img.to_rgb8()))
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Still images of a directory, in file-name order.
#[derive(Debug)]
pub struct ImageSequenceSource {
    files: Vec<PathBuf>,
    next: usize,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path) -> Result<Self, SourceError> {
        let io_err = |source| SourceError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && is_image(&path) {
                files.push(path);
            }
        }
        if files.is_empty() {
            return Err(SourceError::Empty {
                path: dir.to_path_buf(),
            });
        }
        files.sort();
        log::info!("found {} image(s) in {}", files.len(), dir.display());
        Ok(Self { files, next: 0 })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    fn next_frame(&mut self) -> Result<Option<ColorImage>, PreviewError> {
        let Some(path) = self.files.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        log::debug!("reading {}", path.display());
        load_color_image(path)
            .map(Some)
            .map_err(|e| PreviewError::backend(Stage::Capture, e))
    }
}

/// Writes every shown canvas as `frame_NNNNN.png`. Never reports a key.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    written: usize,
}

impl PngSequenceSink {
    /// Create `dir` (and parents) if needed.
    pub fn create(dir: &Path) -> Result<Self, SourceError> {
        std::fs::create_dir_all(dir).map_err(|source| SourceError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: 0,
        })
    }

    pub fn written(&self) -> usize {
        self.written
    }

    fn save(&mut self, canvas: &ColorImage) -> Result<(), SourceError> {
        let path = self.dir.join(format!("frame_{:05}.png", self.written));
        let rgb = color_image_to_rgb(canvas).ok_or_else(|| SourceError::Encode {
            path: path.clone(),
            source: image::ImageError::Parameter(image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            )),
        })?;
        rgb.save(&path).map_err(|source| SourceError::Encode {
            path: path.clone(),
            source,
        })?;
        self.written += 1;
        Ok(())
    }
}

impl DisplaySink for PngSequenceSink {
    fn show(&mut self, canvas: &ColorImage) -> Result<(), PreviewError> {
        self.save(canvas)
            .map_err(|e| PreviewError::backend(Stage::Display, e))
    }

    fn poll_key(&mut self, _timeout_ms: u32) -> Result<Option<i32>, PreviewError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marker_triptych_core::Bgr;

    #[test]
    fn rgb_round_trip_swaps_channels() {
        let mut frame = ColorImage::new(2, 1);
        frame.put_pixel(0, 0, Bgr::BLUE);
        frame.put_pixel(1, 0, Bgr::RED);
        let rgb = color_image_to_rgb(&frame).expect("sized");
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(rgb.get_pixel(1, 0).0, [255, 0, 0]);
        assert_eq!(color_image_from_rgb(&rgb), frame);
    }

    #[test]
    fn extensions_are_case_insensitive() {
        assert!(is_image(Path::new("a/b/frame.PNG")));
        assert!(is_image(Path::new("x.tiff")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("noext")));
    }
}
